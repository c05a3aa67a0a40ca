//! Typed expression trees emitted by the transformer.

use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueType};

/// Built-in functions callable from clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Builtin {
    /// `MAX(a, b)` over two integers.
    Max,
    /// `MIN(a, b)` over two integers.
    Min,
}

impl Builtin {
    /// Resolves an uppercased call name against the built-in table.
    pub(crate) fn resolve(name: &str) -> Option<Builtin> {
        match name {
            "MAX" => Some(Builtin::Max),
            "MIN" => Some(Builtin::Min),
            _ => None,
        }
    }

    /// The canonical function name.
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Max => "MAX",
            Builtin::Min => "MIN",
        }
    }

    /// The type the call produces.
    pub fn result_type(&self) -> ValueType {
        ValueType::Int
    }
}

/// String predicates lowered from the text operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StringMethod {
    Contains,
    StartsWith,
    EndsWith,
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Prefix `+`; numeric identity.
    Plus,
    /// Prefix `-`.
    Negate,
    /// Logical `NOT`.
    Not,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

/// A typed expression over one record instance.
///
/// [`Property`](TypedExpr::Property) nodes implicitly reference the record
/// the expression is evaluated against — the instance placeholder the
/// compiler was asked to bind. The compiler returns the root; it never
/// evaluates the tree itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TypedExpr {
    /// A literal value.
    Constant(Value),
    /// Access to a public field of the record.
    Property {
        /// The field name.
        name: String,
        /// The field's declared type.
        ty: ValueType,
    },
    /// Character lookup on a string-typed target.
    Index {
        target: Box<TypedExpr>,
        index: Box<TypedExpr>,
    },
    /// A call into the built-in function table.
    Call {
        function: Builtin,
        arguments: Vec<TypedExpr>,
    },
    /// A string predicate such as `CONTAINS`.
    StringMethod {
        method: StringMethod,
        target: Box<TypedExpr>,
        argument: Box<TypedExpr>,
    },
    /// A unary operation.
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    /// A binary operation.
    Binary {
        op: BinaryOp,
        left: Box<TypedExpr>,
        right: Box<TypedExpr>,
    },
    /// Numeric widening inserted by the type checker.
    Convert {
        to: ValueType,
        operand: Box<TypedExpr>,
    },
}

impl TypedExpr {
    /// Creates a binary node.
    pub fn binary(op: BinaryOp, left: TypedExpr, right: TypedExpr) -> Self {
        TypedExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Creates a unary node.
    pub fn unary(op: UnaryOp, operand: TypedExpr) -> Self {
        TypedExpr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Creates a widening conversion node.
    pub fn convert(to: ValueType, operand: TypedExpr) -> Self {
        TypedExpr::Convert {
            to,
            operand: Box::new(operand),
        }
    }

    /// The static type of the value this expression produces.
    pub fn value_type(&self) -> ValueType {
        match self {
            TypedExpr::Constant(value) => value.value_type(),
            TypedExpr::Property { ty, .. } => *ty,
            TypedExpr::Index { .. } => ValueType::Char,
            TypedExpr::Call { function, .. } => function.result_type(),
            TypedExpr::StringMethod { .. } => ValueType::Bool,
            TypedExpr::Unary {
                op: UnaryOp::Not, ..
            } => ValueType::Bool,
            TypedExpr::Unary { operand, .. } => operand.value_type(),
            TypedExpr::Binary { op, left, .. } => match op {
                BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Modulo => left.value_type(),
                BinaryOp::Power => ValueType::Double,
                _ => ValueType::Bool,
            },
            TypedExpr::Convert { to, .. } => *to,
        }
    }
}
