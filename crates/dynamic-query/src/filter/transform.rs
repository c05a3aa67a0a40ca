//! Type-checking transformer from parse trees to typed expressions.
//!
//! Walks the rebalanced tree bottom-up; each node emits a typed
//! subexpression from its children's typed subexpressions, checked
//! against the per-operator typing rules. Integer operands promote to
//! double where the rules allow mixing; `^` promotes both sides.

use super::error::{FilterError, FilterResult};
use super::expr::{BinaryOp, Builtin, StringMethod, TypedExpr, UnaryOp};
use super::lexer::TokenKind;
use super::tree::TreeNode;
use crate::record::FieldDef;
use crate::value::{Value, ValueType};

/// Types accepted by the arithmetic operators.
const NUMERIC: [ValueType; 2] = [ValueType::Int, ValueType::Double];

/// Types accepted by the ordering comparisons and `BETWEEN`.
const ORDERED: [ValueType; 3] = [ValueType::Int, ValueType::Double, ValueType::Char];

/// Transformer from parse trees to typed expressions, bound to one record
/// schema.
pub(crate) struct Transformer<'a> {
    record: &'static str,
    fields: &'a [FieldDef],
}

impl<'a> Transformer<'a> {
    pub(crate) fn new(record: &'static str, fields: &'a [FieldDef]) -> Self {
        Self { record, fields }
    }

    /// Transforms the tree, requiring the root to produce `output`.
    pub(crate) fn transform(&self, root: &TreeNode, output: ValueType) -> FilterResult<TypedExpr> {
        let expr = self.node(root)?;
        if expr.value_type() != output {
            return Err(FilterError::ResultMismatch {
                text: root.token.text.clone(),
                position: root.token.position,
                expected: output,
            });
        }
        Ok(expr)
    }

    fn node(&self, node: &TreeNode) -> FilterResult<TypedExpr> {
        match &node.token.kind {
            TokenKind::Value { value } => self.value(node, value),
            TokenKind::Named if node.is_field => self.field(node),
            TokenKind::Named => self.call(node),
            TokenKind::Symbol { symbol } => self.operation(node, symbol),
        }
    }

    fn value(&self, node: &TreeNode, value: &Value) -> FilterResult<TypedExpr> {
        let constant = TypedExpr::Constant(value.clone());
        match node.children.first() {
            Some(index) => self.indexed(node, constant, index, "indexed value"),
            None => Ok(constant),
        }
    }

    fn field(&self, node: &TreeNode) -> FilterResult<TypedExpr> {
        let name = &node.token.text;
        let Some(def) = self.fields.iter().find(|f| f.name == *name) else {
            return Err(FilterError::UnknownMember {
                member: name.clone(),
                position: node.token.position,
                record: self.record,
            });
        };
        let property = TypedExpr::Property {
            name: name.clone(),
            ty: def.ty,
        };
        match node.children.first() {
            Some(index) => self.indexed(node, property, index, "indexed field"),
            None => Ok(property),
        }
    }

    /// String indexing is the only indexer: the target must be a string,
    /// the index an integer; the result is a char.
    fn indexed(
        &self,
        node: &TreeNode,
        target: TypedExpr,
        index: &TreeNode,
        role: &'static str,
    ) -> FilterResult<TypedExpr> {
        if target.value_type() != ValueType::String {
            return Err(FilterError::type_mismatch(
                &node.token,
                role,
                &[ValueType::String],
            ));
        }
        let index_expr = self.node(index)?;
        if index_expr.value_type() != ValueType::Int {
            return Err(FilterError::type_mismatch(
                &index.token,
                "index",
                &[ValueType::Int],
            ));
        }
        Ok(TypedExpr::Index {
            target: Box::new(target),
            index: Box::new(index_expr),
        })
    }

    fn call(&self, node: &TreeNode) -> FilterResult<TypedExpr> {
        let name = node.token.text.to_uppercase();
        let Some(function) = Builtin::resolve(&name) else {
            return Err(FilterError::UnsupportedMethod {
                text: node.token.text.clone(),
                position: node.token.position,
                method: name,
            });
        };
        if node.children.len() != 2 {
            return Err(FilterError::syntax(&node.token));
        }
        let mut arguments = Vec::new();
        for child in &node.children {
            let argument = self.node(child)?;
            if argument.value_type() != ValueType::Int {
                return Err(FilterError::type_mismatch(
                    &child.token,
                    "argument",
                    &[ValueType::Int],
                ));
            }
            arguments.push(argument);
        }
        Ok(TypedExpr::Call {
            function,
            arguments,
        })
    }

    fn operation(&self, node: &TreeNode, symbol: &str) -> FilterResult<TypedExpr> {
        match symbol {
            "(" => self.node(&node.children[0]),
            "[+]" => self.unary_numeric(node, UnaryOp::Plus),
            "[-]" => self.unary_numeric(node, UnaryOp::Negate),
            "NOT" => self.logical_not(node),
            "^" => self.power(node),
            "*" => self.arithmetic(node, BinaryOp::Multiply),
            "/" => self.arithmetic(node, BinaryOp::Divide),
            "%" => self.arithmetic(node, BinaryOp::Modulo),
            "+" => self.arithmetic(node, BinaryOp::Add),
            "-" => self.arithmetic(node, BinaryOp::Subtract),
            "<" => self.comparison(node, BinaryOp::LessThan),
            ">" => self.comparison(node, BinaryOp::GreaterThan),
            "<=" => self.comparison(node, BinaryOp::LessThanOrEqual),
            ">=" => self.comparison(node, BinaryOp::GreaterThanOrEqual),
            "=" => self.equality(node, BinaryOp::Equal),
            "<>" => self.equality(node, BinaryOp::NotEqual),
            "CONTAINS" => self.string_method(node, StringMethod::Contains),
            "STARTSWITH" => self.string_method(node, StringMethod::StartsWith),
            "ENDSWITH" => self.string_method(node, StringMethod::EndsWith),
            "BETWEEN" => self.between(node),
            "IN" => self.choice(node),
            "IS" => self.logical(node, BinaryOp::Equal),
            "AND" => self.logical(node, BinaryOp::And),
            "OR" => self.logical(node, BinaryOp::Or),
            _ => Err(FilterError::syntax(&node.token)),
        }
    }

    fn unary_numeric(&self, node: &TreeNode, op: UnaryOp) -> FilterResult<TypedExpr> {
        let child = &node.children[0];
        let operand = self.node(child)?;
        if !NUMERIC.contains(&operand.value_type()) {
            return Err(FilterError::type_mismatch(&child.token, "value", &NUMERIC));
        }
        Ok(TypedExpr::unary(op, operand))
    }

    fn logical_not(&self, node: &TreeNode) -> FilterResult<TypedExpr> {
        let child = &node.children[0];
        let operand = self.node(child)?;
        if operand.value_type() != ValueType::Bool {
            return Err(FilterError::type_mismatch(
                &child.token,
                "value",
                &[ValueType::Bool],
            ));
        }
        Ok(TypedExpr::unary(UnaryOp::Not, operand))
    }

    /// `^` promotes both sides to double, even for int ^ int.
    fn power(&self, node: &TreeNode) -> FilterResult<TypedExpr> {
        let left = self.checked_numeric(&node.children[0], "value on the left")?;
        let right = self.checked_numeric(&node.children[1], "value on the right")?;
        Ok(TypedExpr::binary(
            BinaryOp::Power,
            promote(left),
            promote(right),
        ))
    }

    fn arithmetic(&self, node: &TreeNode, op: BinaryOp) -> FilterResult<TypedExpr> {
        let left = self.checked_numeric(&node.children[0], "value on the left")?;
        let right = self.checked_numeric(&node.children[1], "value on the right")?;
        // Mixed int/double promotes the int side.
        let (left, right) = match (left.value_type(), right.value_type()) {
            (ValueType::Int, ValueType::Double) => (promote(left), right),
            (ValueType::Double, ValueType::Int) => (left, promote(right)),
            _ => (left, right),
        };
        Ok(TypedExpr::binary(op, left, right))
    }

    fn checked_numeric(&self, child: &TreeNode, role: &'static str) -> FilterResult<TypedExpr> {
        let expr = self.node(child)?;
        if !NUMERIC.contains(&expr.value_type()) {
            return Err(FilterError::type_mismatch(&child.token, role, &NUMERIC));
        }
        Ok(expr)
    }

    fn comparison(&self, node: &TreeNode, op: BinaryOp) -> FilterResult<TypedExpr> {
        let left = self.node(&node.children[0])?;
        let left_type = left.value_type();
        if !ORDERED.contains(&left_type) {
            return Err(FilterError::type_mismatch(
                &node.children[0].token,
                "value on the left",
                &ORDERED,
            ));
        }
        let right = self.matching_right(node, left_type)?;
        Ok(TypedExpr::binary(op, left, right))
    }

    /// `=` and `<>` accept any left type; the right side must match it.
    fn equality(&self, node: &TreeNode, op: BinaryOp) -> FilterResult<TypedExpr> {
        let left = self.node(&node.children[0])?;
        let right = self.matching_right(node, left.value_type())?;
        Ok(TypedExpr::binary(op, left, right))
    }

    /// `IS`, `AND`, and `OR` take a bool on the left and a matching right.
    fn logical(&self, node: &TreeNode, op: BinaryOp) -> FilterResult<TypedExpr> {
        let left = self.node(&node.children[0])?;
        if left.value_type() != ValueType::Bool {
            return Err(FilterError::type_mismatch(
                &node.children[0].token,
                "value on the left",
                &[ValueType::Bool],
            ));
        }
        let right = self.matching_right(node, ValueType::Bool)?;
        Ok(TypedExpr::binary(op, left, right))
    }

    fn string_method(&self, node: &TreeNode, method: StringMethod) -> FilterResult<TypedExpr> {
        let left = self.node(&node.children[0])?;
        if left.value_type() != ValueType::String {
            return Err(FilterError::type_mismatch(
                &node.children[0].token,
                "value on the left",
                &[ValueType::String],
            ));
        }
        let right = self.matching_right(node, ValueType::String)?;
        Ok(TypedExpr::StringMethod {
            method,
            target: Box::new(left),
            argument: Box::new(right),
        })
    }

    /// Transforms the second child, requiring it to match `expected`.
    fn matching_right(&self, node: &TreeNode, expected: ValueType) -> FilterResult<TypedExpr> {
        let child = &node.children[1];
        let right = self.node(child)?;
        if right.value_type() != expected {
            return Err(FilterError::type_mismatch(
                &child.token,
                "value on the right",
                &[expected],
            ));
        }
        Ok(right)
    }

    /// `left BETWEEN lower AND upper` lowers to
    /// `left >= lower AND left <= upper`.
    fn between(&self, node: &TreeNode) -> FilterResult<TypedExpr> {
        let left = self.node(&node.children[0])?;
        let left_type = left.value_type();
        if !ORDERED.contains(&left_type) {
            return Err(FilterError::type_mismatch(
                &node.children[0].token,
                "value on the left",
                &ORDERED,
            ));
        }
        let lower = self.node(&node.children[1])?;
        if lower.value_type() != left_type {
            return Err(FilterError::type_mismatch(
                &node.children[1].token,
                "lower value",
                &[left_type],
            ));
        }
        let upper = self.node(&node.children[2])?;
        if upper.value_type() != left_type {
            return Err(FilterError::type_mismatch(
                &node.children[2].token,
                "upper value",
                &[left_type],
            ));
        }
        Ok(TypedExpr::binary(
            BinaryOp::And,
            TypedExpr::binary(BinaryOp::GreaterThanOrEqual, left.clone(), lower),
            TypedExpr::binary(BinaryOp::LessThanOrEqual, left, upper),
        ))
    }

    /// `left IN (c1, c2, ...)` lowers to the right-nested disjunction
    /// `false OR (left = c1) OR (left = c2) OR ...`, so evaluation visits
    /// the choices in clause order.
    fn choice(&self, node: &TreeNode) -> FilterResult<TypedExpr> {
        let left = self.node(&node.children[0])?;
        let left_type = left.value_type();
        let mut comparisons = Vec::new();
        for child in &node.children[1..] {
            let choice = self.node(child)?;
            if choice.value_type() != left_type {
                return Err(FilterError::type_mismatch(
                    &child.token,
                    "choice",
                    &[left_type],
                ));
            }
            comparisons.push(TypedExpr::binary(BinaryOp::Equal, left.clone(), choice));
        }
        let mut folded: Option<TypedExpr> = None;
        for comparison in comparisons.into_iter().rev() {
            folded = Some(match folded {
                Some(acc) => TypedExpr::binary(BinaryOp::Or, comparison, acc),
                None => comparison,
            });
        }
        let Some(folded) = folded else {
            return Err(FilterError::syntax(&node.token));
        };
        Ok(TypedExpr::binary(
            BinaryOp::Or,
            TypedExpr::Constant(Value::Bool(false)),
            folded,
        ))
    }
}

/// Wraps int-typed expressions in a widening conversion to double.
fn promote(expr: TypedExpr) -> TypedExpr {
    if expr.value_type() == ValueType::Int {
        TypedExpr::convert(ValueType::Double, expr)
    } else {
        expr
    }
}
