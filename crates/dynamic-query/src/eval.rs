//! In-memory evaluation of compiled filter expressions.
//!
//! This is the host collection adapter for [`filter_by`](crate::filter_by):
//! it walks a [`TypedExpr`] against one record. The compiler's typing rules
//! guarantee operand types line up, so the only failures reachable from a
//! compiled expression are runtime ones — division by zero and string
//! indexes out of range.

use thiserror::Error;

use crate::filter::{BinaryOp, Builtin, StringMethod, TypedExpr, UnaryOp};
use crate::record::Queryable;
use crate::value::Value;

/// Errors raised while evaluating a compiled expression against a record.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EvalError {
    /// Integer division or modulo with a zero divisor.
    #[error("Attempted to divide by zero.")]
    DivideByZero,

    /// A string index outside the target string.
    #[error("Index {index} is out of range for a string of length {length}.")]
    IndexOutOfRange {
        /// The evaluated index.
        index: i64,
        /// The target string's length in characters.
        length: usize,
    },

    /// The record returned no value for a field the schema declared.
    #[error("Field '{field}' is missing from the record.")]
    MissingField {
        /// The missing field name.
        field: String,
    },

    /// Operand types did not match the operator. Unreachable for
    /// expressions produced by the compiler.
    #[error("Operand type mismatch during evaluation.")]
    TypeMismatch,
}

/// Evaluates `expr` against one record.
pub fn evaluate<R: Queryable>(expr: &TypedExpr, record: &R) -> Result<Value, EvalError> {
    match expr {
        TypedExpr::Constant(value) => Ok(value.clone()),

        TypedExpr::Property { name, .. } => {
            record.field(name).ok_or_else(|| EvalError::MissingField {
                field: name.clone(),
            })
        }

        TypedExpr::Index { target, index } => {
            let Value::String(target) = evaluate(target, record)? else {
                return Err(EvalError::TypeMismatch);
            };
            let Value::Int(index) = evaluate(index, record)? else {
                return Err(EvalError::TypeMismatch);
            };
            let at = usize::try_from(index).unwrap_or(usize::MAX);
            match target.chars().nth(at) {
                Some(c) => Ok(Value::Char(c)),
                None => Err(EvalError::IndexOutOfRange {
                    index,
                    length: target.chars().count(),
                }),
            }
        }

        TypedExpr::Call {
            function,
            arguments,
        } => {
            let [left, right] = arguments.as_slice() else {
                return Err(EvalError::TypeMismatch);
            };
            let (Value::Int(left), Value::Int(right)) =
                (evaluate(left, record)?, evaluate(right, record)?)
            else {
                return Err(EvalError::TypeMismatch);
            };
            let result = match function {
                Builtin::Max => left.max(right),
                Builtin::Min => left.min(right),
            };
            Ok(Value::Int(result))
        }

        TypedExpr::StringMethod {
            method,
            target,
            argument,
        } => {
            let (Value::String(target), Value::String(argument)) =
                (evaluate(target, record)?, evaluate(argument, record)?)
            else {
                return Err(EvalError::TypeMismatch);
            };
            let result = match method {
                StringMethod::Contains => target.contains(&argument),
                StringMethod::StartsWith => target.starts_with(&argument),
                StringMethod::EndsWith => target.ends_with(&argument),
            };
            Ok(Value::Bool(result))
        }

        TypedExpr::Unary { op, operand } => {
            let value = evaluate(operand, record)?;
            match (op, value) {
                (UnaryOp::Plus, value @ (Value::Int(_) | Value::Double(_))) => Ok(value),
                (UnaryOp::Negate, Value::Int(i)) => Ok(Value::Int(i.wrapping_neg())),
                (UnaryOp::Negate, Value::Double(d)) => Ok(Value::Double(-d)),
                (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
                _ => Err(EvalError::TypeMismatch),
            }
        }

        TypedExpr::Convert { operand, .. } => match evaluate(operand, record)? {
            Value::Int(i) => Ok(Value::Double(i as f64)),
            _ => Err(EvalError::TypeMismatch),
        },

        TypedExpr::Binary { op, left, right } => match op {
            // Logical operators short-circuit left to right.
            BinaryOp::And => {
                let Value::Bool(left) = evaluate(left, record)? else {
                    return Err(EvalError::TypeMismatch);
                };
                if !left {
                    return Ok(Value::Bool(false));
                }
                match evaluate(right, record)? {
                    Value::Bool(right) => Ok(Value::Bool(right)),
                    _ => Err(EvalError::TypeMismatch),
                }
            }
            BinaryOp::Or => {
                let Value::Bool(left) = evaluate(left, record)? else {
                    return Err(EvalError::TypeMismatch);
                };
                if left {
                    return Ok(Value::Bool(true));
                }
                match evaluate(right, record)? {
                    Value::Bool(right) => Ok(Value::Bool(right)),
                    _ => Err(EvalError::TypeMismatch),
                }
            }
            _ => {
                let left = evaluate(left, record)?;
                let right = evaluate(right, record)?;
                apply_binary(*op, left, right)
            }
        },
    }
}

fn apply_binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => arithmetic(op, left, right),
        BinaryOp::Power => {
            let (Value::Double(l), Value::Double(r)) = (left, right) else {
                return Err(EvalError::TypeMismatch);
            };
            Ok(Value::Double(l.powf(r)))
        }
        BinaryOp::LessThan
        | BinaryOp::GreaterThan
        | BinaryOp::LessThanOrEqual
        | BinaryOp::GreaterThanOrEqual => ordered(op, &left, &right),
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
        // Short-circuiting variants are handled by the caller.
        BinaryOp::And | BinaryOp::Or => Err(EvalError::TypeMismatch),
    }
}

/// Integer arithmetic wraps on overflow; double arithmetic follows IEEE
/// semantics, so only integer division and modulo can fail.
fn arithmetic(op: BinaryOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match (left, right) {
        (Value::Int(l), Value::Int(r)) => {
            let result = match op {
                BinaryOp::Add => l.wrapping_add(r),
                BinaryOp::Subtract => l.wrapping_sub(r),
                BinaryOp::Multiply => l.wrapping_mul(r),
                BinaryOp::Divide => {
                    if r == 0 {
                        return Err(EvalError::DivideByZero);
                    }
                    l.wrapping_div(r)
                }
                BinaryOp::Modulo => {
                    if r == 0 {
                        return Err(EvalError::DivideByZero);
                    }
                    l.wrapping_rem(r)
                }
                _ => return Err(EvalError::TypeMismatch),
            };
            Ok(Value::Int(result))
        }
        (Value::Double(l), Value::Double(r)) => {
            let result = match op {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide => l / r,
                BinaryOp::Modulo => l % r,
                _ => return Err(EvalError::TypeMismatch),
            };
            Ok(Value::Double(result))
        }
        _ => Err(EvalError::TypeMismatch),
    }
}

fn ordered(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let ordering = match (left, right) {
        (Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
        (Value::Double(l), Value::Double(r)) => l.partial_cmp(r),
        (Value::Char(l), Value::Char(r)) => Some(l.cmp(r)),
        _ => return Err(EvalError::TypeMismatch),
    };
    // NaN compares false against everything.
    let result = ordering.is_some_and(|o| match op {
        BinaryOp::LessThan => o.is_lt(),
        BinaryOp::GreaterThan => o.is_gt(),
        BinaryOp::LessThanOrEqual => o.is_le(),
        BinaryOp::GreaterThanOrEqual => o.is_ge(),
        _ => false,
    });
    Ok(Value::Bool(result))
}
