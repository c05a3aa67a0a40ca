//! Clause value model shared by the lexer, the typed expression tree, and
//! the evaluator.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The static type of a clause value.
///
/// The display names are the ones quoted in diagnostics, e.g.
/// "The value on the left must be a Int32 or a Double."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueType {
    /// The type of the `null` literal.
    Object,
    Bool,
    Int,
    Double,
    Char,
    String,
}

impl ValueType {
    /// The name used in diagnostic messages.
    pub fn name(&self) -> &'static str {
        match self {
            ValueType::Object => "Object",
            ValueType::Bool => "Boolean",
            ValueType::Int => "Int32",
            ValueType::Double => "Double",
            ValueType::Char => "Char",
            ValueType::String => "String",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A literal or computed clause value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// The `null` literal.
    Null,
    Bool(bool),
    Int(i64),
    Double(f64),
    Char(char),
    String(String),
}

impl Value {
    /// The [`ValueType`] this value carries.
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Null => ValueType::Object,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Double(_) => ValueType::Double,
            Value::Char(_) => ValueType::Char,
            Value::String(_) => ValueType::String,
        }
    }

    /// Total order used by the sort comparator.
    ///
    /// Values of different types compare equal; the sort compiler validates
    /// fields against the record schema, so mixed comparisons only arise
    /// for `null`-able data.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(l), Value::Bool(r)) => l.cmp(r),
            (Value::Int(l), Value::Int(r)) => l.cmp(r),
            (Value::Double(l), Value::Double(r)) => l.total_cmp(r),
            (Value::Char(l), Value::Char(r)) => l.cmp(r),
            (Value::String(l), Value::String(r)) => l.cmp(r),
            _ => Ordering::Equal,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Char(c) => write!(f, "'{c}'"),
            Value::String(s) => write!(f, "\"{s}\""),
        }
    }
}
