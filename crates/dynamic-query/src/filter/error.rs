//! Error types for the filter compiler.

use thiserror::Error;

use super::lexer::Token;
use crate::value::ValueType;

/// A specialized Result type for filter compilation.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while compiling a filter clause.
///
/// Every compile failure carries the position (1-based column) and the
/// exact lexeme of the token it was raised at, so callers can point back
/// into the original clause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The clause is empty or whitespace-only.
    #[error("Filter clause cannot be null or empty.")]
    EmptyClause,

    /// No lexer or parser rule applies at this token.
    #[error("Invalid syntax near '{text}' at position {position}.")]
    Syntax {
        /// The offending lexeme.
        text: String,
        /// 1-based column of the lexeme.
        position: usize,
    },

    /// A field reference does not name a public member of the record type.
    #[error("Invalid syntax near '{member}' at position {position}. '{member}' is not a public member of '{record}'.")]
    UnknownMember {
        /// The unresolved field name.
        member: String,
        /// 1-based column of the field reference.
        position: usize,
        /// The record type name.
        record: &'static str,
    },

    /// An operand's type violates the operator's typing rules.
    #[error("Invalid syntax near '{text}' at position {position}. The {role} must be a {expected}.")]
    TypeMismatch {
        /// The offending operand's lexeme.
        text: String,
        /// 1-based column of the operand.
        position: usize,
        /// The operand's role, e.g. "value on the left" or "index".
        role: &'static str,
        /// The acceptable types, preformatted as "Int32 or a Double".
        expected: String,
    },

    /// A call names a function outside the built-in table.
    #[error("Invalid syntax near '{text}' at position {position}. Method '{method}' not supported.")]
    UnsupportedMethod {
        /// The call's lexeme as written.
        text: String,
        /// 1-based column of the call.
        position: usize,
        /// The uppercased function name.
        method: String,
    },

    /// The expression's type does not match the requested output type.
    #[error("Invalid syntax near '{text}' at position {position}. The result of the expression must be a {expected}.")]
    ResultMismatch {
        /// The root token's lexeme.
        text: String,
        /// 1-based column of the root token.
        position: usize,
        /// The requested output type.
        expected: ValueType,
    },
}

impl FilterError {
    /// Creates a syntax error at the given token.
    pub(crate) fn syntax(token: &Token) -> Self {
        FilterError::Syntax {
            text: token.text.clone(),
            position: token.position,
        }
    }

    /// Creates a type mismatch error at the given token.
    pub(crate) fn type_mismatch(token: &Token, role: &'static str, expected: &[ValueType]) -> Self {
        FilterError::TypeMismatch {
            text: token.text.clone(),
            position: token.position,
            role,
            expected: expected
                .iter()
                .map(|t| t.name())
                .collect::<Vec<_>>()
                .join(" or a "),
        }
    }
}
