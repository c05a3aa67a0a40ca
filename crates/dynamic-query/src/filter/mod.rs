//! Filter clause compiler.
//!
//! Compiles textual filter clauses such as `Id > 2 AND Name CONTAINS "x"`
//! into [`TypedExpr`] descriptors bound to a [`Queryable`] record type.
//!
//! The pipeline runs strictly forward; no stage revisits an earlier one:
//!
//! 1. the lexer yields tokens tagged with 1-based source positions;
//! 2. the parser builds a left-leaning parse tree in one forward pass,
//!    handling scoping, prefix signs, calls, indexing, `BETWEEN`, and `IN`;
//! 3. the rebalancing pass rotates the tree so higher-precedence
//!    operators bind tighter;
//! 4. the transformer walks the tree bottom-up, applying the typing
//!    rules and emitting the typed expression.
//!
//! # Supported Syntax
//!
//! - literals: integers, decimals, `"strings"`, `'c'` chars (with the
//!   escapes `\\ \' \t \r \n`), `null`, `true`, `false`
//! - field references and string indexing: `Name`, `Name[2]`
//! - built-in calls: `MAX(a, b)`, `MIN(a, b)`
//! - arithmetic: `+ - * / % ^` with int→double promotion
//! - comparisons: `< > <= >= = <>`
//! - text operators: `CONTAINS`, `STARTSWITH`, `ENDSWITH`
//! - ranges and choices: `BETWEEN lo AND hi`, `IN (a, b, c)`
//! - boolean composition: `NOT`, `AND`, `OR`, `IS`, `( ... )`
//!
//! Keywords and reserved words are case-insensitive.
//!
//! # Example
//!
//! ```
//! use dynamic_query::{FieldDef, FilterCompiler, Queryable, Value, ValueType};
//!
//! struct Task {
//!     id: i64,
//!     name: String,
//! }
//!
//! impl Queryable for Task {
//!     fn record_name() -> &'static str {
//!         "Task"
//!     }
//!
//!     fn schema() -> &'static [FieldDef] {
//!         const FIELDS: [FieldDef; 2] = [
//!             FieldDef::new("Id", ValueType::Int),
//!             FieldDef::new("Name", ValueType::String),
//!         ];
//!         &FIELDS
//!     }
//!
//!     fn field(&self, name: &str) -> Option<Value> {
//!         match name {
//!             "Id" => Some(Value::Int(self.id)),
//!             "Name" => Some(Value::String(self.name.clone())),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let expr = FilterCompiler::compile::<Task>("Id > 2", ValueType::Bool).unwrap();
//! assert_eq!(expr.value_type(), ValueType::Bool);
//! ```

mod error;
mod expr;
mod lexer;
mod parser;
mod transform;
mod tree;

pub use error::{FilterError, FilterResult};
pub use expr::{BinaryOp, Builtin, StringMethod, TypedExpr, UnaryOp};

use crate::record::Queryable;
use crate::value::ValueType;
use parser::Parser;
use transform::Transformer;

/// Front door for filter clause compilation.
pub struct FilterCompiler;

impl FilterCompiler {
    /// Compiles `clause` against the record type `R`, requiring the
    /// expression to produce a value of type `output`.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::EmptyClause`] for a blank clause, and the
    /// corresponding [`FilterError`] for any lexical, syntactic, or
    /// typing failure. An error aborts the compile; there is no recovery.
    pub fn compile<R: Queryable>(clause: &str, output: ValueType) -> FilterResult<TypedExpr> {
        if clause.trim().is_empty() {
            return Err(FilterError::EmptyClause);
        }
        let tokens = lexer::Lexer::tokenize(clause)?;
        let root = Parser::parse(tokens)?;
        let root = tree::rebalance(root);
        Transformer::new(R::record_name(), R::schema()).transform(&root, output)
    }
}
