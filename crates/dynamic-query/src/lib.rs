//! Dynamic query clauses for in-memory record sequences.
//!
//! This crate compiles user-supplied textual clauses — filter predicates
//! and sort keys — into typed query descriptors and applies them to
//! slices of records. Typical consumers are API endpoints that accept
//! `?filter=...&sort=...` strings against a statically known record type.
//!
//! The heart of the crate is the [`filter`] module: a lexer, a
//! precedence-aware parser, a rebalancing pass, and a type-checking
//! transformer that emits a [`TypedExpr`] bound to the record type's
//! field map. [`filter_by`] and [`sort_by`] wrap it into the one-call
//! surface most callers want.
//!
//! # Example
//!
//! ```
//! use dynamic_query::{filter_by, sort_by, FieldDef, Queryable, Value, ValueType};
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
//! let tasks = vec![
//!     Task { id: 1, name: "alpha".to_string() },
//!     Task { id: 2, name: "beta".to_string() },
//!     Task { id: 3, name: "gamma".to_string() },
//! ];
//!
//! let filtered = filter_by(&tasks, "Id > 1").unwrap();
//! assert_eq!(filtered.len(), 2);
//!
//! let ordered = sort_by(&tasks, "Name DESC").unwrap();
//! assert_eq!(ordered[0].name, "gamma");
//! ```

pub mod eval;
pub mod filter;
pub mod record;
pub mod sort;
pub mod value;

pub use eval::{evaluate, EvalError};
pub use filter::{
    BinaryOp, Builtin, FilterCompiler, FilterError, StringMethod, TypedExpr, UnaryOp,
};
pub use record::{FieldDef, Queryable};
pub use sort::{compile_sort_keys, SortKey, SortingError};
pub use value::{Value, ValueType};

use thiserror::Error;

/// Top-level error for the query surface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The filter clause failed to compile.
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The sort clause failed to compile.
    #[error(transparent)]
    Sorting(#[from] SortingError),

    /// A compiled expression failed at evaluation time.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Filters `source` by a textual clause, keeping matches in input order.
///
/// The clause compiles against `R`'s field map and must produce a
/// boolean; see the [`filter`] module docs for the supported syntax.
///
/// # Errors
///
/// Returns a [`FilterError`] for a blank or invalid clause, and an
/// [`EvalError`] when a record trips a runtime failure such as division
/// by zero or a string index out of range.
pub fn filter_by<'a, R: Queryable>(source: &'a [R], clause: &str) -> Result<Vec<&'a R>, QueryError> {
    let predicate = FilterCompiler::compile::<R>(clause, ValueType::Bool)?;
    let mut matches = Vec::new();
    for record in source {
        match evaluate(&predicate, record)? {
            Value::Bool(true) => matches.push(record),
            Value::Bool(false) => {}
            _ => return Err(EvalError::TypeMismatch.into()),
        }
    }
    Ok(matches)
}

/// Sorts `source` by a textual clause of `field [ASC|DESC]` items.
///
/// The keys compose into one stable multi-key ordering applied in listed
/// order — the first item is the primary key, later items break ties.
/// Records comparing equal keep their input order.
///
/// # Errors
///
/// Returns a [`SortingError`] for a blank or invalid clause or an
/// unknown field.
pub fn sort_by<'a, R: Queryable>(source: &'a [R], clause: &str) -> Result<Vec<&'a R>, QueryError> {
    let keys = compile_sort_keys::<R>(clause)?;
    let mut ordered: Vec<&R> = source.iter().collect();
    ordered.sort_by(|a, b| sort::compare_by_keys(*a, *b, &keys));
    Ok(ordered)
}
