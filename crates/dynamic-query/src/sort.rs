//! Sort clause compiler and multi-key ordering.
//!
//! A sort clause is a comma-separated list of `field [ASC|DESC]` items,
//! e.g. `Name DESC, Id`. The compiled keys compose into a single
//! comparator applied with a stable sort, so later keys refine earlier
//! ones instead of replacing them; the first item is the primary key.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::record::Queryable;

/// Errors that can occur while compiling a sort clause.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SortingError {
    /// The clause is empty or whitespace-only.
    #[error("Sorting clause cannot be null or empty.")]
    EmptyClause,

    /// An item is not `field`, `field ASC`, or `field DESC`.
    #[error("Sorting item must be in the format of 'field[ ASC]' or 'field DESC'.")]
    InvalidItem {
        /// The offending clause item.
        item: String,
    },

    /// An item names a field outside the record schema.
    #[error("'{field}' is not a valid field for '{record}'.")]
    UnknownField {
        /// The unresolved field name.
        field: String,
        /// The record type name.
        record: &'static str,
    },
}

/// One key of a compiled sort clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// The field to order by.
    pub field: String,
    /// True for `DESC` items; `ASC` is the default.
    pub descending: bool,
}

/// Compiles a sort clause into ordered keys, validating each field
/// against `R`'s schema.
///
/// # Errors
///
/// Returns [`SortingError::EmptyClause`] for a blank clause,
/// [`SortingError::InvalidItem`] for a malformed item, and
/// [`SortingError::UnknownField`] when a field is not in the schema.
pub fn compile_sort_keys<R: Queryable>(clause: &str) -> Result<Vec<SortKey>, SortingError> {
    if clause.trim().is_empty() {
        return Err(SortingError::EmptyClause);
    }
    let mut keys = Vec::new();
    for item in clause.split(',') {
        let item = item.trim();
        let mut parts = item.split_whitespace();
        let Some(field) = parts.next() else {
            return Err(SortingError::InvalidItem {
                item: item.to_string(),
            });
        };
        let descending = match parts.next().map(|d| d.to_uppercase()) {
            None => false,
            Some(direction) if direction == "ASC" => false,
            Some(direction) if direction == "DESC" => true,
            Some(_) => {
                return Err(SortingError::InvalidItem {
                    item: item.to_string(),
                })
            }
        };
        if parts.next().is_some() {
            return Err(SortingError::InvalidItem {
                item: item.to_string(),
            });
        }
        if !R::schema().iter().any(|f| f.name == field) {
            return Err(SortingError::UnknownField {
                field: field.to_string(),
                record: R::record_name(),
            });
        }
        keys.push(SortKey {
            field: field.to_string(),
            descending,
        });
    }
    Ok(keys)
}

/// Compares two records by the compiled keys, primary key first.
pub(crate) fn compare_by_keys<R: Queryable>(a: &R, b: &R, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match (a.field(&key.field), b.field(&key.field)) {
            (Some(left), Some(right)) => left.compare(&right),
            _ => Ordering::Equal,
        };
        let ordering = if key.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}
