//! Record schemas for clause compilation.

use crate::value::{Value, ValueType};

/// One public field of a record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// The field name as written in clauses (case-sensitive).
    pub name: &'static str,
    /// The field's value type.
    pub ty: ValueType,
}

impl FieldDef {
    /// Creates a field definition.
    pub const fn new(name: &'static str, ty: ValueType) -> Self {
        Self { name, ty }
    }
}

/// A record type that clauses can be compiled against.
///
/// The record type supplies its own field map: [`schema`](Queryable::schema)
/// drives name lookup and type checking while a clause compiles, and
/// [`field`](Queryable::field) supplies the values while a compiled
/// expression evaluates.
///
/// # Example
///
/// ```
/// use dynamic_query::{FieldDef, Queryable, Value, ValueType};
///
/// struct Task {
///     id: i64,
///     name: String,
/// }
///
/// impl Queryable for Task {
///     fn record_name() -> &'static str {
///         "Task"
///     }
///
///     fn schema() -> &'static [FieldDef] {
///         const FIELDS: [FieldDef; 2] = [
///             FieldDef::new("Id", ValueType::Int),
///             FieldDef::new("Name", ValueType::String),
///         ];
///         &FIELDS
///     }
///
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "Id" => Some(Value::Int(self.id)),
///             "Name" => Some(Value::String(self.name.clone())),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Queryable {
    /// The record type name quoted in diagnostics.
    fn record_name() -> &'static str;

    /// The public fields, in declaration order.
    fn schema() -> &'static [FieldDef];

    /// Reads one field by name. Returns `None` for unknown names.
    fn field(&self, name: &str) -> Option<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i64,
        y: i64,
    }

    impl Queryable for Point {
        fn record_name() -> &'static str {
            "Point"
        }

        fn schema() -> &'static [FieldDef] {
            const FIELDS: [FieldDef; 2] = [
                FieldDef::new("X", ValueType::Int),
                FieldDef::new("Y", ValueType::Int),
            ];
            &FIELDS
        }

        fn field(&self, name: &str) -> Option<Value> {
            match name {
                "X" => Some(Value::Int(self.x)),
                "Y" => Some(Value::Int(self.y)),
                _ => None,
            }
        }
    }

    #[test]
    fn test_schema_lookup() {
        let def = Point::schema().iter().find(|f| f.name == "X").unwrap();
        assert_eq!(def.ty, ValueType::Int);
    }

    #[test]
    fn test_field_read() {
        let point = Point { x: 3, y: 4 };
        assert_eq!(point.field("Y"), Some(Value::Int(4)));
        assert_eq!(point.field("Z"), None);
    }
}
