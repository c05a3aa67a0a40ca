//! End-to-end tests for `filter_by` against an in-memory record sequence.

use dynamic_query::{
    filter_by, EvalError, FieldDef, FilterError, QueryError, Queryable, Value, ValueType,
};

#[derive(Debug, PartialEq)]
struct Item {
    id: i64,
    name: String,
}

impl Queryable for Item {
    fn record_name() -> &'static str {
        "Item"
    }

    fn schema() -> &'static [FieldDef] {
        const FIELDS: [FieldDef; 2] = [
            FieldDef::new("Id", ValueType::Int),
            FieldDef::new("Name", ValueType::String),
        ];
        &FIELDS
    }

    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "Id" => Some(Value::Int(self.id)),
            "Name" => Some(Value::String(self.name.clone())),
            _ => None,
        }
    }
}

fn make_item(id: i64, name: &str) -> Item {
    Item {
        id,
        name: name.to_string(),
    }
}

fn make_items() -> Vec<Item> {
    vec![
        make_item(1, "001"),
        make_item(2, "003"),
        make_item(3, "004"),
        make_item(4, "005"),
        make_item(5, "002"),
    ]
}

fn ids(items: &[&Item]) -> Vec<i64> {
    items.iter().map(|i| i.id).collect()
}

// ==================== Filtering Tests ====================

#[test]
fn test_filter_by_comparison_keeps_input_order() {
    let items = make_items();
    let filtered = filter_by(&items, "Id > 2").unwrap();
    assert_eq!(ids(&filtered), vec![3, 4, 5]);
}

#[test]
fn test_filter_by_equality_on_string() {
    let items = make_items();
    let filtered = filter_by(&items, "Name = \"003\"").unwrap();
    assert_eq!(ids(&filtered), vec![2]);
}

#[test]
fn test_filter_by_boolean_composition() {
    let items = make_items();
    let filtered = filter_by(&items, "Id > 1 AND Id < 5").unwrap();
    assert_eq!(ids(&filtered), vec![2, 3, 4]);

    let filtered = filter_by(&items, "Id = 1 OR Name = \"002\"").unwrap();
    assert_eq!(ids(&filtered), vec![1, 5]);

    let filtered = filter_by(&items, "NOT (Id BETWEEN 2 AND 4)").unwrap();
    assert_eq!(ids(&filtered), vec![1, 5]);
}

#[test]
fn test_filter_by_precedence_without_parentheses() {
    let items = make_items();
    // AND binds tighter than OR.
    let filtered = filter_by(&items, "Id = 1 OR Id > 3 AND Name STARTSWITH \"00\"").unwrap();
    assert_eq!(ids(&filtered), vec![1, 4, 5]);
}

#[test]
fn test_filter_by_in_choices() {
    let items = make_items();
    let filtered = filter_by(&items, "Id IN (1, 3, 5)").unwrap();
    assert_eq!(ids(&filtered), vec![1, 3, 5]);

    let filtered = filter_by(&items, "Name IN (\"002\", \"005\")").unwrap();
    assert_eq!(ids(&filtered), vec![4, 5]);
}

#[test]
fn test_filter_by_string_operators() {
    let items = make_items();
    let filtered = filter_by(&items, "Name ENDSWITH \"3\"").unwrap();
    assert_eq!(ids(&filtered), vec![2]);

    let filtered = filter_by(&items, "Name CONTAINS \"00\"").unwrap();
    assert_eq!(ids(&filtered), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_filter_by_string_indexing() {
    let items = make_items();
    let filtered = filter_by(&items, "Name[2] = '3'").unwrap();
    assert_eq!(ids(&filtered), vec![2]);
}

#[test]
fn test_filter_by_arithmetic_on_fields() {
    let items = make_items();
    let filtered = filter_by(&items, "Id * 2 >= 6").unwrap();
    assert_eq!(ids(&filtered), vec![3, 4, 5]);

    let filtered = filter_by(&items, "MAX(Id, 3) = 3").unwrap();
    assert_eq!(ids(&filtered), vec![1, 2, 3]);
}

#[test]
fn test_filter_by_matches_nothing() {
    let items = make_items();
    let filtered = filter_by(&items, "Id > 100").unwrap();
    assert!(filtered.is_empty());
}

#[test]
fn test_filter_by_empty_source() {
    let items: Vec<Item> = vec![];
    let filtered = filter_by(&items, "Id > 0").unwrap();
    assert!(filtered.is_empty());
}

// ==================== Error Surface Tests ====================

#[test]
fn test_filter_by_rejects_blank_clause() {
    let items = make_items();
    let err = filter_by(&items, "   ").unwrap_err();
    assert_eq!(err, QueryError::Filter(FilterError::EmptyClause));
    assert_eq!(err.to_string(), "Filter clause cannot be null or empty.");
}

#[test]
fn test_filter_by_surfaces_compile_errors_unchanged() {
    let items = make_items();

    let err = filter_by(&items, "Id >").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid syntax near '>' at position 4."
    );

    let err = filter_by(&items, "Missing = 1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid syntax near 'Missing' at position 1. 'Missing' is not a public member of 'Item'."
    );

    let err = filter_by(&items, "Id + 1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid syntax near '+' at position 4. The result of the expression must be a Boolean."
    );
}

#[test]
fn test_filter_by_surfaces_runtime_errors() {
    let items = make_items();
    let err = filter_by(&items, "Id / (Id - 1) > 0").unwrap_err();
    assert_eq!(err, QueryError::Eval(EvalError::DivideByZero));
}
