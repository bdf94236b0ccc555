//! Integration tests for record derivation and binding

use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::json;
use sift_bind::{BindError, FieldDesc, ParseInto, RecordDesc, Registry, TypeDesc};
use sift_core::{to, Value};

#[derive(Debug, Deserialize, PartialEq)]
struct Node {
    name: String,
    children: Option<Vec<Node>>,
}

fn node_registry() -> Registry {
    Registry::new()
        .with(
            RecordDesc::new("Node").field("name", TypeDesc::Str).with_field(
                FieldDesc::new("children", TypeDesc::optional(TypeDesc::list(TypeDesc::record("Node"))))
                    .default(Value::Null),
            ),
        )
        .unwrap()
}

#[test]
fn self_referencing_record_parses_nested_input() {
    let schema = node_registry().derive("Node").unwrap();
    let node: Node = schema
        .parse_into(json!({
            "name": "n1",
            "children": [{"name": "n2", "children": [{"name": "n3"}]}],
        }))
        .unwrap();

    assert_eq!(
        node,
        Node {
            name: "n1".to_string(),
            children: Some(vec![Node {
                name: "n2".to_string(),
                children: Some(vec![Node {
                    name: "n3".to_string(),
                    children: None,
                }]),
            }]),
        }
    );
}

#[test]
fn self_referencing_record_locates_deep_failures() {
    let schema = node_registry().derive("Node").unwrap();
    let err = schema
        .parse(json!({"name": "n1", "children": [{"name": 2}]}))
        .unwrap_err();
    assert_eq!(
        err.to_json(),
        json!([
            {"loc": ["children"], "msgs": ["Expected null, received list"]},
            {"loc": ["children", 0, "name"], "msgs": ["Expected str, received int"]},
        ])
    );
}

#[test]
fn mutually_recursive_records() {
    let registry = Registry::new()
        .with(
            RecordDesc::new("Employee").field("name", TypeDesc::Str).with_field(
                FieldDesc::new("manager", TypeDesc::optional(TypeDesc::record("Manager"))).default(Value::Null),
            ),
        )
        .unwrap()
        .with(
            RecordDesc::new("Manager")
                .field("name", TypeDesc::Str)
                .field("reports", TypeDesc::list(TypeDesc::record("Employee"))),
        )
        .unwrap();

    let employee = registry.derive("Employee").unwrap();
    let parsed = employee
        .parse(json!({"name": "e", "manager": {"name": "m", "reports": [{"name": "x"}]}}))
        .unwrap();
    assert_eq!(
        parsed.to_json(),
        json!({
            "name": "e",
            "manager": {"name": "m", "reports": [{"name": "x", "manager": null}]},
        })
    );

    let err = employee
        .parse(json!({"name": "e", "manager": {"name": "m", "reports": [{"name": 1}]}}))
        .unwrap_err();
    assert_eq!(
        err.to_json(),
        json!([
            {"loc": ["manager"], "msgs": ["Expected null, received map"]},
            {"loc": ["manager", "reports", 0, "name"], "msgs": ["Expected str, received int"]},
        ])
    );
}

#[derive(Debug, Deserialize, PartialEq)]
struct InventoryItem {
    name: String,
    unit_price: f64,
    quantity_on_hand: i64,
}

#[test]
fn field_schema_override_and_defaults() {
    let registry = Registry::new()
        .with(
            RecordDesc::new("InventoryItem")
                .field("name", TypeDesc::Str)
                .with_field(FieldDesc::new("unit_price", TypeDesc::Float).schema(to::float()))
                .with_field(FieldDesc::new("quantity_on_hand", TypeDesc::Int).default(0)),
        )
        .unwrap();

    let item: InventoryItem = registry
        .derive("InventoryItem")
        .unwrap()
        .parse_into(json!({"name": "necklace", "unit_price": "12.50"}))
        .unwrap();
    assert_eq!(
        item,
        InventoryItem {
            name: "necklace".to_string(),
            unit_price: 12.5,
            quantity_on_hand: 0,
        }
    );
}

#[test]
fn refine_appends_to_the_derived_schema() {
    let registry = Registry::new()
        .with(RecordDesc::new("Shout").with_field(FieldDesc::new("f", TypeDesc::Str).refine(|schema| {
            schema.transform(|value| Ok(Value::from(value.as_str().unwrap_or_default().to_uppercase())))
        })))
        .unwrap();
    let schema = registry.derive("Shout").unwrap();
    assert_eq!(schema.parse(json!({"f": "hello"})).unwrap().to_json(), json!({"f": "HELLO"}));
    assert_eq!(
        schema.parse(json!({"f": 1})).unwrap_err().to_json(),
        json!([{"loc": ["f"], "msgs": ["Expected str, received int"]}])
    );
}

#[test]
fn aliases_and_unions() {
    let registry = Registry::new()
        .with(
            RecordDesc::new("Setting")
                .with_field(FieldDesc::new("key", TypeDesc::Str).alias("name"))
                .field("value", TypeDesc::union([TypeDesc::Str, TypeDesc::Int, TypeDesc::Bool])),
        )
        .unwrap();
    let schema = registry.derive("Setting").unwrap();

    assert_eq!(
        schema.parse(json!({"name": "retries", "value": 3})).unwrap().to_json(),
        json!({"key": "retries", "value": 3})
    );
    assert_eq!(
        schema.parse(json!({"name": "retries", "value": null})).unwrap_err().to_json(),
        json!([{
            "loc": ["value"],
            "msgs": [
                "Expected str, received null",
                "Expected int, received null",
                "Expected bool, received null",
            ],
        }])
    );
    assert_eq!(schema.fields().get("value").unwrap().schema().to_string(), "String | Integer | Boolean");
}

#[test]
fn binding_reports_both_failure_kinds() {
    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Strict {
        name: String,
        extra: String,
    }

    let schema = node_registry().derive("Node").unwrap();
    let err = schema.parse_into::<Node>(json!({})).unwrap_err();
    assert!(matches!(err, BindError::Invalid(_)));
    assert_eq!(
        err.validation().unwrap().to_json(),
        json!([{"loc": ["name"], "msgs": ["This field is required"]}])
    );

    let err = schema.parse_into::<Strict>(json!({"name": "n"})).unwrap_err();
    assert!(matches!(err, BindError::Deserialize(_)));
}
