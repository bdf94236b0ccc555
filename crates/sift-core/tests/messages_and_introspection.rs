//! Message resolution scopes, record inputs and read-only introspection

use pretty_assertions::assert_eq;
use serde_json::json;
use sift_core::messages::{self, DefaultMessage, MessageResolver};
use sift_core::{
    float, integer, list, mapping, string, structure, to, Annotation, ErrorRecord, Field, Fields, Lazy, Message,
    NodeKind, PathSegment, Record, Schema, TypeTag, UnknownKeys, Value,
};
use std::sync::Arc;

struct Terse;

impl MessageResolver for Terse {
    fn resolve(&self, message: &DefaultMessage, value: &Value) -> String {
        match message {
            DefaultMessage::FieldRequired => "Required".to_string(),
            DefaultMessage::StrMin { min } => format!("Min length is {}", min),
            _ => messages::default_text(message, value),
        }
    }
}

#[test]
fn scoped_resolver_rewrites_defaults_only_inside_scope() {
    let schema = structure(Fields::new().with("a", string().min(1))).unwrap();

    messages::with_resolver(Terse, || {
        let err = schema.parse(json!({})).unwrap_err();
        assert_eq!(err.format_errors(), vec![ErrorRecord::at(["a"], ["Required"])]);

        let err = schema.parse(json!({"a": ""})).unwrap_err();
        assert_eq!(err.format_errors(), vec![ErrorRecord::at(["a"], ["Min length is 1"])]);

        let err = string().max(1).parse("123").unwrap_err();
        assert_eq!(err.messages(), ["The maximum length of the string is 1"]);
    });

    let err = schema.parse(json!({})).unwrap_err();
    assert_eq!(err.format_errors(), vec![ErrorRecord::at(["a"], ["This field is required"])]);
}

#[test]
fn explicit_messages_beat_the_resolver() {
    let _scope = messages::push_resolver(Terse);
    let fields = Fields::new().with("a", Field::new(string()).required_message("give me a"));
    let err = structure(fields).unwrap().parse(json!({})).unwrap_err();
    assert_eq!(err.format_errors(), vec![ErrorRecord::at(["a"], ["give me a"])]);
}

#[test]
fn dynamic_messages_see_the_failing_value() {
    let schema = Schema::new().ensure_with(
        |v| v.as_i64().map_or(false, |i| i % 2 == 0),
        sift_core::EnsureOptions::new().message(Message::dynamic(|v| format!("{} is odd", v))),
    );
    assert_eq!(schema.parse(3).unwrap_err().messages(), ["3 is odd"]);
}

#[test]
fn closure_resolver_falls_back_to_defaults() {
    let resolver = messages::from_fn(|message, _| match message {
        DefaultMessage::TypeCheck { expected } => Some(format!("need {}", expected)),
        _ => None,
    });
    messages::with_resolver(resolver, || {
        assert_eq!(integer().parse("x").unwrap_err().messages(), ["need int"]);
        assert_eq!(
            to::integer().parse("x").unwrap_err().messages(),
            ["Cannot convert the value \"x\" to int"]
        );
    });
}

#[derive(Debug)]
struct Person {
    name: String,
    age: i64,
}

impl Record for Person {
    fn type_name(&self) -> &str {
        "Person"
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "age" => Some(Value::Int(self.age)),
            _ => None,
        }
    }
}

#[test]
fn structs_read_records_by_attribute() {
    let schema = structure(
        Fields::new()
            .with("name", string())
            .with("age", integer())
            .with("email", Field::new(string()).optional()),
    )
    .unwrap();
    let person: Arc<dyn Record> = Arc::new(Person {
        name: "Ada".to_string(),
        age: 36,
    });
    assert_eq!(
        schema.parse(person.clone()).unwrap().to_json(),
        json!({"name": "Ada", "age": 36})
    );

    let strict = mapping(Fields::new().with("name", string()), UnknownKeys::Exclude).unwrap();
    assert_eq!(
        strict.parse(person).unwrap_err().messages(),
        ["Expected map, received Person"]
    );
}

#[test]
fn custom_getter_replaces_lookup() {
    let schema = structure(Fields::new().with(
        "id",
        Field::new(integer()).getter(|input| input.get("meta").and_then(|meta| meta.get("id")).cloned()),
    ))
    .unwrap();
    assert_eq!(
        schema.parse(json!({"meta": {"id": 7}})).unwrap().to_json(),
        json!({"id": 7})
    );
    assert_eq!(
        schema.parse(json!({"id": 7})).unwrap_err().to_json(),
        json!([{"loc": ["id"], "msgs": ["This field is required"]}])
    );
}

#[test]
fn nodes_expose_kind_and_annotations() {
    let schema = string().min(2).max(5);
    let kinds: Vec<NodeKind> = schema.nodes().iter().map(|node| node.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Validator { break_on_failure: false },
            NodeKind::Transformer,
            NodeKind::Validator { break_on_failure: false },
            NodeKind::Validator { break_on_failure: false },
        ]
    );
    let keys: Vec<&str> = schema.annotations().map(Annotation::key).collect();
    assert_eq!(keys, vec!["type", "min", "max"]);
}

#[test]
fn annotations_describe_structure() {
    let schema = structure(
        Fields::new()
            .with("tags", list(string()))
            .with("score", Field::new(float().gt(0.0)).with_default(1.0)),
    )
    .unwrap()
    .describe("title", "Entry");

    let mut saw_fields = false;
    for annotation in schema.annotations() {
        match annotation {
            Annotation::Type(tag) => assert_eq!(*tag, TypeTag::Object),
            Annotation::Fields(fields) => {
                saw_fields = true;
                assert_eq!(fields.names().collect::<Vec<_>>(), vec!["tags", "score"]);
                let tags = fields.get("tags").unwrap().schema();
                assert!(tags
                    .annotations()
                    .any(|a| matches!(a, Annotation::Items(item) if item.to_string() == "String")));
            }
            Annotation::Custom { key, value } => {
                assert_eq!(key, "title");
                assert_eq!(value, &json!("Entry"));
            }
            other => panic!("unexpected annotation {:?}", other),
        }
    }
    assert!(saw_fields);
}

#[test]
fn union_display_flattens_branches() {
    let schema = string() | integer() | sift_core::boolean();
    assert_eq!(schema.to_string(), "String | Integer | Boolean");
    assert_eq!(schema.union_branches().len(), 3);
}

#[test]
fn lazy_reference_supports_recursive_structs() {
    let node = Lazy::new("Node");
    let tree = structure(
        Fields::new()
            .with("value", integer())
            .with("children", Field::new(list(&node)).with_default_fn(|| Value::List(Vec::new()))),
    )
    .unwrap();
    node.define(&tree).unwrap();

    let parsed = tree
        .parse(json!({"value": 1, "children": [{"value": 2, "children": [{"value": 3}]}]}))
        .unwrap();
    assert_eq!(
        parsed.to_json(),
        json!({"value": 1, "children": [{"value": 2, "children": [{"value": 3, "children": []}]}]})
    );

    let err = tree
        .parse(json!({"value": 1, "children": [{"value": 2, "children": [{"value": "x"}]}]}))
        .unwrap_err();
    assert_eq!(
        err.format_errors(),
        vec![ErrorRecord::at(
            vec![
                PathSegment::from("children"),
                PathSegment::Index(0),
                PathSegment::from("children"),
                PathSegment::Index(0),
                PathSegment::from("value"),
            ],
            ["Expected int, received str"],
        )]
    );
}
