//! Property-based testing strategies for generating test data
//!
//! This module provides proptest strategies for generating random
//! values and error trees used by the crate's property tests.

#![cfg(test)]

use crate::validation::{PathSegment, ValidationError};
use crate::value::{Map, Value};
use proptest::collection::vec;
use proptest::prelude::*;

/// Strategy for generating scalar values
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e9f64..1.0e9).prop_map(Value::Float),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::Str),
    ]
}

/// Strategy for generating nested values
pub fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(Value::List),
            vec(("[a-z]{1,6}", inner), 0..6)
                .prop_map(|entries| Value::Map(entries.into_iter().collect::<Map>())),
        ]
    })
}

/// Strategy for generating path segments
pub fn segment_strategy() -> impl Strategy<Value = PathSegment> {
    prop_oneof![
        "[a-z]{1,4}".prop_map(PathSegment::Key),
        (0usize..4).prop_map(PathSegment::Index),
    ]
}

/// Strategy for generating error trees with unique child keys
pub fn error_strategy() -> impl Strategy<Value = ValidationError> {
    let leaf = vec("[a-z ]{1,10}", 0..3).prop_map(|msgs| {
        let mut error = ValidationError::new();
        for msg in msgs {
            error.push_message(msg);
        }
        error
    });
    leaf.prop_recursive(3, 16, 3, |inner| {
        (vec("[a-z ]{1,10}", 0..2), vec((segment_strategy(), inner), 0..3)).prop_map(|(msgs, children)| {
            let mut error = ValidationError::new();
            for msg in msgs {
                error.push_message(msg);
            }
            for (key, child) in children {
                if !child.is_empty() && error.child(key.clone()).is_none() {
                    error.attach(key, child);
                }
            }
            error
        })
    })
}

fn message_count(error: &ValidationError) -> usize {
    error.messages().len() + error.children().map(|(_, child)| message_count(child)).sum::<usize>()
}

proptest! {
    #[test]
    fn prop_format_errors_keeps_every_message(error in error_strategy()) {
        let total: usize = error.format_errors().iter().map(|record| record.msgs.len()).sum();
        prop_assert_eq!(total, message_count(&error));
    }

    #[test]
    fn prop_merge_concatenates_messages(a in error_strategy(), b in error_strategy()) {
        let expected = message_count(&a) + message_count(&b);
        let mut merged = a.clone();
        merged.merge(b);
        prop_assert_eq!(message_count(&merged), expected);
        prop_assert!(merged.messages().starts_with(a.messages()));
    }

    #[test]
    fn prop_json_round_trip(value in value_strategy()) {
        let json = value.to_json();
        prop_assert_eq!(Value::from(json.clone()).to_json(), json);
    }
}
