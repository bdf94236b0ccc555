//! Typed schemas built on the chain engine
//!
//! Every typed schema starts with the same three nodes:
//!
//! 1. a conversion transform, present only for coercing variants (see
//!    [`to`](crate::to));
//! 2. a type-check validator annotated with the expected [`TypeTag`];
//! 3. a post-processing transform, which is where structs resolve fields and
//!    lists parse their items.
//!
//! The post-processing transform also acts as a barrier, so refinements
//! appended later never see a value of the wrong type.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

/// Conversions and operators shared by the typed handles that wrap a
/// [`Schema`](crate::Schema)
macro_rules! typed_handle {
    ($handle:ident) => {
        impl std::ops::Deref for $handle {
            type Target = crate::schema::Schema;

            fn deref(&self) -> &crate::schema::Schema {
                &self.schema
            }
        }

        impl From<$handle> for crate::schema::Schema {
            fn from(handle: $handle) -> Self {
                handle.schema
            }
        }

        impl From<&$handle> for crate::schema::Schema {
            fn from(handle: &$handle) -> Self {
                handle.schema.clone()
            }
        }

        impl From<$handle> for crate::types::Field {
            fn from(handle: $handle) -> Self {
                crate::types::Field::new(handle.schema)
            }
        }

        impl<R: Into<crate::schema::Schema>> std::ops::BitOr<R> for $handle {
            type Output = crate::schema::Schema;

            fn bitor(self, rhs: R) -> crate::schema::Schema {
                crate::schema::union(self.schema, rhs)
            }
        }

        impl std::fmt::Display for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(&self.schema, f)
            }
        }
    };
}

pub mod conversions;
pub mod fields;
mod primitives;
mod structures;

pub use fields::{Field, Fields};
pub use primitives::{
    any, boolean, boolean_with_message, datetime, datetime_with_message, float, float_with_message, integer,
    integer_with_message, null, null_with_message, string, string_with_message, DateTimeSchema, NumberSchema,
    StringSchema,
};
pub use structures::{any_list, list, list_with_message, mapping, structure, StructSchema, UnknownKeys};

use crate::messages::{DefaultMessage, Message};
use crate::schema::{Annotation, Schema};
use crate::validation::ValidationError;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime type expected by a typed schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Any,
    String,
    Integer,
    Float,
    Boolean,
    Null,
    DateTime,
    List,
    /// A map or a record
    Object,
    /// A map only
    Mapping,
}

impl TypeTag {
    /// Name used in type-mismatch messages, in the vocabulary of
    /// [`Value::kind_name`]
    pub fn name(&self) -> &'static str {
        match self {
            TypeTag::Any => "any",
            TypeTag::String => "str",
            TypeTag::Integer => "int",
            TypeTag::Float => "float",
            TypeTag::Boolean => "bool",
            TypeTag::Null => "null",
            TypeTag::DateTime => "datetime",
            TypeTag::List => "list",
            TypeTag::Object => "object",
            TypeTag::Mapping => "map",
        }
    }

    /// Schema display name
    pub fn title(&self) -> &'static str {
        match self {
            TypeTag::Any => "Any",
            TypeTag::String => "String",
            TypeTag::Integer => "Integer",
            TypeTag::Float => "Float",
            TypeTag::Boolean => "Boolean",
            TypeTag::Null => "Null",
            TypeTag::DateTime => "Datetime",
            TypeTag::List => "List",
            TypeTag::Object => "Struct",
            TypeTag::Mapping => "MappingStruct",
        }
    }

    pub fn matches(&self, value: &Value) -> bool {
        match self {
            TypeTag::Any => true,
            TypeTag::String => matches!(value, Value::Str(_)),
            TypeTag::Integer => matches!(value, Value::Int(_)),
            TypeTag::Float => matches!(value, Value::Float(_)),
            TypeTag::Boolean => matches!(value, Value::Bool(_)),
            TypeTag::Null => matches!(value, Value::Null),
            TypeTag::DateTime => matches!(value, Value::DateTime(_)),
            TypeTag::List => matches!(value, Value::List(_)),
            TypeTag::Object => matches!(value, Value::Map(_) | Value::Record(_)),
            TypeTag::Mapping => matches!(value, Value::Map(_)),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A conversion step used by coercing schemas; `None` means the value cannot
/// be represented as the target type
pub(crate) type Convert = fn(&Value) -> Option<Value>;

/// Assemble the convert → type check → post-process prefix shared by all
/// typed schemas
pub(crate) fn typed<P>(
    tag: TypeTag,
    convert: Option<Convert>,
    message: Option<Message>,
    post: P,
    post_annotations: Vec<Annotation>,
) -> Schema
where
    P: Fn(&Value) -> Result<Value, ValidationError> + Send + Sync + 'static,
{
    let mut schema = Schema::new();

    if let Some(convert) = convert {
        let message = message.clone();
        schema = schema.push_apply(
            move |value| {
                convert(value).ok_or_else(|| {
                    ValidationError::message(crate::messages::render(
                        message.as_ref(),
                        &DefaultMessage::TypeConversion {
                            expected: tag.name().to_string(),
                        },
                        value,
                    ))
                })
            },
            Vec::new(),
        );
    }

    schema
        .ensure_builtin(
            move |value| tag.matches(value),
            message,
            DefaultMessage::TypeCheck {
                expected: tag.name().to_string(),
            },
            vec![Annotation::Type(tag)],
        )
        .push_apply(post, post_annotations)
}

/// Post-process step for leaves that need none
pub(crate) fn passthrough(value: &Value) -> Result<Value, ValidationError> {
    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NodeKind;

    #[test]
    fn test_integer_tag_rejects_bool() {
        assert!(TypeTag::Integer.matches(&Value::Int(1)));
        assert!(!TypeTag::Integer.matches(&Value::Bool(true)));
    }

    #[test]
    fn test_object_accepts_maps_only_for_mapping() {
        let map = Value::Map(Default::default());
        assert!(TypeTag::Object.matches(&map));
        assert!(TypeTag::Mapping.matches(&map));
        assert!(!TypeTag::Mapping.matches(&Value::List(vec![])));
    }

    #[test]
    fn test_typed_chain_shape() {
        let plain = typed(TypeTag::String, None, None, passthrough, Vec::new());
        let kinds: Vec<NodeKind> = plain.nodes().iter().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Validator { break_on_failure: false }, NodeKind::Transformer]
        );

        let stringify: Convert = |v| Some(Value::from(v.to_string()));
        let coercing = typed(TypeTag::String, Some(stringify), None, passthrough, Vec::new());
        assert_eq!(coercing.node_count(), 3);
        assert_eq!(coercing.parse(12).unwrap(), Value::from("12"));
    }

    #[test]
    fn test_type_check_message() {
        let schema = typed(TypeTag::Integer, None, None, passthrough, Vec::new());
        let err = schema.parse("x").unwrap_err();
        assert_eq!(err.messages(), ["Expected int, received str"]);
    }

    #[test]
    fn test_tag_serializes_lowercase() {
        assert_eq!(serde_json::to_value(TypeTag::DateTime).unwrap(), serde_json::json!("datetime"));
    }
}
