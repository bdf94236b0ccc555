//! Sift Core - composable validation and transformation schemas
//!
//! Build a schema describing the shape a value must have, then call
//! [`Schema::parse`] on untrusted input. Parsing either returns the
//! validated (and possibly converted) value, or a [`ValidationError`]
//! describing every failure found, each located by field alias or list index.
//!
//! # Main Components
//!
//! - **Values**: the dynamic [`Value`] model that schemas consume and produce
//! - **Chain Engine**: [`Schema`], an immutable pipeline of validators and transformers
//! - **Typed Schemas**: primitives, coercing variants in [`to`], structs, lists and unions
//! - **Fields**: [`Field`] resolution and the field-set algebra in [`fields`]
//! - **Messages**: the scoped [`messages`] resolver for built-in failure texts
//!
//! # Example
//!
//! ```
//! use sift_core::{integer, list, string, structure, Field, Fields};
//! use serde_json::json;
//!
//! let user = structure(
//!     Fields::new()
//!         .with("username", Field::new(string().min(1)).alias("name"))
//!         .with("age", Field::new(integer().gte(0)).with_default(18))
//!         .with("tags", list(string())),
//! )
//! .unwrap();
//!
//! let parsed = user.parse(json!({"name": "john", "tags": ["admin"]})).unwrap();
//! assert_eq!(parsed.to_json(), json!({"username": "john", "age": 18, "tags": ["admin"]}));
//!
//! let err = user.parse(json!({"name": "", "tags": [1]})).unwrap_err();
//! assert_eq!(
//!     err.to_json(),
//!     json!([
//!         {"loc": ["name"], "msgs": ["The minimum length of the string is 1"]},
//!         {"loc": ["tags", 0], "msgs": ["Expected str, received int"]},
//!     ])
//! );
//! ```
//!
//! # Recursion
//!
//! Parsing recurses once per level of input nesting. Extremely deep inputs
//! can therefore exhaust the stack; bound the input depth upstream if it is
//! untrusted.

pub mod error;
pub mod messages;
pub mod schema;
pub mod types;
pub mod validation;
pub mod value;

mod proptest_strategies;

pub use error::{Result, SchemaError};
pub use messages::{DefaultMessage, DefaultMessages, Message, MessageResolver, MessageScope};
pub use schema::{union, Annotation, EnsureOptions, Lazy, Node, NodeKind, Schema};
pub use types::conversions as to;
pub use types::fields;
pub use types::{
    any, any_list, boolean, boolean_with_message, datetime, datetime_with_message, float, float_with_message,
    integer, integer_with_message, list, list_with_message, mapping, null, null_with_message, string,
    string_with_message, structure, DateTimeSchema, Field, Fields, NumberSchema, StringSchema, StructSchema,
    TypeTag, UnknownKeys,
};
pub use validation::{ErrorRecord, ParseResult, PathSegment, ValidationError};
pub use value::{Map, Number, Record, Timestamp, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A schema that only checks `predicate`
pub fn ensure<F>(predicate: F) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Schema::new().ensure(predicate)
}

/// A schema that only applies `func`
pub fn transform<F>(func: F) -> Schema
where
    F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
{
    Schema::new().transform(func)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_free_constructors() {
        assert!(ensure(|v| v.is_null()).parse(Value::Null).is_ok());
        let doubled = transform(|v| Ok(Value::Int(v.as_i64().unwrap_or_default() * 2)));
        assert_eq!(doubled.parse(4).unwrap(), Value::Int(8));
    }
}
