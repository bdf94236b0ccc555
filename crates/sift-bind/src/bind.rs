//! Binding parsed values into Rust types

use crate::error::Result;
use serde::de::DeserializeOwned;
use sift_core::{Schema, Value};

/// Parse with a schema, then deserialize the output into `T`
///
/// ```
/// use serde::Deserialize;
/// use serde_json::json;
/// use sift_bind::ParseInto;
/// use sift_core::{integer, string, structure, Field, Fields};
///
/// #[derive(Debug, Deserialize, PartialEq)]
/// struct User {
///     name: String,
///     age: i64,
/// }
///
/// let schema = structure(
///     Fields::new()
///         .with("name", string())
///         .with("age", Field::new(integer()).with_default(18)),
/// )
/// .unwrap();
///
/// let user: User = schema.parse_into(json!({"name": "ann"})).unwrap();
/// assert_eq!(user, User { name: "ann".to_string(), age: 18 });
/// ```
pub trait ParseInto {
    fn parse_into<T: DeserializeOwned>(&self, value: impl Into<Value>) -> Result<T>;
}

// Typed handles reach this impl through auto-deref.
impl ParseInto for Schema {
    fn parse_into<T: DeserializeOwned>(&self, value: impl Into<Value>) -> Result<T> {
        let parsed = self.parse(value)?;
        Ok(serde_json::from_value(parsed.to_json())?)
    }
}
