//! Sift Bind - struct schemas derived from record descriptions
//!
//! Describe a record as an ordered list of typed fields, register it, and
//! derive a [`StructSchema`](sift_core::StructSchema) that validates inputs of
//! that shape. Nested records, lists, optional and union types are resolved
//! recursively, and records may refer to themselves. [`ParseInto`] binds a
//! parsed value straight into a `serde::Deserialize` type.
//!
//! # Example
//!
//! ```
//! use serde::Deserialize;
//! use serde_json::json;
//! use sift_bind::{FieldDesc, ParseInto, RecordDesc, Registry, TypeDesc};
//! use sift_core::Value;
//!
//! #[derive(Debug, Deserialize, PartialEq)]
//! struct Node {
//!     name: String,
//!     children: Option<Vec<Node>>,
//! }
//!
//! let registry = Registry::new()
//!     .with(
//!         RecordDesc::new("Node")
//!             .field("name", TypeDesc::Str)
//!             .with_field(
//!                 FieldDesc::new("children", TypeDesc::optional(TypeDesc::list(TypeDesc::record("Node"))))
//!                     .default(Value::Null),
//!             ),
//!     )
//!     .unwrap();
//!
//! let schema = registry.derive("Node").unwrap();
//! let node: Node = schema
//!     .parse_into(json!({"name": "n1", "children": [{"name": "n2"}]}))
//!     .unwrap();
//! assert_eq!(node.children.unwrap()[0].name, "n2");
//! ```

pub mod bind;
pub mod desc;
pub mod error;
pub mod registry;

pub use bind::ParseInto;
pub use desc::{FieldDesc, RecordDesc, TypeDesc};
pub use error::{BindError, Result};
pub use registry::Registry;
