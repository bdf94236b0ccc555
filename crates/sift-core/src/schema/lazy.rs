//! Deferred schema references for recursive shapes
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use super::{Annotation, Schema};
use crate::error::{Result, SchemaError};
use log::debug;
use std::fmt;
use std::sync::{Arc, OnceLock};

struct LazyCell {
    name: String,
    target: OnceLock<Schema>,
}

/// A named, single-assignment schema slot
///
/// [`Lazy::schema`] hands out a schema that resolves the slot at parse time,
/// which is how a struct can contain lists of itself:
///
/// ```
/// use sift_core::{integer, list, structure, Field, Fields, Lazy, Value};
///
/// let node = Lazy::new("Node");
/// let tree = structure(
///     Fields::new()
///         .with("value", integer())
///         .with("children", Field::new(list(node.schema())).with_default(Value::List(Vec::new()))),
/// )
/// .unwrap();
/// node.define(tree.clone()).unwrap();
///
/// let parsed = tree.parse(serde_json::json!({"value": 1, "children": [{"value": 2}]}));
/// assert!(parsed.is_ok());
/// ```
///
/// Parsing through a reference that was never defined is a programming error
/// and panics with the reference name. A defined reference keeps its target
/// alive, so a self-referential schema is never freed.
#[derive(Clone)]
pub struct Lazy {
    cell: Arc<LazyCell>,
}

impl Lazy {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            cell: Arc::new(LazyCell {
                name: name.into(),
                target: OnceLock::new(),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.cell.name
    }

    /// Assign the target schema; a second assignment is rejected
    pub fn define(&self, schema: impl Into<Schema>) -> Result<()> {
        self.cell
            .target
            .set(schema.into())
            .map_err(|_| SchemaError::AlreadyDefined {
                name: self.cell.name.clone(),
            })?;
        debug!("lazy reference {} defined", self.cell.name);
        Ok(())
    }

    pub fn is_defined(&self) -> bool {
        self.cell.target.get().is_some()
    }

    pub fn get(&self) -> Option<&Schema> {
        self.cell.target.get()
    }

    /// Schema that parses through the target
    pub fn schema(&self) -> Schema {
        let cell = self.cell.clone();
        Schema::new().push_apply(
            move |value| match cell.target.get() {
                Some(target) => target.parse_ref(value),
                None => panic!("lazy reference `{}` parsed before it was defined", cell.name),
            },
            vec![Annotation::Reference(self.clone())],
        )
    }
}

impl fmt::Debug for Lazy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("name", &self.cell.name)
            .field("defined", &self.is_defined())
            .finish()
    }
}

impl From<&Lazy> for Schema {
    fn from(lazy: &Lazy) -> Self {
        lazy.schema()
    }
}

impl From<Lazy> for Schema {
    fn from(lazy: Lazy) -> Self {
        lazy.schema()
    }
}
