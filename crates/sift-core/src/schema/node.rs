//! Chain nodes and the metadata attached to them
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::schema::{Lazy, Schema};
use crate::types::{Fields, TypeTag};
use crate::validation::ValidationError;
use crate::value::{Number, Value};
use std::fmt;
use std::sync::Arc;

pub(crate) type CheckFn = dyn Fn(&Value) -> Result<(), ValidationError> + Send + Sync;
pub(crate) type ApplyFn = dyn Fn(&Value) -> Result<Value, ValidationError> + Send + Sync;

/// Behavior of a single node
#[derive(Clone)]
pub(crate) enum Step {
    /// Validate in place; failures accumulate
    Ensure {
        check: Arc<CheckFn>,
        break_on_failure: bool,
    },
    /// Replace the current value; acts as a barrier for pending failures
    Transform { apply: Arc<ApplyFn> },
}

/// Public view of a node's behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Validator { break_on_failure: bool },
    Transformer,
}

/// Read-only metadata describing what a node checks or produces
///
/// Parsing never reads annotations. They exist so that exporters can turn a
/// schema into JSON-Schema or OpenAPI fragments without running it.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// Expected runtime type
    Type(TypeTag),
    /// Item schema of a list
    Items(Schema),
    /// Declared fields of a struct
    Fields(Fields),
    /// The two branches of a union
    Union(Schema, Schema),
    /// A lazy self-reference
    Reference(Lazy),
    MinLength(usize),
    MaxLength(usize),
    Pattern(String),
    Gt(Number),
    Gte(Number),
    Lt(Number),
    Lte(Number),
    Aware,
    Naive,
    /// Free-form metadata added with [`Schema::describe`]
    Custom {
        key: String,
        value: serde_json::Value,
    },
}

impl Annotation {
    /// Metadata key, matching the vocabulary of JSON-Schema style exporters
    pub fn key(&self) -> &str {
        match self {
            Annotation::Type(_) => "type",
            Annotation::Items(_) => "item",
            Annotation::Fields(_) => "fields",
            Annotation::Union(..) => "union",
            Annotation::Reference(_) => "ref",
            Annotation::MinLength(_) => "min",
            Annotation::MaxLength(_) => "max",
            Annotation::Pattern(_) => "pattern",
            Annotation::Gt(_) => "gt",
            Annotation::Gte(_) => "gte",
            Annotation::Lt(_) => "lt",
            Annotation::Lte(_) => "lte",
            Annotation::Aware => "aware",
            Annotation::Naive => "naive",
            Annotation::Custom { key, .. } => key,
        }
    }
}

/// An immutable link in a schema chain
pub struct Node {
    pub(crate) prev: Option<Arc<Node>>,
    pub(crate) step: Step,
    pub(crate) annotations: Vec<Annotation>,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match &self.step {
            Step::Ensure {
                break_on_failure, ..
            } => NodeKind::Validator {
                break_on_failure: *break_on_failure,
            },
            Step::Transform { .. } => NodeKind::Transformer,
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// The node this one was appended to, if any
    pub fn prev(&self) -> Option<&Node> {
        self.prev.as_deref()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("annotations", &self.annotations)
            .finish()
    }
}
