//! Chain engine
//!
//! A [`Schema`] is a handle to the tip of an immutable, singly-linked chain of
//! nodes. Every builder call appends a new node and returns a new handle, so a
//! schema can be extended in one place without affecting other holders of the
//! same handle.
//!
//! # Execution model
//!
//! `parse` walks the chain from its root to the tip:
//!
//! - a **validator** checks the current value; a failure is merged into the
//!   pending error and the walk continues, unless the validator was built
//!   with `break_on_failure`;
//! - a **transformer** first raises the pending error if there is one, then
//!   replaces the current value with its output.
//!
//! After the walk the pending error is raised if non-empty, otherwise the
//! current value is returned.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

mod lazy;
mod node;
mod union;

pub use lazy::Lazy;
pub use node::{Annotation, Node, NodeKind};
pub use union::union;

pub(crate) use node::Step;

use crate::messages::{self, DefaultMessage, Message};
use crate::validation::{ParseResult, ValidationError};
use crate::value::Value;
use log::{debug, trace};
use std::borrow::Cow;
use std::fmt;
use std::ops::BitOr;
use std::sync::Arc;

/// Options for [`Schema::ensure_with`]
#[derive(Debug, Clone, Default)]
pub struct EnsureOptions {
    message: Option<Message>,
    break_on_failure: bool,
}

impl EnsureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Message reported when the predicate fails
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Stop walking the chain when the predicate fails
    pub fn break_on_failure(mut self, enabled: bool) -> Self {
        self.break_on_failure = enabled;
        self
    }
}

/// A composable validation and transformation pipeline
#[derive(Clone, Default)]
pub struct Schema {
    tip: Option<Arc<Node>>,
}

impl Schema {
    /// The empty chain, which accepts any value unchanged
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&self, step: Step, annotations: Vec<Annotation>) -> Schema {
        Schema {
            tip: Some(Arc::new(Node {
                prev: self.tip.clone(),
                step,
                annotations,
            })),
        }
    }

    pub(crate) fn push_check<F>(&self, check: F, break_on_failure: bool, annotations: Vec<Annotation>) -> Schema
    where
        F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.push(
            Step::Ensure {
                check: Arc::new(check),
                break_on_failure,
            },
            annotations,
        )
    }

    pub(crate) fn push_apply<F>(&self, apply: F, annotations: Vec<Annotation>) -> Schema
    where
        F: Fn(&Value) -> Result<Value, ValidationError> + Send + Sync + 'static,
    {
        self.push(
            Step::Transform {
                apply: Arc::new(apply),
            },
            annotations,
        )
    }

    /// Predicate check whose failure text comes from the message resolver
    /// unless the caller supplied one
    pub(crate) fn ensure_builtin<F>(
        &self,
        predicate: F,
        message: Option<Message>,
        fallback: DefaultMessage,
        annotations: Vec<Annotation>,
    ) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.push_check(
            move |value| {
                if predicate(value) {
                    Ok(())
                } else {
                    Err(ValidationError::message(messages::render(
                        message.as_ref(),
                        &fallback,
                        value,
                    )))
                }
            },
            false,
            annotations,
        )
    }

    /// Append a validator reporting "Invalid value" on failure
    pub fn ensure<F>(&self, predicate: F) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.ensure_with(predicate, EnsureOptions::new())
    }

    /// Append a validator with an explicit message or break-on-failure
    pub fn ensure_with<F>(&self, predicate: F, options: EnsureOptions) -> Schema
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        let EnsureOptions {
            message,
            break_on_failure,
        } = options;
        self.push_check(
            move |value| {
                if predicate(value) {
                    Ok(())
                } else {
                    Err(ValidationError::message(messages::render(
                        message.as_ref(),
                        &DefaultMessage::EnsureFailed,
                        value,
                    )))
                }
            },
            break_on_failure,
            Vec::new(),
        )
    }

    /// Append a validator that reports its own failure tree
    ///
    /// The returned error is merged into the pending failures as-is, so a
    /// nested schema run inside the check keeps its located messages:
    ///
    /// ```
    /// use serde_json::json;
    /// use sift_core::{integer, structure, Fields, Schema};
    ///
    /// let point = structure(Fields::new().with("x", integer())).unwrap();
    /// let schema = Schema::new().ensure_result(move |v| point.parse_ref(v).map(|_| ()));
    /// let err = schema.parse(json!({"x": "no"})).unwrap_err();
    /// assert_eq!(err.to_json(), json!([{"loc": ["x"], "msgs": ["Expected int, received str"]}]));
    /// ```
    pub fn ensure_result<F>(&self, check: F) -> Schema
    where
        F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.push_check(check, false, Vec::new())
    }

    /// Like [`Schema::ensure_result`], optionally stopping the chain on failure
    pub fn ensure_result_with<F>(&self, check: F, break_on_failure: bool) -> Schema
    where
        F: Fn(&Value) -> Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.push_check(check, break_on_failure, Vec::new())
    }

    /// Append a transformer
    ///
    /// A [`ValidationError`] returned through `anyhow` is reported as-is. Any
    /// other error becomes a failure whose text is the error's own message.
    pub fn transform<F>(&self, func: F) -> Schema
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.wrap_transform(func, None)
    }

    /// Like [`Schema::transform`], reporting `message` for foreign errors
    pub fn transform_with<F>(&self, func: F, message: impl Into<Message>) -> Schema
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.wrap_transform(func, Some(message.into()))
    }

    fn wrap_transform<F>(&self, func: F, message: Option<Message>) -> Schema
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.push_apply(
            move |value| {
                func(value).map_err(|err| match err.downcast::<ValidationError>() {
                    Ok(validation) => validation,
                    Err(other) => {
                        trace!("transform failed: {}", other);
                        ValidationError::message(messages::render(
                            message.as_ref(),
                            &DefaultMessage::TransformFailed {
                                reason: other.to_string(),
                            },
                            value,
                        ))
                    }
                })
            },
            Vec::new(),
        )
    }

    /// Hand the value to another schema and adopt its result
    pub fn relay(&self, other: impl Into<Schema>) -> Schema {
        let other = other.into();
        self.push_apply(move |value| other.parse_ref(value), Vec::new())
    }

    /// Attach free-form metadata for exporters; parsing is unaffected
    pub fn describe(&self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Schema {
        self.push_check(
            |_| Ok(()),
            false,
            vec![Annotation::Custom {
                key: key.into(),
                value: value.into(),
            }],
        )
    }

    /// Validate and transform `value`
    pub fn parse(&self, value: impl Into<Value>) -> ParseResult<Value> {
        self.parse_ref(&value.into())
    }

    /// [`Schema::parse`] without taking ownership of the input
    pub fn parse_ref(&self, value: &Value) -> ParseResult<Value> {
        let mut current = Cow::Borrowed(value);
        let mut error = ValidationError::new();

        for node in self.nodes() {
            match &node.step {
                Step::Ensure {
                    check,
                    break_on_failure,
                } => {
                    if let Err(failure) = check(&current) {
                        error.merge(failure);
                        if *break_on_failure {
                            trace!("validator failed with break_on_failure, skipping rest of chain");
                            break;
                        }
                    }
                }
                Step::Transform { apply } => {
                    if !error.is_empty() {
                        debug!("pending failures before transform, stopping chain");
                        return Err(error);
                    }
                    current = Cow::Owned(apply(&current)?);
                }
            }
        }

        if error.is_empty() {
            Ok(current.into_owned())
        } else {
            Err(error)
        }
    }

    /// Nodes from the chain root to the tip
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes = Vec::new();
        let mut cursor = self.tip.as_deref();
        while let Some(node) = cursor {
            nodes.push(node);
            cursor = node.prev.as_deref();
        }
        nodes.reverse();
        nodes
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut cursor = self.tip.as_deref();
        while let Some(node) = cursor {
            count += 1;
            cursor = node.prev.as_deref();
        }
        count
    }

    /// Annotations of every node, root first
    pub fn annotations(&self) -> impl Iterator<Item = &Annotation> {
        self.nodes().into_iter().flat_map(|node| node.annotations.iter())
    }

    /// Both branches if this schema is an unextended union
    pub fn union_parts(&self) -> Option<(&Schema, &Schema)> {
        let tip = self.tip.as_deref()?;
        tip.annotations.iter().find_map(|annotation| match annotation {
            Annotation::Union(a, b) => Some((a, b)),
            _ => None,
        })
    }

    /// Leaf branches of nested unions, left to right
    ///
    /// A schema that is not a union yields itself.
    pub fn union_branches(&self) -> Vec<Schema> {
        match self.union_parts() {
            Some((a, b)) => {
                let mut branches = a.union_branches();
                branches.extend(b.union_branches());
                branches
            }
            None => vec![self.clone()],
        }
    }

    /// Display name of the schema kind
    fn title(&self) -> String {
        for annotation in self.annotations() {
            match annotation {
                Annotation::Type(tag) => return tag.title().to_string(),
                Annotation::Reference(lazy) => return lazy.name().to_string(),
                Annotation::Union(..) => return "Union".to_string(),
                _ => {}
            }
        }
        "Schema".to_string()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let titles: Vec<String> = self.union_branches().iter().map(Schema::title).collect();
        write!(f, "{}", titles.join(" | "))
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.to_string())
            .field("nodes", &self.node_count())
            .finish()
    }
}

impl From<&Schema> for Schema {
    fn from(schema: &Schema) -> Self {
        schema.clone()
    }
}

impl<R: Into<Schema>> BitOr<R> for Schema {
    type Output = Schema;

    fn bitor(self, rhs: R) -> Schema {
        union(self, rhs)
    }
}

impl<R: Into<Schema>> BitOr<R> for &Schema {
    type Output = Schema;

    fn bitor(self, rhs: R) -> Schema {
        union(self.clone(), rhs)
    }
}
