//! Structured, mergeable validation failures
//!
//! A [`ValidationError`] is a tree. Each node holds the peer messages reported
//! against one value, plus child errors keyed by field alias or list index.
//! Failures from every level of a `parse` call end up in a single tree, and
//! [`ValidationError::format_errors`] flattens it into located records.
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use crate::error::SchemaError;
use indexmap::map::Entry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// One step in an error location
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Struct field alias or unknown map key
    Key(String),
    /// List position
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write!(f, "{}", key),
            PathSegment::Index(index) => write!(f, "{}", index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// A flattened error entry produced by [`ValidationError::format_errors`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    /// Path from the parsed value to the failing value; `None` at the root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Vec<PathSegment>>,
    pub msgs: Vec<String>,
}

impl ErrorRecord {
    /// Record reported against the root value
    pub fn root<I, S>(msgs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: None,
            msgs: msgs.into_iter().map(Into::into).collect(),
        }
    }

    /// Record reported at a nested location
    pub fn at<L, I, S>(loc: L, msgs: I) -> Self
    where
        L: IntoIterator,
        L::Item: Into<PathSegment>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            loc: Some(loc.into_iter().map(Into::into).collect()),
            msgs: msgs.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(loc) = &self.loc {
            let path: Vec<String> = loc.iter().map(ToString::to_string).collect();
            write!(f, "{}: ", path.join("."))?;
        }
        write!(f, "{}", self.msgs.join("; "))
    }
}

/// Accumulated parse failure
#[derive(Error, Debug, Clone, Default, PartialEq)]
pub struct ValidationError {
    messages: Vec<String>,
    children: IndexMap<PathSegment, ValidationError>,
}

impl ValidationError {
    /// An empty error, used as an accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// An error carrying a single peer message
    pub fn message(msg: impl Into<String>) -> Self {
        Self {
            messages: vec![msg.into()],
            children: IndexMap::new(),
        }
    }

    /// No peer messages and no children
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.is_empty()
    }

    /// Peer messages about this value, in the order they were reported
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn children(&self) -> impl Iterator<Item = (&PathSegment, &ValidationError)> {
        self.children.iter()
    }

    pub fn child(&self, key: impl Into<PathSegment>) -> Option<&ValidationError> {
        self.children.get(&key.into())
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn push_message(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }

    /// Peer merge: concatenate messages and merge overlapping children recursively
    pub fn merge(&mut self, other: ValidationError) {
        self.messages.extend(other.messages);
        for (key, child) in other.children {
            match self.children.entry(key) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(child),
                Entry::Vacant(entry) => {
                    entry.insert(child);
                }
            }
        }
    }

    /// Attach a child error; each key may be set once
    pub fn insert_child(
        &mut self,
        key: impl Into<PathSegment>,
        error: ValidationError,
    ) -> Result<(), SchemaError> {
        match self.children.entry(key.into()) {
            Entry::Occupied(entry) => Err(SchemaError::DuplicateChild {
                key: entry.key().to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(error);
                Ok(())
            }
        }
    }

    /// Builder form of [`ValidationError::insert_child`] for internal callers
    /// that already guarantee key uniqueness
    pub(crate) fn attach(&mut self, key: impl Into<PathSegment>, error: ValidationError) {
        let key = key.into();
        debug_assert!(
            !self.children.contains_key(&key),
            "child error {} set twice",
            key
        );
        match self.children.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(error),
            Entry::Vacant(entry) => {
                entry.insert(error);
            }
        }
    }

    /// Flatten into located records
    ///
    /// Root peer messages come first as a record without `loc`. Children are
    /// then walked depth-first in insertion order; every node that has its own
    /// peer messages contributes one record. Nodes that only route to deeper
    /// failures are skipped.
    pub fn format_errors(&self) -> Vec<ErrorRecord> {
        let mut records = Vec::new();
        if !self.messages.is_empty() {
            records.push(ErrorRecord {
                loc: None,
                msgs: self.messages.clone(),
            });
        }
        let mut path = Vec::new();
        self.collect_children(&mut path, &mut records);
        records
    }

    fn collect_children(&self, path: &mut Vec<PathSegment>, records: &mut Vec<ErrorRecord>) {
        for (key, child) in &self.children {
            path.push(key.clone());
            if !child.messages.is_empty() {
                records.push(ErrorRecord {
                    loc: Some(path.clone()),
                    msgs: child.messages.clone(),
                });
            }
            child.collect_children(path, records);
            path.pop();
        }
    }

    /// JSON array of the formatted records
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self.format_errors()).unwrap_or(serde_json::Value::Null)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.format_errors();
        if records.is_empty() {
            return write!(f, "Validation failed");
        }
        for (i, record) in records.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

impl Serialize for ValidationError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.format_errors().serialize(serializer)
    }
}
