//! Error types for schema derivation and binding
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

use sift_core::{SchemaError, ValidationError};
use thiserror::Error;

/// Result type alias for binding operations
pub type Result<T> = std::result::Result<T, BindError>;

/// Errors raised while deriving schemas or binding parsed values
#[derive(Error, Debug)]
pub enum BindError {
    /// A record with the same name is already registered
    #[error("Record already registered: {name}")]
    DuplicateRecord { name: String },

    /// A type description names a record that was never registered
    #[error("Unknown record: {name}")]
    UnknownRecord { name: String },

    /// A union type description with no members
    #[error("Union for field {field} has no member types")]
    EmptyUnion { field: String },

    /// The derived fields could not be assembled into a schema
    #[error("Schema construction failed: {0}")]
    Schema(#[from] SchemaError),

    /// The input did not satisfy the schema
    #[error("Validation failed:\n{0}")]
    Invalid(#[from] ValidationError),

    /// The parsed value did not fit the target Rust type
    #[error("Deserialization failed: {0}")]
    Deserialize(#[from] serde_json::Error),
}

impl BindError {
    /// The validation report, when the failure came from parsing
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            BindError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BindError::UnknownRecord { name: "Node".to_string() };
        assert_eq!(err.to_string(), "Unknown record: Node");

        let err = BindError::DuplicateRecord { name: "User".to_string() };
        assert_eq!(err.to_string(), "Record already registered: User");
    }

    #[test]
    fn test_validation_accessor() {
        let err = BindError::from(ValidationError::message("bad"));
        assert_eq!(err.validation().map(|e| e.messages().to_vec()), Some(vec!["bad".to_string()]));

        let err = BindError::EmptyUnion { field: "x".to_string() };
        assert!(err.validation().is_none());
    }
}
