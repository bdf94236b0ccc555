//! Build-time error types for the Sift core library
//!
//! Parse-time failures are accumulated into a [`ValidationError`](crate::ValidationError)
//! tree. Everything in this module is different: a [`SchemaError`] means the
//! schema itself was configured incorrectly, and it is returned immediately
//! from the builder call that detected it.

use thiserror::Error;

/// Configuration error raised while building a schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A field-set operation named a field that does not exist
    #[error("Unknown field: {field} (known fields: {})", known.join(", "))]
    UnknownField { field: String, known: Vec<String> },

    /// Two struct fields read the same external key
    #[error("Duplicate alias: {alias} is used by both {first} and {second}")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },

    /// An error child key was set twice
    #[error("Duplicate child key in validation error: {key}")]
    DuplicateChild { key: String },

    /// A `pattern` refinement received an invalid regular expression
    #[error("Invalid pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A lazy reference was defined more than once
    #[error("Lazy reference {name} is already defined")]
    AlreadyDefined { name: String },
}

impl SchemaError {
    /// Create an unknown field error listing the valid names
    pub fn unknown_field<I, S>(field: impl Into<String>, known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaError::UnknownField {
            field: field.into(),
            known: known.into_iter().map(Into::into).collect(),
        }
    }
}

/// Convenience type alias for builder results
pub type Result<T> = std::result::Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_lists_known_names() {
        let err = SchemaError::unknown_field("nope", ["name", "age"]);
        assert_eq!(err.to_string(), "Unknown field: nope (known fields: name, age)");
    }

    #[test]
    fn test_duplicate_alias_display() {
        let err = SchemaError::DuplicateAlias {
            alias: "n".to_string(),
            first: "name".to_string(),
            second: "nick".to_string(),
        };
        assert!(err.to_string().contains("name and nick"));
    }
}
