//! Parse-time failure reporting
//!
//! Copyright (c) 2025 Sift Team
//! Licensed under the Apache-2.0 license

mod error;

pub use error::{ErrorRecord, PathSegment, ValidationError};

/// Result of a `parse` call
pub type ParseResult<T> = std::result::Result<T, ValidationError>;
