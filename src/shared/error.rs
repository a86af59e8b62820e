//! Shared Error Types
//!
//! Errors raised while checking or decoding client submissions. They are
//! produced before any write happens, so surfacing one never leaves partial
//! state behind.
//!
//! # Usage
//!
//! ```rust
//! use coursetree::shared::error::SharedError;
//!
//! let error = SharedError::validation("chapters[0].title", "Chapter title is required");
//! assert!(error.to_string().contains("chapters[0].title"));
//! ```
use thiserror::Error;

/// Errors shared between request decoding and the course engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// A required field is missing or a value is out of range
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// Path of the offending field, e.g. `chapters[2].units[0].title`
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
