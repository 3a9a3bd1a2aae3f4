//! Shared Error Types
//!
//! Failures outside the HTTP layer: turning tree payloads into event data
//! and validating the ids a request names.
//!
//! ```rust
//! use kontexted_collab::shared::error::SharedError;
//!
//! let error = SharedError::validation("notePublicId", "Invalid note public id");
//! ```

use thiserror::Error;

/// Errors raised by the event model and request validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// An event payload could not be encoded
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// A request value is out of range or empty
    #[error("Validation error in field '{field}': {message}")]
    ValidationError { field: String, message: String },
}

impl SharedError {
    pub fn serialization(message: impl Into<String>) -> Self {
        SharedError::SerializationError { message: message.into() }
    }

    /// `field` uses the JSON name the client sent
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SharedError::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        SharedError::serialization(err.to_string())
    }
}
