/**
 * Backend Error Types
 *
 * Rejected requests carry their own status. A missing production secret
 * reports a generic 500 and keeps the detail in the logs. Every token
 * failure (expired, tampered, malformed) collapses into `InvalidToken`.
 * Proxied status calls keep the collaboration service's status code.
 */

use thiserror::Error;
use axum::http::StatusCode;
use crate::shared::SharedError;

/// Errors returned by the web tier and collaboration service handlers
///
/// ```rust
/// use kontexted_collab::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let rejected = BackendError::handler(StatusCode::BAD_REQUEST, "Invalid payload");
/// assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request rejected with an explicit status
    #[error("Handler error: {message}")]
    HandlerError { status: StatusCode, message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Invalid token")]
    InvalidToken,

    /// Failure reported by the collaboration service, or 502 when unreachable
    #[error("Upstream error ({status}): {message}")]
    UpstreamError { status: StatusCode, message: String },

    #[error(transparent)]
    SharedError(#[from] SharedError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BackendError {
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError { status, message: message.into() }
    }

    /// The message is logged, never sent to clients
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError { message: message.into() }
    }

    pub fn upstream(status: StatusCode, message: impl Into<String>) -> Self {
        Self::UpstreamError { status, message: message.into() }
    }

    /// Validation failures are 400, serialization failures 500
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::ConfigurationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::UpstreamError { status, .. } => *status,
            Self::SharedError(err) => match err {
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            },
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the `error` field of the response body
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. } => message.clone(),
            // Secret handling details stay in the logs.
            Self::ConfigurationError { .. } => "Server misconfigured".to_string(),
            Self::InvalidToken => "Unauthorized".to_string(),
            Self::UpstreamError { message, .. } => message.clone(),
            Self::SharedError(SharedError::ValidationError { message, .. }) => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::SerializationError(err) => err.to_string(),
        }
    }
}
