//! `IntoResponse` for `BackendError`
//!
//! Every failure renders as `{"error": <message>, "status": <code>}` with the
//! matching HTTP status. Server-side failures are logged at error level,
//! client rejections at debug.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("[Server] Request failed: {}", self);
        } else {
            tracing::debug!("[Server] Request rejected: {}", self);
        }

        let body = json!({ "error": self.message(), "status": status.as_u16() });
        (status, Json(body)).into_response()
    }
}
