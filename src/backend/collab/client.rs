//! HTTP client the web tier uses to reach the collaboration service

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::backend::error::BackendError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Fallback message when a status call gives no usable error
pub const STATUS_FAILED_MESSAGE: &str = "Collab status failed";

/// Fallback message when a save call gives no usable error
pub const SAVE_FAILED_MESSAGE: &str = "Collab save failed";

/// Client for the collaboration service's HTTP API
#[derive(Debug, Clone)]
pub struct CollabClient {
    http: reqwest::Client,
    base_url: String,
}

impl CollabClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("[Collab] Falling back to default HTTP client: {:?}", e);
                reqwest::Client::new()
            });
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST /api/status` with a capability token
    pub async fn status(&self, token: &str) -> Result<Value, BackendError> {
        self.call("/api/status", token, None, STATUS_FAILED_MESSAGE).await
    }

    /// `POST /api/save` with a capability token and `{includeBlame}`
    pub async fn save(&self, token: &str, include_blame: bool) -> Result<Value, BackendError> {
        let body = json!({ "includeBlame": include_blame });
        self.call("/api/save", token, Some(body), SAVE_FAILED_MESSAGE).await
    }

    /// A non-success answer becomes `UpstreamError` with the upstream status
    /// and its `error` message, or `fallback` when it sent none.
    async fn call(
        &self,
        path: &str,
        token: &str,
        body: Option<Value>,
        fallback: &str,
    ) -> Result<Value, BackendError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&url).bearer_auth(token);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("[Collab] Request to {} failed: {:?}", url, e);
            BackendError::upstream(StatusCode::BAD_GATEWAY, fallback)
        })?;

        let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let payload: Option<Value> = response.json().await.ok();

        if !status.is_success() {
            let message = payload
                .as_ref()
                .and_then(|payload| payload.get("error"))
                .and_then(Value::as_str)
                .unwrap_or(fallback);
            tracing::warn!("[Collab] {} answered {}: {}", path, status, message);
            return Err(BackendError::upstream(status, message));
        }

        payload.ok_or_else(|| BackendError::upstream(StatusCode::BAD_GATEWAY, fallback))
    }
}
