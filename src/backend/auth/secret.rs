//! Signing secret resolution
//!
//! The shared HMAC secret comes from `COLLAB_TOKEN_SECRET`. Production
//! deployments must configure it; elsewhere a fixed development secret is
//! substituted and a warning is logged once per process.

use std::sync::Once;

use crate::backend::error::BackendError;
use crate::shared::config::Environment;

/// Fallback secret for non-production deployments
pub const DEV_SECRET: &str = "dev-secret";

static DEV_SECRET_WARNING: Once = Once::new();

/// Resolve the signing secret for the given deployment context
///
/// # Errors
///
/// `ConfigurationError` when no secret is configured in production.
pub fn resolve_secret(configured: Option<&str>, environment: Environment) -> Result<String, BackendError> {
    match configured.filter(|secret| !secret.is_empty()) {
        Some(secret) => Ok(secret.to_string()),
        None if environment.is_production() => Err(BackendError::configuration(
            "COLLAB_TOKEN_SECRET is required in production",
        )),
        None => {
            DEV_SECRET_WARNING.call_once(|| {
                tracing::warn!("[Token] COLLAB_TOKEN_SECRET not set; using {}", DEV_SECRET);
            });
            Ok(DEV_SECRET.to_string())
        }
    }
}
