//! Shared Module
//!
//! This module contains types that do not depend on the HTTP server: the
//! workspace event model, tree payloads, configuration and shared errors.
//! Everything here is plain serde data and can be used from mutation
//! handlers, tests and clients alike.

/// Workspace event model
pub mod event;

/// Workspace tree payloads
pub mod workspace;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use event::{EventType, WorkspaceEvent};
pub use workspace::{FolderSummary, NoteSummary};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, Environment};
