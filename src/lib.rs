//! Kontexted Collab - live collaboration transport
//!
//! The real-time layer of a team workspace/notes application:
//!
//! - a workspace event hub that fans note and folder mutations out to every
//!   connected client over Server-Sent Events
//! - short-lived capability tokens that hand a client off from the web tier
//!   to the collaboration service for exactly one note
//! - a socket adapter that carries collaboration traffic between a WebSocket
//!   and a pluggable collaboration engine
//!
//! # Module Structure
//!
//! - **`shared`** - Transport-neutral types: events, payload summaries,
//!   configuration, errors
//! - **`backend`** - Axum server (only compiled with the `ssr` feature)
//!
//! # Usage
//!
//! ```rust,no_run
//! use kontexted_collab::backend::server::create_app;
//! use kontexted_collab::shared::{AppConfig, WorkspaceEvent};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (app, state) = create_app(AppConfig::builder().build()?)?;
//! state.hub.publish(WorkspaceEvent::note_deleted(1, 42));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
