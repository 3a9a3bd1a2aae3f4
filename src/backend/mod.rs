//! Backend Module
//!
//! Server-side code for the live collaboration transport layer. Only
//! compiled with the `ssr` feature.
//!
//! # Architecture
//!
//! - **`auth`** - Capability token minting and verification
//! - **`realtime`** - Workspace event hub and live update streams
//! - **`collab`** - Socket adapter, WebSocket bridge, collaboration engine
//! - **`middleware`** - Session user and capability token extractors
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`server`** - Application state, configuration, initialization
//! - **`error`** - Backend-specific error types
//!
//! # Data Flow
//!
//! A mutation handler in the embedding application changes workspace state
//! and publishes a `WorkspaceEvent` on `AppState::hub`. Every live update
//! stream subscribed to that workspace writes it to its client.
//!
//! Separately, a client that wants to edit a note asks `POST /api/collab/token`
//! for a capability token and presents it when opening `GET /collab`.

pub mod auth;
pub mod collab;
pub mod error;
pub mod middleware;
pub mod realtime;
pub mod routes;
pub mod server;

pub use auth::TokenService;
pub use error::BackendError;
pub use realtime::{LiveUpdateStream, WorkspaceEventHub};
pub use server::{create_app, AppState};
