//! Server Module
//!
//! This module contains the server-side setup: application state,
//! configuration loading, initialization and the shutdown signal.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs       - Module exports and documentation
//! ├── state.rs     - AppState and FromRef implementations
//! ├── config.rs    - Configuration loading from the environment
//! ├── init.rs      - State and router creation
//! └── shutdown.rs  - Graceful shutdown signal for live streams
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

/// Shutdown signal
pub mod shutdown;

pub use config::load_config;
pub use init::{create_app, create_state};
pub use shutdown::{Shutdown, ShutdownSignal};
pub use state::AppState;
