//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs            - Module exports and documentation
//! ├── router.rs         - Main router creation
//! ├── web_routes.rs     - Routes for signed-in users
//! └── collab_routes.rs  - Token-authorized collaboration service routes
//! ```

/// Main router creation
pub mod router;

/// Web tier routes
pub mod web_routes;

/// Collaboration service routes
pub mod collab_routes;

pub use router::create_router;
