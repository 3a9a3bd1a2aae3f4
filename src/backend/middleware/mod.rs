//! Middleware Module
//!
//! Request extractors that establish who is calling.
//!
//! - **`auth`** - Session user and capability token extractors

pub mod auth;

pub use auth::{request_token, AuthUser, AuthenticatedUser, CollabAuth};
