//! Backend Error Module
//!
//! `BackendError` is what every HTTP handler in the service returns. It maps
//! onto a status code and a `{"error", "status"}` JSON body, so handlers
//! use `?` and never build error responses by hand.
//!
//! Socket transport failures live in `backend::collab::socket::SocketError`
//! and never reach an HTTP response.

/// `BackendError` and its status mapping
pub mod types;

/// `IntoResponse` for `BackendError`
pub mod conversion;

pub use types::BackendError;
