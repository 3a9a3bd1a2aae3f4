//! Collaboration Module
//!
//! The transport side of collaborative note editing. A client obtains a
//! capability token from the web tier, then opens a WebSocket to the
//! collaboration service; the socket is wrapped in a `SocketAdapter` and
//! handed to the configured `CollabEngine`.
//!
//! # Module Structure
//!
//! ```text
//! collab/
//! ├── mod.rs       - Module exports and documentation
//! ├── socket.rs    - Socket adapter and the RawSocket seam
//! ├── bridge.rs    - axum WebSocket driver behind a RawSocket
//! ├── engine.rs    - CollabEngine trait and the relay engine
//! ├── handlers.rs  - Token, status, save and WebSocket handlers
//! ├── resolver.rs  - NoteResolver seam and the in-memory NoteDirectory
//! └── client.rs    - Web tier client for the collaboration service
//! ```

/// Socket adapter
pub mod socket;

/// WebSocket bridge
pub mod bridge;

/// Collaboration engine seam
pub mod engine;

/// HTTP and WebSocket handlers
pub mod handlers;

/// Collaboration service client
pub mod client;

/// Workspace and note lookup
pub mod resolver;

pub use client::CollabClient;
pub use engine::{CollabEngine, CollabSession, NoteStatus, RelayEngine, SaveReceipt};
pub use handlers::{
    handle_collab_save_proxy, handle_collab_socket, handle_collab_status_proxy, handle_collab_token,
    handle_save, handle_status, NoteSaveRequest, NoteTokenRequest, SaveOptions,
};
pub use resolver::{NoteDirectory, NoteResolver};
pub use socket::{RawSocket, ReadyState, SocketAdapter, SocketError, SocketEvent, SocketEventKind};
