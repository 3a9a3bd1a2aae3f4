//! Real-time Update Module
//!
//! Workspace mutations reach connected clients through this module. Mutation
//! handlers publish a `WorkspaceEvent` into the hub; every open live update
//! stream for that workspace turns it into one SSE frame.
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── hub.rs          - Workspace event hub (publish/subscribe)
//! ├── stream.rs       - Per-client live update stream
//! └── subscription.rs - SSE endpoint handler
//! ```
//!
//! # Example
//!
//! ```rust
//! use kontexted_collab::backend::realtime::WorkspaceEventHub;
//! use kontexted_collab::shared::WorkspaceEvent;
//!
//! let hub = WorkspaceEventHub::new();
//! let subscription = hub.subscribe(1, |event| println!("{}", event.event_type));
//! hub.publish(WorkspaceEvent::note_deleted(1, 42));
//! subscription.unsubscribe();
//! ```

/// Workspace event hub
pub mod hub;

/// Live update stream
pub mod stream;

/// SSE subscription handler
pub mod subscription;

pub use hub::{Subscription, WorkspaceEventHub};
pub use stream::{Frame, LiveStreamHandle, LiveUpdateStream, StreamState, DEFAULT_HEARTBEAT_INTERVAL};
pub use subscription::handle_workspace_events;
