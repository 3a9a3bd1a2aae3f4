/**
 * Socket Adapter
 *
 * Presents any bidirectional socket implementation through one fixed
 * surface so the collaboration engine never depends on a transport library:
 *
 * - `ready_state()` reads through to the underlying socket on every call
 * - `send(data, callback)` reports every outcome through the callback
 * - `close(code, reason)` never fails from the caller's point of view
 * - `ping()` uses the native keepalive if there is one, otherwise emits a
 *   synthetic pong straight away
 * - `on(kind, handler)` holds one handler per event kind; registering again
 *   replaces the previous handler
 */

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use thiserror::Error;
use uuid::Uuid;

/// Connection state of the underlying socket, numbered like the browser API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ReadyState {
    Connecting = 0,
    Open = 1,
    Closing = 2,
    Closed = 3,
}

impl ReadyState {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => ReadyState::Connecting,
            1 => ReadyState::Open,
            2 => ReadyState::Closing,
            _ => ReadyState::Closed,
        }
    }

    pub fn is_open(self) -> bool {
        self == ReadyState::Open
    }
}

/// Transport failure reported through `send` callbacks and `error` events
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SocketError {
    #[error("socket is not open")]
    NotOpen,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("socket operation panicked")]
    Panicked,
}

/// The underlying socket an adapter wraps
///
/// Implementations may fail or panic; the adapter contains both.
pub trait RawSocket: Send + Sync + 'static {
    fn ready_state(&self) -> ReadyState;

    fn send(&self, data: Bytes) -> Result<(), SocketError>;

    fn close(&self, code: Option<u16>, reason: Option<&str>) -> Result<(), SocketError>;

    /// Native keepalive. `None` when the transport has no ping primitive.
    fn ping(&self) -> Option<Result<(), SocketError>> {
        None
    }
}

/// Event names a handler can be registered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketEventKind {
    Message,
    Close,
    Error,
    Pong,
}

/// An event emitted by the adapter
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Message(Bytes),
    Close { code: Option<u16>, reason: String },
    Error(SocketError),
    Pong(Bytes),
}

impl SocketEvent {
    pub fn kind(&self) -> SocketEventKind {
        match self {
            SocketEvent::Message(_) => SocketEventKind::Message,
            SocketEvent::Close { .. } => SocketEventKind::Close,
            SocketEvent::Error(_) => SocketEventKind::Error,
            SocketEvent::Pong(_) => SocketEventKind::Pong,
        }
    }
}

/// Handler registered for one event kind
pub type SocketHandler = Arc<dyn Fn(SocketEvent) + Send + Sync>;

/// Uniform wrapper around one accepted socket
pub struct SocketAdapter {
    id: Uuid,
    raw: Arc<dyn RawSocket>,
    handlers: Mutex<HashMap<SocketEventKind, SocketHandler>>,
}

impl std::fmt::Debug for SocketAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketAdapter")
            .field("id", &self.id)
            .field("ready_state", &self.ready_state())
            .finish()
    }
}

impl SocketAdapter {
    pub fn new(raw: Arc<dyn RawSocket>) -> Self {
        Self {
            id: Uuid::new_v4(),
            raw,
            handlers: Mutex::new(HashMap::new()),
        }
    }

    /// Connection id, unique per adapter
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn ready_state(&self) -> ReadyState {
        self.raw.ready_state()
    }

    /// Write `data` and report the outcome to `callback`
    ///
    /// Errors and panics from the underlying socket are turned into a
    /// `SocketError` for the callback; nothing propagates to the caller.
    pub fn send<F>(&self, data: Bytes, callback: F)
    where
        F: FnOnce(Result<(), SocketError>),
    {
        let result = catch_unwind(AssertUnwindSafe(|| self.raw.send(data))).unwrap_or_else(|_| {
            tracing::error!("[Socket] Send panicked on connection {}", self.id);
            Err(SocketError::Panicked)
        });

        if let Err(e) = &result {
            tracing::debug!("[Socket] Send failed on connection {}: {}", self.id, e);
        }
        callback(result);
    }

    /// Close the underlying socket
    pub fn close(&self, code: Option<u16>, reason: Option<&str>) {
        match catch_unwind(AssertUnwindSafe(|| self.raw.close(code, reason))) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::debug!("[Socket] Close on connection {} ignored: {}", self.id, e);
            }
            Err(_) => {
                tracing::error!("[Socket] Close panicked on connection {}", self.id);
            }
        }
    }

    /// Send a keepalive
    pub fn ping(&self) {
        match catch_unwind(AssertUnwindSafe(|| self.raw.ping())) {
            Ok(Some(Ok(()))) => {}
            Ok(Some(Err(e))) => {
                tracing::debug!("[Socket] Ping failed on connection {}: {}", self.id, e);
            }
            Ok(None) => self.emit(SocketEvent::Pong(Bytes::new())),
            Err(_) => {
                tracing::error!("[Socket] Ping panicked on connection {}", self.id);
            }
        }
    }

    /// Register the handler for `kind`, replacing any previous one
    pub fn on<F>(&self, kind: SocketEventKind, handler: F)
    where
        F: Fn(SocketEvent) + Send + Sync + 'static,
    {
        self.handlers().insert(kind, Arc::new(handler));
    }

    /// Invoke the handler registered for the event's kind, if any
    pub fn emit(&self, event: SocketEvent) {
        let kind = event.kind();
        let handler = self.handlers().get(&kind).cloned();
        let Some(handler) = handler else {
            return;
        };

        if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
            tracing::error!("[Socket] {:?} handler panicked on connection {}", kind, self.id);
        }
    }

    fn handlers(&self) -> MutexGuard<'_, HashMap<SocketEventKind, SocketHandler>> {
        self.handlers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
