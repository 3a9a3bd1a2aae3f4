/**
 * Collaboration Engine Seam
 *
 * The collaboration service hands every verified connection to a
 * `CollabEngine`. The engine only ever sees the socket adapter surface,
 * never the transport.
 *
 * `RelayEngine` is the built-in engine: it groups connections by note and
 * forwards each inbound message verbatim to every other open connection on
 * the same note. Document merge semantics belong to whatever engine is
 * plugged in instead; the relay does not interpret the bytes it carries.
 */

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use serde::Serialize;
use uuid::Uuid;

use crate::backend::auth::CollabClaims;
use crate::backend::collab::socket::{SocketAdapter, SocketEvent, SocketEventKind};

/// One verified connection
#[derive(Debug, Clone)]
pub struct CollabSession {
    pub claims: CollabClaims,
    pub socket: Arc<SocketAdapter>,
}

/// Status document for one note
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteStatus {
    pub workspace_id: i64,
    pub note_id: i64,
    pub note_public_id: String,
    pub connections: usize,
}

/// Answer to a save request
///
/// `persisted` is false when the engine holds no document state of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub ok: bool,
    pub workspace_id: i64,
    pub note_id: i64,
    pub note_public_id: String,
    pub persisted: bool,
}

/// Pluggable collaboration engine
pub trait CollabEngine: Send + Sync + 'static {
    /// Take ownership of a verified connection
    fn attach(&self, session: CollabSession);

    /// Status of the note named by `claims`
    fn status(&self, claims: &CollabClaims) -> serde_json::Value;

    /// Flush the note named by `claims` to durable storage
    ///
    /// `include_blame` asks the engine to record line attribution with the
    /// saved revision.
    fn save(&self, claims: &CollabClaims, include_blame: bool) -> serde_json::Value;
}

type Rooms = HashMap<i64, Vec<Arc<SocketAdapter>>>;

/// Forwards bytes between connections editing the same note
#[derive(Clone, Default)]
pub struct RelayEngine {
    rooms: Arc<Mutex<Rooms>>,
}

impl std::fmt::Debug for RelayEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayEngine")
            .field("rooms", &self.rooms().len())
            .finish()
    }
}

impl RelayEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn rooms(&self) -> MutexGuard<'_, Rooms> {
        self.rooms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of connections attached to a note
    pub fn connection_count(&self, note_id: i64) -> usize {
        self.rooms().get(&note_id).map_or(0, Vec::len)
    }

    /// Forward `data` from `sender` to the other open connections on the note
    fn relay(rooms: &Mutex<Rooms>, note_id: i64, sender: Uuid, data: bytes::Bytes) -> usize {
        let peers: Vec<Arc<SocketAdapter>> = rooms
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&note_id)
            .map(|sockets| {
                sockets
                    .iter()
                    .filter(|socket| socket.id() != sender)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        let mut delivered = 0;
        for peer in peers {
            if !peer.ready_state().is_open() {
                continue;
            }
            let peer_id = peer.id();
            peer.send(data.clone(), |result| match result {
                Ok(()) => delivered += 1,
                Err(e) => tracing::debug!("[Collab] Relay to {} failed: {}", peer_id, e),
            });
        }
        delivered
    }

    fn detach(rooms: &Mutex<Rooms>, note_id: i64, socket_id: Uuid) {
        let mut rooms = rooms.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sockets) = rooms.get_mut(&note_id) else {
            return;
        };
        let before = sockets.len();
        sockets.retain(|socket| socket.id() != socket_id);
        if sockets.len() < before {
            tracing::info!(
                "[Collab] Connection {} left note {} ({} remaining)",
                socket_id,
                note_id,
                sockets.len()
            );
        }
        if sockets.is_empty() {
            rooms.remove(&note_id);
        }
    }
}

impl CollabEngine for RelayEngine {
    fn attach(&self, session: CollabSession) {
        let CollabSession { claims, socket } = session;
        let note_id = claims.note_id;
        let socket_id = socket.id();

        // Handlers hold weak references so a closed room does not keep itself alive
        let rooms: Weak<Mutex<Rooms>> = Arc::downgrade(&self.rooms);
        socket.on(SocketEventKind::Message, {
            let rooms = rooms.clone();
            move |event| {
                if let (SocketEvent::Message(data), Some(rooms)) = (event, rooms.upgrade()) {
                    RelayEngine::relay(&rooms, note_id, socket_id, data);
                }
            }
        });
        socket.on(SocketEventKind::Close, {
            let rooms = rooms.clone();
            move |_| {
                if let Some(rooms) = rooms.upgrade() {
                    RelayEngine::detach(&rooms, note_id, socket_id);
                }
            }
        });
        socket.on(SocketEventKind::Error, move |event| {
            if let SocketEvent::Error(e) = event {
                tracing::warn!("[Collab] Connection {} errored: {}", socket_id, e);
            }
            if let Some(rooms) = rooms.upgrade() {
                RelayEngine::detach(&rooms, note_id, socket_id);
            }
        });

        let mut rooms = self.rooms();
        let sockets = rooms.entry(note_id).or_default();
        sockets.push(socket);
        tracing::info!(
            "[Collab] User {} joined note {} (workspace {}), {} connected",
            claims.user_id,
            note_id,
            claims.workspace_id,
            sockets.len()
        );
    }

    fn status(&self, claims: &CollabClaims) -> serde_json::Value {
        let status = NoteStatus {
            workspace_id: claims.workspace_id,
            note_id: claims.note_id,
            note_public_id: claims.note_public_id.clone(),
            connections: self.connection_count(claims.note_id),
        };
        serde_json::to_value(status).unwrap_or_default()
    }

    fn save(&self, claims: &CollabClaims, include_blame: bool) -> serde_json::Value {
        // Relayed bytes are never merged, so there is nothing to write
        tracing::debug!(
            "[Collab] Save requested for note {} (blame: {}), nothing to persist",
            claims.note_id,
            include_blame
        );
        let receipt = SaveReceipt {
            ok: true,
            workspace_id: claims.workspace_id,
            note_id: claims.note_id,
            note_public_id: claims.note_public_id.clone(),
            persisted: false,
        };
        serde_json::to_value(receipt).unwrap_or_default()
    }
}
