/**
 * Workspace Event System
 *
 * This module defines the events published whenever the workspace tree
 * changes. Each event is scoped to one workspace and carries a type tag
 * (`note.created`, `folder.updated`, ...) plus an arbitrary JSON payload.
 *
 * Events are immutable once constructed. The hub hands them to subscribers
 * behind an `Arc`, so every live stream sees the exact same value.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::workspace::{FolderSummary, NoteSummary};

/// Type tag of a workspace event
///
/// Serialized as the dotted wire tag (`"note.created"`), which is also the
/// SSE `event:` name written by the live update stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EventType {
    /// A note was created
    NoteCreated,
    /// A note was renamed, moved or deleted
    NoteUpdated,
    /// A folder was created
    FolderCreated,
    /// A folder was renamed or moved
    FolderUpdated,
    /// Synthetic first frame of every live update stream
    Ready,
    /// Any other tag
    Custom(String),
}

impl EventType {
    /// Wire tag for this event type
    pub fn as_str(&self) -> &str {
        match self {
            EventType::NoteCreated => "note.created",
            EventType::NoteUpdated => "note.updated",
            EventType::FolderCreated => "folder.created",
            EventType::FolderUpdated => "folder.updated",
            EventType::Ready => "ready",
            EventType::Custom(name) => name.as_str(),
        }
    }
}

impl From<String> for EventType {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "note.created" => EventType::NoteCreated,
            "note.updated" => EventType::NoteUpdated,
            "folder.created" => EventType::FolderCreated,
            "folder.updated" => EventType::FolderUpdated,
            "ready" => EventType::Ready,
            _ => EventType::Custom(tag),
        }
    }
}

impl From<&str> for EventType {
    fn from(tag: &str) -> Self {
        EventType::from(tag.to_string())
    }
}

impl From<EventType> for String {
    fn from(event_type: EventType) -> Self {
        event_type.as_str().to_string()
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation event scoped to one workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceEvent {
    /// Workspace the event belongs to
    pub workspace_id: i64,
    /// Type tag
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Event payload
    pub data: serde_json::Value,
}

impl WorkspaceEvent {
    /// Create a new workspace event
    pub fn new(workspace_id: i64, event_type: impl Into<EventType>, data: serde_json::Value) -> Self {
        Self {
            workspace_id,
            event_type: event_type.into(),
            data,
        }
    }

    /// Create an event from any serializable payload
    pub fn from_payload<T: Serialize>(
        workspace_id: i64,
        event_type: impl Into<EventType>,
        payload: &T,
    ) -> Result<Self, SharedError> {
        let data = serde_json::to_value(payload)?;
        Ok(Self::new(workspace_id, event_type, data))
    }

    /// `note.created` with the inserted note
    pub fn note_created(workspace_id: i64, note: &NoteSummary) -> Result<Self, SharedError> {
        Self::from_payload(workspace_id, EventType::NoteCreated, note)
    }

    /// `note.updated` with the updated note
    pub fn note_updated(workspace_id: i64, note: &NoteSummary) -> Result<Self, SharedError> {
        Self::from_payload(workspace_id, EventType::NoteUpdated, note)
    }

    /// Deletions are announced as `note.updated` carrying only the id, so
    /// clients refetch the tree.
    pub fn note_deleted(workspace_id: i64, note_id: i64) -> Self {
        Self::new(
            workspace_id,
            EventType::NoteUpdated,
            serde_json::json!({ "id": note_id }),
        )
    }

    /// `folder.created` with the inserted folder
    pub fn folder_created(workspace_id: i64, folder: &FolderSummary) -> Result<Self, SharedError> {
        Self::from_payload(workspace_id, EventType::FolderCreated, folder)
    }

    /// `folder.updated` with the updated folder
    pub fn folder_updated(workspace_id: i64, folder: &FolderSummary) -> Result<Self, SharedError> {
        Self::from_payload(workspace_id, EventType::FolderUpdated, folder)
    }

    /// The synthetic `ready` event sent first on every live stream
    pub fn ready(workspace_id: i64) -> Self {
        Self::new(workspace_id, EventType::Ready, serde_json::json!({ "ok": true }))
    }
}
