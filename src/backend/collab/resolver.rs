/**
 * Note Resolution
 *
 * Before the web tier signs anything it checks that the note named in the
 * request lives in the named workspace and that its internal id matches its
 * public id. Workspaces and notes belong to the embedding application, so
 * the lookup sits behind `NoteResolver`; a database-backed application
 * implements it over its own tables.
 *
 * `NoteDirectory` is the in-memory resolver used when nothing else is
 * plugged in. The application registers notes as it creates them.
 */

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use crate::backend::error::BackendError;

/// Lookup of workspaces and notes owned by the embedding application
#[async_trait]
pub trait NoteResolver: Send + Sync {
    async fn workspace_exists(&self, workspace_id: i64) -> Result<bool, BackendError>;

    /// Internal id of the note with `note_public_id` inside `workspace_id`
    async fn note_id(
        &self,
        workspace_id: i64,
        note_public_id: &str,
    ) -> Result<Option<i64>, BackendError>;
}

type Workspaces = HashMap<i64, HashMap<String, i64>>;

/// In-memory workspace and note registry
#[derive(Debug, Clone, Default)]
pub struct NoteDirectory {
    workspaces: Arc<RwLock<Workspaces>>,
}

impl NoteDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_workspace(&self, workspace_id: i64) {
        self.workspaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(workspace_id)
            .or_default();
    }

    /// Register a note, creating its workspace entry if needed
    pub fn add_note(&self, workspace_id: i64, note_id: i64, note_public_id: impl Into<String>) {
        self.workspaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(workspace_id)
            .or_default()
            .insert(note_public_id.into(), note_id);
    }

    pub fn remove_note(&self, workspace_id: i64, note_public_id: &str) -> bool {
        self.workspaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&workspace_id)
            .is_some_and(|notes| notes.remove(note_public_id).is_some())
    }

    pub fn remove_workspace(&self, workspace_id: i64) -> bool {
        self.workspaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&workspace_id)
            .is_some()
    }
}

#[async_trait]
impl NoteResolver for NoteDirectory {
    async fn workspace_exists(&self, workspace_id: i64) -> Result<bool, BackendError> {
        Ok(self
            .workspaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&workspace_id))
    }

    async fn note_id(
        &self,
        workspace_id: i64,
        note_public_id: &str,
    ) -> Result<Option<i64>, BackendError> {
        Ok(self
            .workspaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&workspace_id)
            .and_then(|notes| notes.get(note_public_id).copied()))
    }
}
