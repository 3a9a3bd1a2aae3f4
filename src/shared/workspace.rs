//! Workspace tree payloads
//!
//! Row summaries returned by the mutation handlers and carried as the `data`
//! of workspace events. Field names follow the JSON the clients consume.

use serde::{Deserialize, Serialize};

/// A note as it appears in the workspace tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSummary {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub title: String,
    /// Parent folder, `None` for notes at the workspace root
    pub folder_id: Option<i64>,
}

/// A folder as it appears in the workspace tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderSummary {
    pub id: i64,
    pub public_id: String,
    pub name: String,
    pub display_name: String,
    pub parent_id: Option<i64>,
}
