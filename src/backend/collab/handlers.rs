/**
 * Collaboration Handlers
 *
 * Web tier:
 * - `POST /api/collab/token` - mint an edit-session token for a note
 * - `POST /api/collab/status` - ask the collaboration service about a note
 * - `POST /api/collab/save` - ask the collaboration service to save a note
 *
 * Collaboration service:
 * - `POST /api/status` - engine status for the token's note
 * - `POST /api/save` - engine save for the token's note
 * - `GET /collab` - WebSocket upgrade into the collaboration engine
 *
 * The web tier only signs for notes its `NoteResolver` places in the named
 * workspace. The collaboration service trusts nothing but the capability
 * token; it never sees the user's session.
 */

use axum::{
    body::Bytes,
    extract::{ws::WebSocketUpgrade, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::backend::auth::{MintedToken, NoteGrant, EDIT_SESSION_TOKEN_TTL_SECS, ONE_SHOT_TOKEN_TTL_SECS};
use crate::backend::collab::bridge::serve_socket;
use crate::backend::collab::resolver::NoteResolver;
use crate::backend::error::BackendError;
use crate::backend::middleware::{AuthUser, CollabAuth};
use crate::backend::server::state::AppState;
use crate::shared::SharedError;

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, BackendError> {
    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!("[Collab] Rejected request body: {:?}", e);
        BackendError::handler(StatusCode::BAD_REQUEST, "Invalid payload")
    })
}

/// Body of the web tier's collaboration requests
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteTokenRequest {
    pub workspace_id: i64,
    pub note_id: i64,
    pub note_public_id: String,
}

impl NoteTokenRequest {
    /// Parse and validate a raw request body
    pub fn parse(body: &[u8]) -> Result<Self, BackendError> {
        let request: NoteTokenRequest = parse_body(body)?;
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), BackendError> {
        if self.workspace_id <= 0 {
            return Err(SharedError::validation("workspaceId", "Invalid workspace id").into());
        }
        if self.note_id <= 0 {
            return Err(SharedError::validation("noteId", "Invalid note id").into());
        }
        if self.note_public_id.trim().is_empty() {
            return Err(SharedError::validation("notePublicId", "Invalid note public id").into());
        }
        Ok(())
    }

    /// Check that the note exists in the workspace under both of its ids
    ///
    /// # Errors
    ///
    /// * `404 Not Found` - "Workspace not found", or "Note not found" when
    ///   the public id is unknown in that workspace or names another note
    pub async fn resolve(&self, notes: &dyn NoteResolver) -> Result<(), BackendError> {
        if !notes.workspace_exists(self.workspace_id).await? {
            return Err(BackendError::handler(StatusCode::NOT_FOUND, "Workspace not found"));
        }

        match notes.note_id(self.workspace_id, &self.note_public_id).await? {
            Some(note_id) if note_id == self.note_id => Ok(()),
            Some(note_id) => {
                tracing::warn!(
                    "[Collab] Note {} in workspace {} is id {}, request claimed {}",
                    self.note_public_id,
                    self.workspace_id,
                    note_id,
                    self.note_id
                );
                Err(BackendError::handler(StatusCode::NOT_FOUND, "Note not found"))
            }
            None => Err(BackendError::handler(StatusCode::NOT_FOUND, "Note not found")),
        }
    }

    fn grant(&self, user_id: &str) -> NoteGrant {
        NoteGrant {
            workspace_id: self.workspace_id,
            note_public_id: self.note_public_id.clone(),
            note_id: self.note_id,
            user_id: user_id.to_string(),
        }
    }
}

/// Body of `POST /api/collab/save`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSaveRequest {
    #[serde(flatten)]
    pub note: NoteTokenRequest,
    #[serde(default)]
    pub include_blame: bool,
}

impl NoteSaveRequest {
    pub fn parse(body: &[u8]) -> Result<Self, BackendError> {
        let request: NoteSaveRequest = parse_body(body)?;
        request.note.validate()?;
        Ok(request)
    }
}

/// Options the collaboration service accepts on `POST /api/save`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveOptions {
    #[serde(default)]
    pub include_blame: bool,
}

impl SaveOptions {
    /// An empty body means defaults
    pub fn parse(body: &[u8]) -> Result<Self, BackendError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        parse_body(body)
    }
}

/// Mint an edit-session token (POST /api/collab/token)
pub async fn handle_collab_token(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> Result<Json<MintedToken>, BackendError> {
    let request = NoteTokenRequest::parse(&body)?;
    request.resolve(app_state.notes.as_ref()).await?;
    let minted = app_state
        .tokens
        .mint(&request.grant(&user.user_id), EDIT_SESSION_TOKEN_TTL_SECS)?;

    tracing::info!(
        "[Collab] Issued edit token for note {} to user {}",
        request.note_id,
        user.user_id
    );
    Ok(Json(minted))
}

/// Proxy a status check to the collaboration service (POST /api/collab/status)
pub async fn handle_collab_status_proxy(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> Result<Json<Value>, BackendError> {
    let request = NoteTokenRequest::parse(&body)?;
    request.resolve(app_state.notes.as_ref()).await?;
    let minted = app_state
        .tokens
        .mint(&request.grant(&user.user_id), ONE_SHOT_TOKEN_TTL_SECS)?;

    let status = app_state.collab_client.status(&minted.token).await?;
    Ok(Json(status))
}

/// Proxy a save to the collaboration service (POST /api/collab/save)
///
/// Line attribution rows live in the application's database; this answers
/// with the collaboration service's payload as is.
pub async fn handle_collab_save_proxy(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Bytes,
) -> Result<Json<Value>, BackendError> {
    let request = NoteSaveRequest::parse(&body)?;
    request.note.resolve(app_state.notes.as_ref()).await?;
    let minted = app_state
        .tokens
        .mint(&request.note.grant(&user.user_id), ONE_SHOT_TOKEN_TTL_SECS)?;

    tracing::info!(
        "[Collab] User {} saving note {}",
        user.user_id,
        request.note.note_id
    );
    let saved = app_state
        .collab_client
        .save(&minted.token, request.include_blame)
        .await?;
    Ok(Json(saved))
}

/// Engine status for the token's note (POST /api/status)
pub async fn handle_status(
    State(app_state): State<AppState>,
    CollabAuth(claims): CollabAuth,
) -> Json<Value> {
    tracing::debug!("[Collab] Status requested for note {}", claims.note_id);
    Json(app_state.engine.status(&claims))
}

/// Engine save for the token's note (POST /api/save)
pub async fn handle_save(
    State(app_state): State<AppState>,
    CollabAuth(claims): CollabAuth,
    body: Bytes,
) -> Result<Json<Value>, BackendError> {
    let options = SaveOptions::parse(&body)?;
    Ok(Json(app_state.engine.save(&claims, options.include_blame)))
}

/// Upgrade to a collaboration socket (GET /collab)
///
/// The token is checked before the upgrade, so an unauthorized client gets a
/// plain 401 instead of a socket that closes immediately.
pub async fn handle_collab_socket(
    State(app_state): State<AppState>,
    CollabAuth(claims): CollabAuth,
    upgrade: WebSocketUpgrade,
) -> Response {
    let engine = app_state.engine.clone();
    let keepalive = app_state.config.keepalive_interval;
    upgrade
        .on_failed_upgrade(|e| tracing::warn!("[Collab] WebSocket upgrade failed: {:?}", e))
        .on_upgrade(move |socket| serve_socket(socket, claims, engine, keepalive))
        .into_response()
}
