/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct serves as the central state container, holding:
 * - The workspace event hub (process-wide, created once)
 * - The capability token service
 * - The resolver that places notes in workspaces before tokens are signed
 * - The collaboration engine behind the WebSocket endpoint
 * - The HTTP client for calling the collaboration service
 * - Configuration and the shutdown signal
 *
 * Every field is cheap to clone; handlers receive their own copy.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::TokenService;
use crate::backend::collab::client::CollabClient;
use crate::backend::collab::engine::{CollabEngine, RelayEngine};
use crate::backend::collab::resolver::{NoteDirectory, NoteResolver};
use crate::backend::realtime::hub::WorkspaceEventHub;
use crate::backend::server::shutdown::Shutdown;
use crate::shared::AppConfig;

/// Application state shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Publish/subscribe registry for workspace mutations
    pub hub: WorkspaceEventHub,

    /// Mints and verifies capability tokens
    pub tokens: TokenService,

    /// Workspace and note lookup for the web tier
    pub notes: Arc<dyn NoteResolver>,

    /// Receives every verified collaboration connection
    pub engine: Arc<dyn CollabEngine>,

    /// Web tier's client for the collaboration service
    pub collab_client: CollabClient,

    pub config: Arc<AppConfig>,

    /// Ends live update streams on graceful shutdown
    pub shutdown: Shutdown,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("hub", &self.hub)
            .field("tokens", &self.tokens)
            .field("collab_url", &self.collab_client.base_url())
            .finish()
    }
}

impl AppState {
    /// State with the default relay engine and an empty `NoteDirectory`
    pub fn new(config: AppConfig) -> Self {
        Self::with_engine(config, Arc::new(RelayEngine::new()))
    }

    /// State with a caller-supplied collaboration engine
    pub fn with_engine(config: AppConfig, engine: Arc<dyn CollabEngine>) -> Self {
        Self {
            hub: WorkspaceEventHub::new(),
            tokens: TokenService::from_config(&config),
            notes: Arc::new(NoteDirectory::new()),
            engine,
            collab_client: CollabClient::new(config.collab_url()),
            config: Arc::new(config),
            shutdown: Shutdown::new(),
        }
    }

    /// Replace the note resolver
    pub fn with_resolver(mut self, notes: Arc<dyn NoteResolver>) -> Self {
        self.notes = notes;
        self
    }
}

impl FromRef<AppState> for WorkspaceEventHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}

impl FromRef<AppState> for TokenService {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<dyn CollabEngine> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.engine.clone()
    }
}
