/**
 * Web Tier Routes
 *
 * Routes served to signed-in users of the workspace application.
 *
 * # Routes
 *
 * - `GET /api/workspaces/{workspace_id}/events` - Live update stream (SSE)
 * - `POST /api/collab/token` - Edit-session capability token
 * - `POST /api/collab/status` - Collaboration status for a note
 * - `POST /api/collab/save` - Save a note through the collaboration service
 *
 * All of them require the session layer to have put an `AuthenticatedUser`
 * on the request.
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::collab::handlers::{
    handle_collab_save_proxy, handle_collab_status_proxy, handle_collab_token,
};
use crate::backend::realtime::subscription::handle_workspace_events;
use crate::backend::server::state::AppState;

/// Configure web tier routes
pub fn configure_web_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route(
            "/api/workspaces/{workspace_id}/events",
            get(handle_workspace_events),
        )
        .route("/api/collab/token", post(handle_collab_token))
        .route("/api/collab/status", post(handle_collab_status_proxy))
        .route("/api/collab/save", post(handle_collab_save_proxy))
}
