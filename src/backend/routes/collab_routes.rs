/**
 * Collaboration Service Routes
 *
 * - `POST /api/status` - Engine status for the token's note
 * - `POST /api/save` - Engine save for the token's note
 * - `GET /collab` - WebSocket upgrade into the collaboration engine
 *
 * All of them authorize with a capability token only.
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::collab::handlers::{handle_collab_socket, handle_save, handle_status};
use crate::backend::server::state::AppState;

/// Configure collaboration service routes
pub fn configure_collab_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/status", post(handle_status))
        .route("/api/save", post(handle_save))
        .route("/collab", get(handle_collab_socket))
}
