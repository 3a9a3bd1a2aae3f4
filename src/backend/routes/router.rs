/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * the web tier and collaboration service routes into a single Axum router.
 * By default one process serves both; they share nothing but the token
 * signing secret, so they can also be deployed apart.
 */

use axum::{http::StatusCode, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::collab_routes::configure_collab_routes;
use crate::backend::routes::web_routes::configure_web_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// ## Web Tier
///
/// - `GET /api/workspaces/{workspace_id}/events` - Live update stream
/// - `POST /api/collab/token` - Edit-session token
/// - `POST /api/collab/status` - Proxied status check
///
/// ## Collaboration Service
///
/// - `POST /api/status` - Engine status
/// - `GET /collab` - WebSocket upgrade
///
/// ## Fallback
///
/// Unknown routes get a JSON 404.
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = configure_web_routes(Router::new());
    let router = configure_collab_routes(router);

    router
        .fallback(|| async { BackendError::handler(StatusCode::NOT_FOUND, "Not found") })
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}
