/**
 * Server Initialization
 *
 * This module builds the application state and the router.
 *
 * # Initialization Process
 *
 * 1. Build `AppState` from the loaded configuration
 * 2. Check the token signing secret so a misconfigured production
 *    deployment fails before it accepts traffic
 * 3. Create the router with all routes
 */

use axum::Router;

use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Create application state, failing fast on a missing signing secret
pub fn create_state(config: AppConfig) -> Result<AppState, BackendError> {
    let app_state = AppState::new(config);
    app_state.tokens.ensure_configured()?;
    tracing::info!("[Server] Application state initialized ({:?})", app_state.tokens);
    Ok(app_state)
}

/// Create and configure the Axum application
///
/// Returns the state alongside the router so the caller can trigger
/// shutdown on it.
pub fn create_app(config: AppConfig) -> Result<(Router<()>, AppState), BackendError> {
    let app_state = create_state(config)?;
    let app = create_router(app_state.clone());
    tracing::info!("[Server] Router configured");
    Ok((app, app_state))
}
