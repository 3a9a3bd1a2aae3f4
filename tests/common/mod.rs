//! Common test utilities and helpers
//!
//! - Application state with a seeded note directory
//! - Routers with and without a signed-in user
//! - Request builders and response readers
//! - Custom assertion macros


use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request},
    response::Response,
    Extension, Router,
};
use kontexted_collab::backend::auth::NoteGrant;
use kontexted_collab::backend::collab::NoteDirectory;
use kontexted_collab::backend::middleware::AuthenticatedUser;
use kontexted_collab::backend::routes::create_router;
use kontexted_collab::backend::server::{create_state, AppState};
use kontexted_collab::shared::{AppConfig, AppConfigBuilder};
use serde_json::Value;
use tokio::task::JoinHandle;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_USER: &str = "user-42";

/// Configuration builder preloaded with the test secret
pub fn test_config() -> AppConfigBuilder {
    AppConfig::builder().token_secret(TEST_SECRET)
}

/// Notes the web tier routes know about: `(workspace, note, public id)`
pub const KNOWN_NOTES: &[(i64, i64, &str)] = &[(3, 12, "n_abc"), (5, 77, "n_77"), (1, 2, "n_2")];

pub fn test_notes() -> NoteDirectory {
    let notes = NoteDirectory::new();
    for (workspace_id, note_id, public_id) in KNOWN_NOTES {
        notes.add_note(*workspace_id, *note_id, *public_id);
    }
    notes
}

pub fn test_state() -> AppState {
    state_with(test_config().build().expect("valid test config"))
}

pub fn state_with(config: AppConfig) -> AppState {
    create_state(config)
        .expect("state should build")
        .with_resolver(Arc::new(test_notes()))
}

/// Router as seen by a signed-in user
pub fn signed_in_router(state: AppState) -> Router {
    create_router(state).layer(Extension(AuthenticatedUser::new(TEST_USER)))
}

/// Router with no session layer
pub fn anonymous_router(state: AppState) -> Router {
    create_router(state)
}

/// Serve the signed-in router on an ephemeral port
///
/// The web tier's `COLLAB_URL` points back at the same listener.
pub async fn serve_live(config: AppConfigBuilder) -> (SocketAddr, AppState, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local address");

    let state = state_with(
        config
            .port(addr.port())
            .collab_url(format!("http://{}", addr))
            .build()
            .expect("valid live config"),
    );
    let app = signed_in_router(state.clone());
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (addr, state, server)
}

pub fn grant(workspace_id: i64, note_id: i64) -> NoteGrant {
    NoteGrant {
        workspace_id,
        note_public_id: format!("n_{}", note_id),
        note_id,
        user_id: TEST_USER.to_string(),
    }
}

/// Create authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}

pub fn json_post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    serde_json::from_slice(&bytes).expect("json body")
}
