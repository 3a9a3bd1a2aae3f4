//! Status proxy tests against a mocked collaboration service

use axum::http::StatusCode;
use kontexted_collab::backend::auth::ONE_SHOT_TOKEN_TTL_SECS;
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{json_post, read_json, signed_in_router, state_with, test_config, TEST_USER};

fn status_request() -> axum::http::Request<axum::body::Body> {
    json_post(
        "/api/collab/status",
        json!({"workspaceId": 5, "noteId": 77, "notePublicId": "n_77"}),
    )
}

#[tokio::test]
async fn test_forwards_with_one_shot_token() {
    let collab = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/status"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"connections": 2})))
        .expect(1)
        .mount(&collab)
        .await;

    let state = state_with(test_config().collab_url(collab.uri()).build().unwrap());
    let response = signed_in_router(state.clone()).oneshot(status_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"connections": 2}));

    let requests = collab.received_requests().await.expect("recording enabled");
    let authorization = requests[0]
        .headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .expect("authorization header");
    let token = authorization.strip_prefix("Bearer ").expect("bearer scheme");

    let claims = state.tokens.verify(token).expect("forwarded token verifies");
    assert_eq!(claims.note_id, 77);
    assert_eq!(claims.user_id, TEST_USER);
    assert_eq!(claims.exp - claims.iat, ONE_SHOT_TOKEN_TTL_SECS as i64);
}

#[tokio::test]
async fn test_upstream_error_is_passed_through() {
    let collab = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"error": "engine offline"})))
        .mount(&collab)
        .await;

    let state = state_with(test_config().collab_url(collab.uri()).build().unwrap());
    let response = signed_in_router(state).oneshot(status_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(read_json(response).await["error"], "engine offline");
}

#[tokio::test]
async fn test_upstream_error_without_message() {
    let collab = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&collab)
        .await;

    let state = state_with(test_config().collab_url(collab.uri()).build().unwrap());
    let response = signed_in_router(state).oneshot(status_request()).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(read_json(response).await["error"], "Collab status failed");
}

#[tokio::test]
async fn test_unknown_workspace_is_rejected_before_forwarding() {
    let collab = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"connections": 0})))
        .expect(0)
        .mount(&collab)
        .await;

    let state = state_with(test_config().collab_url(collab.uri()).build().unwrap());
    let response = signed_in_router(state)
        .oneshot(json_post(
            "/api/collab/status",
            json!({"workspaceId": 404, "noteId": 77, "notePublicId": "n_77"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "Workspace not found");
}
