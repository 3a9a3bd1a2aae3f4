//! Collaboration service route tests

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use kontexted_collab::backend::auth::{now_unix, ONE_SHOT_TOKEN_TTL_SECS};
use pretty_assertions::assert_eq;
use serde_json::json;
use tower::ServiceExt;

use crate::common::{anonymous_router, auth_header, grant, read_json, test_state};

fn status_request(authorization: Option<String>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/api/status");
    if let Some(value) = authorization {
        builder = builder.header(header::AUTHORIZATION, value);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_status_with_valid_token() {
    let state = test_state();
    let minted = state.tokens.mint(&grant(9, 31), ONE_SHOT_TOKEN_TTL_SECS).unwrap();

    let response = anonymous_router(state)
        .oneshot(status_request(Some(auth_header(&minted.token))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({"workspaceId": 9, "noteId": 31, "notePublicId": "n_31", "connections": 0})
    );
}

#[tokio::test]
async fn test_status_rejects_missing_and_expired_tokens() {
    let state = test_state();

    let response = anonymous_router(state.clone())
        .oneshot(status_request(None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let stale = state
        .tokens
        .mint_at(&grant(9, 31), ONE_SHOT_TOKEN_TTL_SECS, now_unix() - 600)
        .unwrap();
    let response = anonymous_router(state.clone())
        .oneshot(status_request(Some(auth_header(&stale.token))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json(response).await["error"], "Unauthorized");

    let response = anonymous_router(state)
        .oneshot(status_request(Some(auth_header("garbage"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_save_acknowledged_by_relay_engine() {
    let state = test_state();
    let minted = state.tokens.mint(&grant(9, 31), ONE_SHOT_TOKEN_TTL_SECS).unwrap();

    let response = anonymous_router(state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/save")
                .header(header::AUTHORIZATION, auth_header(&minted.token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"includeBlame":true}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        read_json(response).await,
        json!({
            "ok": true,
            "workspaceId": 9,
            "noteId": 31,
            "notePublicId": "n_31",
            "persisted": false
        })
    );

    let response = anonymous_router(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/save")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_socket_upgrade_checks_token_first() {
    let state = test_state();

    let response = anonymous_router(state.clone())
        .oneshot(Request::builder().uri("/collab").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = anonymous_router(state.clone())
        .oneshot(
            Request::builder()
                .uri("/collab?token=not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // A valid token gets past authorization; this request is not a real upgrade
    let minted = state.tokens.mint(&grant(9, 31), 600).unwrap();
    let response = anonymous_router(state)
        .oneshot(
            Request::builder()
                .uri(format!("/collab?token={}", minted.token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let response = anonymous_router(test_state())
        .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "Not found");
}
