//! Live update stream endpoint tests

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use futures_util::StreamExt;
use kontexted_collab::shared::{NoteSummary, WorkspaceEvent};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

use crate::common::{anonymous_router, signed_in_router, state_with, test_config, test_state};

fn events_request(workspace: &str) -> Request<Body> {
    Request::builder()
        .uri(format!("/api/workspaces/{}/events", workspace))
        .body(Body::empty())
        .unwrap()
}

async fn next_chunk<S>(stream: &mut S) -> Bytes
where
    S: futures_util::Stream<Item = Result<Bytes, axum::Error>> + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("frame before timeout")
        .expect("stream still open")
        .expect("body chunk")
}

#[tokio::test]
async fn test_stream_headers_and_ready_frame() {
    let state = test_state();
    let response = signed_in_router(state.clone())
        .oneshot(events_request("3"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache, no-transform");
    assert_eq!(headers[header::CONNECTION], "keep-alive");
    assert_eq!(headers["x-accel-buffering"], "no");

    let mut body = response.into_body().into_data_stream();
    assert_eq!(
        next_chunk(&mut body).await,
        Bytes::from_static(b"event: ready\ndata: {\"ok\":true}\n\n")
    );
    assert_eq!(state.hub.subscriber_count(3), 1);
}

#[tokio::test]
async fn test_published_events_reach_stream() {
    let state = test_state();
    let response = signed_in_router(state.clone())
        .oneshot(events_request("3"))
        .await
        .unwrap();
    let mut body = response.into_body().into_data_stream();
    next_chunk(&mut body).await;

    let note = NoteSummary {
        id: 12,
        public_id: "n_x1".to_string(),
        name: "todo".to_string(),
        title: "Todo".to_string(),
        folder_id: None,
    };
    assert_eq!(state.hub.publish(WorkspaceEvent::note_created(3, &note).unwrap()), 1);
    assert_eq!(state.hub.publish(WorkspaceEvent::note_deleted(3, 12)), 1);
    assert_eq!(state.hub.publish(WorkspaceEvent::note_deleted(4, 99)), 0);

    let created = crate::assert_event_frame!(next_chunk(&mut body).await, "note.created");
    crate::assert_contains!(&created, "\"publicId\":\"n_x1\"");

    assert_eq!(
        next_chunk(&mut body).await,
        Bytes::from_static(b"event: note.updated\ndata: {\"id\":12}\n\n")
    );
}

#[tokio::test]
async fn test_dropping_body_releases_subscription() {
    let state = test_state();
    let response = signed_in_router(state.clone())
        .oneshot(events_request("8"))
        .await
        .unwrap();
    assert_eq!(state.hub.subscriber_count(8), 1);

    drop(response);
    assert_eq!(state.hub.subscriber_count(8), 0);
    assert_eq!(state.hub.workspace_count(), 0);
}

#[tokio::test]
async fn test_heartbeat_frame() {
    let state = state_with(
        test_config()
            .heartbeat_interval(Duration::from_millis(50))
            .build()
            .unwrap(),
    );
    let response = signed_in_router(state.clone()).oneshot(events_request("1")).await.unwrap();
    let mut body = response.into_body().into_data_stream();
    next_chunk(&mut body).await;

    assert_eq!(next_chunk(&mut body).await, Bytes::from_static(b": ping\n\n"));
}

#[tokio::test]
async fn test_shutdown_ends_stream() {
    let state = test_state();
    let response = signed_in_router(state.clone())
        .oneshot(events_request("2"))
        .await
        .unwrap();
    let mut body = response.into_body().into_data_stream();
    next_chunk(&mut body).await;

    state.shutdown.trigger();
    let end = tokio::time::timeout(Duration::from_secs(5), body.next())
        .await
        .expect("stream ends before timeout");
    assert!(end.is_none());
    assert_eq!(state.hub.subscriber_count(2), 0);
}

#[tokio::test]
async fn test_requires_signed_in_user() {
    let state = test_state();
    let response = anonymous_router(state.clone())
        .oneshot(events_request("3"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(state.hub.subscriber_count(3), 0);
}

#[tokio::test]
async fn test_invalid_workspace_id() {
    for workspace in ["abc", "0", "-4"] {
        let response = signed_in_router(test_state())
            .oneshot(events_request(workspace))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "workspace {}", workspace);
    }
}
