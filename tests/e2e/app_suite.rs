//! End-to-end: the web tier proxies status and save calls to a live
//! collaboration service served by the same application.

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::common::{serve_live, test_config};

#[tokio::test]
async fn test_status_and_save_round_trip_through_live_listener() {
    let (addr, state, server) = serve_live(test_config()).await;
    let http = reqwest::Client::new();

    let status: Value = http
        .post(format!("http://{}/api/collab/status", addr))
        .json(&json!({"workspaceId": 1, "noteId": 2, "notePublicId": "n_2"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        status,
        json!({"workspaceId": 1, "noteId": 2, "notePublicId": "n_2", "connections": 0})
    );

    let response = http
        .post(format!("http://{}/api/collab/save", addr))
        .json(&json!({"workspaceId": 1, "noteId": 2, "notePublicId": "n_2", "includeBlame": true}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let saved: Value = response.json().await.unwrap();
    assert_eq!(saved["ok"], true);
    assert_eq!(saved["noteId"], 2);

    state.shutdown.trigger();
    server.abort();
}
