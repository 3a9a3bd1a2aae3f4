//! End-to-end: real WebSocket clients on a live collaboration service

use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use kontexted_collab::backend::auth::{EDIT_SESSION_TOKEN_TTL_SECS, ONE_SHOT_TOKEN_TTL_SECS};
use kontexted_collab::backend::server::AppState;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::common::{grant, serve_live, test_config};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const WAIT: Duration = Duration::from_secs(5);

async fn connect(addr: SocketAddr, state: &AppState, workspace_id: i64, note_id: i64) -> Client {
    let minted = state
        .tokens
        .mint(&grant(workspace_id, note_id), EDIT_SESSION_TOKEN_TTL_SECS)
        .unwrap();
    let (client, _) = connect_async(format!("ws://{}/collab?token={}", addr, minted.token))
        .await
        .expect("upgrade accepted");
    client
}

/// Connection count the collaboration service reports over HTTP
async fn connections(addr: SocketAddr, state: &AppState, workspace_id: i64, note_id: i64) -> i64 {
    let minted = state
        .tokens
        .mint(&grant(workspace_id, note_id), ONE_SHOT_TOKEN_TTL_SECS)
        .unwrap();
    let status: Value = reqwest::Client::new()
        .post(format!("http://{}/api/status", addr))
        .bearer_auth(minted.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    status["connections"].as_i64().expect("connections count")
}

async fn wait_for_connections(addr: SocketAddr, state: &AppState, note_id: i64, expected: i64) {
    let settled = tokio::time::timeout(WAIT, async {
        while connections(addr, state, 4, note_id).await != expected {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    assert!(settled.is_ok(), "note {} never reached {} connections", note_id, expected);
}

/// Next data frame, skipping control frames
async fn next_data(client: &mut Client) -> Bytes {
    tokio::time::timeout(WAIT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Binary(data))) => return data,
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("unexpected frame {:?}", other),
            }
        }
    })
    .await
    .expect("data frame before timeout")
}

async fn assert_silent(client: &mut Client) {
    let frame = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(frame.is_err(), "expected no frame, got {:?}", frame);
}

#[tokio::test]
async fn test_relay_between_editors_of_one_note() {
    let (addr, state, server) = serve_live(test_config()).await;

    let mut alice = connect(addr, &state, 4, 40).await;
    let mut bob = connect(addr, &state, 4, 40).await;
    let mut carol = connect(addr, &state, 4, 41).await;
    wait_for_connections(addr, &state, 40, 2).await;
    wait_for_connections(addr, &state, 41, 1).await;

    alice
        .send(Message::binary(Bytes::from_static(b"update-1")))
        .await
        .unwrap();
    assert_eq!(next_data(&mut bob).await, Bytes::from_static(b"update-1"));
    assert_silent(&mut alice).await;
    assert_silent(&mut carol).await;

    // Text frames are relayed as bytes
    bob.send(Message::text("hello")).await.unwrap();
    assert_eq!(next_data(&mut alice).await, Bytes::from_static(b"hello"));

    state.shutdown.trigger();
    server.abort();
}

#[tokio::test]
async fn test_closing_client_is_detached() {
    let (addr, state, server) = serve_live(test_config()).await;

    let mut alice = connect(addr, &state, 4, 50).await;
    let bob = connect(addr, &state, 4, 50).await;
    wait_for_connections(addr, &state, 50, 2).await;

    alice.close(None).await.unwrap();
    wait_for_connections(addr, &state, 50, 1).await;

    // A peer vanishing without a close handshake is detached as well
    drop(bob);
    wait_for_connections(addr, &state, 50, 0).await;

    server.abort();
}

#[tokio::test]
async fn test_keepalive_pings_open_sockets() {
    let (addr, state, server) =
        serve_live(test_config().keepalive_interval(Duration::from_millis(50))).await;

    let mut client = connect(addr, &state, 4, 60).await;
    let frame = tokio::time::timeout(WAIT, client.next())
        .await
        .expect("ping before timeout");
    assert!(matches!(frame, Some(Ok(Message::Ping(_)))), "got {:?}", frame);

    server.abort();
}
