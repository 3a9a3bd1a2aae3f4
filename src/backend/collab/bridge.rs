/**
 * WebSocket Bridge
 *
 * Drives one upgraded axum WebSocket on behalf of a `SocketAdapter`:
 *
 * - a writer task drains the outbound queue the adapter's sends feed
 * - the connection task reads inbound frames and emits them on the adapter
 *   as `message`, `pong`, `close` or `error`
 * - a keepalive calls `ping()` on the adapter while the socket is open
 */

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{CloseFrame, Message, WebSocket};
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::backend::auth::CollabClaims;
use crate::backend::collab::engine::{CollabEngine, CollabSession};
use crate::backend::collab::socket::{RawSocket, ReadyState, SocketAdapter, SocketError, SocketEvent};
use crate::shared::config::DEFAULT_KEEPALIVE_SECS;

/// Spacing of keepalive pings on collaboration sockets
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(DEFAULT_KEEPALIVE_SECS);

/// How long the writer may keep flushing after the peer is gone
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Normal closure
const CLOSE_NORMAL: u16 = 1000;

/// `RawSocket` over the outbound half of an axum WebSocket
#[derive(Debug)]
pub struct AxumSocket {
    state: Arc<AtomicU8>,
    outbound: mpsc::UnboundedSender<Message>,
}

impl AxumSocket {
    fn new(state: Arc<AtomicU8>, outbound: mpsc::UnboundedSender<Message>) -> Self {
        Self { state, outbound }
    }

    fn enqueue(&self, message: Message) -> Result<(), SocketError> {
        self.outbound
            .send(message)
            .map_err(|_| SocketError::Transport("writer stopped".to_string()))
    }
}

impl RawSocket for AxumSocket {
    fn ready_state(&self) -> ReadyState {
        ReadyState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn send(&self, data: Bytes) -> Result<(), SocketError> {
        if !self.ready_state().is_open() {
            return Err(SocketError::NotOpen);
        }
        self.enqueue(Message::Binary(data))
    }

    fn close(&self, code: Option<u16>, reason: Option<&str>) -> Result<(), SocketError> {
        let previous = self.state.compare_exchange(
            ReadyState::Open as u8,
            ReadyState::Closing as u8,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        if previous.is_err() {
            return Ok(());
        }

        let frame = CloseFrame {
            code: code.unwrap_or(CLOSE_NORMAL),
            reason: reason.unwrap_or_default().to_string().into(),
        };
        self.enqueue(Message::Close(Some(frame)))
    }

    fn ping(&self) -> Option<Result<(), SocketError>> {
        Some(self.enqueue(Message::Ping(Bytes::new())))
    }
}

/// Wrap an upgraded WebSocket, attach it to `engine` and run it to completion
///
/// A zero `keepalive` falls back to `KEEPALIVE_INTERVAL`.
pub async fn serve_socket(
    socket: WebSocket,
    claims: CollabClaims,
    engine: Arc<dyn CollabEngine>,
    keepalive: Duration,
) {
    let (mut sink, mut inbound) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let state = Arc::new(AtomicU8::new(ReadyState::Open as u8));
    let adapter = Arc::new(SocketAdapter::new(Arc::new(AxumSocket::new(state.clone(), tx))));
    let connection_id = adapter.id();

    let mut writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let closing = matches!(message, Message::Close(_));
            if let Err(e) = sink.send(message).await {
                tracing::debug!("[Collab] Write to {} failed: {:?}", connection_id, e);
                break;
            }
            if closing {
                break;
            }
        }
        let _ = sink.close().await;
    });

    tracing::info!(
        "[Collab] Connection {} opened for note {} by user {}",
        connection_id,
        claims.note_id,
        claims.user_id
    );
    engine.attach(CollabSession {
        claims,
        socket: adapter.clone(),
    });

    let keepalive = if keepalive.is_zero() { KEEPALIVE_INTERVAL } else { keepalive };
    let mut ticker = interval_at(Instant::now() + keepalive, keepalive);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let close_event = loop {
        tokio::select! {
            frame = inbound.next() => match frame {
                Some(Ok(Message::Binary(data))) => adapter.emit(SocketEvent::Message(data)),
                Some(Ok(Message::Text(text))) => {
                    adapter.emit(SocketEvent::Message(Bytes::copy_from_slice(text.as_str().as_bytes())))
                }
                Some(Ok(Message::Pong(data))) => adapter.emit(SocketEvent::Pong(data)),
                // Pings are answered by the protocol layer
                Some(Ok(Message::Ping(_))) => {}
                Some(Ok(Message::Close(frame))) => {
                    break match frame {
                        Some(frame) => SocketEvent::Close {
                            code: Some(frame.code),
                            reason: frame.reason.as_str().to_string(),
                        },
                        None => SocketEvent::Close { code: None, reason: String::new() },
                    };
                }
                Some(Err(e)) => {
                    state.store(ReadyState::Closed as u8, Ordering::SeqCst);
                    adapter.emit(SocketEvent::Error(SocketError::Transport(e.to_string())));
                    break SocketEvent::Close { code: None, reason: String::new() };
                }
                None => break SocketEvent::Close { code: None, reason: String::new() },
            },
            _ = ticker.tick() => {
                if adapter.ready_state().is_open() {
                    adapter.ping();
                }
            }
        }
    };

    state.store(ReadyState::Closed as u8, Ordering::SeqCst);
    adapter.emit(close_event);
    drop(adapter);

    if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut writer).await.is_err() {
        writer.abort();
    }
    tracing::info!("[Collab] Connection {} closed", connection_id);
}
