/**
 * Live Update Stream
 *
 * One long-lived, server-to-client text stream per connected client and
 * workspace. The stream subscribes to the workspace event hub when it opens
 * and yields `Frame`s, which the HTTP handler turns into axum SSE events:
 *
 * ```text
 * event: ready
 * data: {"ok":true}
 *
 * event: note.created
 * data: {...}
 *
 * : ping
 * ```
 *
 * # Lifecycle
 *
 * `Open` -> `Closing` -> `Closed`. The stream leaves `Open` when the client
 * goes away (the body stream is dropped), when a server-side handle cancels
 * it, or when server shutdown is signalled. Whichever happens first runs the
 * cleanup: the hub subscription is released and the frame pump stops, which
 * also stops the heartbeat. Later triggers are no-ops.
 *
 * Events reach the pump through an unbounded channel, so a publisher never
 * waits for a slow client.
 */

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::Duration;

use axum::response::sse::Event;
use futures_util::stream::{self, Stream};
use tokio::sync::{mpsc, Notify};
use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

use crate::backend::realtime::hub::{Subscription, WorkspaceEventHub};
use crate::backend::server::shutdown::ShutdownSignal;
use crate::shared::{EventType, WorkspaceEvent};

/// Default spacing of `: ping` comment frames
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Lifecycle state of a live update stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Open,
    Closing,
    Closed,
}

/// A single frame written to the client
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// `event: <type>` followed by `data: <json>`
    Event { event_type: EventType, data: String },
    /// `: ping` comment line
    Heartbeat,
}

impl Frame {
    /// Serialize a hub event into a frame
    pub fn from_event(event: &WorkspaceEvent) -> Result<Self, serde_json::Error> {
        Ok(Frame::Event {
            event_type: event.event_type.clone(),
            data: serde_json::to_string(&event.data)?,
        })
    }
}

impl From<Frame> for Event {
    fn from(frame: Frame) -> Self {
        match frame {
            Frame::Event { event_type, data } => {
                // axum refuses event names containing line breaks
                let name = event_type.as_str().replace(['\r', '\n'], "");
                Event::default().event(name).data(data)
            }
            Frame::Heartbeat => Event::default().comment("ping"),
        }
    }
}

struct StreamShared {
    workspace_id: i64,
    state: Mutex<StreamState>,
    subscription: Subscription,
    wake: Notify,
}

impl StreamShared {
    fn state(&self) -> MutexGuard<'_, StreamState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_open(&self) -> bool {
        *self.state() == StreamState::Open
    }

    /// Run cleanup if the stream is still open. Returns whether this call did it.
    fn close(&self, reason: &str) -> bool {
        {
            let mut state = self.state();
            if *state != StreamState::Open {
                return false;
            }
            *state = StreamState::Closing;
        }

        self.subscription.unsubscribe();
        *self.state() = StreamState::Closed;
        self.wake.notify_one();

        tracing::info!(
            "[LiveStream] Closed stream for workspace {} ({})",
            self.workspace_id,
            reason
        );
        true
    }
}

/// Server-side handle onto a live stream
#[derive(Clone)]
pub struct LiveStreamHandle {
    shared: Arc<StreamShared>,
}

impl LiveStreamHandle {
    /// Cancel the stream. Only the first call returns `true`.
    pub fn cancel(&self) -> bool {
        self.shared.close("cancelled")
    }

    pub fn state(&self) -> StreamState {
        *self.shared.state()
    }

    pub fn workspace_id(&self) -> i64 {
        self.shared.workspace_id
    }
}

impl std::fmt::Debug for LiveStreamHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveStreamHandle")
            .field("workspace_id", &self.shared.workspace_id)
            .field("state", &self.state())
            .finish()
    }
}

struct Pump {
    shared: Arc<StreamShared>,
    events: mpsc::UnboundedReceiver<Arc<WorkspaceEvent>>,
    heartbeat: Interval,
    shutdown: ShutdownSignal,
    ready_sent: bool,
}

/// Live update stream for one client and workspace
///
/// Implements `Stream<Item = Frame>`. Dropping it counts as the client
/// aborting.
pub struct LiveUpdateStream {
    frames: Pin<Box<dyn Stream<Item = Frame> + Send>>,
    handle: LiveStreamHandle,
}

impl LiveUpdateStream {
    /// Subscribe to `workspace_id` and start the stream
    ///
    /// The hub subscription is taken immediately, so events published after
    /// this call are delivered after the `ready` frame. A zero heartbeat
    /// interval falls back to `DEFAULT_HEARTBEAT_INTERVAL`.
    pub fn open(
        hub: &WorkspaceEventHub,
        workspace_id: i64,
        heartbeat_interval: Duration,
        shutdown: ShutdownSignal,
    ) -> Self {
        let heartbeat_interval = if heartbeat_interval.is_zero() {
            tracing::warn!(
                "[LiveStream] Zero heartbeat interval, using {:?}",
                DEFAULT_HEARTBEAT_INTERVAL
            );
            DEFAULT_HEARTBEAT_INTERVAL
        } else {
            heartbeat_interval
        };

        let (tx, rx) = mpsc::unbounded_channel::<Arc<WorkspaceEvent>>();
        let subscription = hub.subscribe(workspace_id, move |event| {
            // Receiver gone means the stream is closing
            let _ = tx.send(event);
        });

        let shared = Arc::new(StreamShared {
            workspace_id,
            state: Mutex::new(StreamState::Open),
            subscription,
            wake: Notify::new(),
        });

        let mut heartbeat = interval_at(Instant::now() + heartbeat_interval, heartbeat_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let pump = Pump {
            shared: Arc::clone(&shared),
            events: rx,
            heartbeat,
            shutdown,
            ready_sent: false,
        };

        tracing::info!("[LiveStream] Opened stream for workspace {}", workspace_id);

        Self {
            frames: Box::pin(stream::unfold(pump, next_frame)),
            handle: LiveStreamHandle { shared },
        }
    }

    pub fn handle(&self) -> LiveStreamHandle {
        self.handle.clone()
    }

    pub fn state(&self) -> StreamState {
        self.handle.state()
    }
}

async fn next_frame(mut pump: Pump) -> Option<(Frame, Pump)> {
    if !pump.shared.is_open() {
        return None;
    }

    if !pump.ready_sent {
        pump.ready_sent = true;
        let ready = WorkspaceEvent::ready(pump.shared.workspace_id);
        if let Ok(frame) = Frame::from_event(&ready) {
            return Some((frame, pump));
        }
    }

    loop {
        if !pump.shared.is_open() {
            return None;
        }

        tokio::select! {
            biased;

            _ = pump.shared.wake.notified() => continue,
            _ = pump.shutdown.wait() => {
                pump.shared.close("server shutdown");
                return None;
            }
            event = pump.events.recv() => match event {
                Some(event) => match Frame::from_event(&event) {
                    Ok(frame) => return Some((frame, pump)),
                    Err(e) => {
                        tracing::error!(
                            "[LiveStream] Failed to serialize {} event: {:?}",
                            event.event_type,
                            e
                        );
                        continue;
                    }
                },
                None => {
                    pump.shared.close("hub subscription ended");
                    return None;
                }
            },
            _ = pump.heartbeat.tick() => return Some((Frame::Heartbeat, pump)),
        }
    }
}

impl Stream for LiveUpdateStream {
    type Item = Frame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().frames.as_mut().poll_next(cx)
    }
}

impl Drop for LiveUpdateStream {
    fn drop(&mut self) {
        self.handle.shared.close("client disconnected");
    }
}
