/**
 * Live Update Subscription Handler
 *
 * `GET /api/workspaces/{workspace_id}/events` opens a live update stream
 * for a signed-in user.
 *
 * # Example Response
 *
 * ```http
 * HTTP/1.1 200 OK
 * Content-Type: text/event-stream
 * Cache-Control: no-cache, no-transform
 * Connection: keep-alive
 * X-Accel-Buffering: no
 *
 * event: ready
 * data: {"ok":true}
 *
 * event: note.created
 * data: {"id":12,"publicId":"n_x1","name":"todo","title":"Todo","folderId":null}
 *
 * : ping
 * ```
 *
 * The connection closing is the only error signal a client ever gets.
 */

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::{
        header::{CACHE_CONTROL, CONNECTION},
        StatusCode,
    },
    response::{
        sse::{Event, Sse},
        IntoResponse,
    },
};
use futures_util::StreamExt;

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::stream::LiveUpdateStream;
use crate::backend::server::state::AppState;

/// Handle live update subscription (GET /api/workspaces/{workspace_id}/events)
///
/// `Sse` sets `Content-Type: text/event-stream`; the extra headers keep
/// proxies from caching or buffering the stream. No keep-alive is attached:
/// the stream paces its own `: ping` heartbeat.
///
/// # Errors
///
/// * `400 Bad Request` - workspace id is not a positive integer
/// * `401 Unauthorized` - no signed-in user
pub async fn handle_workspace_events(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(workspace_id): Path<String>,
) -> Result<impl IntoResponse, BackendError> {
    let workspace_id = workspace_id
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| BackendError::handler(StatusCode::BAD_REQUEST, "Invalid workspace id"))?;

    tracing::info!(
        "[LiveStream] User {} subscribing to workspace {}",
        user.user_id,
        workspace_id
    );

    let stream = LiveUpdateStream::open(
        &app_state.hub,
        workspace_id,
        app_state.config.heartbeat_interval,
        app_state.shutdown.signal(),
    );
    let events = stream.map(|frame| Ok::<_, Infallible>(Event::from(frame)));

    Ok((
        [
            (CACHE_CONTROL, "no-cache, no-transform"),
            (CONNECTION, "keep-alive"),
        ],
        [("x-accel-buffering", "no")],
        Sse::new(events),
    ))
}
