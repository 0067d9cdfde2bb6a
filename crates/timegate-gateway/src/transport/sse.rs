//! SSE stream handler.
//!
//! Responsibilities:
//! - Authorize before any session state exists
//! - Register a fresh session id (a collision is an internal fault, never an
//!   overwrite)
//! - First frame: `endpoint` event telling the client where to POST messages
//!   for this session
//! - Relay loop: dispatch results and heartbeats onto one stream, in the order
//!   they became ready
//! - Teardown exactly once, on every exit path, via a drop guard

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use serde_json::Value;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::app_state::AppState;
use crate::dispatch::{CallContext, Dispatcher};
use crate::session::{self, SessionEntry, SessionRegistry};
use crate::transport::heartbeat::HeartbeatTicker;

const TIMEZONE_HEADER: &str = "x-timezone";
const DEFAULT_TIMEZONE: &str = "UTC";

/// One frame on a session's outbound stream. Converted to an SSE event only
/// at the transport edge so the relay stays inspectable.
#[derive(Debug)]
pub enum StreamFrame {
    /// Stream setup: where to POST messages for this session.
    Endpoint(String),
    /// A dispatched JSON-RPC response.
    Message(Value),
    /// Content-free keepalive.
    Keepalive,
}

impl StreamFrame {
    fn into_event(self) -> Event {
        match self {
            // Compact JSON never contains a raw newline, which SSE data must not.
            StreamFrame::Message(v) => Event::default().event("message").data(v.to_string()),
            StreamFrame::Endpoint(url) => Event::default().event("endpoint").data(url),
            StreamFrame::Keepalive => Event::default().comment("ping"),
        }
    }
}

pub async fn sse_handler(State(app): State<AppState>, headers: HeaderMap) -> Response {
    // Authorization precedes registration: a rejected credential leaves no
    // trace in the registry.
    let identity = match app.gate().authorize(&headers) {
        Ok(identity) => identity,
        Err(e) => return super::error_response(e),
    };

    // Call context for the RPC handler; the transport does not interpret it.
    let timezone = headers
        .get(TIMEZONE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_TIMEZONE)
        .to_string();

    let session_id = session::new_session_id();
    let capacity = app.cfg().channel_capacity;
    let (inbound_tx, inbound_rx) = mpsc::channel::<Value>(capacity);

    if let Err(e) = app.registry().insert(
        &session_id,
        SessionEntry::new(inbound_tx, identity.client_id.clone()),
    ) {
        tracing::error!(%session_id, "session id collision on insert");
        return super::error_response(e);
    }

    let (stream_tx, stream_rx) = mpsc::channel::<StreamFrame>(capacity);
    let ctx = CallContext::new(session_id.clone(), identity.client_id, timezone);
    let endpoint = format!("{}/messages/?session_id={}", app.cfg().path, session_id);

    tracing::info!(%session_id, client_id = %ctx.client_id(), "session opened");

    tokio::spawn(run_relay(
        app.registry(),
        app.dispatcher(),
        ctx,
        inbound_rx,
        stream_tx,
        endpoint,
        app.cfg().heartbeat_interval(),
    ));

    let stream = ReceiverStream::new(stream_rx).map(|f| Ok::<_, Infallible>(f.into_event()));
    Sse::new(stream).into_response()
}

/// Relay loop for one session.
///
/// Owns the inbound receiver and the heartbeat ticker. The registry entry is
/// released exactly once by `SessionGuard`, on every exit path: clean
/// disconnect, write failure, or cancellation of the task itself.
pub async fn run_relay(
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<Dispatcher>,
    ctx: CallContext,
    mut inbound_rx: mpsc::Receiver<Value>,
    stream_tx: mpsc::Sender<StreamFrame>,
    endpoint: String,
    heartbeat_every: Duration,
) {
    let _guard = SessionGuard {
        registry,
        session_id: ctx.session_id().to_string(),
    };

    // The client cannot address this session until it learns the message URL.
    if stream_tx.send(StreamFrame::Endpoint(endpoint)).await.is_err() {
        // Client went away before setup finished; guard cleans up.
        return;
    }

    let mut heartbeat = HeartbeatTicker::new(heartbeat_every);

    loop {
        tokio::select! {
            maybe = inbound_rx.recv() => {
                // The sender half lives in the registry entry; `None` means
                // the entry is gone and nothing further can arrive.
                let Some(frame) = maybe else { break };
                let Some(response) = dispatcher.dispatch(ctx.clone(), frame).await else {
                    continue;
                };
                if stream_tx.send(StreamFrame::Message(response)).await.is_err() {
                    tracing::debug!(session_id = %ctx.session_id(), "stream write failed, tearing down");
                    break;
                }
            }

            _ = heartbeat.tick() => {
                // Never block the relay on a saturated stream; a dropped tick
                // is acceptable, a stalled session is not.
                match stream_tx.try_send(StreamFrame::Keepalive) {
                    Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => {}
                    Err(mpsc::error::TrySendError::Closed(_)) => break,
                }
            }

            _ = stream_tx.closed() => {
                // Connection-closed signal: the SSE body (and with it the
                // stream receiver) was dropped.
                break;
            }
        }
    }
}

/// Removes this connection's own session id from the registry, exactly once.
///
/// Drop-based so teardown also runs when the relay task is cancelled or
/// unwinds. Removal is idempotent; if a racing path already removed the entry
/// this observes "already removed" and stays silent.
struct SessionGuard {
    registry: Arc<SessionRegistry>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(entry) = self.registry.remove(&self.session_id) {
            tracing::info!(
                session_id = %self.session_id,
                open_for_ms = entry.created_at.elapsed().as_millis() as u64,
                "session closed"
            );
        } else {
            tracing::debug!(session_id = %self.session_id, "session already removed");
        }
    }
}
