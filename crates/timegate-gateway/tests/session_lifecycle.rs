#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

//! Relay lifecycle, driven through the same entry point the SSE handler
//! spawns: setup frame ordering, heartbeat cadence, intake routing, and
//! disconnect-triggered cleanup.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

use timegate_gateway::dispatch::{CallContext, Dispatcher};
use timegate_gateway::services::TimeService;
use timegate_gateway::session::{self, SessionEntry, SessionRegistry};
use timegate_gateway::transport::messages::intake;
use timegate_gateway::transport::sse::{run_relay, StreamFrame};

const FAST_HEARTBEAT: Duration = Duration::from_millis(40);
// Long enough that no keepalive can interleave with the frames under test.
const SLOW_HEARTBEAT: Duration = Duration::from_secs(60);

fn dispatcher() -> Arc<Dispatcher> {
    let d = Dispatcher::new();
    d.register(Arc::new(TimeService::new()));
    Arc::new(d)
}

/// Register a session and spawn its relay, exactly as the SSE handler does.
fn open_session(
    registry: &Arc<SessionRegistry>,
    heartbeat: Duration,
) -> (String, mpsc::Receiver<StreamFrame>) {
    let session_id = session::new_session_id();
    let (inbound_tx, inbound_rx) = mpsc::channel::<Value>(8);
    registry
        .insert(&session_id, SessionEntry::new(inbound_tx, "mcp-client"))
        .unwrap();

    let (stream_tx, stream_rx) = mpsc::channel::<StreamFrame>(8);
    let ctx = CallContext::new(session_id.clone(), "mcp-client", "UTC");
    let endpoint = format!("/mcp/messages/?session_id={session_id}");

    tokio::spawn(run_relay(
        Arc::clone(registry),
        dispatcher(),
        ctx,
        inbound_rx,
        stream_tx,
        endpoint,
        heartbeat,
    ));

    (session_id, stream_rx)
}

async fn next_frame(rx: &mut mpsc::Receiver<StreamFrame>, within: Duration) -> StreamFrame {
    timeout(within, rx.recv())
        .await
        .expect("timed out waiting for frame")
        .expect("stream closed unexpectedly")
}

async fn wait_for_removal(registry: &SessionRegistry, session_id: &str) {
    for _ in 0..100 {
        if !registry.contains(session_id) {
            return;
        }
        sleep(Duration::from_millis(10)).await;
    }
    panic!("session {session_id} was never removed");
}

#[tokio::test]
async fn endpoint_frame_is_written_first() {
    let registry = Arc::new(SessionRegistry::new());
    let (session_id, mut rx) = open_session(&registry, SLOW_HEARTBEAT);

    match next_frame(&mut rx, Duration::from_secs(1)).await {
        StreamFrame::Endpoint(url) => {
            assert!(url.contains(&session_id));
            assert!(url.starts_with("/mcp/messages/"));
        }
        other => panic!("expected endpoint frame first, got {other:?}"),
    }
}

#[tokio::test]
async fn heartbeat_fires_with_no_application_traffic() {
    let registry = Arc::new(SessionRegistry::new());
    let (_session_id, mut rx) = open_session(&registry, FAST_HEARTBEAT);

    // setup frame, then a keepalive within one interval (plus jitter allowance)
    assert!(matches!(
        next_frame(&mut rx, Duration::from_secs(1)).await,
        StreamFrame::Endpoint(_)
    ));
    assert!(matches!(
        next_frame(&mut rx, FAST_HEARTBEAT * 4).await,
        StreamFrame::Keepalive
    ));
    // and it keeps coming
    assert!(matches!(
        next_frame(&mut rx, FAST_HEARTBEAT * 4).await,
        StreamFrame::Keepalive
    ));
}

#[tokio::test]
async fn posted_request_yields_result_frame_before_any_heartbeat() {
    let registry = Arc::new(SessionRegistry::new());
    let (session_id, mut rx) = open_session(&registry, SLOW_HEARTBEAT);
    assert!(matches!(
        next_frame(&mut rx, Duration::from_secs(1)).await,
        StreamFrame::Endpoint(_)
    ));

    let request = json!({ "jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {} });
    intake(&registry, Some(session_id.as_str()), request).unwrap();

    match next_frame(&mut rx, Duration::from_secs(1)).await {
        StreamFrame::Message(resp) => {
            assert_eq!(resp["id"], 1);
            assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
        }
        other => panic!("expected message frame, got {other:?}"),
    }
}

#[tokio::test]
async fn disconnect_removes_the_session_exactly_once() {
    let registry = Arc::new(SessionRegistry::new());
    let (session_id, mut rx) = open_session(&registry, SLOW_HEARTBEAT);
    assert!(matches!(
        next_frame(&mut rx, Duration::from_secs(1)).await,
        StreamFrame::Endpoint(_)
    ));
    assert!(registry.contains(&session_id));

    // Client disconnect: the SSE body (receiver) is dropped.
    drop(rx);
    wait_for_removal(&registry, &session_id).await;

    // A racing second teardown observes "already removed" and is a no-op.
    assert!(registry.remove(&session_id).is_none());

    // A subsequent post addresses a dead session.
    let err = intake(
        &registry,
        Some(session_id.as_str()),
        json!({ "jsonrpc": "2.0", "id": 2, "method": "ping" }),
    )
    .unwrap_err();
    assert_eq!(err.client_code().as_str(), "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn unknown_session_post_never_blocks() {
    let registry = Arc::new(SessionRegistry::new());
    let ghost = session::new_session_id();

    let result = timeout(Duration::from_millis(100), async {
        intake(&registry, Some(ghost.as_str()), json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" }))
    })
    .await
    .expect("intake must not block");
    assert_eq!(
        result.unwrap_err().client_code().as_str(),
        "SESSION_NOT_FOUND"
    );
}

#[tokio::test]
async fn malformed_session_id_is_rejected_before_lookup() {
    let registry = Arc::new(SessionRegistry::new());
    let frame = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" });

    let missing = intake(&registry, None, frame.clone()).unwrap_err();
    assert_eq!(missing.client_code().as_str(), "BAD_REQUEST");

    let malformed = intake(&registry, Some("not-a-session"), frame).unwrap_err();
    assert_eq!(malformed.client_code().as_str(), "BAD_REQUEST");
}

#[tokio::test]
async fn saturated_inbound_queue_rejects_without_blocking() {
    // No relay draining this session: a capacity-1 queue fills immediately.
    let registry = SessionRegistry::new();
    let session_id = session::new_session_id();
    let (inbound_tx, _inbound_rx) = mpsc::channel::<Value>(1);
    registry
        .insert(&session_id, SessionEntry::new(inbound_tx, "mcp-client"))
        .unwrap();

    let frame = json!({ "jsonrpc": "2.0", "id": 1, "method": "ping" });
    intake(&registry, Some(session_id.as_str()), frame.clone()).unwrap();
    let err = intake(&registry, Some(session_id.as_str()), frame).unwrap_err();
    assert_eq!(err.client_code().as_str(), "OVERLOADED");
}

#[tokio::test]
async fn concurrent_sessions_are_isolated() {
    let registry = Arc::new(SessionRegistry::new());
    let (id_a, mut rx_a) = open_session(&registry, SLOW_HEARTBEAT);
    let (id_b, mut rx_b) = open_session(&registry, SLOW_HEARTBEAT);
    assert_ne!(id_a, id_b);

    assert!(matches!(
        next_frame(&mut rx_a, Duration::from_secs(1)).await,
        StreamFrame::Endpoint(_)
    ));
    assert!(matches!(
        next_frame(&mut rx_b, Duration::from_secs(1)).await,
        StreamFrame::Endpoint(_)
    ));

    // Traffic addressed to A must only surface on A's stream.
    intake(
        &registry,
        Some(id_a.as_str()),
        json!({ "jsonrpc": "2.0", "id": 10, "method": "ping" }),
    )
    .unwrap();
    assert!(matches!(
        next_frame(&mut rx_a, Duration::from_secs(1)).await,
        StreamFrame::Message(_)
    ));
    assert!(
        timeout(Duration::from_millis(100), rx_b.recv()).await.is_err(),
        "session B observed session A's frame"
    );

    // A's teardown must not disturb B's registry entry.
    drop(rx_a);
    wait_for_removal(&registry, &id_a).await;
    assert!(registry.contains(&id_b));
}
