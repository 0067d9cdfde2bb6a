//! Message intake endpoint.
//!
//! Short-lived POST that forwards a client message into its session's inbound
//! channel and acknowledges immediately. The RPC result is delivered
//! asynchronously on the session's stream, never in this response.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::mpsc::error::TrySendError;

use timegate_core::error::{Result, TimeGateError};

use crate::app_state::AppState;
use crate::session::{self, SessionRegistry};

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    #[serde(default)]
    pub session_id: Option<String>,
}

pub async fn post_message(
    State(app): State<AppState>,
    Query(query): Query<MessageQuery>,
    headers: HeaderMap,
    Json(frame): Json<Value>,
) -> Response {
    if let Err(e) = app.gate().authorize(&headers) {
        return super::error_response(e);
    }
    match intake(&app.registry(), query.session_id.as_deref(), frame) {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) => super::error_response(e),
    }
}

/// Validate the identifier, look the session up, and enqueue without blocking.
pub fn intake(
    registry: &SessionRegistry,
    session_id: Option<&str>,
    frame: Value,
) -> Result<()> {
    // Malformed addressing is rejected before the registry is touched.
    let session_id = session_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| TimeGateError::BadRequest("missing session_id".into()))?;
    if !session::is_valid_session_id(session_id) {
        return Err(TimeGateError::BadRequest(format!(
            "malformed session_id: {session_id}"
        )));
    }

    let entry = registry
        .lookup(session_id)
        .ok_or_else(|| TimeGateError::SessionNotFound(session_id.to_string()))?;

    match entry.inbound.try_send(frame) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => Err(TimeGateError::Overloaded(session_id.to_string())),
        // A closed inbound channel means the relay is mid-teardown; to the
        // client that session is already gone.
        Err(TrySendError::Closed(_)) => {
            Err(TimeGateError::SessionNotFound(session_id.to_string()))
        }
    }
}
