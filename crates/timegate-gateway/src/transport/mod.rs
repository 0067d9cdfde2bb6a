//! HTTP transport: the long-lived SSE stream, the message intake endpoint,
//! and the per-session heartbeat.

pub mod heartbeat;
pub mod messages;
pub mod sse;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use timegate_core::error::{ClientCode, TimeGateError};

fn status_for(code: ClientCode) -> StatusCode {
    match code {
        ClientCode::BadRequest => StatusCode::BAD_REQUEST,
        ClientCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ClientCode::SessionNotFound => StatusCode::NOT_FOUND,
        ClientCode::Overloaded => StatusCode::SERVICE_UNAVAILABLE,
        ClientCode::DuplicateSession | ClientCode::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Map an error to its HTTP rejection (stable code string + message).
pub fn error_response(err: TimeGateError) -> Response {
    let code = err.client_code();
    (
        status_for(code),
        Json(json!({ "error": code.as_str(), "message": err.to_string() })),
    )
        .into_response()
}
