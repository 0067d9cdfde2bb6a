//! Axum router wiring.
//!
//! Mounts the stream and message endpoints under the configured URL prefix,
//! plus a bare liveness probe.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;

use crate::{app_state::AppState, transport};

pub fn build_router(state: AppState) -> Router {
    let prefix = state.cfg().path.clone();
    Router::new()
        .route(&format!("{prefix}/sse"), get(transport::sse::sse_handler))
        .route(
            &format!("{prefix}/messages/"),
            post(transport::messages::post_message),
        )
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
