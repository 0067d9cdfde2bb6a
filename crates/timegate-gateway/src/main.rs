//! timegate gateway binary.
//!
//! Thin bootstrap: tracing init, config load, bind, serve. Everything with
//! behavior lives in the library modules.

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use timegate_gateway::{app_state, config, router};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.json".to_string());
    let cfg = config::load_from_file(&config_path).expect("config load failed");

    let listen: SocketAddr = cfg
        .listen_addr()
        .parse()
        .expect("host/port must form a valid SocketAddr");

    let state = app_state::AppState::new(cfg);
    let app = router::build_router(state);

    tracing::info!(%listen, "timegate-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .expect("failed to bind");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
