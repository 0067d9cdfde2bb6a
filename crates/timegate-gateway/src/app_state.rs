//! Shared application state for the timegate gateway.
//!
//! Wires the token gate, session registry, and dispatcher (with the built-in
//! time tool registered) behind one cloneable handle.

use std::sync::Arc;

use crate::auth::TokenGate;
use crate::config::GatewayConfig;
use crate::dispatch::Dispatcher;
use crate::services::TimeService;
use crate::session::SessionRegistry;

/// Identity metadata attached to the configured token, matching the
/// original deployment's single static client.
const DEFAULT_CLIENT_ID: &str = "mcp-client";

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    registry: Arc<SessionRegistry>,
    dispatcher: Arc<Dispatcher>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    gate: TokenGate,
}

impl AppState {
    pub fn new(cfg: GatewayConfig) -> Self {
        let gate = TokenGate::single(cfg.token.clone(), DEFAULT_CLIENT_ID);

        let dispatcher = Dispatcher::new();
        dispatcher.register(Arc::new(TimeService::new()));
        tracing::info!(tools = ?dispatcher.registered_tools(), "dispatcher ready");

        Self {
            inner: Arc::new(AppStateInner { cfg, gate }),
            registry: Arc::new(SessionRegistry::new()),
            dispatcher: Arc::new(dispatcher),
        }
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn gate(&self) -> &TokenGate {
        &self.inner.gate
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }
}
