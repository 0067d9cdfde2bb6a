use std::time::Duration;

use serde::Deserialize;
use timegate_core::error::{Result, TimeGateError};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Bearer secret accepted by the token gate.
    pub token: String,

    /// URL prefix the stream and message routes mount under.
    #[serde(default = "default_path")]
    pub path: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Keepalive interval for open streams, in seconds.
    #[serde(default = "default_heartbeat_interval_secs")]
    pub heartbeat_interval_secs: u64,

    /// Capacity of each session's inbound and outbound queues.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(TimeGateError::BadRequest("token must not be empty".into()));
        }
        if !self.path.starts_with('/') {
            return Err(TimeGateError::BadRequest(
                "path must start with '/'".into(),
            ));
        }
        if self.path.len() > 1 && self.path.ends_with('/') {
            return Err(TimeGateError::BadRequest(
                "path must not end with '/'".into(),
            ));
        }
        if !(1..=120).contains(&self.heartbeat_interval_secs) {
            return Err(TimeGateError::BadRequest(
                "heartbeat_interval_secs must be between 1 and 120".into(),
            ));
        }
        if self.channel_capacity == 0 {
            return Err(TimeGateError::BadRequest(
                "channel_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_secs(self.heartbeat_interval_secs)
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_path() -> String {
    "/mcp".into()
}
fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8000
}
fn default_heartbeat_interval_secs() -> u64 {
    15
}
fn default_channel_capacity() -> usize {
    64
}
