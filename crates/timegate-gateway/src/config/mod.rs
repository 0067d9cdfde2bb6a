//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use timegate_core::error::{Result, TimeGateError};

pub use schema::GatewayConfig;

pub fn load_from_file(path: &str) -> Result<GatewayConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| TimeGateError::Internal(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GatewayConfig> {
    let cfg: GatewayConfig = serde_json::from_str(s)
        .map_err(|e| TimeGateError::BadRequest(format!("invalid config json: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
