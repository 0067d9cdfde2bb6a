//! timegate gateway library entry.
//!
//! This crate wires the token gate, session registry, SSE transport, message
//! intake, and RPC dispatch into a cohesive server stack. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod router;
pub mod services;
pub mod session;
pub mod transport;
