//! Wire-level contracts: JSON-RPC 2.0 framing and MCP result shapes.

pub mod mcp;
pub mod rpc;
