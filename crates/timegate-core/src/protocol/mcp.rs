//! Minimal MCP result shapes: initialize handshake, tool descriptors, and
//! tool-call content results.

use serde_json::{json, Value};

/// Protocol revision advertised during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// `initialize` result body.
pub fn initialize_result(server_name: &str, server_version: &str) -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": server_name,
            "version": server_version
        }
    })
}

/// `tools/call` success result wrapping a single text content block.
pub fn tool_result_text(text: impl Into<String>) -> Value {
    json!({
        "content": [
            { "type": "text", "text": text.into() }
        ],
        "isError": false
    })
}

/// Tool descriptor for `tools/list`.
pub fn tool_descriptor(name: &str, description: &str, input_schema: Value) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": input_schema
    })
}
