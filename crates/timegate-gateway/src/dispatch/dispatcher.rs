//! JSON-RPC dispatcher.
//!
//! Consumes raw inbound frames forwarded by the intake endpoint, routes MCP
//! methods (`initialize`, `ping`, `tools/list`, `tools/call`), and produces
//! the response frame the relay loop writes back onto the session's stream.
//! Notifications produce no frame.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use serde_json::{json, Value};

use timegate_core::error::{Result, TimeGateError};
use timegate_core::protocol::{mcp, rpc};

const SERVER_NAME: &str = "timegate";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-call context: which session asked, on whose behalf, and the timezone
/// the stream was opened with. The transport captures it; only tools read it.
#[derive(Clone)]
pub struct CallContext {
    session_id: Arc<str>,
    client_id: Arc<str>,
    timezone: Arc<str>,
}

impl CallContext {
    pub fn new(
        session_id: impl Into<Arc<str>>,
        client_id: impl Into<Arc<str>>,
        timezone: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            client_id: client_id.into(),
            timezone: timezone.into(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
    pub fn client_id(&self) -> &str {
        &self.client_id
    }
    pub fn timezone(&self) -> &str {
        &self.timezone
    }
}

/// A callable tool exposed through `tools/list` / `tools/call`.
#[async_trait]
pub trait ToolService: Send + Sync {
    fn name(&self) -> &'static str;
    /// Descriptor advertised by `tools/list`.
    fn descriptor(&self) -> Value;
    async fn call(&self, ctx: CallContext, args: Value) -> Result<Value>;
}

/// Registry and dispatcher for tool services.
#[derive(Default)]
pub struct Dispatcher {
    tools: DashMap<&'static str, Arc<dyn ToolService>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
        }
    }

    pub fn register(&self, svc: Arc<dyn ToolService>) {
        self.tools.insert(svc.name(), svc);
    }

    pub fn registered_tools(&self) -> Vec<&'static str> {
        self.tools.iter().map(|e| *e.key()).collect()
    }

    /// Handle one raw inbound frame. Returns the response frame to relay, or
    /// `None` when the frame was a notification.
    pub async fn dispatch(&self, ctx: CallContext, frame: Value) -> Option<Value> {
        // Keep the id around so even an unparseable frame gets a correlated error.
        let id = frame.get("id").cloned().unwrap_or(Value::Null);
        let request: rpc::Request = match serde_json::from_value(frame) {
            Ok(r) => r,
            Err(e) => {
                return Some(err_frame(id, rpc::PARSE_ERROR, format!("Parse error: {e}")));
            }
        };
        match request {
            rpc::Request::Notification(n) => {
                // No id to correlate an error with, even for a bad version.
                tracing::debug!(method = %n.method, session_id = %ctx.session_id(), "notification ignored");
                None
            }
            rpc::Request::Call(call) => {
                if call.jsonrpc != rpc::JSONRPC_VERSION {
                    return Some(err_frame(
                        call.id,
                        rpc::INVALID_REQUEST,
                        format!("Invalid request: unsupported jsonrpc version {:?}", call.jsonrpc),
                    ));
                }
                Some(self.handle_call(ctx, call).await)
            }
        }
    }

    async fn handle_call(&self, ctx: CallContext, call: rpc::Call) -> Value {
        match call.method.as_str() {
            "initialize" => ok_frame(call.id, mcp::initialize_result(SERVER_NAME, SERVER_VERSION)),
            "ping" => ok_frame(call.id, json!({})),
            "tools/list" => {
                let tools: Vec<Value> = self.tools.iter().map(|e| e.value().descriptor()).collect();
                ok_frame(call.id, json!({ "tools": tools }))
            }
            "tools/call" => self.handle_tool_call(ctx, call).await,
            other => err_frame(
                call.id,
                rpc::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        }
    }

    async fn handle_tool_call(&self, ctx: CallContext, call: rpc::Call) -> Value {
        let params: rpc::ToolCallParams =
            match serde_json::from_value(call.params.unwrap_or(Value::Null)) {
                Ok(p) => p,
                Err(e) => {
                    return err_frame(
                        call.id,
                        rpc::INVALID_PARAMS,
                        format!("Invalid params for tools/call: {e}"),
                    );
                }
            };

        let Some(tool) = self.tools.get(params.name.as_str()).map(|e| e.value().clone()) else {
            return err_frame(
                call.id,
                rpc::METHOD_NOT_FOUND,
                format!("Unknown tool: {}", params.name),
            );
        };

        match tool.call(ctx, params.arguments).await {
            Ok(result) => ok_frame(call.id, result),
            Err(TimeGateError::BadRequest(msg)) => {
                err_frame(call.id, rpc::INVALID_PARAMS, format!("Invalid params: {msg}"))
            }
            Err(e) => {
                tracing::error!(tool = %params.name, error = %e, "tool call failed");
                err_frame(call.id, rpc::INTERNAL_ERROR, "Internal error")
            }
        }
    }
}

fn encode(frame: impl Serialize) -> Value {
    // Response/ErrorResponse only hold Value and String fields; encoding them
    // cannot fail.
    serde_json::to_value(frame).unwrap_or(Value::Null)
}

fn ok_frame(id: Value, result: Value) -> Value {
    encode(rpc::Response::ok(id, result))
}

fn err_frame(id: Value, code: i32, message: impl Into<String>) -> Value {
    encode(rpc::ErrorResponse::new(id, code, message))
}
