//! MCP request handling: one JSON-RPC line in, at most one response out.

use serde_json::{json, Value};

use super::types::{
    error_codes, CallToolParams, InitializeResult, JsonRpcRequest, JsonRpcResponse, ServerInfo,
};
use crate::tools::{ToolDispatcher, ToolResult};

pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "r2r-mcp-server";

const INSTRUCTIONS: &str = "Tools for an R2R retrieval service. Call r2r_login first unless a \
token is configured. r2r_ingest is asynchronous: poll r2r_list_documents until the document \
status is success before searching it.";

/// MCP server state: the tool dispatcher behind the JSON-RPC surface.
#[derive(Debug, Clone)]
pub struct McpServer {
    dispatcher: ToolDispatcher,
}

impl McpServer {
    pub fn new(dispatcher: ToolDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Handle one line of input. Returns `None` for notifications.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, "unparsable JSON-RPC message");
                return Some(JsonRpcResponse::failure(
                    Value::Null,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {e}"),
                ));
            }
        };

        let id = value.get("id").cloned();
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(request) => request,
            Err(e) => {
                return Some(JsonRpcResponse::failure(
                    id.unwrap_or(Value::Null),
                    error_codes::INVALID_REQUEST,
                    format!("Invalid request: {e}"),
                ));
            }
        };

        self.handle_request(request).await
    }

    /// Handle a parsed request. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = request.id.clone() else {
            tracing::debug!(method = %request.method, "notification received");
            return None;
        };

        tracing::debug!(method = %request.method, "request received");

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                json!({ "tools": self.dispatcher.definitions() }),
            ),
            "tools/call" => self.call_tool(id, request.params).await,
            other => JsonRpcResponse::failure(
                id,
                error_codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            ),
        };

        Some(response)
    }

    async fn call_tool(&self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params.map(serde_json::from_value) {
            Some(Ok(params)) => params,
            Some(Err(e)) => {
                return JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid params: {e}"),
                );
            }
            None => {
                return JsonRpcResponse::failure(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Invalid params: missing tool name",
                );
            }
        };

        // Unknown tools surface as an error envelope, not a JSON-RPC error.
        let result = self
            .dispatcher
            .call(&params.name, params.arguments)
            .await
            .unwrap_or_else(|err| ToolResult::error(format!("Error: {err}")));

        match serde_json::to_value(&result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::failure(
                id,
                error_codes::INTERNAL_ERROR,
                format!("failed to serialize tool result: {e}"),
            ),
        }
    }
}

fn initialize_result() -> Value {
    let result = InitializeResult {
        protocol_version: PROTOCOL_VERSION,
        capabilities: json!({ "tools": {} }),
        server_info: ServerInfo {
            name: SERVER_NAME,
            version: env!("CARGO_PKG_VERSION"),
        },
        instructions: INSTRUCTIONS,
    };
    serde_json::to_value(result).unwrap_or_else(|_| json!({}))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
