//! MCP 服务端核心：请求分发

use serde_json::{json, Value};
use tracing::debug;

use super::protocol::*;
use super::tools;
use crate::workflow::ReportTools;

/// 报告分析 MCP 服务
#[derive(Clone)]
pub struct DocAnalyzerServer {
    name: String,
    version: String,
    tools: ReportTools,
}

impl DocAnalyzerServer {
    pub fn new(tools: ReportTools) -> Self {
        Self {
            name: "doc-analyzer".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            tools,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// 处理一条请求，通知类消息返回 None
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        debug!("收到请求: {}", request.method);

        if request.is_notification() {
            // initialized / cancelled 等通知无需回复
            return None;
        }

        let id = request.id.clone();
        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => {
                JsonRpcResponse::success(id, json!({ "tools": tools::get_tool_definitions() }))
            }
            "tools/call" => self.handle_call_tool(id, request.params).await,
            other => JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
        };
        Some(response)
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: self.name.clone(),
                version: self.version.clone(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Value) -> JsonRpcResponse {
        let Some(name) = params.get("name").and_then(|v| v.as_str()) else {
            return JsonRpcResponse::error(id, INVALID_PARAMS, "tools/call requires a tool name");
        };
        let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

        match tools::handle_tool_call(&self.tools, name, arguments).await {
            Ok(content) => JsonRpcResponse::success(
                id,
                json!({
                    "content": content,
                    "isError": false
                }),
            ),
            Err(e) => JsonRpcResponse::success(
                id,
                json!({
                    "content": [ToolResultContent::text(format!("Error: {}", e))],
                    "isError": true
                }),
            ),
        }
    }
}
