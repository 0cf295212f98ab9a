use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use ideogram_contracts::rpc::{codes, RpcError, RpcRequest, RpcResponse};
use ideogram_contracts::tools::ToolRegistry;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub const SERVER_NAME: &str = "ideogram-mcp-server";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub struct ToolServer {
    registry: ToolRegistry,
}

impl ToolServer {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> Result<()> {
        info!(tools = self.registry.list().len(), "tool server listening on stdio");
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .context("failed to read request line")?;
            if read == 0 {
                break;
            }
            let reply = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line),
                Err(err) => {
                    warn!(error = %err, "request line is not valid UTF-8");
                    Some(parse_error(format!("Parse error: {err}")))
                }
            };
            if let Some(response) = reply {
                serde_json::to_writer(&mut writer, &response)
                    .context("failed to encode response")?;
                writer.write_all(b"\n").context("failed to write response")?;
                writer.flush().context("failed to flush response")?;
            }
        }
        info!("input closed, shutting down");
        Ok(())
    }

    /// Returns `None` for notifications.
    pub fn handle_line(&self, line: &str) -> Option<RpcResponse> {
        let raw = match serde_json::from_str::<Value>(line) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "unparsable request line");
                return Some(parse_error(format!("Parse error: {err}")));
            }
        };
        let fallback_id = raw.get("id").cloned().unwrap_or(Value::Null);
        let request = match serde_json::from_value::<RpcRequest>(raw) {
            Ok(request) => request,
            Err(err) => {
                return Some(RpcResponse::failure(
                    fallback_id,
                    RpcError::new(codes::INVALID_REQUEST, format!("Invalid request: {err}")),
                ));
            }
        };

        debug!(method = %request.method, "request received");
        let outcome = self.dispatch(&request);
        if request.is_notification() {
            return None;
        }
        let id = request.id.unwrap_or_default();
        Some(match outcome {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        })
    }

    fn dispatch(&self, request: &RpcRequest) -> std::result::Result<Value, RpcError> {
        match request.method.as_str() {
            "initialize" => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION"),
                },
            })),
            "notifications/initialized" | "ping" => Ok(json!({})),
            "tools/list" => Ok(json!({ "tools": self.registry.list() })),
            "tools/call" => self.call_tool(request.params.as_ref()),
            other => Err(RpcError::new(
                codes::METHOD_NOT_FOUND,
                format!("Method not found: {other}"),
            )),
        }
    }

    fn call_tool(&self, params: Option<&Value>) -> std::result::Result<Value, RpcError> {
        let name = params
            .and_then(|params| params.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| RpcError::new(codes::INVALID_PARAMS, "Tool name is required"))?;
        let arguments = params.and_then(|params| params.get("arguments"));
        info!(tool = name, "tool call");
        let text = self.registry.call(name, arguments)?;
        Ok(json!({ "content": [{ "type": "text", "text": text }] }))
    }
}

fn parse_error(message: String) -> RpcResponse {
    RpcResponse::failure(Value::Null, RpcError::new(codes::PARSE_ERROR, message))
}
