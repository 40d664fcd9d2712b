//! JSON-RPC 2.0 loop over line-delimited stdio.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::handlers::{self, HandlerState};
use super::tools::available_tools;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Reports kept parsed between calls.
const CACHE_CAPACITY: usize = 16;

const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INTERNAL_ERROR: i64 = -32603;

/// JSON-RPC 2.0 Request
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    #[allow(dead_code)]
    jsonrpc: Option<String>,
    id: Option<Value>,
    method: String,
    params: Option<Value>,
}

/// Failure to be reported as a JSON-RPC error object.
struct RpcError {
    code: i64,
    message: String,
}

impl RpcError {
    fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub struct ToolServer {
    state: HandlerState,
    shutdown: bool,
}

impl Default for ToolServer {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolServer {
    pub fn new() -> Self {
        Self {
            state: HandlerState::new(CACHE_CAPACITY),
            shutdown: false,
        }
    }

    /// Serve requests from `reader` until EOF or `shutdown`.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, writer: &mut W) -> Result<()> {
        info!("covrank tool server started");

        for line in reader.lines() {
            let line = line.context("Failed to read request")?;
            if line.trim().is_empty() {
                continue;
            }

            debug!("Received: {}", line);

            if let Some(response) = self.handle_message(&line) {
                let response_str = serde_json::to_string(&response)?;
                debug!("Sending: {}", response_str);
                writeln!(writer, "{}", response_str)?;
                writer.flush()?;
            }

            if self.shutdown {
                info!("Shutdown requested");
                break;
            }
        }

        Ok(())
    }

    /// Handle one raw message; `None` for notifications.
    pub fn handle_message(&mut self, message: &str) -> Option<Value> {
        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                error!("Invalid JSON-RPC request: {}", e);
                return Some(error_response(
                    Value::Null,
                    RpcError::new(INVALID_REQUEST, format!("Invalid request: {e}")),
                ));
            }
        };

        let result = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "initialized" | "notifications/initialized" => return None,
            "tools/list" => Ok(json!({ "tools": available_tools() })),
            "tools/call" => self.handle_call_tool(request.params.as_ref()),
            "shutdown" => {
                self.shutdown = true;
                Ok(Value::Null)
            }
            other => Err(RpcError::new(
                METHOD_NOT_FOUND,
                format!("Unknown method: {other}"),
            )),
        };

        // Requests without an id are notifications and get no reply.
        let id = request.id?;
        Some(match result {
            Ok(value) => json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": value
            }),
            Err(e) => error_response(id, e),
        })
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "covrank",
                "version": env!("CARGO_PKG_VERSION")
            }
        })
    }

    fn handle_call_tool(&mut self, params: Option<&Value>) -> std::result::Result<Value, RpcError> {
        let params =
            params.ok_or_else(|| RpcError::new(INVALID_REQUEST, "Missing params for tools/call"))?;

        let name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| RpcError::new(INVALID_REQUEST, "Missing tool name"))?;

        let arguments = params.get("arguments").cloned().unwrap_or(json!({}));

        debug!("Calling tool: {} with args: {}", name, arguments);

        let result = match name {
            "rank_files" => handlers::handle_rank_files(&mut self.state, &arguments),
            "project_summary" => handlers::handle_project_summary(&mut self.state, &arguments),
            "file_details" => handlers::handle_file_details(&mut self.state, &arguments),
            "estimate_impact" => handlers::handle_estimate_impact(&mut self.state, &arguments),
            _ => {
                return Err(RpcError::new(
                    METHOD_NOT_FOUND,
                    format!("Unknown tool: {name}"),
                ))
            }
        };

        let content = match result {
            Ok(value) => {
                let text = serde_json::to_string_pretty(&value)
                    .map_err(|e| RpcError::new(INTERNAL_ERROR, e.to_string()))?;
                json!({
                    "content": [{ "type": "text", "text": text }]
                })
            }
            Err(e) => {
                error!("Tool {} failed: {:#}", name, e);
                json!({
                    "content": [{
                        "type": "text",
                        "text": json!({ "error": format!("{e:#}") }).to_string()
                    }],
                    "isError": true
                })
            }
        };
        Ok(content)
    }
}

fn error_response(id: Value, error: RpcError) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": error.code,
            "message": error.message
        }
    })
}

/// Run the tool server on stdin/stdout.
pub fn run_server() -> Result<()> {
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    ToolServer::new().run(stdin.lock(), &mut stdout)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(server: &mut ToolServer, message: Value) -> Value {
        server.handle_message(&message.to_string()).unwrap()
    }

    #[test]
    fn test_initialize() {
        let mut server = ToolServer::new();
        let out = call(&mut server, json!({"jsonrpc": "2.0", "id": 1, "method": "initialize"}));
        assert_eq!(out["id"], 1);
        assert_eq!(out["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(out["result"]["serverInfo"]["name"], "covrank");
    }

    #[test]
    fn test_list_tools() {
        let mut server = ToolServer::new();
        let out = call(&mut server, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}));
        let tools = out["result"]["tools"].as_array().unwrap();
        assert!(tools.iter().any(|t| t["name"] == "rank_files"));
    }

    #[test]
    fn test_notification_has_no_reply() {
        let mut server = ToolServer::new();
        assert!(server
            .handle_message(r#"{"jsonrpc":"2.0","method":"initialized"}"#)
            .is_none());
    }

    #[test]
    fn test_unknown_method() {
        let mut server = ToolServer::new();
        let out = call(&mut server, json!({"jsonrpc": "2.0", "id": 3, "method": "bogus"}));
        assert_eq!(out["error"]["code"], METHOD_NOT_FOUND);
    }

    #[test]
    fn test_invalid_json() {
        let mut server = ToolServer::new();
        let out = server.handle_message("{not json").unwrap();
        assert_eq!(out["error"]["code"], INVALID_REQUEST);
        assert!(out["id"].is_null());
    }

    #[test]
    fn test_tool_error_is_result() {
        let mut server = ToolServer::new();
        let out = call(
            &mut server,
            json!({
                "jsonrpc": "2.0",
                "id": 4,
                "method": "tools/call",
                "params": {"name": "project_summary", "arguments": {"project_dir": "/no/such/dir"}}
            }),
        );
        assert_eq!(out["result"]["isError"], true);
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let input = concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"shutdown"}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/list"}"#,
            "\n"
        );
        let mut output = Vec::new();
        ToolServer::new().run(input.as_bytes(), &mut output).unwrap();

        let replies: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[1]["id"], 2);
    }
}
