// crates/wiki-relay-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: MCP server implementations for stdio and HTTP transports.
// Purpose: Expose Wiki Relay tools via JSON-RPC 2.0.
// Dependencies: wiki-relay-core, wiki-relay-client, axum, tokio
// ============================================================================

//! ## Overview
//! The MCP server exposes Wiki Relay tools using JSON-RPC 2.0. It supports
//! stdio (Content-Length framing) and HTTP transports and always routes calls
//! through [`crate::tools::ToolRouter`]. Two methods exist: `tools/list` and
//! `tools/call`; everything else is a JSON-RPC error. On the HTTP transport
//! the `Authorization: Bearer` header becomes the call-scoped credential
//! override.
//! Security posture: inbound payloads are untrusted and size-limited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::body::Bytes;
use axum::extract::ConnectInfo;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use wiki_relay_client::WikiClient;
use wiki_relay_core::ApiToken;
use wiki_relay_core::ToolDefinition;
use wiki_relay_core::ToolReply;

use crate::audit::StderrAuditSink;
use crate::config::ServerTransport;
use crate::config::WikiRelayConfig;
use crate::tools::RequestContext;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: WikiRelayConfig,
    /// Tool router for request dispatch.
    router: ToolRouter,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when initialization fails.
    pub fn from_config(config: WikiRelayConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let client = WikiClient::new(config.backend.client.clone())
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        let router =
            ToolRouter::new(client, config.backend.api_token.clone(), Arc::new(StderrAuditSink));
        Ok(Self {
            config,
            router,
        })
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        match self.config.server.transport {
            ServerTransport::Stdio => {
                serve_stdio(&self.router, self.config.server.max_body_bytes)
            }
            ServerTransport::Http => serve_http(self.config, self.router).await,
        }
    }
}

// ============================================================================
// SECTION: JSON-RPC Types
// ============================================================================

/// JSON-RPC 2.0 request envelope.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// Protocol version marker.
    jsonrpc: String,
    /// Request identifier echoed in the response.
    #[serde(default)]
    id: Value,
    /// Method name.
    method: String,
    /// Method parameters.
    #[serde(default)]
    params: Option<Value>,
}

/// JSON-RPC 2.0 response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// Protocol version marker.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Success payload.
    result: Option<Value>,
    /// Error payload.
    error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Error message.
    message: String,
}

/// Tool call parameters for `tools/call`.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Tool argument bag.
    #[serde(default)]
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Builds a success response envelope.
fn success_response(id: Value, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: Some(result),
        error: None,
    }
}

/// Builds an error response envelope.
fn error_response(id: Value, code: i64, message: &str) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Dispatches a JSON-RPC request to the tool router.
fn handle_request(
    router: &ToolRouter,
    base_context: &RequestContext,
    request: JsonRpcRequest,
) -> (StatusCode, JsonRpcResponse) {
    let context = base_context.clone().with_request_id(request.id.to_string());
    if request.jsonrpc != "2.0" {
        return (
            StatusCode::BAD_REQUEST,
            error_response(request.id, -32600, "invalid json-rpc version"),
        );
    }
    match request.method.as_str() {
        "tools/list" => {
            let result = ToolListResult {
                tools: router.list_tools(),
            };
            match serde_json::to_value(result) {
                Ok(value) => (StatusCode::OK, success_response(request.id, value)),
                Err(_) => jsonrpc_error(request.id, &ToolError::Serialization),
            }
        }
        "tools/call" => {
            let id = request.id;
            let params = request.params.unwrap_or(Value::Null);
            match serde_json::from_value::<ToolCallParams>(params) {
                Ok(call) => {
                    match call_tool_with_blocking(router, &context, &call.name, &call.arguments) {
                        Ok(reply) => match serde_json::to_value(reply) {
                            Ok(value) => (StatusCode::OK, success_response(id, value)),
                            Err(_) => jsonrpc_error(id, &ToolError::Serialization),
                        },
                        Err(err) => jsonrpc_error(id, &err),
                    }
                }
                Err(_) => {
                    (StatusCode::BAD_REQUEST, error_response(id, -32602, "invalid tool params"))
                }
            }
        }
        _ => (StatusCode::BAD_REQUEST, error_response(request.id, -32601, "method not found")),
    }
}

/// Executes a tool call, shifting to a blocking context when available.
fn call_tool_with_blocking(
    router: &ToolRouter,
    context: &RequestContext,
    name: &str,
    arguments: &Value,
) -> Result<ToolReply, ToolError> {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == tokio::runtime::RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(|| router.handle_tool_call(context, name, arguments))
        }
        _ => router.handle_tool_call(context, name, arguments),
    }
}

/// Builds a JSON-RPC error response for a protocol-level tool failure.
fn jsonrpc_error(id: Value, error: &ToolError) -> (StatusCode, JsonRpcResponse) {
    let (status, code, message) = match error {
        ToolError::UnknownTool => (StatusCode::BAD_REQUEST, -32601, "unknown tool"),
        ToolError::Serialization => (StatusCode::OK, -32060, "serialization failed"),
    };
    (status, error_response(id, code, message))
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdio until stdin closes.
fn serve_stdio(router: &ToolRouter, max_body_bytes: usize) -> Result<(), McpServerError> {
    let mut reader = BufReader::new(std::io::stdin());
    let mut writer = std::io::stdout();
    loop {
        let Some(bytes) = read_framed(&mut reader, max_body_bytes)? else {
            return Ok(());
        };
        let response = match serde_json::from_slice::<JsonRpcRequest>(&bytes) {
            Ok(request) => {
                let context = RequestContext::stdio();
                handle_request(router, &context, request).1
            }
            Err(_) => error_response(Value::Null, -32600, "invalid json-rpc request"),
        };
        let payload = serde_json::to_vec(&response)
            .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
        write_framed(&mut writer, &payload)?;
    }
}

/// Reads a framed stdio payload using MCP Content-Length headers.
///
/// Returns `None` on a clean end of stream before any header.
fn read_framed(
    reader: &mut BufReader<impl Read>,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, McpServerError> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if saw_header {
                return Err(McpServerError::Transport("stdio closed mid-frame".to_string()));
            }
            return Ok(None);
        }
        if line.trim().is_empty() {
            break;
        }
        saw_header = true;
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed stdio payload using MCP Content-Length headers.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Shared state for the HTTP transport.
struct ServerState {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

/// Serves JSON-RPC requests over HTTP.
async fn serve_http(config: WikiRelayConfig, router: ToolRouter) -> Result<(), McpServerError> {
    let bind = config
        .server
        .bind
        .as_deref()
        .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
    let addr: SocketAddr =
        bind.parse().map_err(|_| McpServerError::Config("invalid bind address".to_string()))?;
    let state = Arc::new(ServerState {
        router,
        max_body_bytes: config.server.max_body_bytes,
    });
    let app = Router::new().route("/rpc", post(handle_http)).with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .map_err(|_| McpServerError::Transport("http server failed".to_string()))
}

/// Handles one HTTP JSON-RPC exchange.
async fn handle_http(
    State(state): State<Arc<ServerState>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    bytes: Bytes,
) -> (StatusCode, Json<JsonRpcResponse>) {
    let context = RequestContext::http(Some(peer.ip()), bearer_token(&headers));
    let (status, response) = match parse_request(state.max_body_bytes, &bytes) {
        Ok(request) => handle_request(&state.router, &context, request),
        Err(rejection) => rejection,
    };
    (status, Json(response))
}

/// Parses and bounds-checks an HTTP JSON-RPC payload.
fn parse_request(
    max_body_bytes: usize,
    bytes: &Bytes,
) -> Result<JsonRpcRequest, (StatusCode, JsonRpcResponse)> {
    if bytes.len() > max_body_bytes {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            error_response(Value::Null, -32070, "request body too large"),
        ));
    }
    serde_json::from_slice(bytes.as_ref()).map_err(|_| {
        (StatusCode::BAD_REQUEST, error_response(Value::Null, -32600, "invalid json-rpc request"))
    })
}

/// Extracts the call-scoped bearer credential from request headers.
fn bearer_token(headers: &HeaderMap) -> Option<ApiToken> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, value) = header.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    ApiToken::new(value.trim())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
