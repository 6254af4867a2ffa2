// crates/solforge-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: JSON-RPC dispatcher plus stdio and HTTP transports.
// Purpose: Route protocol envelopes to the tool registry.
// Dependencies: axum, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! The dispatcher is a pure function from one request envelope to at
//! most one response envelope; notifications produce no response. Both
//! transports share it: stdio reads one JSON line per request and
//! writes one JSON line per response, HTTP wraps the same dispatch in
//! axum routes and adds direct per-tool endpoints. A malformed request
//! gets an error envelope; it never terminates the transport.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use axum::Json;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use tokio::io::AsyncBufReadExt;
use tokio::io::AsyncWriteExt;
use tokio::io::BufReader;

use crate::audit::AuditSink;
use crate::audit::McpAuditEvent;
use crate::audit::StderrAuditSink;
use crate::config::ConfigError;
use crate::config::ServerConfig;
use crate::config::ServerTransport;
use crate::registry::ToolError;
use crate::registry::ToolRegistry;
use crate::tools::default_registry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Protocol revision advertised by `initialize`.
const PROTOCOL_VERSION: &str = "2024-11-05";
/// JSON-RPC parse error code.
const PARSE_ERROR: i64 = -32700;
/// JSON-RPC invalid request code.
const INVALID_REQUEST: i64 = -32600;
/// JSON-RPC method not found code.
const METHOD_NOT_FOUND: i64 = -32601;
/// JSON-RPC invalid params code.
const INVALID_PARAMS: i64 = -32602;
/// JSON-RPC internal error code.
const INTERNAL_ERROR: i64 = -32603;
/// Method prefix for fire-and-forget notifications.
const NOTIFICATION_PREFIX: &str = "notifications/";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by server construction and transport startup.
#[derive(Debug, Error)]
pub enum McpServerError {
    /// Configuration validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The tool registry could not be built.
    #[error("server init failed: {0}")]
    Init(String),
    /// The transport could not start or died.
    #[error("transport failed: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Envelopes
// ============================================================================

/// One decoded JSON-RPC request.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    /// Protocol version tag, echoed but not enforced.
    #[serde(default)]
    pub jsonrpc: Option<String>,
    /// Request id; absent for notifications.
    #[serde(default)]
    pub id: Value,
    /// Method name.
    pub method: String,
    /// Method parameters.
    #[serde(default)]
    pub params: Option<Value>,
}

/// One JSON-RPC response envelope.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcResponse {
    /// Protocol version tag.
    pub jsonrpc: &'static str,
    /// Echo of the request id.
    pub id: Value,
    /// Success payload; absent on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload; absent on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error object.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcError {
    /// Numeric error code.
    pub code: i64,
    /// Short human-readable message.
    pub message: String,
}

impl JsonRpcResponse {
    /// Builds a success response echoing the request id.
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response echoing the request id.
    #[must_use]
    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Parameters of a `tools/call` request.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Name of the tool to invoke.
    name: String,
    /// Arguments object, defaults to empty.
    #[serde(default)]
    arguments: Option<Value>,
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Routes one request envelope; notifications return `None`.
#[must_use]
pub fn handle_request(registry: &ToolRegistry, request: &JsonRpcRequest) -> Option<JsonRpcResponse> {
    if request.method.starts_with(NOTIFICATION_PREFIX) {
        return None;
    }
    let id = request.id.clone();
    let response = match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "serverInfo": {
                    "name": "solforge",
                    "version": env!("CARGO_PKG_VERSION"),
                },
                "capabilities": { "tools": {} },
            }),
        ),
        "tools/list" => {
            JsonRpcResponse::success(id, json!({ "tools": registry.descriptors() }))
        }
        "tools/call" => dispatch_tool_call(registry, id, request.params.clone()),
        "ping" => JsonRpcResponse::success(id, json!({})),
        other => {
            JsonRpcResponse::failure(id, METHOD_NOT_FOUND, format!("method not found: {other}"))
        }
    };
    Some(response)
}

/// Handles `tools/call`, classifying tool failures.
fn dispatch_tool_call(
    registry: &ToolRegistry,
    id: Value,
    params: Option<Value>,
) -> JsonRpcResponse {
    let Some(params) = params else {
        return JsonRpcResponse::failure(id, INVALID_PARAMS, "tools/call requires params.name");
    };
    let call: ToolCallParams = match serde_json::from_value(params) {
        Ok(call) => call,
        Err(_) => {
            return JsonRpcResponse::failure(
                id,
                INVALID_PARAMS,
                "tools/call requires params.name",
            );
        }
    };
    let arguments = call.arguments.unwrap_or_else(|| json!({}));
    match registry.call(&call.name, arguments) {
        Ok(result) => wrap_tool_payload(id, &result),
        Err(err) => match classify_tool_error(&err) {
            ToolFault::Envelope(code) => JsonRpcResponse::failure(id, code, err.to_string()),
            ToolFault::Result => wrap_tool_payload(id, &failure_payload(&err)),
        },
    }
}

/// Where a tool failure surfaces.
enum ToolFault {
    /// Protocol-level failure reported through the error envelope.
    Envelope(i64),
    /// Business-level failure reported as a `{success:false}` result.
    Result,
}

/// Splits tool failures between envelope errors and result payloads.
const fn classify_tool_error(err: &ToolError) -> ToolFault {
    match err {
        ToolError::UnknownTool(_) => ToolFault::Envelope(METHOD_NOT_FOUND),
        ToolError::InvalidParams(_) => ToolFault::Envelope(INVALID_PARAMS),
        ToolError::Serialization => ToolFault::Envelope(INTERNAL_ERROR),
        ToolError::Invalid(_)
        | ToolError::Upstream { .. }
        | ToolError::Exhausted(_)
        | ToolError::Io(_)
        | ToolError::Internal(_) => ToolFault::Result,
    }
}

/// Builds the `{success:false}` payload for a business failure.
fn failure_payload(err: &ToolError) -> Value {
    match err {
        ToolError::Upstream { message, details } => json!({
            "success": false,
            "error": message,
            "details": details,
        }),
        other => json!({
            "success": false,
            "error": other.to_string(),
        }),
    }
}

/// Wraps a tool payload as the single text entry of the content array.
fn wrap_tool_payload(id: Value, payload: &Value) -> JsonRpcResponse {
    match serde_json::to_string(payload) {
        Ok(text) => JsonRpcResponse::success(
            id,
            json!({ "content": [{ "type": "text", "text": text }] }),
        ),
        Err(_) => {
            JsonRpcResponse::failure(id, INTERNAL_ERROR, "result serialization failed")
        }
    }
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Shared state behind both transports.
struct ServerState {
    /// Immutable tool registry.
    registry: Arc<ToolRegistry>,
    /// Audit event destination.
    audit: Arc<dyn AuditSink>,
    /// Validated configuration.
    config: ServerConfig,
}

/// The Solforge MCP server.
pub struct McpServer {
    /// Shared transport state.
    state: Arc<ServerState>,
}

impl McpServer {
    /// Builds a server from configuration, validating it and building
    /// the default tool registry.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when validation fails or a declared
    /// tool schema does not compile.
    pub fn from_config(mut config: ServerConfig) -> Result<Self, McpServerError> {
        config.validate()?;
        let registry =
            default_registry(&config).map_err(|err| McpServerError::Init(err.to_string()))?;
        Ok(Self {
            state: Arc::new(ServerState {
                registry: Arc::new(registry),
                audit: Arc::new(StderrAuditSink),
                config,
            }),
        })
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit_sink(mut self, sink: Arc<dyn AuditSink>) -> Self {
        if let Some(state) = Arc::get_mut(&mut self.state) {
            state.audit = sink;
        }
        self
    }

    /// Runs the configured transport until the peer disconnects.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] when the transport cannot
    /// start or its I/O fails.
    pub async fn serve(&self) -> Result<(), McpServerError> {
        match self.state.config.transport {
            ServerTransport::Stdio => serve_stdio(Arc::clone(&self.state)).await,
            ServerTransport::Http => serve_http(Arc::clone(&self.state)).await,
        }
    }
}

/// Dispatches one request on a blocking-capable context and records an
/// audit event. Tool handlers block on network and file I/O.
fn dispatch_blocking(
    state: &ServerState,
    transport: &'static str,
    request: &JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    let response =
        tokio::task::block_in_place(|| handle_request(&state.registry, request));
    let mut event = McpAuditEvent::request(transport, request.method.clone());
    if request.method == "tools/call"
        && let Some(name) = request
            .params
            .as_ref()
            .and_then(|params| params.get("name"))
            .and_then(Value::as_str)
    {
        event = event.with_tool(name);
    }
    if let Some(JsonRpcResponse {
        error: Some(err), ..
    }) = &response
    {
        event = event.failed(err.code);
    }
    state.audit.record(&event);
    response
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves line-delimited JSON over stdin/stdout until EOF. Requests
/// are handled one at a time in arrival order; responses are written
/// in the same order.
async fn serve_stdio(state: Arc<ServerState>) -> Result<(), McpServerError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|err| McpServerError::Transport(err.to_string()))?;
        let Some(line) = line else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }
        let response = if line.len() > state.config.max_body_bytes {
            Some(JsonRpcResponse::failure(
                Value::Null,
                INVALID_REQUEST,
                "request exceeds size limit",
            ))
        } else {
            match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => dispatch_blocking(&state, "stdio", &request),
                Err(_) => Some(JsonRpcResponse::failure(
                    Value::Null,
                    PARSE_ERROR,
                    "request is not valid JSON-RPC",
                )),
            }
        };
        if let Some(response) = response {
            let mut payload = serde_json::to_vec(&response)
                .map_err(|err| McpServerError::Transport(err.to_string()))?;
            payload.push(b'\n');
            stdout
                .write_all(&payload)
                .await
                .map_err(|err| McpServerError::Transport(err.to_string()))?;
            stdout
                .flush()
                .await
                .map_err(|err| McpServerError::Transport(err.to_string()))?;
        }
    }
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Serves the HTTP surface on the configured bind address.
async fn serve_http(state: Arc<ServerState>) -> Result<(), McpServerError> {
    let bind = state
        .config
        .bind
        .clone()
        .ok_or_else(|| McpServerError::Transport("http transport has no bind".to_string()))?;
    let max_body = state.config.max_body_bytes;
    let app = Router::new()
        .route("/health", get(http_health))
        .route("/tools", get(http_tools))
        .route("/tools/{name}", post(http_tool_call))
        .route("/mcp", post(http_mcp))
        .layer(DefaultBodyLimit::max(max_body))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .map_err(|err| McpServerError::Transport(format!("bind {bind} failed: {err}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|err| McpServerError::Transport(err.to_string()))
}

/// `GET /health` liveness probe.
async fn http_health(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "tools": state.registry.len(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// `GET /tools` registry listing, same payload as `tools/list`.
async fn http_tools(State(state): State<Arc<ServerState>>) -> Json<Value> {
    Json(json!({ "tools": state.registry.descriptors() }))
}

/// `POST /tools/{name}` direct tool invocation, bypassing the envelope.
async fn http_tool_call(
    State(state): State<Arc<ServerState>>,
    Path(name): Path<String>,
    Json(arguments): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let result =
        tokio::task::block_in_place(|| state.registry.call(&name, arguments));
    let mut event = McpAuditEvent::request("http", format!("tools/{name}")).with_tool(&name);
    let (status, payload) = match result {
        Ok(payload) => (StatusCode::OK, payload),
        Err(err) => match classify_tool_error(&err) {
            ToolFault::Envelope(code) => {
                event = event.failed(code);
                let status = match err {
                    ToolError::UnknownTool(_) => StatusCode::NOT_FOUND,
                    ToolError::InvalidParams(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, json!({ "success": false, "error": err.to_string() }))
            }
            ToolFault::Result => (StatusCode::OK, failure_payload(&err)),
        },
    };
    state.audit.record(&event);
    (status, Json(payload))
}

/// `POST /mcp` full envelope pass-through.
async fn http_mcp(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let request: JsonRpcRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(_) => {
            let response = JsonRpcResponse::failure(
                Value::Null,
                PARSE_ERROR,
                "request is not valid JSON-RPC",
            );
            return (StatusCode::OK, Json(envelope_value(&response)));
        }
    };
    match dispatch_blocking(&state, "http", &request) {
        Some(response) => (StatusCode::OK, Json(envelope_value(&response))),
        None => (StatusCode::NO_CONTENT, Json(Value::Null)),
    }
}

/// Serializes an envelope, falling back to a static internal error.
fn envelope_value(response: &JsonRpcResponse) -> Value {
    serde_json::to_value(response).unwrap_or_else(|_| {
        json!({
            "jsonrpc": "2.0",
            "id": null,
            "error": { "code": INTERNAL_ERROR, "message": "internal error" },
        })
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only panic-based assertions."
    )]

    use serde_json::Value;
    use serde_json::json;

    use super::JsonRpcRequest;
    use super::handle_request;
    use crate::config::ServerConfig;
    use crate::registry::ToolRegistry;
    use crate::tools::default_registry;

    /// Builds the default registry for dispatch tests.
    fn registry() -> ToolRegistry {
        default_registry(&ServerConfig::default()).expect("registry builds")
    }

    /// Builds a request envelope.
    fn request(id: Value, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: Some("2.0".to_string()),
            id,
            method: method.to_string(),
            params,
        }
    }

    /// Extracts the parsed tool payload from a `tools/call` response.
    fn tool_payload(response: &super::JsonRpcResponse) -> Value {
        let result = response.result.as_ref().expect("result present");
        let text = result["content"][0]["text"].as_str().expect("text payload");
        serde_json::from_str(text).expect("payload parses")
    }

    #[test]
    fn initialize_reports_capabilities() {
        let registry = registry();
        let response = handle_request(&registry, &request(json!(1), "initialize", None))
            .expect("response present");
        let result = response.result.expect("result present");
        assert_eq!(result["serverInfo"]["name"], "solforge");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[test]
    fn responses_echo_the_request_id() {
        let registry = registry();
        for id in [json!(42), json!("abc"), Value::Null] {
            let response = handle_request(&registry, &request(id.clone(), "ping", None))
                .expect("response present");
            assert_eq!(response.id, id);
        }
    }

    #[test]
    fn notifications_get_no_response() {
        let registry = registry();
        let response =
            handle_request(&registry, &request(json!(1), "notifications/initialized", None));
        assert!(response.is_none());
    }

    #[test]
    fn unknown_methods_are_method_not_found() {
        let registry = registry();
        let response = handle_request(&registry, &request(json!(1), "no/such/method", None))
            .expect("response present");
        assert_eq!(response.error.expect("error present").code, -32601);
    }

    #[test]
    fn tools_list_and_tools_call_agree() {
        let registry = registry();
        let response = handle_request(&registry, &request(json!(1), "tools/list", None))
            .expect("response present");
        let result = response.result.expect("result present");
        let tools = result["tools"].as_array().expect("tools listed");
        assert!(!tools.is_empty());
        for tool in tools {
            let name = tool["name"].as_str().expect("tool name");
            let call = handle_request(
                &registry,
                &request(json!(2), "tools/call", Some(json!({ "name": name }))),
            )
            .expect("response present");
            // Every listed tool must route; missing arguments are an
            // InvalidParams failure, not an unknown tool.
            if let Some(err) = call.error {
                assert_ne!(err.code, -32601, "tool {name} is listed but not callable");
            }
        }
    }

    #[test]
    fn unknown_tool_is_an_envelope_error() {
        let registry = registry();
        let response = handle_request(
            &registry,
            &request(json!(7), "tools/call", Some(json!({ "name": "does_not_exist" }))),
        )
        .expect("response present");
        let error = response.error.expect("error present");
        assert_eq!(error.code, -32601);
        assert!(error.message.contains("Unknown tool"));
    }

    #[test]
    fn missing_tool_name_is_invalid_params() {
        let registry = registry();
        let response =
            handle_request(&registry, &request(json!(7), "tools/call", Some(json!({}))))
                .expect("response present");
        assert_eq!(response.error.expect("error present").code, -32602);
    }

    #[test]
    fn tool_results_arrive_as_text_content() {
        let registry = registry();
        let response = handle_request(
            &registry,
            &request(
                json!(3),
                "tools/call",
                Some(json!({
                    "name": "derive_discriminator",
                    "arguments": { "instructionName": "initialize" },
                })),
            ),
        )
        .expect("response present");
        let payload = tool_payload(&response);
        assert_eq!(payload["success"], true);
        assert_eq!(payload["preimage"], "global:initialize");
    }

    #[test]
    fn business_failures_are_success_false_results() {
        let registry = registry();
        let response = handle_request(
            &registry,
            &request(
                json!(4),
                "tools/call",
                Some(json!({
                    "name": "derive_pda",
                    "arguments": { "programId": "invalid", "seeds": ["a"] },
                })),
            ),
        )
        .expect("response present");
        assert!(response.error.is_none());
        let payload = tool_payload(&response);
        assert_eq!(payload["success"], false);
        assert!(
            payload["error"].as_str().expect("error text").contains("program id")
        );
    }

    #[test]
    fn schema_violations_are_invalid_params() {
        let registry = registry();
        let response = handle_request(
            &registry,
            &request(
                json!(5),
                "tools/call",
                Some(json!({
                    "name": "derive_pda",
                    "arguments": { "programId": 12, "seeds": ["a"] },
                })),
            ),
        )
        .expect("response present");
        assert_eq!(response.error.expect("error present").code, -32602);
    }
}
