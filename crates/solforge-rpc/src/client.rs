// crates/solforge-rpc/src/client.rs
// ============================================================================
// Module: RPC Client
// Description: Blocking JSON-RPC 2.0 client with strict limits.
// Purpose: Issue one bounded node request per call, fail closed on limits.
// Dependencies: reqwest, serde_json, url
// ============================================================================

//! ## Overview
//! The client wraps `reqwest::blocking::Client` with a per-call timeout
//! and a response size ceiling. Node-reported errors are surfaced as
//! [`RpcError::Node`] so the caller can distinguish "the node said no"
//! from "the node was unreachable".

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Read;
use std::time::Duration;

use reqwest::Url;
use reqwest::blocking::Client;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Configuration for the RPC client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RpcClientConfig {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response size allowed, in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 15_000,
            max_response_bytes: 4 * 1024 * 1024,
            user_agent: "solforge/0.1".to_string(),
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by RPC client calls.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RpcError {
    /// The HTTP client could not be constructed.
    #[error("http client build failed")]
    ClientBuild,
    /// The endpoint URL was not valid.
    #[error("invalid rpc url: {0}")]
    InvalidUrl(String),
    /// The request timed out before the node answered.
    #[error("rpc request timed out")]
    Timeout,
    /// The node was unreachable or the transfer failed.
    #[error("rpc request failed: {0}")]
    Transport(String),
    /// The response exceeded the configured size ceiling.
    #[error("rpc response exceeds size limit")]
    ResponseTooLarge,
    /// The response body was not a well-formed JSON-RPC reply.
    #[error("malformed rpc response: {0}")]
    Malformed(String),
    /// The node returned a JSON-RPC error object.
    #[error("node error {code}: {message}")]
    Node {
        /// JSON-RPC error code reported by the node.
        code: i64,
        /// Human-readable message reported by the node.
        message: String,
    },
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Blocking JSON-RPC client bound to one endpoint.
#[derive(Debug, Clone)]
pub struct RpcClient {
    /// Node endpoint URL.
    endpoint: Url,
    /// HTTP client used for outbound requests.
    client: Client,
    /// Maximum response size allowed, in bytes.
    max_response_bytes: usize,
}

impl RpcClient {
    /// Creates a client for the given endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::InvalidUrl`] when the endpoint does not parse
    /// as an http(s) URL and [`RpcError::ClientBuild`] when the HTTP
    /// client cannot be constructed.
    pub fn new(endpoint: &str, config: &RpcClientConfig) -> Result<Self, RpcError> {
        let url =
            Url::parse(endpoint).map_err(|_| RpcError::InvalidUrl(endpoint.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(RpcError::InvalidUrl(endpoint.to_string()));
        }
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|_| RpcError::ClientBuild)?;
        Ok(Self {
            endpoint: url,
            client,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Returns the endpoint this client targets.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Issues one JSON-RPC call and returns the `result` payload.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] for transport failures, oversized or
    /// malformed responses, and node-reported error objects.
    pub fn call(&self, method: &str, params: Value) -> Result<Value, RpcError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&body)
            .send()
            .map_err(classify_transport_error)?;
        let status = response.status();
        let bytes = read_response_limited(response, self.max_response_bytes)?;
        if !status.is_success() {
            return Err(RpcError::Transport(format!("node returned http {status}")));
        }
        let reply: Value = serde_json::from_slice(&bytes)
            .map_err(|err| RpcError::Malformed(err.to_string()))?;
        extract_result(reply)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Maps a reqwest error to a timeout or transport error.
fn classify_transport_error(err: reqwest::Error) -> RpcError {
    if err.is_timeout() {
        RpcError::Timeout
    } else {
        RpcError::Transport("node unreachable".to_string())
    }
}

/// Pulls the `result` field out of a JSON-RPC reply, surfacing node
/// errors.
fn extract_result(mut reply: Value) -> Result<Value, RpcError> {
    let Value::Object(map) = &mut reply else {
        return Err(RpcError::Malformed("reply is not an object".to_string()));
    };
    if let Some(error) = map.get("error") {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown node error")
            .to_string();
        return Err(RpcError::Node {
            code,
            message,
        });
    }
    map.remove("result").ok_or_else(|| RpcError::Malformed("reply has no result".to_string()))
}

/// Reads the response body while enforcing a byte limit.
fn read_response_limited(
    response: reqwest::blocking::Response,
    max_bytes: usize,
) -> Result<Vec<u8>, RpcError> {
    let max_bytes_u64 =
        u64::try_from(max_bytes).map_err(|_| RpcError::ResponseTooLarge)?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(RpcError::ResponseTooLarge);
    }
    let mut buf = Vec::new();
    let limit = max_bytes_u64.saturating_add(1);
    let mut handle = response.take(limit);
    handle
        .read_to_end(&mut buf)
        .map_err(|_| RpcError::Transport("failed to read response".to_string()))?;
    if buf.len() > max_bytes {
        return Err(RpcError::ResponseTooLarge);
    }
    Ok(buf)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
