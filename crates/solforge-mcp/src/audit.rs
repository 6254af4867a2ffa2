// crates/solforge-mcp/src/audit.rs
// ============================================================================
// Module: Request Audit Logging
// Description: Structured audit events for MCP request handling.
// Purpose: Emit one JSON line per request without hard dependencies.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events are plain serializable structs routed through a sink
//! trait, so deployments can forward them to any logging pipeline. The
//! default sink writes one JSON line per event to stderr; stdout stays
//! reserved for the stdio transport payloads.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Event
// ============================================================================

/// One MCP request audit event.
#[derive(Debug, Clone, Serialize)]
pub struct McpAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Transport the request arrived on.
    pub transport: &'static str,
    /// JSON-RPC method, or the HTTP route for direct calls.
    pub method: String,
    /// Tool name when the request targeted one.
    pub tool: Option<String>,
    /// Request outcome label ("ok" or "error").
    pub outcome: &'static str,
    /// JSON-RPC error code when the request failed at protocol level.
    pub error_code: Option<i64>,
}

impl McpAuditEvent {
    /// Builds a request event stamped with the current time.
    #[must_use]
    pub fn request(transport: &'static str, method: impl Into<String>) -> Self {
        Self {
            event: "mcp_request",
            timestamp_ms: now_ms(),
            transport,
            method: method.into(),
            tool: None,
            outcome: "ok",
            error_code: None,
        }
    }

    /// Marks the event as failed with the given protocol error code.
    #[must_use]
    pub fn failed(mut self, code: i64) -> Self {
        self.outcome = "error";
        self.error_code = Some(code);
        self
    }

    /// Attaches the targeted tool name.
    #[must_use]
    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }
}

/// Returns milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or_default()
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for audit events.
pub trait AuditSink: Send + Sync {
    /// Records one audit event.
    fn record(&self, event: &McpAuditEvent);
}

/// Sink writing one JSON line per event to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    #[allow(clippy::print_stderr, reason = "Stderr is the audit output channel.")]
    fn record(&self, event: &McpAuditEvent) {
        if let Ok(line) = serde_json::to_string(event) {
            eprintln!("{line}");
        }
    }
}

/// Sink discarding every event.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &McpAuditEvent) {}
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

    use super::McpAuditEvent;

    #[test]
    fn events_serialize_as_flat_json() {
        let event = McpAuditEvent::request("stdio", "tools/call").with_tool("derive_pda");
        let json = serde_json::to_value(&event).expect("event serializes");
        assert_eq!(json["event"], "mcp_request");
        assert_eq!(json["method"], "tools/call");
        assert_eq!(json["tool"], "derive_pda");
        assert_eq!(json["outcome"], "ok");
    }

    #[test]
    fn failure_marks_outcome_and_code() {
        let event = McpAuditEvent::request("http", "tools/call").failed(-32601);
        assert_eq!(event.outcome, "error");
        assert_eq!(event.error_code, Some(-32601));
    }
}
