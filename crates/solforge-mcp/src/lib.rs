// crates/solforge-mcp/src/lib.rs
// ============================================================================
// Module: Solforge MCP
// Description: Tool registry, JSON-RPC dispatcher, and transports.
// Purpose: Expose Solforge tools via MCP over stdio and HTTP.
// Dependencies: axum, jsonschema, serde, solforge-core, tokio
// ============================================================================

//! ## Overview
//! This crate wires the Solforge tools into an MCP server. The registry
//! is built once at startup and read-only afterwards; the dispatcher
//! routes JSON-RPC 2.0 envelopes to tool handlers; the transports speak
//! line-delimited JSON over stdio or plain HTTP. Tool inputs are
//! untrusted and validated against each tool's declared schema before a
//! handler runs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod config;
pub mod registry;
pub mod server;
pub mod tools;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::ServerConfig;
pub use config::ServerTransport;
pub use registry::ToolDescriptor;
pub use registry::ToolError;
pub use registry::ToolHandler;
pub use registry::ToolRegistry;
pub use server::McpServer;
pub use server::McpServerError;
pub use tools::default_registry;
