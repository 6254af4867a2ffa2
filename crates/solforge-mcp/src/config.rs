// crates/solforge-mcp/src/config.rs
// ============================================================================
// Module: Server Configuration
// Description: Transport, bind, and limit settings for the MCP server.
// Purpose: Validate configuration once before the server starts.
// Dependencies: serde, solforge-core
// ============================================================================

//! ## Overview
//! Configuration is flags and environment only; there is no config file
//! surface. `SOLFORGE_PORT` overrides the port of the HTTP bind address
//! so deployments can remap without editing flags.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use solforge_core::Cluster;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable overriding the HTTP bind port.
pub const PORT_ENV: &str = "SOLFORGE_PORT";
/// Default HTTP bind address.
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by configuration validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is missing or out of range.
    #[error("config error: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Transport
// ============================================================================

/// Transport the server listens on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerTransport {
    /// Line-delimited JSON over stdin/stdout.
    Stdio,
    /// Plain HTTP endpoints.
    Http,
}

impl ServerTransport {
    /// Returns the stable label for the transport.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stdio => "stdio",
            Self::Http => "http",
        }
    }
}

// ============================================================================
// SECTION: Server Configuration
// ============================================================================

/// MCP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Transport the server listens on.
    pub transport: ServerTransport,
    /// HTTP bind address (required for the HTTP transport).
    pub bind: Option<String>,
    /// Maximum allowed request body size in bytes.
    pub max_body_bytes: usize,
    /// Timeout for each upstream RPC call, in milliseconds.
    pub rpc_timeout_ms: u64,
    /// Cluster used when a tool call names no network.
    pub default_network: Cluster,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: ServerTransport::Stdio,
            bind: None,
            max_body_bytes: 1024 * 1024,
            rpc_timeout_ms: 15_000,
            default_network: Cluster::Devnet,
        }
    }
}

impl ServerConfig {
    /// Validates settings and applies the port environment override.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a setting is missing or out of range.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.max_body_bytes == 0 {
            return Err(ConfigError::Invalid("max_body_bytes must be positive".to_string()));
        }
        if self.rpc_timeout_ms == 0 {
            return Err(ConfigError::Invalid("rpc_timeout_ms must be positive".to_string()));
        }
        if self.transport == ServerTransport::Http {
            let bind = self.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
            if let Some(port) = port_from_env()? {
                *bind = rebind_port(bind, port)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads the port override from the environment.
fn port_from_env() -> Result<Option<u16>, ConfigError> {
    match std::env::var(PORT_ENV) {
        Ok(value) => value
            .parse::<u16>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid(format!("{PORT_ENV} is not a valid port"))),
        Err(_) => Ok(None),
    }
}

/// Replaces the port of a `host:port` bind address.
fn rebind_port(bind: &str, port: u16) -> Result<String, ConfigError> {
    let host = bind
        .rsplit_once(':')
        .map(|(host, _)| host)
        .ok_or_else(|| ConfigError::Invalid("bind address must be host:port".to_string()))?;
    Ok(format!("{host}:{port}"))
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

    use super::ConfigError;
    use super::ServerConfig;
    use super::ServerTransport;
    use super::rebind_port;

    #[test]
    fn defaults_validate() {
        let mut config = ServerConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.transport, ServerTransport::Stdio);
    }

    #[test]
    fn http_without_bind_gets_the_default() {
        let mut config = ServerConfig {
            transport: ServerTransport::Http,
            ..ServerConfig::default()
        };
        config.validate().expect("http defaults validate");
        assert_eq!(config.bind.as_deref(), Some(super::DEFAULT_BIND));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let mut config = ServerConfig {
            rpc_timeout_ms: 0,
            ..ServerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rebind_replaces_only_the_port() {
        let bind = rebind_port("127.0.0.1:3000", 8080).expect("rebind succeeds");
        assert_eq!(bind, "127.0.0.1:8080");
    }
}
