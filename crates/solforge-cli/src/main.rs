// crates/solforge-cli/src/main.rs
// ============================================================================
// Module: Solforge CLI Entry Point
// Description: Command dispatcher for the Solforge MCP server and tools.
// Purpose: Start the server or invoke a tool locally without a client.
// Dependencies: clap, serde_json, solforge-core, solforge-mcp, tokio
// ============================================================================

//! ## Overview
//! Three commands: `serve` runs the MCP server on stdio or HTTP,
//! `tools` lists the registry, and `call` invokes one tool in-process
//! with a JSON arguments string. `call` exists so derivations and scans
//! are usable from a shell without wiring up an MCP client.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde_json::Value;
use serde_json::json;
use solforge_core::Cluster;
use solforge_mcp::McpServer;
use solforge_mcp::ServerConfig;
use solforge_mcp::ServerTransport;
use solforge_mcp::default_registry;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "solforge", version, about = "Solana developer tools over MCP")]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Solforge MCP server.
    Serve(ServeCommand),
    /// List the registered tools and their schemas.
    Tools,
    /// Invoke one tool in-process and print its result.
    Call(CallCommand),
}

/// Transport selection for the `serve` command.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum TransportArg {
    /// Line-delimited JSON over stdin/stdout.
    Stdio,
    /// Plain HTTP endpoints.
    Http,
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeCommand {
    /// Transport to listen on.
    #[arg(long, value_enum, default_value_t = TransportArg::Stdio)]
    transport: TransportArg,
    /// HTTP bind address (host:port), HTTP transport only.
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,
    /// Default network for RPC tools.
    #[arg(long, value_name = "NETWORK", default_value = "devnet")]
    network: String,
    /// Upstream RPC timeout in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 15_000)]
    rpc_timeout_ms: u64,
}

/// Arguments for the `call` command.
#[derive(Args, Debug)]
struct CallCommand {
    /// Tool name to invoke.
    #[arg(value_name = "TOOL")]
    tool: String,
    /// JSON arguments object.
    #[arg(long, value_name = "JSON", default_value = "{}")]
    args: String,
    /// Default network for RPC tools.
    #[arg(long, value_name = "NETWORK", default_value = "devnet")]
    network: String,
    /// Upstream RPC timeout in milliseconds.
    #[arg(long, value_name = "MS", default_value_t = 15_000)]
    rpc_timeout_ms: u64,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => {
            let _ = write_stderr_line(&format!("error: {err}"));
            ExitCode::FAILURE
        }
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(command) => command_serve(command).await,
        Commands::Tools => command_tools(),
        Commands::Call(command) => command_call(&command),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(command: ServeCommand) -> CliResult<ExitCode> {
    let config = ServerConfig {
        transport: match command.transport {
            TransportArg::Stdio => ServerTransport::Stdio,
            TransportArg::Http => ServerTransport::Http,
        },
        bind: command.bind,
        default_network: Cluster::from_selector(&command.network),
        rpc_timeout_ms: command.rpc_timeout_ms,
        ..ServerConfig::default()
    };
    let server = McpServer::from_config(config)
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Tools Command
// ============================================================================

/// Executes the `tools` command.
fn command_tools() -> CliResult<ExitCode> {
    let registry = default_registry(&ServerConfig::default())
        .map_err(|err| CliError::new(format!("registry build failed: {err}")))?;
    let listing = json!({ "tools": registry.descriptors() });
    write_json_value(&listing)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Call Command
// ============================================================================

/// Executes the `call` command.
fn command_call(command: &CallCommand) -> CliResult<ExitCode> {
    let arguments: Value = serde_json::from_str(&command.args)
        .map_err(|err| CliError::new(format!("arguments are not valid JSON: {err}")))?;
    let config = ServerConfig {
        default_network: Cluster::from_selector(&command.network),
        rpc_timeout_ms: command.rpc_timeout_ms,
        ..ServerConfig::default()
    };
    let registry = default_registry(&config)
        .map_err(|err| CliError::new(format!("registry build failed: {err}")))?;
    match registry.call(&command.tool, arguments) {
        Ok(result) => {
            write_json_value(&result)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            write_json_value(&json!({ "success": false, "error": err.to_string() }))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty-printed JSON to stdout with a trailing newline.
fn write_json_value(value: &Value) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("output serialization failed: {err}")))?;
    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.write_all(b"\n"))
        .map_err(|err| CliError::new(format!("stdout write failed: {err}")))
}

/// Writes one line to stderr.
fn write_stderr_line(line: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    stderr.write_all(line.as_bytes())?;
    stderr.write_all(b"\n")
}

// ============================================================================
// SECTION: Tests
// ============================================================================
