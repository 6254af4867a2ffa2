// crates/solforge-mcp/src/tools.rs
// ============================================================================
// Module: Tool Handlers
// Description: The Solforge tool set registered with the dispatcher.
// Purpose: Validate arguments, perform one unit of work, return JSON.
// Dependencies: bs58, serde, serde_json, solforge-analyze, solforge-core,
//               solforge-rpc, solforge-scaffold
// ============================================================================

//! ## Overview
//! Each tool is one stateless handler: decode the schema-validated
//! arguments into a typed struct, do the work, and return a plain JSON
//! object with a `success` field. Derivation and analysis tools never
//! touch the network; RPC tools issue exactly one upstream call (two
//! for airdrop, which also reads the post-airdrop balance). Input that
//! is well-formed JSON but semantically wrong is a `{success:false}`
//! result, not a protocol error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use solforge_analyze::analyze_build_error;
use solforge_analyze::scan_source;
use solforge_core::Cluster;
use solforge_core::Discriminator;
use solforge_core::LAMPORTS_PER_SOL;
use solforge_core::PdaError;
use solforge_core::Pubkey;
use solforge_core::derive_idl_address;
use solforge_core::discriminator;
use solforge_core::find_program_address;
use solforge_rpc::RpcClient;
use solforge_rpc::RpcClientConfig;
use solforge_rpc::RpcError;
use solforge_scaffold::ProjectSpec;
use solforge_scaffold::ScaffoldError;
use solforge_scaffold::scaffold_project;

use crate::config::ServerConfig;
use crate::registry::RegistryError;
use crate::registry::ToolError;
use crate::registry::ToolHandler;
use crate::registry::ToolRegistry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default number of program accounts returned.
const DEFAULT_ACCOUNT_LIMIT: usize = 10;
/// Maximum number of program accounts returned.
const MAX_ACCOUNT_LIMIT: usize = 100;
/// Airdrop ceiling in SOL.
const MAX_AIRDROP_SOL: f64 = 2.0;
/// Byte length of an Ed25519 transaction signature.
const SIGNATURE_LEN: usize = 64;

// ============================================================================
// SECTION: Registry Construction
// ============================================================================

/// Builds the full Solforge tool registry.
///
/// # Errors
///
/// Returns [`RegistryError`] when a declared schema does not compile.
pub fn default_registry(config: &ServerConfig) -> Result<ToolRegistry, RegistryError> {
    let ctx = RpcContext {
        default_network: config.default_network,
        rpc_config: RpcClientConfig {
            timeout_ms: config.rpc_timeout_ms,
            ..RpcClientConfig::default()
        },
    };
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(DerivePdaTool))?;
    registry.register(Box::new(DeriveDiscriminatorTool))?;
    registry.register(Box::new(DeriveIdlAddressTool))?;
    registry.register(Box::new(GetBalanceTool { ctx: ctx.clone() }))?;
    registry.register(Box::new(GetAccountInfoTool { ctx: ctx.clone() }))?;
    registry.register(Box::new(GetProgramAccountsTool { ctx: ctx.clone() }))?;
    registry.register(Box::new(GetTransactionTool { ctx: ctx.clone() }))?;
    registry.register(Box::new(RequestAirdropTool { ctx }))?;
    registry.register(Box::new(ScanVulnerabilitiesTool))?;
    registry.register(Box::new(AnalyzeBuildErrorTool))?;
    registry.register(Box::new(CreateAnchorProjectTool))?;
    Ok(registry)
}

// ============================================================================
// SECTION: Shared Helpers
// ============================================================================

/// Settings shared by the RPC-backed tools.
#[derive(Debug, Clone)]
struct RpcContext {
    /// Cluster used when a call names no network.
    default_network: Cluster,
    /// Client settings for upstream calls.
    rpc_config: RpcClientConfig,
}

impl RpcContext {
    /// Resolves the endpoint and network label for one call. A raw
    /// `rpcUrl` override wins over the network selector.
    fn resolve(&self, network: Option<&str>, rpc_url: Option<&str>) -> (String, String) {
        if let Some(url) = rpc_url {
            return (url.to_string(), "custom".to_string());
        }
        let cluster = network
            .map_or(self.default_network, Cluster::from_selector);
        (cluster.endpoint().to_string(), cluster.as_str().to_string())
    }

    /// Builds a client for the endpoint.
    fn client(&self, endpoint: &str) -> Result<RpcClient, ToolError> {
        RpcClient::new(endpoint, &self.rpc_config).map_err(|err| match err {
            RpcError::InvalidUrl(url) => ToolError::Invalid(format!("invalid rpc url: {url}")),
            _ => ToolError::Internal("rpc client construction failed".to_string()),
        })
    }
}

/// Decodes validated arguments into a typed request struct.
fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolError> {
    serde_json::from_value(arguments).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Parses a Base58 public key, naming the field on failure.
fn parse_pubkey(field: &str, text: &str) -> Result<Pubkey, ToolError> {
    text.parse::<Pubkey>()
        .map_err(|_| ToolError::Invalid(format!("invalid {field}: {text}")))
}

/// Maps an upstream RPC failure into a tool error.
fn map_rpc_error(err: RpcError) -> ToolError {
    match err {
        RpcError::Timeout => ToolError::Upstream {
            message: "rpc request timed out".to_string(),
            details: None,
        },
        RpcError::Transport(message) => ToolError::Upstream {
            message,
            details: None,
        },
        RpcError::ResponseTooLarge => ToolError::Upstream {
            message: "rpc response exceeds size limit".to_string(),
            details: None,
        },
        RpcError::Malformed(detail) => ToolError::Upstream {
            message: "malformed rpc response".to_string(),
            details: Some(detail),
        },
        RpcError::Node { code, message } => ToolError::Upstream {
            message,
            details: Some(format!("node error code {code}")),
        },
        RpcError::InvalidUrl(url) => ToolError::Invalid(format!("invalid rpc url: {url}")),
        RpcError::ClientBuild => {
            ToolError::Internal("rpc client construction failed".to_string())
        }
    }
}

/// Converts lamports to a SOL decimal for display.
#[allow(
    clippy::cast_precision_loss,
    reason = "Display value only; exact lamports are returned alongside."
)]
fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Converts a clamped SOL amount to lamports.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    reason = "Amount is clamped to the airdrop ceiling before the cast."
)]
fn sol_to_lamports(sol: f64) -> u64 {
    (sol * LAMPORTS_PER_SOL as f64) as u64
}

// ============================================================================
// SECTION: Derivation Tools
// ============================================================================

/// Arguments for `derive_pda`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DerivePdaArgs {
    /// Base58 program id.
    program_id: String,
    /// Ordered UTF-8 seed strings.
    seeds: Vec<String>,
}

/// Derives a program derived address from seeds.
struct DerivePdaTool;

impl ToolHandler for DerivePdaTool {
    fn name(&self) -> &'static str {
        "derive_pda"
    }

    fn description(&self) -> &'static str {
        "Derives a program derived address and bump from ordered seeds."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "programId": {
                    "type": "string",
                    "description": "Base58 program id"
                },
                "seeds": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Ordered seed strings, each at most 32 bytes"
                }
            },
            "required": ["programId", "seeds"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: DerivePdaArgs = parse_args(arguments)?;
        let program_id = parse_pubkey("program id", &args.program_id)?;
        let seed_bytes: Vec<&[u8]> = args.seeds.iter().map(String::as_bytes).collect();
        let derived =
            find_program_address(&seed_bytes, &program_id).map_err(|err| match err {
                PdaError::DerivationExhausted => ToolError::Exhausted(err.to_string()),
                _ => ToolError::Invalid(err.to_string()),
            })?;
        Ok(json!({
            "success": true,
            "pda": derived.address.to_string(),
            "bump": derived.bump,
            "programId": args.program_id,
            "seeds": args.seeds,
        }))
    }
}

/// Arguments for `derive_discriminator`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeriveDiscriminatorArgs {
    /// Instruction or account name.
    instruction_name: String,
    /// Domain-separation namespace.
    namespace: Option<String>,
}

/// Derives an 8-byte Anchor discriminator.
struct DeriveDiscriminatorTool;

impl ToolHandler for DeriveDiscriminatorTool {
    fn name(&self) -> &'static str {
        "derive_discriminator"
    }

    fn description(&self) -> &'static str {
        "Derives the 8-byte Anchor discriminator for an instruction name."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "instructionName": {
                    "type": "string",
                    "description": "Instruction or account name"
                },
                "namespace": {
                    "type": "string",
                    "description": "Namespace, defaults to \"global\""
                }
            },
            "required": ["instructionName"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: DeriveDiscriminatorArgs = parse_args(arguments)?;
        let namespace = args
            .namespace
            .unwrap_or_else(|| discriminator::DEFAULT_NAMESPACE.to_string());
        let disc = Discriminator::derive(&namespace, &args.instruction_name)
            .map_err(|err| ToolError::Invalid(err.to_string()))?;
        Ok(json!({
            "success": true,
            "namespace": namespace,
            "instructionName": args.instruction_name,
            "preimage": discriminator::preimage(&namespace, &args.instruction_name),
            "hex": disc.to_hex(),
            "bytes": disc.to_bytes(),
        }))
    }
}

/// Arguments for `derive_idl_address`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeriveIdlAddressArgs {
    /// Base58 program id.
    program_id: String,
}

/// Derives the canonical Anchor IDL account address.
struct DeriveIdlAddressTool;

impl ToolHandler for DeriveIdlAddressTool {
    fn name(&self) -> &'static str {
        "derive_idl_address"
    }

    fn description(&self) -> &'static str {
        "Derives the canonical Anchor IDL account address for a program."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "programId": {
                    "type": "string",
                    "description": "Base58 program id"
                }
            },
            "required": ["programId"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: DeriveIdlAddressArgs = parse_args(arguments)?;
        let program_id = parse_pubkey("program id", &args.program_id)?;
        let address = derive_idl_address(&program_id).map_err(|err| match err {
            PdaError::DerivationExhausted => ToolError::Exhausted(err.to_string()),
            _ => ToolError::Invalid(err.to_string()),
        })?;
        Ok(json!({
            "success": true,
            "programId": args.program_id,
            "idlAddress": address.to_string(),
        }))
    }
}

// ============================================================================
// SECTION: RPC Tools
// ============================================================================

/// Arguments for `get_balance`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetBalanceArgs {
    /// Base58 account address.
    address: String,
    /// Network selector.
    network: Option<String>,
    /// Raw endpoint override.
    rpc_url: Option<String>,
}

/// Fetches the lamport balance of an address.
struct GetBalanceTool {
    /// Shared RPC settings.
    ctx: RpcContext,
}

impl ToolHandler for GetBalanceTool {
    fn name(&self) -> &'static str {
        "get_balance"
    }

    fn description(&self) -> &'static str {
        "Fetches the lamport and SOL balance of an address."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": { "type": "string", "description": "Base58 address" },
                "network": { "type": "string", "description": "Network selector" },
                "rpcUrl": { "type": "string", "description": "Endpoint override" }
            },
            "required": ["address"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: GetBalanceArgs = parse_args(arguments)?;
        let address = parse_pubkey("address", &args.address)?;
        let (endpoint, network) =
            self.ctx.resolve(args.network.as_deref(), args.rpc_url.as_deref());
        let client = self.ctx.client(&endpoint)?;
        let lamports = client.get_balance(&address).map_err(map_rpc_error)?;
        Ok(json!({
            "success": true,
            "address": args.address,
            "network": network,
            "lamports": lamports,
            "sol": lamports_to_sol(lamports),
        }))
    }
}

/// Arguments for `get_account_info`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetAccountInfoArgs {
    /// Base58 account address.
    address: String,
    /// Network selector.
    network: Option<String>,
    /// Raw endpoint override.
    rpc_url: Option<String>,
}

/// Fetches account state, treating absence as a normal outcome.
struct GetAccountInfoTool {
    /// Shared RPC settings.
    ctx: RpcContext,
}

impl ToolHandler for GetAccountInfoTool {
    fn name(&self) -> &'static str {
        "get_account_info"
    }

    fn description(&self) -> &'static str {
        "Fetches account owner, balance, and data; absence is exists:false."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": { "type": "string", "description": "Base58 address" },
                "network": { "type": "string", "description": "Network selector" },
                "rpcUrl": { "type": "string", "description": "Endpoint override" }
            },
            "required": ["address"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: GetAccountInfoArgs = parse_args(arguments)?;
        let address = parse_pubkey("address", &args.address)?;
        let (endpoint, network) =
            self.ctx.resolve(args.network.as_deref(), args.rpc_url.as_deref());
        let client = self.ctx.client(&endpoint)?;
        let account = client.get_account_info(&address).map_err(map_rpc_error)?;
        match account {
            None => Ok(json!({
                "success": true,
                "address": args.address,
                "network": network,
                "exists": false,
            })),
            Some(info) => Ok(json!({
                "success": true,
                "address": args.address,
                "network": network,
                "exists": true,
                "owner": info.owner,
                "lamports": info.lamports,
                "executable": info.executable,
                "dataLen": info.data_len,
                "dataBase64": info.data_base64,
            })),
        }
    }
}

/// Arguments for `get_program_accounts`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetProgramAccountsArgs {
    /// Base58 program id.
    program_id: String,
    /// Network selector.
    network: Option<String>,
    /// Raw endpoint override.
    rpc_url: Option<String>,
    /// Maximum number of accounts returned.
    limit: Option<usize>,
    /// Exact account data size filter, in bytes.
    data_size: Option<u64>,
}

/// Lists accounts owned by a program, with an explicit truncation cap.
struct GetProgramAccountsTool {
    /// Shared RPC settings.
    ctx: RpcContext,
}

impl ToolHandler for GetProgramAccountsTool {
    fn name(&self) -> &'static str {
        "get_program_accounts"
    }

    fn description(&self) -> &'static str {
        "Lists accounts owned by a program, capped at a configurable limit."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "programId": { "type": "string", "description": "Base58 program id" },
                "network": { "type": "string", "description": "Network selector" },
                "rpcUrl": { "type": "string", "description": "Endpoint override" },
                "limit": {
                    "type": "integer",
                    "minimum": 1,
                    "description": "Maximum accounts returned, capped at 100"
                },
                "dataSize": {
                    "type": "integer",
                    "minimum": 0,
                    "description": "Exact data size filter in bytes"
                }
            },
            "required": ["programId"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: GetProgramAccountsArgs = parse_args(arguments)?;
        let program_id = parse_pubkey("program id", &args.program_id)?;
        let limit = args.limit.unwrap_or(DEFAULT_ACCOUNT_LIMIT).min(MAX_ACCOUNT_LIMIT);
        let (endpoint, network) =
            self.ctx.resolve(args.network.as_deref(), args.rpc_url.as_deref());
        let client = self.ctx.client(&endpoint)?;
        let accounts = client
            .get_program_accounts(&program_id, args.data_size)
            .map_err(map_rpc_error)?;
        let total = accounts.len();
        let returned: Vec<Value> = accounts
            .iter()
            .take(limit)
            .map(|account| {
                json!({
                    "pubkey": account.pubkey,
                    "lamports": account.lamports,
                    "dataLen": account.data_len,
                })
            })
            .collect();
        Ok(json!({
            "success": true,
            "programId": args.program_id,
            "network": network,
            "totalAccounts": total,
            "returnedAccounts": returned.len(),
            "accounts": returned,
        }))
    }
}

/// Arguments for `get_transaction`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GetTransactionArgs {
    /// Base58 transaction signature.
    signature: String,
    /// Network selector.
    network: Option<String>,
    /// Raw endpoint override.
    rpc_url: Option<String>,
}

/// Fetches a transaction summary, treating absence as a normal outcome.
struct GetTransactionTool {
    /// Shared RPC settings.
    ctx: RpcContext,
}

impl ToolHandler for GetTransactionTool {
    fn name(&self) -> &'static str {
        "get_transaction"
    }

    fn description(&self) -> &'static str {
        "Fetches a transaction summary; an unknown signature is exists:false."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "signature": {
                    "type": "string",
                    "description": "Base58 transaction signature"
                },
                "network": { "type": "string", "description": "Network selector" },
                "rpcUrl": { "type": "string", "description": "Endpoint override" }
            },
            "required": ["signature"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: GetTransactionArgs = parse_args(arguments)?;
        validate_signature(&args.signature)?;
        let (endpoint, network) =
            self.ctx.resolve(args.network.as_deref(), args.rpc_url.as_deref());
        let client = self.ctx.client(&endpoint)?;
        let transaction = client.get_transaction(&args.signature).map_err(map_rpc_error)?;
        match transaction {
            None => Ok(json!({
                "success": true,
                "signature": args.signature,
                "network": network,
                "exists": false,
            })),
            Some(tx) => Ok(json!({
                "success": true,
                "signature": args.signature,
                "network": network,
                "exists": true,
                "slot": tx.slot,
                "blockTime": tx.block_time,
                "fee": tx.fee,
                "status": if tx.success { "success" } else { "failed" },
                "error": tx.error,
                "logMessages": tx.log_messages,
                "programIds": tx.program_ids,
                "preBalances": tx.pre_balances,
                "postBalances": tx.post_balances,
            })),
        }
    }
}

/// Rejects text that is not a Base58 64-byte signature.
fn validate_signature(signature: &str) -> Result<(), ToolError> {
    let decoded = bs58::decode(signature)
        .into_vec()
        .map_err(|_| ToolError::Invalid(format!("invalid signature: {signature}")))?;
    if decoded.len() != SIGNATURE_LEN {
        return Err(ToolError::Invalid(format!("invalid signature: {signature}")));
    }
    Ok(())
}

/// Arguments for `request_airdrop`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RequestAirdropArgs {
    /// Base58 recipient address.
    address: String,
    /// Network selector.
    network: Option<String>,
    /// Raw endpoint override.
    rpc_url: Option<String>,
    /// Requested amount in SOL, defaults to 1.
    sol: Option<f64>,
}

/// Requests a faucet airdrop on a test network.
struct RequestAirdropTool {
    /// Shared RPC settings.
    ctx: RpcContext,
}

impl ToolHandler for RequestAirdropTool {
    fn name(&self) -> &'static str {
        "request_airdrop"
    }

    fn description(&self) -> &'static str {
        "Requests a faucet airdrop on devnet, testnet, or a local validator."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "address": { "type": "string", "description": "Base58 address" },
                "network": { "type": "string", "description": "Network selector" },
                "rpcUrl": { "type": "string", "description": "Endpoint override" },
                "sol": {
                    "type": "number",
                    "description": "Amount in SOL, capped at 2"
                }
            },
            "required": ["address"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: RequestAirdropArgs = parse_args(arguments)?;
        let address = parse_pubkey("address", &args.address)?;
        // A raw endpoint override is assumed to target a test validator.
        if args.rpc_url.is_none() {
            let cluster = args
                .network
                .as_deref()
                .map_or(self.ctx.default_network, Cluster::from_selector);
            if !cluster.supports_airdrop() {
                return Err(ToolError::Invalid(format!(
                    "airdrop is not available on {cluster}"
                )));
            }
        }
        let requested = args.sol.unwrap_or(1.0);
        if !requested.is_finite() || requested <= 0.0 {
            return Err(ToolError::Invalid("airdrop amount must be positive".to_string()));
        }
        let clamped = requested.min(MAX_AIRDROP_SOL);
        let lamports = sol_to_lamports(clamped);
        let (endpoint, network) =
            self.ctx.resolve(args.network.as_deref(), args.rpc_url.as_deref());
        let client = self.ctx.client(&endpoint)?;
        let signature = client.request_airdrop(&address, lamports).map_err(map_rpc_error)?;
        let post_balance = client.get_balance(&address).ok();
        Ok(json!({
            "success": true,
            "address": args.address,
            "network": network,
            "requestedSol": clamped,
            "lamports": lamports,
            "signature": signature,
            "postBalanceLamports": post_balance,
        }))
    }
}

// ============================================================================
// SECTION: Analysis Tools
// ============================================================================

/// Arguments for `scan_vulnerabilities`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScanVulnerabilitiesArgs {
    /// Program source text to scan.
    source: String,
    /// Optional file name echoed into the report.
    file_name: Option<String>,
}

/// Runs the lexical vulnerability pattern scan.
struct ScanVulnerabilitiesTool;

impl ToolHandler for ScanVulnerabilitiesTool {
    fn name(&self) -> &'static str {
        "scan_vulnerabilities"
    }

    fn description(&self) -> &'static str {
        "Scans Anchor program source for known vulnerability patterns."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "source": { "type": "string", "description": "Source text to scan" },
                "fileName": { "type": "string", "description": "Display name" }
            },
            "required": ["source"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: ScanVulnerabilitiesArgs = parse_args(arguments)?;
        let report = scan_source(&args.source)
            .map_err(|err| ToolError::Internal(err.to_string()))?;
        let findings =
            serde_json::to_value(&report.findings).map_err(|_| ToolError::Serialization)?;
        Ok(json!({
            "success": true,
            "fileName": args.file_name,
            "totalFindings": report.findings.len(),
            "counts": {
                "critical": report.critical,
                "high": report.high,
                "medium": report.medium,
                "low": report.low,
            },
            "findings": findings,
        }))
    }
}

/// Arguments for `analyze_build_error`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeBuildErrorArgs {
    /// Compiler or Anchor build output to categorize.
    error_text: String,
}

/// Categorizes build output against a table of known diagnostics.
struct AnalyzeBuildErrorTool;

impl ToolHandler for AnalyzeBuildErrorTool {
    fn name(&self) -> &'static str {
        "analyze_build_error"
    }

    fn description(&self) -> &'static str {
        "Categorizes a build error and suggests a concrete fix."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "errorText": {
                    "type": "string",
                    "description": "Compiler or Anchor build output"
                }
            },
            "required": ["errorText"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: AnalyzeBuildErrorArgs = parse_args(arguments)?;
        let diagnosis = analyze_build_error(&args.error_text);
        Ok(json!({
            "success": true,
            "recognized": diagnosis.recognized,
            "category": diagnosis.category,
            "summary": diagnosis.summary,
            "suggestedFix": diagnosis.suggested_fix,
        }))
    }
}

// ============================================================================
// SECTION: Scaffolding Tool
// ============================================================================

/// Arguments for `create_anchor_project`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateAnchorProjectArgs {
    /// Project and program crate name.
    name: String,
    /// Directory the project root is created under.
    directory: String,
}

/// Writes a fresh Anchor project skeleton.
struct CreateAnchorProjectTool;

impl ToolHandler for CreateAnchorProjectTool {
    fn name(&self) -> &'static str {
        "create_anchor_project"
    }

    fn description(&self) -> &'static str {
        "Creates an Anchor project skeleton in an empty directory."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Project name, lowercase crate identifier"
                },
                "directory": {
                    "type": "string",
                    "description": "Parent directory for the project root"
                }
            },
            "required": ["name", "directory"],
            "additionalProperties": false
        })
    }

    fn handle(&self, arguments: Value) -> Result<Value, ToolError> {
        let args: CreateAnchorProjectArgs = parse_args(arguments)?;
        let spec = ProjectSpec {
            name: args.name.clone(),
            directory: PathBuf::from(&args.directory),
        };
        let files = scaffold_project(&spec).map_err(|err| match err {
            ScaffoldError::Io(message) => ToolError::Io(message),
            other => ToolError::Invalid(other.to_string()),
        })?;
        let root = spec.directory.join(&spec.name);
        Ok(json!({
            "success": true,
            "name": args.name,
            "projectRoot": root.display().to_string(),
            "files": files,
        }))
    }
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

    use serde_json::json;

    use super::*;

    /// System program id, valid Base58 for 32 zero bytes.
    const SYSTEM_PROGRAM: &str = "11111111111111111111111111111111";

    #[test]
    fn registry_holds_the_full_tool_set() {
        let registry =
            default_registry(&ServerConfig::default()).expect("registry builds");
        let names: Vec<String> =
            registry.descriptors().into_iter().map(|d| d.name).collect();
        assert_eq!(names.len(), 11);
        for name in [
            "derive_pda",
            "derive_discriminator",
            "derive_idl_address",
            "get_balance",
            "get_account_info",
            "get_program_accounts",
            "get_transaction",
            "request_airdrop",
            "scan_vulnerabilities",
            "analyze_build_error",
            "create_anchor_project",
        ] {
            assert!(names.contains(&name.to_string()), "missing tool {name}");
        }
    }

    #[test]
    fn derive_pda_returns_a_valid_address() {
        let result = DerivePdaTool
            .handle(json!({
                "programId": SYSTEM_PROGRAM,
                "seeds": ["metadata", "test"],
            }))
            .expect("derivation succeeds");
        assert_eq!(result["success"], true);
        let bump = result["bump"].as_u64().expect("bump present");
        assert!(bump <= 255);
        let address = result["pda"].as_str().expect("pda present");
        assert!(address.parse::<Pubkey>().is_ok());
    }

    #[test]
    fn derive_pda_is_deterministic() {
        let args = json!({ "programId": SYSTEM_PROGRAM, "seeds": ["vault"] });
        let first = DerivePdaTool.handle(args.clone()).expect("first derivation");
        let second = DerivePdaTool.handle(args).expect("second derivation");
        assert_eq!(first, second);
    }

    #[test]
    fn derive_pda_rejects_invalid_program_id() {
        let err = DerivePdaTool
            .handle(json!({ "programId": "invalid", "seeds": ["a"] }))
            .unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
        assert!(err.to_string().contains("program id"));
    }

    #[test]
    fn derive_pda_rejects_empty_seed_list() {
        let err = DerivePdaTool
            .handle(json!({ "programId": SYSTEM_PROGRAM, "seeds": [] }))
            .unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
    }

    #[test]
    fn discriminators_differ_across_names() {
        let init = DeriveDiscriminatorTool
            .handle(json!({ "instructionName": "initialize" }))
            .expect("initialize derivation");
        let transfer = DeriveDiscriminatorTool
            .handle(json!({ "instructionName": "transfer" }))
            .expect("transfer derivation");
        let init_hex = init["hex"].as_str().expect("hex present");
        assert_eq!(init_hex.len(), 16);
        assert_ne!(init_hex, transfer["hex"].as_str().expect("hex present"));
        assert_eq!(init["preimage"], "global:initialize");
    }

    #[test]
    fn discriminator_namespace_is_mixed_in() {
        let global = DeriveDiscriminatorTool
            .handle(json!({ "instructionName": "x" }))
            .expect("global derivation");
        let account = DeriveDiscriminatorTool
            .handle(json!({ "instructionName": "x", "namespace": "account" }))
            .expect("account derivation");
        assert_ne!(global["hex"], account["hex"]);
    }

    #[test]
    fn empty_instruction_name_is_rejected() {
        let err = DeriveDiscriminatorTool
            .handle(json!({ "instructionName": "" }))
            .unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
    }

    #[test]
    fn idl_address_is_deterministic_and_distinct() {
        let args = json!({ "programId": SYSTEM_PROGRAM });
        let first = DeriveIdlAddressTool.handle(args.clone()).expect("first derivation");
        let second = DeriveIdlAddressTool.handle(args).expect("second derivation");
        assert_eq!(first["idlAddress"], second["idlAddress"]);
        assert_ne!(first["idlAddress"].as_str(), Some(SYSTEM_PROGRAM));
    }

    #[test]
    fn balance_query_rejects_invalid_pubkey_before_any_network_call() {
        let tool = GetBalanceTool {
            ctx: RpcContext {
                default_network: Cluster::Devnet,
                rpc_config: RpcClientConfig::default(),
            },
        };
        let err = tool.handle(json!({ "address": "not-base58!" })).unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
    }

    #[test]
    fn airdrop_rejects_mainnet_before_any_network_call() {
        let tool = RequestAirdropTool {
            ctx: RpcContext {
                default_network: Cluster::Devnet,
                rpc_config: RpcClientConfig::default(),
            },
        };
        let err = tool
            .handle(json!({ "address": SYSTEM_PROGRAM, "network": "mainnet-beta" }))
            .unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
        assert!(err.to_string().contains("airdrop"));
    }

    #[test]
    fn airdrop_rejects_non_positive_amounts() {
        let tool = RequestAirdropTool {
            ctx: RpcContext {
                default_network: Cluster::Devnet,
                rpc_config: RpcClientConfig::default(),
            },
        };
        let err = tool
            .handle(json!({ "address": SYSTEM_PROGRAM, "sol": 0.0 }))
            .unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
    }

    #[test]
    fn signature_validation_requires_64_bytes() {
        assert!(validate_signature(SYSTEM_PROGRAM).is_err());
        assert!(validate_signature("not base58 at all!").is_err());
        let valid = bs58::encode([7u8; 64]).into_string();
        assert!(validate_signature(&valid).is_ok());
    }

    #[test]
    fn endpoint_override_wins_over_network_selector() {
        let ctx = RpcContext {
            default_network: Cluster::Devnet,
            rpc_config: RpcClientConfig::default(),
        };
        let (endpoint, network) =
            ctx.resolve(Some("mainnet-beta"), Some("http://127.0.0.1:8899"));
        assert_eq!(endpoint, "http://127.0.0.1:8899");
        assert_eq!(network, "custom");
        let (endpoint, network) = ctx.resolve(Some("unknown-net"), None);
        assert_eq!(endpoint, Cluster::Devnet.endpoint());
        assert_eq!(network, "devnet");
    }

    #[test]
    fn amount_conversions_round_trip_whole_sol() {
        assert_eq!(sol_to_lamports(2.0), 2 * LAMPORTS_PER_SOL);
        let close = (lamports_to_sol(1_500_000_000) - 1.5).abs();
        assert!(close < 1e-9);
    }

    #[test]
    fn scan_tool_reports_counts() {
        let source = "let x = ctx.accounts.vault.to_account_info();";
        let result = ScanVulnerabilitiesTool
            .handle(json!({ "source": source, "fileName": "lib.rs" }))
            .expect("scan succeeds");
        assert_eq!(result["success"], true);
        assert_eq!(result["fileName"], "lib.rs");
        assert!(result["totalFindings"].as_u64().is_some());
    }

    #[test]
    fn build_error_tool_recognizes_known_diagnostics() {
        let result = AnalyzeBuildErrorTool
            .handle(json!({ "errorText": "error[E0382]: borrow of moved value: `data`" }))
            .expect("analysis succeeds");
        assert_eq!(result["recognized"], true);
        let unknown = AnalyzeBuildErrorTool
            .handle(json!({ "errorText": "something nobody has seen" }))
            .expect("analysis succeeds");
        assert_eq!(unknown["recognized"], false);
    }

    #[test]
    fn scaffold_tool_writes_and_lists_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = CreateAnchorProjectTool
            .handle(json!({
                "name": "demo_vault",
                "directory": dir.path().display().to_string(),
            }))
            .expect("scaffold succeeds");
        assert_eq!(result["success"], true);
        let files = result["files"].as_array().expect("files listed");
        assert_eq!(files.len(), 6);
        let err = CreateAnchorProjectTool
            .handle(json!({
                "name": "demo_vault",
                "directory": dir.path().display().to_string(),
            }))
            .unwrap_err();
        assert!(matches!(err, ToolError::Invalid(_)));
    }
}
