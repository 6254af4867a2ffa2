// crates/solforge-rpc/src/queries.rs
// ============================================================================
// Module: Node Queries
// Description: Typed wrappers over individual Solana RPC methods.
// Purpose: Normalize node replies into plain value types.
// Dependencies: base64, serde, serde_json, solforge-core
// ============================================================================

//! ## Overview
//! One method per upstream query. Each wrapper issues exactly one node
//! call and reshapes the reply into a plain struct. Absence of an account
//! or transaction is `None`, not an error; only transport and protocol
//! failures surface as [`RpcError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use solforge_core::Pubkey;

use crate::client::RpcClient;
use crate::client::RpcError;

// ============================================================================
// SECTION: Reply Types
// ============================================================================

/// Normalized account state returned by `getAccountInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountInfo {
    /// Account balance in lamports.
    pub lamports: u64,
    /// Base58 address of the owning program.
    pub owner: String,
    /// True when the account holds an executable program.
    pub executable: bool,
    /// Account data as base64 text.
    pub data_base64: String,
    /// Decoded account data length in bytes.
    pub data_len: usize,
}

/// One account returned by `getProgramAccounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyedAccount {
    /// Base58 address of the account.
    pub pubkey: String,
    /// Account balance in lamports.
    pub lamports: u64,
    /// Decoded account data length in bytes.
    pub data_len: usize,
}

/// Normalized transaction summary returned by `getTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionInfo {
    /// Slot the transaction landed in.
    pub slot: u64,
    /// Block time in Unix seconds, when the node recorded one.
    pub block_time: Option<i64>,
    /// Fee paid, in lamports.
    pub fee: u64,
    /// True when the transaction executed without error.
    pub success: bool,
    /// Node-reported error payload, serialized, when execution failed.
    pub error: Option<String>,
    /// Program log messages.
    pub log_messages: Vec<String>,
    /// Base58 program ids of the top-level instructions.
    pub program_ids: Vec<String>,
    /// Account balances before execution, in lamports.
    pub pre_balances: Vec<u64>,
    /// Account balances after execution, in lamports.
    pub post_balances: Vec<u64>,
}

// ============================================================================
// SECTION: Query Methods
// ============================================================================

impl RpcClient {
    /// Fetches the lamport balance of an address.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] for transport failures or malformed replies.
    pub fn get_balance(&self, address: &Pubkey) -> Result<u64, RpcError> {
        let result = self.call("getBalance", json!([address.to_string()]))?;
        context_value(&result)?
            .as_u64()
            .ok_or_else(|| RpcError::Malformed("balance is not a u64".to_string()))
    }

    /// Fetches an account, returning `None` when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] for transport failures or malformed replies.
    pub fn get_account_info(&self, address: &Pubkey) -> Result<Option<AccountInfo>, RpcError> {
        let result = self.call(
            "getAccountInfo",
            json!([address.to_string(), {"encoding": "base64"}]),
        )?;
        parse_account(context_value(&result)?)
    }

    /// Fetches accounts owned by a program, optionally filtered by data
    /// size.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] for transport failures or malformed replies.
    pub fn get_program_accounts(
        &self,
        program_id: &Pubkey,
        data_size: Option<u64>,
    ) -> Result<Vec<KeyedAccount>, RpcError> {
        let mut options = json!({"encoding": "base64"});
        if let (Some(size), Value::Object(map)) = (data_size, &mut options) {
            map.insert("filters".to_string(), json!([{"dataSize": size}]));
        }
        let result = self.call("getProgramAccounts", json!([program_id.to_string(), options]))?;
        parse_program_accounts(&result)
    }

    /// Fetches a transaction summary, returning `None` when the node has
    /// no record of the signature.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] for transport failures or malformed replies.
    pub fn get_transaction(&self, signature: &str) -> Result<Option<TransactionInfo>, RpcError> {
        let result = self.call(
            "getTransaction",
            json!([signature, {"encoding": "jsonParsed", "maxSupportedTransactionVersion": 0}]),
        )?;
        parse_transaction(&result)
    }

    /// Requests a faucet airdrop and returns the transaction signature.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError`] for transport failures or malformed replies.
    pub fn request_airdrop(&self, address: &Pubkey, lamports: u64) -> Result<String, RpcError> {
        let result = self.call("requestAirdrop", json!([address.to_string(), lamports]))?;
        result
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| RpcError::Malformed("airdrop signature is not a string".to_string()))
    }
}

// ============================================================================
// SECTION: Reply Parsing
// ============================================================================

/// Unwraps the `{context, value}` envelope used by stateful queries.
fn context_value(result: &Value) -> Result<&Value, RpcError> {
    result.get("value").ok_or_else(|| RpcError::Malformed("reply has no value".to_string()))
}

/// Parses an account object, treating JSON null as absence.
fn parse_account(value: &Value) -> Result<Option<AccountInfo>, RpcError> {
    if value.is_null() {
        return Ok(None);
    }
    let lamports = u64_field(value, "lamports")?;
    let owner = str_field(value, "owner")?.to_string();
    let executable = value.get("executable").and_then(Value::as_bool).unwrap_or(false);
    let data_base64 = account_data_base64(value)?;
    let data_len = BASE64
        .decode(&data_base64)
        .map_err(|_| RpcError::Malformed("account data is not base64".to_string()))?
        .len();
    Ok(Some(AccountInfo {
        lamports,
        owner,
        executable,
        data_base64,
        data_len,
    }))
}

/// Extracts the base64 payload from the `[data, encoding]` pair.
fn account_data_base64(account: &Value) -> Result<String, RpcError> {
    let data = account
        .get("data")
        .ok_or_else(|| RpcError::Malformed("account has no data field".to_string()))?;
    match data {
        Value::Array(parts) => parts
            .first()
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RpcError::Malformed("account data pair is malformed".to_string())),
        Value::String(text) => Ok(text.clone()),
        _ => Err(RpcError::Malformed("account data has unexpected shape".to_string())),
    }
}

/// Parses the `getProgramAccounts` reply list.
fn parse_program_accounts(result: &Value) -> Result<Vec<KeyedAccount>, RpcError> {
    let entries = result
        .as_array()
        .ok_or_else(|| RpcError::Malformed("program accounts reply is not a list".to_string()))?;
    let mut accounts = Vec::with_capacity(entries.len());
    for entry in entries {
        let pubkey = str_field(entry, "pubkey")?.to_string();
        let account = entry
            .get("account")
            .ok_or_else(|| RpcError::Malformed("entry has no account field".to_string()))?;
        let lamports = u64_field(account, "lamports")?;
        let data_len = match account_data_base64(account) {
            Ok(data) => BASE64
                .decode(&data)
                .map_err(|_| RpcError::Malformed("account data is not base64".to_string()))?
                .len(),
            Err(_) => 0,
        };
        accounts.push(KeyedAccount {
            pubkey,
            lamports,
            data_len,
        });
    }
    Ok(accounts)
}

/// Parses a `getTransaction` reply, treating JSON null as absence.
fn parse_transaction(result: &Value) -> Result<Option<TransactionInfo>, RpcError> {
    if result.is_null() {
        return Ok(None);
    }
    let slot = u64_field(result, "slot")?;
    let block_time = result.get("blockTime").and_then(Value::as_i64);
    let meta = result
        .get("meta")
        .ok_or_else(|| RpcError::Malformed("transaction has no meta".to_string()))?;
    let fee = u64_field(meta, "fee")?;
    let error = meta.get("err").filter(|err| !err.is_null()).map(Value::to_string);
    let log_messages = meta
        .get("logMessages")
        .and_then(Value::as_array)
        .map(|logs| logs.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default();
    let pre_balances = u64_list(meta.get("preBalances"));
    let post_balances = u64_list(meta.get("postBalances"));
    let program_ids = result
        .get("transaction")
        .and_then(|tx| tx.get("message"))
        .and_then(|message| message.get("instructions"))
        .and_then(Value::as_array)
        .map(|instructions| {
            instructions
                .iter()
                .filter_map(|instruction| instruction.get("programId"))
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();
    Ok(Some(TransactionInfo {
        slot,
        block_time,
        fee,
        success: error.is_none(),
        error,
        log_messages,
        program_ids,
        pre_balances,
        post_balances,
    }))
}

/// Reads a required u64 field from a JSON object.
fn u64_field(value: &Value, name: &str) -> Result<u64, RpcError> {
    value
        .get(name)
        .and_then(Value::as_u64)
        .ok_or_else(|| RpcError::Malformed(format!("missing u64 field {name}")))
}

/// Reads a required string field from a JSON object.
fn str_field<'a>(value: &'a Value, name: &str) -> Result<&'a str, RpcError> {
    value
        .get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| RpcError::Malformed(format!("missing string field {name}")))
}

/// Reads an optional list of u64 values.
fn u64_list(value: Option<&Value>) -> Vec<u64> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_u64).collect())
        .unwrap_or_default()
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

    use super::parse_account;
    use super::parse_program_accounts;
    use super::parse_transaction;
    use crate::client::RpcError;

    #[test]
    fn null_account_is_absent() {
        let parsed = parse_account(&json!(null)).expect("parse succeeds");
        assert!(parsed.is_none());
    }

    #[test]
    fn account_fields_are_normalized() {
        let value = json!({
            "lamports": 1_000_000u64,
            "owner": "11111111111111111111111111111111",
            "executable": false,
            "data": ["aGVsbG8=", "base64"],
        });
        let account = parse_account(&value).expect("parse succeeds").expect("account present");
        assert_eq!(account.lamports, 1_000_000);
        assert_eq!(account.owner, "11111111111111111111111111111111");
        assert_eq!(account.data_len, 5);
    }

    #[test]
    fn reply_types_serialize_with_camel_case_keys() {
        let value = json!({
            "lamports": 1_000_000u64,
            "owner": "11111111111111111111111111111111",
            "executable": false,
            "data": ["aGVsbG8=", "base64"],
        });
        let account = parse_account(&value).expect("parse succeeds").expect("account present");
        let serialized = serde_json::to_value(&account).expect("serializes");
        assert_eq!(serialized["dataBase64"], "aGVsbG8=");
        assert_eq!(serialized["dataLen"], 5);
        assert_eq!(serialized["owner"], "11111111111111111111111111111111");
    }

    #[test]
    fn transaction_summary_serializes_with_camel_case_keys() {
        let value = json!({
            "slot": 9u64,
            "blockTime": 1_700_000_000i64,
            "meta": { "fee": 5_000u64, "err": null },
            "transaction": { "message": { "instructions": [] } },
        });
        let tx = parse_transaction(&value).expect("parse succeeds").expect("tx present");
        let serialized = serde_json::to_value(&tx).expect("serializes");
        assert_eq!(serialized["blockTime"], 1_700_000_000i64);
        assert_eq!(serialized["logMessages"], json!([]));
        assert_eq!(serialized["preBalances"], json!([]));
    }

    #[test]
    fn malformed_account_is_rejected() {
        let err = parse_account(&json!({"owner": "x"})).unwrap_err();
        assert!(matches!(err, RpcError::Malformed(_)));
    }

    #[test]
    fn program_accounts_list_is_parsed() {
        let value = json!([
            {
                "pubkey": "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T",
                "account": {
                    "lamports": 42u64,
                    "owner": "11111111111111111111111111111111",
                    "data": ["", "base64"],
                },
            },
        ]);
        let accounts = parse_program_accounts(&value).expect("parse succeeds");
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].lamports, 42);
        assert_eq!(accounts[0].data_len, 0);
    }

    #[test]
    fn null_transaction_is_absent() {
        let parsed = parse_transaction(&json!(null)).expect("parse succeeds");
        assert!(parsed.is_none());
    }

    #[test]
    fn transaction_summary_is_normalized() {
        let value = json!({
            "slot": 123u64,
            "blockTime": 1_700_000_000i64,
            "meta": {
                "fee": 5_000u64,
                "err": null,
                "logMessages": ["Program log: ok"],
                "preBalances": [10u64, 20u64],
                "postBalances": [5u64, 25u64],
            },
            "transaction": {
                "message": {
                    "instructions": [{"programId": "11111111111111111111111111111111"}],
                },
            },
        });
        let tx = parse_transaction(&value).expect("parse succeeds").expect("tx present");
        assert!(tx.success);
        assert_eq!(tx.fee, 5_000);
        assert_eq!(tx.program_ids, vec!["11111111111111111111111111111111".to_string()]);
        assert_eq!(tx.pre_balances, vec![10, 20]);
        assert_eq!(tx.post_balances, vec![5, 25]);
    }

    #[test]
    fn failed_transaction_keeps_error_payload() {
        let value = json!({
            "slot": 5u64,
            "meta": {
                "fee": 5_000u64,
                "err": {"InstructionError": [0, "Custom"]},
            },
            "transaction": {"message": {"instructions": []}},
        });
        let tx = parse_transaction(&value).expect("parse succeeds").expect("tx present");
        assert!(!tx.success);
        assert!(tx.error.is_some());
    }
}
