// crates/solforge-rpc/src/lib.rs
// ============================================================================
// Module: Solforge RPC
// Description: Bounded JSON-RPC client for Solana node queries.
// Purpose: Wrap each upstream node query behind one typed method.
// Dependencies: reqwest, serde_json, solforge-core, url
// ============================================================================

//! ## Overview
//! This crate issues single-shot JSON-RPC 2.0 calls to a Solana node.
//! Every request carries a bounded timeout and a response size limit, and
//! every upstream failure surfaces as a typed [`RpcError`] so callers can
//! normalize it into a structured tool result instead of crashing the
//! transport. Nothing here retries, caches, or holds a connection across
//! calls.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod queries;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::RpcClient;
pub use client::RpcClientConfig;
pub use client::RpcError;
pub use queries::AccountInfo;
pub use queries::KeyedAccount;
pub use queries::TransactionInfo;
