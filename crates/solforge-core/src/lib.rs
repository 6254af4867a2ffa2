// crates/solforge-core/src/lib.rs
// ============================================================================
// Module: Solforge Core
// Description: Deterministic Solana derivations and addressing primitives.
// Purpose: Provide the pure leaf logic shared by every Solforge tool.
// Dependencies: bs58, ed25519-dalek, serde, sha2
// ============================================================================

//! ## Overview
//! This crate holds the pure, I/O-free building blocks of Solforge: the
//! 32-byte public key value type, program derived address search, Anchor
//! instruction discriminator hashing, and the cluster endpoint table.
//! Every function here is deterministic; identical inputs always produce
//! identical outputs.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod cluster;
pub mod discriminator;
pub mod pda;
pub mod pubkey;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use cluster::Cluster;
pub use discriminator::DEFAULT_NAMESPACE;
pub use discriminator::Discriminator;
pub use discriminator::DiscriminatorError;
pub use pda::DerivedAddress;
pub use pda::MAX_SEED_LEN;
pub use pda::MAX_SEEDS;
pub use pda::PdaError;
pub use pda::create_address_with_seed;
pub use pda::derive_idl_address;
pub use pda::find_program_address;
pub use pubkey::Pubkey;
pub use pubkey::PubkeyError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Number of lamports in one SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;
