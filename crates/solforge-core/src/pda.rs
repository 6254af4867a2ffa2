// crates/solforge-core/src/pda.rs
// ============================================================================
// Module: Program Derived Addresses
// Description: Deterministic off-curve address search and seeded derivation.
// Purpose: Compute program-owned addresses that can never have private keys.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! A program derived address is the SHA-256 of the seed list, a single
//! bump byte, the program id, and a fixed domain marker. The search walks
//! the bump from 255 down to 0 and returns the first digest that does not
//! decompress to an Ed25519 point. The off-curve requirement is the whole
//! security property: no private key can exist for the returned address.
//!
//! ## Invariants
//! - Identical `(program_id, seeds)` inputs always yield the identical
//!   `(address, bump)` pair.
//! - A successful derivation never returns an on-curve address.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

use crate::pubkey::Pubkey;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum number of seeds accepted by a derivation.
pub const MAX_SEEDS: usize = 16;
/// Maximum byte length of a single seed.
pub const MAX_SEED_LEN: usize = 32;
/// Domain separator appended to every PDA preimage.
const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";
/// Seed string for the canonical Anchor IDL account derivation.
const IDL_SEED: &str = "anchor:idl";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by program derived address computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PdaError {
    /// No seeds were supplied.
    #[error("no seeds supplied")]
    MissingSeeds,
    /// A seed exceeded the per-seed byte ceiling.
    #[error("seed {index} is {len} bytes, maximum is {MAX_SEED_LEN}")]
    SeedTooLong {
        /// Zero-based position of the offending seed.
        index: usize,
        /// Byte length of the offending seed.
        len: usize,
    },
    /// The seed list exceeded the seed count ceiling.
    #[error("{0} seeds supplied, maximum is {MAX_SEEDS}")]
    TooManySeeds(usize),
    /// All 256 bump candidates decompressed to curve points.
    #[error("all 256 bump candidates landed on the curve")]
    DerivationExhausted,
}

// ============================================================================
// SECTION: Derived Address
// ============================================================================

/// Result of a successful program derived address search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedAddress {
    /// The derived off-curve address.
    pub address: Pubkey,
    /// Bump seed that forced the address off the curve.
    pub bump: u8,
}

// ============================================================================
// SECTION: Derivation
// ============================================================================

/// Finds the program derived address for the given seeds.
///
/// Seed ceilings are validated before any hashing happens.
///
/// # Errors
///
/// Returns [`PdaError::MissingSeeds`] for an empty seed list,
/// [`PdaError::TooManySeeds`] or [`PdaError::SeedTooLong`] when a ceiling
/// is exceeded, and [`PdaError::DerivationExhausted`] when every bump
/// candidate lands on the curve.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<DerivedAddress, PdaError> {
    if seeds.is_empty() {
        return Err(PdaError::MissingSeeds);
    }
    validate_seeds(seeds)?;
    search(seeds, program_id)
}

/// Derives an address from a base key, a string seed, and an owner.
///
/// This is the `create_with_seed` construction:
/// `SHA-256(base || seed || owner)`.
///
/// # Errors
///
/// Returns [`PdaError::SeedTooLong`] when the seed exceeds the per-seed
/// byte ceiling.
pub fn create_address_with_seed(
    base: &Pubkey,
    seed: &str,
    owner: &Pubkey,
) -> Result<Pubkey, PdaError> {
    if seed.len() > MAX_SEED_LEN {
        return Err(PdaError::SeedTooLong {
            index: 0,
            len: seed.len(),
        });
    }
    let mut hasher = Sha256::new();
    hasher.update(base.as_bytes());
    hasher.update(seed.as_bytes());
    hasher.update(owner.as_bytes());
    Ok(Pubkey::new(hasher.finalize().into()))
}

/// Derives the canonical IDL account address for a program.
///
/// Uses the Anchor convention: the empty-seed program address as base,
/// then the `create_with_seed` derivation with the program as owner.
///
/// # Errors
///
/// Returns [`PdaError::DerivationExhausted`] when the base search fails.
pub fn derive_idl_address(program_id: &Pubkey) -> Result<Pubkey, PdaError> {
    let base = search(&[], program_id)?;
    create_address_with_seed(&base.address, IDL_SEED, program_id)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Validates seed count and per-seed length ceilings.
fn validate_seeds(seeds: &[&[u8]]) -> Result<(), PdaError> {
    if seeds.len() > MAX_SEEDS {
        return Err(PdaError::TooManySeeds(seeds.len()));
    }
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(PdaError::SeedTooLong {
                index,
                len: seed.len(),
            });
        }
    }
    Ok(())
}

/// Walks bump candidates from 255 down to 0 and returns the first
/// off-curve digest.
fn search(seeds: &[&[u8]], program_id: &Pubkey) -> Result<DerivedAddress, PdaError> {
    for bump in (0u8..=255).rev() {
        let candidate = hash_candidate(seeds, bump, program_id);
        if !candidate.is_on_curve() {
            return Ok(DerivedAddress {
                address: candidate,
                bump,
            });
        }
    }
    Err(PdaError::DerivationExhausted)
}

/// Hashes one bump candidate preimage.
fn hash_candidate(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Pubkey {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    Pubkey::new(hasher.finalize().into())
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

    use super::DerivedAddress;
    use super::MAX_SEEDS;
    use super::PdaError;
    use super::derive_idl_address;
    use super::find_program_address;
    use crate::pubkey::Pubkey;

    /// Returns the system program id used as a fixture program.
    fn system_program() -> Pubkey {
        "11111111111111111111111111111111".parse().expect("system program parses")
    }

    #[test]
    fn derivation_is_deterministic() {
        let program = system_program();
        let seeds: &[&[u8]] = &[b"metadata", b"test"];
        let first = find_program_address(seeds, &program).expect("derivation succeeds");
        let second = find_program_address(seeds, &program).expect("derivation succeeds");
        assert_eq!(first, second);
    }

    #[test]
    fn derived_address_is_off_curve() {
        let program = system_program();
        let DerivedAddress {
            address,
            ..
        } = find_program_address(&[b"metadata", b"test"], &program).expect("derivation succeeds");
        assert!(!address.is_on_curve());
    }

    #[test]
    fn distinct_seeds_yield_distinct_addresses() {
        let program = system_program();
        let first = find_program_address(&[b"vault"], &program).expect("derivation succeeds");
        let second = find_program_address(&[b"treasury"], &program).expect("derivation succeeds");
        assert_ne!(first.address, second.address);
    }

    #[test]
    fn seed_order_matters() {
        let program = system_program();
        let forward =
            find_program_address(&[b"alpha", b"beta"], &program).expect("derivation succeeds");
        let reversed =
            find_program_address(&[b"beta", b"alpha"], &program).expect("derivation succeeds");
        assert_ne!(forward.address, reversed.address);
    }

    #[test]
    fn rejects_empty_seed_list() {
        let err = find_program_address(&[], &system_program()).unwrap_err();
        assert_eq!(err, PdaError::MissingSeeds);
    }

    #[test]
    fn rejects_oversized_seed() {
        let long = [0u8; 33];
        let err = find_program_address(&[&long], &system_program()).unwrap_err();
        assert_eq!(
            err,
            PdaError::SeedTooLong {
                index: 0,
                len: 33
            }
        );
    }

    #[test]
    fn rejects_too_many_seeds() {
        let seed: &[u8] = b"s";
        let seeds = vec![seed; MAX_SEEDS + 1];
        let err = find_program_address(&seeds, &system_program()).unwrap_err();
        assert_eq!(err, PdaError::TooManySeeds(MAX_SEEDS + 1));
    }

    #[test]
    fn idl_address_is_deterministic_and_distinct_per_program() {
        let system = system_program();
        let other: Pubkey =
            "BPFLoaderUpgradeab1e11111111111111111111111".parse().expect("loader id parses");
        let first = derive_idl_address(&system).expect("idl derivation succeeds");
        let again = derive_idl_address(&system).expect("idl derivation succeeds");
        let second = derive_idl_address(&other).expect("idl derivation succeeds");
        assert_eq!(first, again);
        assert_ne!(first, second);
    }
}
