// crates/solforge-core/src/pubkey.rs
// ============================================================================
// Module: Solana Public Keys
// Description: 32-byte public key value type with a Base58 text form.
// Purpose: Provide validated address parsing shared by every tool.
// Dependencies: bs58, ed25519-dalek, serde
// ============================================================================

//! ## Overview
//! Public keys are opaque 32-byte values that serialize as Base58 text.
//! Parsing validates encoding and length only; whether an address is
//! meaningful on chain is decided by the tools that use it. The on-curve
//! test backs the program derived address security property: an address
//! that does not decompress to an Ed25519 point can never have a private
//! key.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use ed25519_dalek::VerifyingKey;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised when parsing a public key from Base58 text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PubkeyError {
    /// Input was not valid Base58 text.
    #[error("invalid base58 encoding")]
    InvalidEncoding,
    /// Decoded byte length was not 32.
    #[error("decoded key is {0} bytes, expected 32")]
    InvalidLength(usize),
}

// ============================================================================
// SECTION: Public Key
// ============================================================================

/// A 32-byte Solana public key.
///
/// # Invariants
/// - Always exactly 32 bytes; the Base58 text form round-trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pubkey([u8; 32]);

impl Pubkey {
    /// Byte length of a public key.
    pub const LEN: usize = 32;

    /// Creates a public key from raw bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw key bytes by value.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }

    /// Returns a reference to the raw key bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true when the key decompresses to a point on the Ed25519
    /// curve.
    #[must_use]
    pub fn is_on_curve(&self) -> bool {
        VerifyingKey::from_bytes(&self.0).is_ok()
    }
}

impl fmt::Display for Pubkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&bs58::encode(self.0).into_string())
    }
}

impl FromStr for Pubkey {
    type Err = PubkeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s).into_vec().map_err(|_| PubkeyError::InvalidEncoding)?;
        let bytes: [u8; 32] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| PubkeyError::InvalidLength(decoded.len()))?;
        Ok(Self(bytes))
    }
}

impl Serialize for Pubkey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pubkey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
