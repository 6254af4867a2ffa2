// crates/solforge-core/src/discriminator.rs
// ============================================================================
// Module: Instruction Discriminators
// Description: 8-byte Anchor instruction identifiers from namespaced names.
// Purpose: Provide byte-for-byte reproducible wire identifiers.
// Dependencies: sha2
// ============================================================================

//! ## Overview
//! An instruction discriminator is the first eight bytes of
//! `SHA-256(namespace + ":" + name)`. The namespace domain-separates
//! identical instruction names used in different contexts. Collisions
//! between distinct names sharing a namespace are not detected here;
//! callers own name uniqueness within a program.

// ============================================================================
// SECTION: Imports
// ============================================================================

use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Namespace used when a caller does not supply one.
pub const DEFAULT_NAMESPACE: &str = "global";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by discriminator derivation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscriminatorError {
    /// The instruction name was empty.
    #[error("instruction name must not be empty")]
    EmptyName,
}

// ============================================================================
// SECTION: Discriminator
// ============================================================================

/// An 8-byte instruction discriminator.
///
/// # Invariants
/// - Purely a function of `(namespace, name)`; reproducible across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Discriminator([u8; 8]);

impl Discriminator {
    /// Derives the discriminator for a namespaced instruction name.
    ///
    /// # Errors
    ///
    /// Returns [`DiscriminatorError::EmptyName`] for an empty name; an
    /// empty instruction name is never semantically valid.
    pub fn derive(namespace: &str, name: &str) -> Result<Self, DiscriminatorError> {
        if name.is_empty() {
            return Err(DiscriminatorError::EmptyName);
        }
        let mut hasher = Sha256::new();
        hasher.update(preimage(namespace, name).as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        Ok(Self(bytes))
    }

    /// Returns the raw discriminator bytes.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 8] {
        self.0
    }

    /// Returns the discriminator as lowercase hex.
    #[must_use]
    pub fn to_hex(self) -> String {
        hex_encode(&self.0)
    }
}

/// Returns the canonical preimage string hashed for a discriminator.
#[must_use]
pub fn preimage(namespace: &str, name: &str) -> String {
    format!("{namespace}:{name}")
}

// ============================================================================
// SECTION: Hex Encoding
// ============================================================================

/// Encodes bytes as a lowercase hex string.
fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
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

    use super::DEFAULT_NAMESPACE;
    use super::Discriminator;
    use super::DiscriminatorError;
    use super::preimage;

    #[test]
    fn derivation_is_stable() {
        let first =
            Discriminator::derive(DEFAULT_NAMESPACE, "initialize").expect("derivation succeeds");
        let second =
            Discriminator::derive(DEFAULT_NAMESPACE, "initialize").expect("derivation succeeds");
        assert_eq!(first, second);
        assert_eq!(first.to_hex().len(), 16);
    }

    #[test]
    fn distinct_names_differ() {
        let initialize =
            Discriminator::derive(DEFAULT_NAMESPACE, "initialize").expect("derivation succeeds");
        let transfer =
            Discriminator::derive(DEFAULT_NAMESPACE, "transfer").expect("derivation succeeds");
        assert_ne!(initialize, transfer);
    }

    #[test]
    fn distinct_namespaces_differ() {
        let global = Discriminator::derive("ns1", "x").expect("derivation succeeds");
        let account = Discriminator::derive("ns2", "x").expect("derivation succeeds");
        assert_ne!(global, account);
    }

    #[test]
    fn rejects_empty_name() {
        let err = Discriminator::derive(DEFAULT_NAMESPACE, "").unwrap_err();
        assert_eq!(err, DiscriminatorError::EmptyName);
    }

    #[test]
    fn preimage_joins_with_colon() {
        assert_eq!(preimage("global", "initialize"), "global:initialize");
    }

    #[test]
    fn hex_matches_bytes() {
        let disc = Discriminator::derive("global", "initialize").expect("derivation succeeds");
        let hex = disc.to_hex();
        let bytes = disc.to_bytes();
        for (pair, byte) in hex.as_bytes().chunks(2).zip(bytes) {
            let text = std::str::from_utf8(pair).expect("hex pair is utf8");
            assert_eq!(u8::from_str_radix(text, 16).expect("hex pair parses"), byte);
        }
    }
}
