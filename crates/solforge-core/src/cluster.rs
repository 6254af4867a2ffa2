// crates/solforge-core/src/cluster.rs
// ============================================================================
// Module: Cluster Endpoints
// Description: Network selector to RPC endpoint mapping.
// Purpose: Resolve the small fixed set of Solana cluster URLs.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Tools take a network selector string; this module maps it to one of
//! the public cluster endpoints. Unknown selectors fall back to devnet so
//! a typo never silently targets mainnet. An explicit `rpcUrl` argument
//! on a tool always takes precedence over this table.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Cluster
// ============================================================================

/// A Solana cluster selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    /// The main network.
    MainnetBeta,
    /// The development network with a public faucet.
    Devnet,
    /// The test network.
    Testnet,
    /// A local test validator.
    Localnet,
}

impl Cluster {
    /// Cluster used when a selector is missing or unknown.
    pub const DEFAULT: Self = Self::Devnet;

    /// Parses a selector string, returning `None` for unknown values.
    #[must_use]
    pub fn parse(selector: &str) -> Option<Self> {
        match selector {
            "mainnet-beta" | "mainnet" => Some(Self::MainnetBeta),
            "devnet" => Some(Self::Devnet),
            "testnet" => Some(Self::Testnet),
            "localnet" | "localhost" => Some(Self::Localnet),
            _ => None,
        }
    }

    /// Resolves a selector, falling back to [`Self::DEFAULT`] for unknown
    /// values.
    #[must_use]
    pub fn from_selector(selector: &str) -> Self {
        Self::parse(selector).unwrap_or(Self::DEFAULT)
    }

    /// Returns the RPC endpoint URL for the cluster.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            Self::MainnetBeta => "https://api.mainnet-beta.solana.com",
            Self::Devnet => "https://api.devnet.solana.com",
            Self::Testnet => "https://api.testnet.solana.com",
            Self::Localnet => "http://127.0.0.1:8899",
        }
    }

    /// Returns the stable selector label for the cluster.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MainnetBeta => "mainnet-beta",
            Self::Devnet => "devnet",
            Self::Testnet => "testnet",
            Self::Localnet => "localnet",
        }
    }

    /// Returns true when the cluster faucet accepts airdrop requests.
    #[must_use]
    pub const fn supports_airdrop(self) -> bool {
        matches!(self, Self::Devnet | Self::Testnet | Self::Localnet)
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
