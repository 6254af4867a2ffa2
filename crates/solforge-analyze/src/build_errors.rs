// crates/solforge-analyze/src/build_errors.rs
// ============================================================================
// Module: Build Error Triage
// Description: Categorize rustc and Anchor diagnostics from build logs.
// Purpose: Map known error text to a category and a concrete fix.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A fixed, ordered table of needle strings matched against the supplied
//! build output. The first hit wins. Unrecognized text still returns a
//! diagnosis, marked `recognized: false`, with a generic triage hint.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

// ============================================================================
// SECTION: Diagnosis
// ============================================================================

/// Categorized build error with a suggested fix.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnosis {
    /// True when the error text matched a known diagnostic.
    pub recognized: bool,
    /// Stable category label.
    pub category: &'static str,
    /// One-line summary of what went wrong.
    pub summary: &'static str,
    /// Concrete next step for the developer.
    pub suggested_fix: &'static str,
}

// ============================================================================
// SECTION: Diagnostic Table
// ============================================================================

/// One entry in the ordered diagnostic table.
struct Diagnostic {
    /// Substring that identifies the error.
    needle: &'static str,
    /// Stable category label.
    category: &'static str,
    /// One-line summary of what went wrong.
    summary: &'static str,
    /// Concrete next step for the developer.
    suggested_fix: &'static str,
}

/// Known diagnostics, most specific first.
const DIAGNOSTICS: &[Diagnostic] = &[
    Diagnostic {
        needle: "E0382",
        category: "ownership",
        summary: "a value was used after being moved",
        suggested_fix: "clone the value, borrow it with &, or restructure so only one \
                        owner uses it",
    },
    Diagnostic {
        needle: "E0308",
        category: "type-mismatch",
        summary: "an expression has a different type than the context expects",
        suggested_fix: "align the types explicitly; for Anchor accounts check the \
                        Account<T> generic parameter",
    },
    Diagnostic {
        needle: "E0499",
        category: "borrow-conflict",
        summary: "two mutable borrows of the same value overlap",
        suggested_fix: "narrow the borrow scopes or split the struct so the borrows touch \
                        different fields",
    },
    Diagnostic {
        needle: "E0502",
        category: "borrow-conflict",
        summary: "a mutable borrow overlaps an immutable one",
        suggested_fix: "finish reading before mutating, or copy the needed data out first",
    },
    Diagnostic {
        needle: "E0106",
        category: "lifetimes",
        summary: "a reference type is missing a lifetime parameter",
        suggested_fix: "add the 'info lifetime to the accounts struct and its fields",
    },
    Diagnostic {
        needle: "E0432",
        category: "unresolved-import",
        summary: "an import path does not resolve",
        suggested_fix: "check the crate is listed in Cargo.toml and the path matches its \
                        module layout",
    },
    Diagnostic {
        needle: "E0433",
        category: "unresolved-import",
        summary: "a crate or module name is unknown",
        suggested_fix: "add the missing dependency to Cargo.toml or fix the use path",
    },
    Diagnostic {
        needle: "declare_id",
        category: "anchor-config",
        summary: "the declared program id does not match the deployed keypair",
        suggested_fix: "run `anchor keys sync` so declare_id! matches target/deploy",
    },
    Diagnostic {
        needle: "AccountDidNotDeserialize",
        category: "account-layout",
        summary: "account data did not match the expected layout",
        suggested_fix: "check the space calculation includes the 8-byte discriminator and \
                        every field",
    },
    Diagnostic {
        needle: "insufficient funds",
        category: "funding",
        summary: "the paying account cannot cover rent or fees",
        suggested_fix: "airdrop SOL to the payer on devnet, or fund it before deploying",
    },
    Diagnostic {
        needle: "linker `cc` not found",
        category: "build-environment",
        summary: "no C linker is installed",
        suggested_fix: "install build-essential (or Xcode command line tools) and rebuild",
    },
    Diagnostic {
        needle: "lock file version",
        category: "toolchain",
        summary: "the lockfile was written by a newer cargo",
        suggested_fix: "update the Rust toolchain, or regenerate Cargo.lock with the \
                        pinned version",
    },
];

/// Fallback diagnosis for unrecognized error text.
const UNRECOGNIZED: Diagnosis = Diagnosis {
    recognized: false,
    category: "unknown",
    summary: "the error text did not match any known diagnostic",
    suggested_fix: "read the first error in the log (later ones usually cascade) and \
                    search its error code",
};

// ============================================================================
// SECTION: Analysis
// ============================================================================

/// Categorizes build error text against the diagnostic table.
#[must_use]
pub fn analyze_build_error(error_text: &str) -> Diagnosis {
    for diagnostic in DIAGNOSTICS {
        if error_text.contains(diagnostic.needle) {
            return Diagnosis {
                recognized: true,
                category: diagnostic.category,
                summary: diagnostic.summary,
                suggested_fix: diagnostic.suggested_fix,
            };
        }
    }
    UNRECOGNIZED
}

// ============================================================================
// SECTION: Tests
// ============================================================================
