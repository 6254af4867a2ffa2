// crates/solforge-analyze/src/lib.rs
// ============================================================================
// Module: Solforge Analyze
// Description: Lexical scanners for Anchor program sources and build logs.
// Purpose: Flag risky source patterns and categorize compiler diagnostics.
// Dependencies: regex, serde
// ============================================================================

//! ## Overview
//! Both scanners in this crate are purely lexical: a fixed table of
//! patterns matched against supplied text, no parsing and no semantic
//! analysis. Findings are hints for a human reviewer, never a verdict.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod build_errors;
pub mod scan;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use build_errors::Diagnosis;
pub use build_errors::analyze_build_error;
pub use scan::Finding;
pub use scan::ScanError;
pub use scan::ScanReport;
pub use scan::Severity;
pub use scan::scan_source;
