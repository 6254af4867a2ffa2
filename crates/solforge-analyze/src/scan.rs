// crates/solforge-analyze/src/scan.rs
// ============================================================================
// Module: Vulnerability Scan
// Description: Regex heuristics over Anchor program source text.
// Purpose: Surface common Solana footguns for human review.
// Dependencies: regex, serde
// ============================================================================

//! ## Overview
//! The scanner walks the supplied source line by line against a fixed
//! pattern table and emits categorized findings with 1-based line numbers
//! and trimmed snippets. One whole-file rule flags accounts structs that
//! never name a signer. The scanner has no notion of scope or data flow;
//! a clean report is not a security audit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum snippet length carried in a finding.
const MAX_SNIPPET_LEN: usize = 120;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by the scanner.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A pattern in the fixed table failed to compile.
    #[error("internal pattern error: {0}")]
    Pattern(String),
}

// ============================================================================
// SECTION: Severity
// ============================================================================

/// Severity of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational; worth a look.
    Low,
    /// Likely a defect under some inputs.
    Medium,
    /// Exploitable in common deployments.
    High,
    /// Direct loss of funds or control.
    Critical,
}

impl Severity {
    /// Returns the stable label for the severity.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

// ============================================================================
// SECTION: Findings
// ============================================================================

/// One pattern match in the scanned source.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    /// Stable identifier of the matched pattern.
    pub pattern: &'static str,
    /// Severity classification.
    pub severity: Severity,
    /// 1-based line number of the match (0 for whole-file rules).
    pub line: usize,
    /// Trimmed source line that matched.
    pub snippet: String,
    /// What the pattern flags.
    pub description: &'static str,
    /// What a reviewer should do about it.
    pub recommendation: &'static str,
}

/// Scan output: findings plus counts by severity.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// All findings in source order.
    pub findings: Vec<Finding>,
    /// Number of critical findings.
    pub critical: usize,
    /// Number of high findings.
    pub high: usize,
    /// Number of medium findings.
    pub medium: usize,
    /// Number of low findings.
    pub low: usize,
}

// ============================================================================
// SECTION: Pattern Table
// ============================================================================

/// One line-level pattern in the fixed table.
struct Pattern {
    /// Stable identifier.
    id: &'static str,
    /// Severity classification.
    severity: Severity,
    /// Regex source matched against each line.
    regex: &'static str,
    /// What the pattern flags.
    description: &'static str,
    /// What a reviewer should do about it.
    recommendation: &'static str,
}

/// Line-level heuristics, ordered roughly by severity.
const PATTERNS: &[Pattern] = &[
    Pattern {
        id: "manual-lamport-transfer",
        severity: Severity::Critical,
        regex: r"lamports\s*\.\s*borrow_mut\s*\(",
        description: "direct lamport mutation bypasses runtime balance checks",
        recommendation: "use a system program transfer or checked try_borrow_mut with \
                         balance validation",
    },
    Pattern {
        id: "init-if-needed",
        severity: Severity::High,
        regex: r"init_if_needed",
        description: "init_if_needed permits re-initialization attacks when the account \
                      already exists",
        recommendation: "split init and update paths, or guard with an explicit \
                         is-initialized flag",
    },
    Pattern {
        id: "unchecked-account",
        severity: Severity::High,
        regex: r"UncheckedAccount\s*<",
        description: "UncheckedAccount skips owner and type validation entirely",
        recommendation: "add an address or owner constraint, or document the CHECK \
                         invariant and verify it in the handler",
    },
    Pattern {
        id: "raw-account-info",
        severity: Severity::Medium,
        regex: r"AccountInfo\s*<",
        description: "raw AccountInfo carries no automatic owner or signer checks",
        recommendation: "prefer Account<T> or Signer<'info> so Anchor enforces the checks",
    },
    Pattern {
        id: "arbitrary-cpi",
        severity: Severity::Medium,
        regex: r"\binvoke(_signed)?\s*\(",
        description: "cross-program invocation with a caller-supplied program id",
        recommendation: "compare the target program id against a known constant before \
                         invoking",
    },
    Pattern {
        id: "unchecked-arithmetic",
        severity: Severity::Medium,
        regex: r"[a-z_\]\)]\s*[+\-*]=\s*",
        description: "compound assignment can overflow and wrap silently in release builds",
        recommendation: "use checked_add / checked_sub / checked_mul and handle the None \
                         case",
    },
    Pattern {
        id: "panic-in-handler",
        severity: Severity::Medium,
        regex: r"\.unwrap\s*\(\s*\)|\.expect\s*\(|panic!\s*\(",
        description: "panics abort the instruction with an opaque error",
        recommendation: "return a typed error with err! / require! instead of panicking",
    },
    Pattern {
        id: "hardcoded-address",
        severity: Severity::Low,
        regex: r#""[1-9A-HJ-NP-Za-km-z]{32,44}""#,
        description: "hardcoded Base58 address embedded in source",
        recommendation: "hoist the address into a named constant or config so reviewers \
                         can audit it",
    },
];

// ============================================================================
// SECTION: Scanner
// ============================================================================

/// Scans source text against the fixed pattern table.
///
/// # Errors
///
/// Returns [`ScanError::Pattern`] when a table regex fails to compile.
pub fn scan_source(source: &str) -> Result<ScanReport, ScanError> {
    let mut findings = Vec::new();
    for pattern in PATTERNS {
        let regex =
            Regex::new(pattern.regex).map_err(|err| ScanError::Pattern(err.to_string()))?;
        for (offset, line) in source.lines().enumerate() {
            if regex.is_match(line) {
                findings.push(Finding {
                    pattern: pattern.id,
                    severity: pattern.severity,
                    line: offset + 1,
                    snippet: snippet_of(line),
                    description: pattern.description,
                    recommendation: pattern.recommendation,
                });
            }
        }
    }
    if let Some(finding) = missing_signer_finding(source) {
        findings.push(finding);
    }
    findings.sort_by_key(|finding| finding.line);
    Ok(report_from(findings))
}

/// Whole-file rule: an accounts struct with no signer anywhere.
fn missing_signer_finding(source: &str) -> Option<Finding> {
    let has_accounts = source.contains("#[derive(Accounts)]");
    let names_signer = source.contains("Signer<") || source.contains("is_signer");
    if has_accounts && !names_signer {
        return Some(Finding {
            pattern: "missing-signer",
            severity: Severity::High,
            line: 0,
            snippet: String::new(),
            description: "no signer constraint appears in any accounts struct",
            recommendation: "require a Signer<'info> for every state-mutating instruction",
        });
    }
    None
}

/// Builds the report with per-severity counts.
fn report_from(findings: Vec<Finding>) -> ScanReport {
    let count =
        |severity: Severity| findings.iter().filter(|f| f.severity == severity).count();
    ScanReport {
        critical: count(Severity::Critical),
        high: count(Severity::High),
        medium: count(Severity::Medium),
        low: count(Severity::Low),
        findings,
    }
}

/// Trims and bounds a matched line for the finding payload.
fn snippet_of(line: &str) -> String {
    let trimmed = line.trim();
    trimmed.chars().take(MAX_SNIPPET_LEN).collect()
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

    use super::Severity;
    use super::scan_source;

    #[test]
    fn clean_source_produces_no_findings() {
        let source = r"
            #[derive(Accounts)]
            pub struct Update<'info> {
                pub authority: Signer<'info>,
            }
        ";
        let report = scan_source(source).expect("scan succeeds");
        assert!(report.findings.is_empty());
    }

    #[test]
    fn flags_unwrap_with_line_number() {
        let source = "fn f() {\n    let x = y.unwrap();\n}\n";
        let report = scan_source(source).expect("scan succeeds");
        let finding = report
            .findings
            .iter()
            .find(|f| f.pattern == "panic-in-handler")
            .expect("unwrap flagged");
        assert_eq!(finding.line, 2);
        assert_eq!(finding.severity, Severity::Medium);
        assert!(finding.snippet.contains("unwrap"));
    }

    #[test]
    fn flags_missing_signer_once_per_file() {
        let source = r"
            #[derive(Accounts)]
            pub struct Update<'info> {
                pub vault: Account<'info, Vault>,
            }
        ";
        let report = scan_source(source).expect("scan succeeds");
        let missing: Vec<_> =
            report.findings.iter().filter(|f| f.pattern == "missing-signer").collect();
        assert_eq!(missing.len(), 1);
        assert_eq!(report.high, 1);
    }

    #[test]
    fn flags_init_if_needed_and_counts_severities() {
        let source = "#[account(init_if_needed, payer = user)]\npub vault: Account<'info, V>,\n";
        let report = scan_source(source).expect("scan succeeds");
        assert_eq!(report.high, 1);
        assert_eq!(report.critical, 0);
    }

    #[test]
    fn flags_unchecked_arithmetic() {
        let source = "vault.balance += amount;\n";
        let report = scan_source(source).expect("scan succeeds");
        assert!(report.findings.iter().any(|f| f.pattern == "unchecked-arithmetic"));
    }

    #[test]
    fn snippet_is_bounded() {
        let long_line = format!("let x = y.unwrap(); // {}", "a".repeat(400));
        let report = scan_source(&long_line).expect("scan succeeds");
        let finding = &report.findings[0];
        assert!(finding.snippet.chars().count() <= 120);
    }
}
