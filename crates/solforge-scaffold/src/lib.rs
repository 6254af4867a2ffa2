// crates/solforge-scaffold/src/lib.rs
// ============================================================================
// Module: Solforge Scaffold
// Description: Anchor project generation into a validated directory.
// Purpose: Write the fixed template set for a new program workspace.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Scaffolding writes a fixed set of template files under a destination
//! directory. The project name is validated as a Rust crate identifier,
//! the destination must be empty or absent, and path traversal in the
//! name is impossible by construction. No semantic validation of the
//! generated code happens here.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod templates;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum project name length.
const MAX_NAME_LEN: usize = 32;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised by project scaffolding.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// The project name is not a valid crate identifier.
    #[error("invalid project name: {0}")]
    InvalidName(String),
    /// The destination already contains files.
    #[error("destination is not empty: {}", .0.display())]
    DestinationNotEmpty(PathBuf),
    /// A filesystem operation failed.
    #[error("scaffold io failed: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Project Specification
// ============================================================================

/// Parameters for one scaffolded project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSpec {
    /// Project and program crate name.
    pub name: String,
    /// Directory the project root is created under.
    pub directory: PathBuf,
}

// ============================================================================
// SECTION: Scaffolding
// ============================================================================

/// Writes the Anchor project template set and returns the created files
/// as paths relative to the project root.
///
/// # Errors
///
/// Returns [`ScaffoldError::InvalidName`] for names that are not crate
/// identifiers, [`ScaffoldError::DestinationNotEmpty`] when the project
/// root already holds files, and [`ScaffoldError::Io`] when a write
/// fails.
pub fn scaffold_project(spec: &ProjectSpec) -> Result<Vec<String>, ScaffoldError> {
    validate_name(&spec.name)?;
    let root = spec.directory.join(&spec.name);
    ensure_empty(&root)?;

    let files = [
        ("Anchor.toml".to_string(), templates::ANCHOR_TOML),
        ("Cargo.toml".to_string(), templates::WORKSPACE_CARGO_TOML),
        (".gitignore".to_string(), templates::GITIGNORE),
        (format!("programs/{}/Cargo.toml", spec.name), templates::PROGRAM_CARGO_TOML),
        (format!("programs/{}/src/lib.rs", spec.name), templates::PROGRAM_LIB_RS),
        (format!("tests/{}.ts", spec.name), templates::TEST_STUB_TS),
    ];

    let mut written = Vec::with_capacity(files.len());
    for (relative, template) in files {
        let target = root.join(&relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .map_err(|_| ScaffoldError::Io("unable to create project directory".to_string()))?;
        }
        let body = template.replace("{{name}}", &spec.name);
        fs::write(&target, body)
            .map_err(|_| ScaffoldError::Io(format!("unable to write {relative}")))?;
        written.push(relative);
    }
    Ok(written)
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates the project name as a lowercase crate identifier.
fn validate_name(name: &str) -> Result<(), ScaffoldError> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(ScaffoldError::InvalidName(name.to_string()));
    }
    let mut chars = name.chars();
    let leading_ok = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_ok = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if !(leading_ok && rest_ok) {
        return Err(ScaffoldError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Rejects destinations that already contain files.
fn ensure_empty(root: &Path) -> Result<(), ScaffoldError> {
    if !root.exists() {
        return Ok(());
    }
    let mut entries = fs::read_dir(root)
        .map_err(|_| ScaffoldError::Io("unable to inspect destination".to_string()))?;
    if entries.next().is_some() {
        return Err(ScaffoldError::DestinationNotEmpty(root.to_path_buf()));
    }
    Ok(())
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

    use std::fs;

    use super::ProjectSpec;
    use super::ScaffoldError;
    use super::scaffold_project;

    /// Builds a spec rooted in a fresh temporary directory.
    fn spec_in(dir: &tempfile::TempDir, name: &str) -> ProjectSpec {
        ProjectSpec {
            name: name.to_string(),
            directory: dir.path().to_path_buf(),
        }
    }

    #[test]
    fn writes_the_full_template_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let files = scaffold_project(&spec_in(&dir, "my_vault")).expect("scaffold succeeds");
        assert_eq!(files.len(), 6);
        let lib = fs::read_to_string(dir.path().join("my_vault/programs/my_vault/src/lib.rs"))
            .expect("lib.rs written");
        assert!(lib.contains("pub mod my_vault"));
        assert!(lib.contains("declare_id!"));
        let anchor = fs::read_to_string(dir.path().join("my_vault/Anchor.toml"))
            .expect("Anchor.toml written");
        assert!(anchor.contains("my_vault = "));
    }

    #[test]
    fn rejects_invalid_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        for name in ["", "My-Project", "1vault", "a".repeat(33).as_str(), "../escape"] {
            let err = scaffold_project(&spec_in(&dir, name)).unwrap_err();
            assert!(matches!(err, ScaffoldError::InvalidName(_)), "name {name:?} was accepted");
        }
    }

    #[test]
    fn refuses_non_empty_destination() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path().join("taken");
        fs::create_dir_all(&root).expect("mkdir");
        fs::write(root.join("existing.txt"), "occupied").expect("write");
        let err = scaffold_project(&spec_in(&dir, "taken")).unwrap_err();
        assert!(matches!(err, ScaffoldError::DestinationNotEmpty(_)));
    }

    #[test]
    fn empty_existing_directory_is_allowed() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("vault")).expect("mkdir");
        let files = scaffold_project(&spec_in(&dir, "vault")).expect("scaffold succeeds");
        assert!(files.contains(&"Anchor.toml".to_string()));
    }
}
