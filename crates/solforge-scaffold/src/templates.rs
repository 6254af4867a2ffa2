// crates/solforge-scaffold/src/templates.rs
// ============================================================================
// Module: Project Templates
// Description: Fixed file bodies for generated Anchor projects.
// Purpose: Keep template text out of the scaffolding logic.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Template bodies use a single `{{name}}` placeholder substituted with
//! the validated project name. The generated program compiles as-is; its
//! placeholder program id must be replaced by `anchor keys sync` before
//! deployment.

/// Anchor workspace manifest.
pub const ANCHOR_TOML: &str = r#"[toolchain]

[features]
resolution = true
skip-lint = false

[programs.localnet]
{{name}} = "11111111111111111111111111111111"

[registry]
url = "https://api.apr.dev"

[provider]
cluster = "localnet"
wallet = "~/.config/solana/id.json"

[scripts]
test = "yarn run ts-mocha -p ./tsconfig.json -t 1000000 tests/**/*.ts"
"#;

/// Cargo workspace manifest.
pub const WORKSPACE_CARGO_TOML: &str = r#"[workspace]
members = ["programs/*"]
resolver = "2"

[profile.release]
overflow-checks = true
lto = "fat"
codegen-units = 1
"#;

/// Program crate manifest.
pub const PROGRAM_CARGO_TOML: &str = r#"[package]
name = "{{name}}"
version = "0.1.0"
edition = "2021"

[lib]
crate-type = ["cdylib", "lib"]
name = "{{name}}"

[features]
default = []
cpi = ["no-entrypoint"]
no-entrypoint = []
no-idl = []
no-log-ix-name = []
idl-build = ["anchor-lang/idl-build"]

[dependencies]
anchor-lang = "0.31.1"
"#;

/// Program entry source with a single initialize instruction.
pub const PROGRAM_LIB_RS: &str = r#"use anchor_lang::prelude::*;

declare_id!("11111111111111111111111111111111");

#[program]
pub mod {{name}} {
    use super::*;

    pub fn initialize(_ctx: Context<Initialize>) -> Result<()> {
        msg!("Program initialized");
        Ok(())
    }
}

#[derive(Accounts)]
pub struct Initialize {}
"#;

/// TypeScript test stub.
pub const TEST_STUB_TS: &str = r#"import * as anchor from "@coral-xyz/anchor";

describe("{{name}}", () => {
  anchor.setProvider(anchor.AnchorProvider.env());

  it("initializes", async () => {
    // Add your test here.
  });
});
"#;

/// Ignore list for generated workspaces.
pub const GITIGNORE: &str = r".anchor
.DS_Store
target
node_modules
dist
test-ledger
";
