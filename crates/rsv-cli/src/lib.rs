//! # rsv-cli — Response Shape Validator Command-Line Interface
//!
//! Provides the `rsv` command for checking captured API responses against
//! the schema registry, outside of the wallet process.
//!
//! ## Subcommands
//!
//! - `rsv validate <SCHEMA> [FILE]` — Validate a JSON payload (stdin when
//!   no file is given).
//! - `rsv schemas` — List registered schema names.
//! - `rsv show <SCHEMA>` — Print the compiled constraint tree of a schema.
//!
//! ```bash
//! curl -s "$COINGECKO/simple/price?ids=bitcoin&vs_currencies=usd" \
//!     | rsv validate coingecko-price
//! rsv --schema-dir ./schemas validate gas-oracle response.json --json
//! ```
//!
//! ## Exit Codes
//!
//! `0` valid, `1` invalid payload, `2` operational error (unreadable input,
//! malformed JSON, unknown schema, bad configuration).
//!
//! ## Crate Policy
//!
//! - CLI construction (argument parsing) is separated from business logic.
//! - Handler functions delegate to `rsv-schema`; no validation logic here.

pub mod schemas;
pub mod show;
pub mod validate;

use std::path::Path;

use anyhow::{Context, Result};

use rsv_core::ValidatorConfig;
use rsv_schema::SchemaRegistry;

/// Exit code for a conforming payload or a successful command.
pub const EXIT_OK: u8 = 0;
/// Exit code for a payload with violations.
pub const EXIT_INVALID: u8 = 1;
/// Exit code for an operational error.
pub const EXIT_ERROR: u8 = 2;

/// Build the registry used by every subcommand: the built-in contracts,
/// plus any documents in `schema_dir`, under the configuration in
/// `config_path` (defaults when absent).
pub fn load_registry(config_path: Option<&Path>, schema_dir: Option<&Path>) -> Result<SchemaRegistry> {
    let config = match config_path {
        Some(path) => ValidatorConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ValidatorConfig::default(),
    };

    let mut builder = SchemaRegistry::builder()
        .with_config(config)
        .with_builtin()
        .context("failed to register built-in schemas")?;

    if let Some(dir) = schema_dir {
        builder = builder
            .load_dir(dir)
            .with_context(|| format!("failed to load schemas from {}", dir.display()))?;
    }

    let registry = builder.build().context("schema registry is inconsistent")?;
    tracing::debug!(schemas = registry.len(), "loaded schema registry");
    Ok(registry)
}
