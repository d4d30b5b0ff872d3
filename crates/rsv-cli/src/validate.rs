//! # Validate Subcommand
//!
//! Checks one JSON payload against a named schema and prints either `OK`
//! or one line per violation.
//!
//! ## Security Invariant
//!
//! The payload is parsed and validated, never interpreted. A payload that
//! fails validation is a normal outcome (exit code 1), not an error.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use rsv_schema::{SchemaRegistry, ValidationResult};

use crate::{EXIT_INVALID, EXIT_OK};

/// Arguments for the `rsv validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Registered schema name (see `rsv schemas`).
    #[arg(value_name = "SCHEMA")]
    pub schema: String,

    /// JSON payload file. Reads stdin when omitted.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Print the full result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 valid, 1 invalid.
pub fn run_validate(args: &ValidateArgs, registry: &SchemaRegistry) -> Result<u8> {
    let text = match &args.file {
        Some(path) => read_payload(path)?,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read payload from stdin")?;
            text
        }
    };

    let result = validate_text(registry, &args.schema, &text)?;
    println!("{}", render(&args.schema, &result, args.json)?);

    Ok(if result.is_valid() { EXIT_OK } else { EXIT_INVALID })
}

/// Read a payload file.
pub fn read_payload(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Parse `text` as JSON and validate it against `schema`.
pub fn validate_text(registry: &SchemaRegistry, schema: &str, text: &str) -> Result<ValidationResult> {
    let value: Value = serde_json::from_str(text).context("payload is not valid JSON")?;
    let result = registry.validate(schema, &value)?;
    tracing::info!(
        schema = %schema,
        valid = result.is_valid(),
        errors = result.errors.len(),
        "validated payload"
    );
    Ok(result)
}

/// Render a result for the terminal, or as pretty JSON.
pub fn render(schema: &str, result: &ValidationResult, json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(result).context("failed to serialize result");
    }
    if result.is_valid() {
        return Ok(format!("OK: payload conforms to '{schema}'"));
    }
    let mut out = format!(
        "FAIL: {} violation(s) against '{schema}'",
        result.errors.len()
    );
    for error in &result.errors {
        out.push('\n');
        out.push_str(&error.to_string());
    }
    Ok(out)
}
