//! # Show Subcommand
//!
//! Prints the compiled constraint tree of one schema, for checking how a
//! document was understood.

use anyhow::{Context, Result};
use clap::Args;

use rsv_schema::SchemaRegistry;

use crate::EXIT_OK;

/// Arguments for the `rsv show` subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Registered schema or definition name.
    #[arg(value_name = "SCHEMA")]
    pub schema: String,
}

/// Execute the show subcommand.
pub fn run_show(args: &ShowArgs, registry: &SchemaRegistry) -> Result<u8> {
    println!("{}", describe(registry, &args.schema)?);
    Ok(EXIT_OK)
}

/// Pretty `Debug` rendering of a registered schema.
pub fn describe(registry: &SchemaRegistry, name: &str) -> Result<String> {
    let schema = registry
        .get(name)
        .with_context(|| format!("unknown schema '{name}'"))?;
    Ok(format!("{name}\n{schema:#?}"))
}
