//! # Schemas Subcommand
//!
//! Lists the names accepted by `rsv validate`.

use anyhow::Result;
use clap::Args;

use rsv_schema::SchemaRegistry;

use crate::EXIT_OK;

/// Arguments for the `rsv schemas` subcommand.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Include definitions (`<document>#/definitions/<Name>`).
    #[arg(long)]
    pub all: bool,
}

/// Execute the schemas subcommand.
pub fn run_schemas(args: &SchemasArgs, registry: &SchemaRegistry) -> Result<u8> {
    for name in schema_names(registry, args.all) {
        println!("{name}");
    }
    Ok(EXIT_OK)
}

/// Registered names in sorted order; definitions only when `all` is set.
pub fn schema_names(registry: &SchemaRegistry, all: bool) -> Vec<&str> {
    if all {
        registry.all_names().collect()
    } else {
        registry.names().collect()
    }
}
