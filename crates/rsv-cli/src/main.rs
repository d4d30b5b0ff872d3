//! # rsv CLI entry point
//!
//! Parses command-line arguments, builds the schema registry and dispatches
//! to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rsv_cli::schemas::{run_schemas, SchemasArgs};
use rsv_cli::show::{run_show, ShowArgs};
use rsv_cli::validate::{run_validate, ValidateArgs};
use rsv_cli::{load_registry, EXIT_ERROR};

/// Response Shape Validator
///
/// Validates third-party API responses (price feeds, token lists, swap
/// quotes) against the registered JSON Schema contracts.
#[derive(Parser, Debug)]
#[command(name = "rsv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML validator configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of additional `*.schema.json` documents.
    #[arg(long, global = true)]
    schema_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a JSON payload against a registered schema.
    Validate(ValidateArgs),

    /// List registered schemas.
    Schemas(SchemasArgs),

    /// Print the compiled form of a schema.
    Show(ShowArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    tracing::debug!("rsv CLI starting");

    let result = load_registry(cli.config.as_deref(), cli.schema_dir.as_deref()).and_then(
        |registry| match &cli.command {
            Commands::Validate(args) => run_validate(args, &registry),
            Commands::Schemas(args) => run_schemas(args, &registry),
            Commands::Show(args) => run_show(args, &registry),
        },
    );

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_validate_file() {
        let cli = Cli::try_parse_from(["rsv", "validate", "coingecko-price", "resp.json"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert_eq!(args.schema, "coingecko-price");
            assert_eq!(args.file, Some(PathBuf::from("resp.json")));
            assert!(!args.json);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_stdin_json() {
        let cli = Cli::try_parse_from(["rsv", "validate", "0x-swap-quote", "--json"]).unwrap();
        if let Commands::Validate(args) = cli.command {
            assert!(args.file.is_none());
            assert!(args.json);
        } else {
            panic!("expected validate");
        }
    }

    #[test]
    fn cli_parse_validate_requires_schema() {
        assert!(Cli::try_parse_from(["rsv", "validate"]).is_err());
    }

    #[test]
    fn cli_parse_schemas_all() {
        let cli = Cli::try_parse_from(["rsv", "schemas", "--all"]).unwrap();
        assert!(matches!(cli.command, Commands::Schemas(SchemasArgs { all: true })));
    }

    #[test]
    fn cli_parse_show() {
        let cli = Cli::try_parse_from(["rsv", "show", "0x-swap-price#/definitions/Fee"]).unwrap();
        if let Commands::Show(args) = cli.command {
            assert_eq!(args.schema, "0x-swap-price#/definitions/Fee");
        } else {
            panic!("expected show");
        }
    }

    #[test]
    fn cli_parse_global_flags() {
        let cli = Cli::try_parse_from([
            "rsv",
            "-vv",
            "schemas",
            "--config",
            "rsv.yaml",
            "--schema-dir",
            "extra",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("rsv.yaml")));
        assert_eq!(cli.schema_dir, Some(PathBuf::from("extra")));
    }

    #[test]
    fn cli_parse_unknown_subcommand_fails() {
        assert!(Cli::try_parse_from(["rsv", "lint"]).is_err());
    }
}
