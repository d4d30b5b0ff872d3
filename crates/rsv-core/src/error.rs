//! # Error Types — Configuration Errors
//!
//! Errors raised while loading or checking validator configuration. Data
//! errors (payloads that do not match a schema) are never represented here:
//! they are ordinary validation results owned by `rsv-schema`.

use thiserror::Error;

/// Error loading or checking a [`crate::ValidatorConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file '{path}': {source}")]
    Read {
        /// Path of the configuration file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid YAML for the expected shape.
    #[error("invalid config in '{origin}': {reason}")]
    Parse {
        /// File path, or `<inline>` for configuration parsed from a string.
        origin: String,
        /// Parser message.
        reason: String,
    },

    /// A field holds a value outside its permitted range.
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}
