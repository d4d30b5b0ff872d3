//! # Schema Errors
//!
//! Every error here is a configuration or caller error: a schema that cannot
//! be compiled, a registry whose references do not resolve, a lookup of an
//! unregistered name. Payloads that fail validation are ordinary
//! [`crate::ValidationResult`]s; they only become a `SchemaError` when a
//! caller asks for one through [`crate::ValidationResult::into_result`].

use thiserror::Error;

use rsv_core::ConfigError;

use crate::result::ValidationViolations;

/// Error raised by schema compilation, registration or lookup.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The document did not conform to the schema.
    #[error("validation failed against schema '{schema_name}':\n{violations}")]
    ValidationFailed {
        /// Name of the schema that was validated against.
        schema_name: String,
        /// Structured list of individual violations.
        violations: ValidationViolations,
    },

    /// No schema is registered under the requested name.
    #[error("unknown schema '{schema_name}'")]
    UnknownSchema {
        /// The requested name.
        schema_name: String,
    },

    /// A `$ref` names a schema that was never registered.
    #[error("unresolved reference '{reference}' in schema '{referenced_from}'")]
    UnknownSchemaRef {
        /// The unresolved target name.
        reference: String,
        /// The registered schema containing the reference.
        referenced_from: String,
    },

    /// References form a loop that never descends into the instance.
    #[error("circular reference without a base case: {cycle}")]
    CircularRef {
        /// The loop, rendered as `a -> b -> a`.
        cycle: String,
    },

    /// Two schemas were registered under one name.
    #[error("schema '{schema_name}' is already registered")]
    DuplicateSchema {
        /// The conflicting name.
        schema_name: String,
    },

    /// The schema document uses a keyword the evaluator does not implement.
    #[error("unsupported keyword '{keyword}' at {schema_path}")]
    UnsupportedKeyword {
        /// The keyword.
        keyword: String,
        /// Location of the keyword within the document.
        schema_path: String,
    },

    /// A keyword value has the wrong shape.
    #[error("malformed schema at {schema_path}: {reason}")]
    MalformedSchema {
        /// Location of the offending keyword.
        schema_path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A `pattern` is not a valid regular expression.
    #[error("invalid pattern '{pattern}' at {schema_path}: {reason}")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// Location of the keyword.
        schema_path: String,
        /// Regex compiler message.
        reason: String,
    },

    /// The schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoadError {
        /// Schema filename or identifier.
        schema_name: String,
        /// Reason the schema could not be loaded.
        reason: String,
    },

    /// Validator configuration was rejected.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// IO error reading schema documents.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
