//! # rsv-schema — Response Shape Validation
//!
//! Validates decoded third-party API responses against named JSON Schema
//! contracts before any field of the payload is trusted.
//!
//! ## Schema Model (`node`, `compile`)
//!
//! Contracts are JSON Schema documents (draft-07 subset). The [`compile`]
//! module turns each document into a [`Schema`] tree of [`SchemaNode`]
//! constraint units, rejecting keywords it does not understand instead of
//! silently ignoring them. Definitions become separately registered schemas
//! named `<document>#/definitions/<Name>`.
//!
//! ## Registry (`registry`, `builtin`)
//!
//! [`SchemaRegistry`] holds every named schema. It is built once, checked
//! for dangling and non-descending circular references, then shared
//! read-only. [`SchemaRegistry::builtin`] loads the four embedded contracts
//! (CoinGecko prices, Uniswap token lists, 0x swap price and quote).
//!
//! ## Evaluation (`validate`, `result`)
//!
//! [`SchemaRegistry::validate`] returns a [`ValidationResult`] listing every
//! violation with its JSON Pointer instance path, schema path, keyword,
//! parameters and a short message. Malformed payloads never panic and never
//! produce `Err`.
//!
//! ## Crate Policy
//!
//! - Depends only on `rsv-core` internally.
//! - Schema `$ref` targets must never be renamed without checking every
//!   reference across the embedded documents.
//! - Validation is a trust boundary: evaluation is bounded by
//!   `ValidatorConfig::max_depth` regardless of payload shape.

pub mod builtin;
pub mod compile;
pub mod error;
pub mod node;
pub mod pattern;
pub mod registry;
pub mod result;
mod validate;

pub use builtin::BuiltinSchema;
pub use compile::{compile_document, compile_schema, CompiledDocument};
pub use error::SchemaError;
pub use node::{
    AdditionalPolicy, ArrayShape, NumberConstraint, ObjectShape, Schema, SchemaNode,
    StringConstraint,
};
pub use pattern::Pattern;
pub use registry::{SchemaRegistry, SchemaRegistryBuilder, SCHEMA_FILE_SUFFIX};
pub use result::{ErrorKind, ValidationError, ValidationResult, ValidationViolations};
