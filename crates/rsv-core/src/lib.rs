//! # rsv-core — Foundational Types for the Response Shape Validator
//!
//! Leaf crate of the workspace. It holds the JSON primitives every other
//! crate leans on when it reasons about untrusted API payloads:
//!
//! 1. **JSON-Pointer paths.** [`pointer::escape_segment`] and
//!    [`pointer::join`] build RFC 6901 instance paths (`~` → `~0`,
//!    `/` → `~1`), so an error location is unambiguous even when the
//!    payload uses slashes in its keys.
//!
//! 2. **Strict JSON equality.** [`value::json_equal`] compares values
//!    structurally and compares numbers by value, so `1` and `1.0` are the
//!    same constant. `serde_json::Value`'s own `PartialEq` distinguishes them.
//!
//! 3. **JSON type kinds.** [`JsonType`] is the closed set of JSON Schema
//!    primitive types, including the `integer` refinement.
//!
//! 4. **UTF-16 length.** String limits are measured in UTF-16 code units,
//!    the unit the upstream API ecosystem uses. [`value::utf16_len`] is the
//!    single place that counts them.
//!
//! 5. **Configuration.** [`ValidatorConfig`] carries the evaluator's
//!    resource bounds and loads from YAML.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `rsv-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod config;
pub mod error;
pub mod pointer;
pub mod value;

// Re-export primary types for ergonomic imports.
pub use config::{ValidatorConfig, DEFAULT_MAX_DEPTH};
pub use error::ConfigError;
pub use value::{compare_numbers, json_equal, utf16_len, JsonType};
