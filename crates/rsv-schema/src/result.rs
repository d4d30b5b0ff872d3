//! # Validation Results
//!
//! The outcome of one validation call. A result is built fresh for every
//! call and owned by the caller; nothing in it refers back to the registry.
//!
//! Results serialize with camelCase field names (`instancePath`,
//! `schemaPath`) so they can be logged or emitted next to the payload that
//! produced them.

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Classification of a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// `type` (or an integer-only number constraint) failed.
    TypeMismatch,
    /// A `required` key is absent.
    MissingRequiredProperty,
    /// A key is present although `additionalProperties` is `false`.
    UnexpectedProperty,
    /// A string does not match `pattern`.
    PatternMismatch,
    /// A string, array or object size is outside its bounds.
    LengthOutOfRange,
    /// A number is outside its bounds.
    RangeOutOfBounds,
    /// `uniqueItems` found two equal elements.
    DuplicateItem,
    /// `const` failed.
    ConstMismatch,
    /// `enum` failed.
    EnumMismatch,
    /// `oneOf` matched zero or several branches.
    OneOfViolation,
    /// `anyOf` matched no branch.
    AnyOfViolation,
    /// A key failed `propertyNames`.
    PropertyNameInvalid,
    /// Evaluation nested deeper than the configured bound.
    DepthExceeded,
}

/// A single violation with structured context.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// Classification.
    pub kind: ErrorKind,
    /// JSON Pointer to the violating value in the instance (`""` is the root).
    pub instance_path: String,
    /// Location of the failing keyword within the schema.
    pub schema_path: String,
    /// The JSON Schema keyword that failed.
    pub keyword: &'static str,
    /// Keyword-specific metadata (`limit`, `missingProperty`, ...).
    pub params: Map<String, Value>,
    /// Human-readable description.
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Outcome of validating one value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty.
    pub valid: bool,
    /// Violations in the order they were found.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Wrap a list of violations; the result is valid iff the list is empty.
    pub fn from_errors(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Whether the value conforms.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// All violations, in order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Number of violations of the given kind.
    pub fn count(&self, kind: ErrorKind) -> usize {
        self.errors.iter().filter(|e| e.kind == kind).count()
    }

    /// Convert into a `Result`, attaching the schema name to failures.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::ValidationFailed` carrying every violation if
    /// the value did not conform.
    pub fn into_result(self, schema_name: &str) -> Result<(), SchemaError> {
        if self.valid {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                schema_name: schema_name.to_string(),
                violations: ValidationViolations {
                    violations: self.errors,
                },
            })
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationViolations {
    violations: Vec<ValidationError>,
}

impl ValidationViolations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[ValidationError] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<ValidationError> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}
