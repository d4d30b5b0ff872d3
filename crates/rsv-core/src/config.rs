//! # Validator Configuration
//!
//! Resource bounds for the recursive evaluator, loaded from YAML.
//!
//! ```yaml
//! # rsv.yaml
//! max_depth: 64
//! ```
//!
//! Every field has a default, so an empty document is a valid configuration.
//! Unknown fields are rejected: a misspelled bound would otherwise be
//! silently replaced by its default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default bound on nested schema evaluation frames.
///
/// The built-in API contracts nest at most around twenty frames deep, so this
/// leaves ample headroom while keeping adversarial input far away from the
/// thread's stack limit.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Evaluator configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Maximum number of nested schema evaluation frames (property, item,
    /// combinator branch and `$ref` descents all count). Exceeding it
    /// reports a `DepthExceeded` violation instead of recursing further.
    pub max_depth: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ValidatorConfig {
    /// Parse and check a configuration from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Self::parse(text, "<inline>")
    }

    /// Read, parse and check a configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    /// Builder-style override of [`ValidatorConfig::max_depth`].
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check field ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_depth",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        // An empty YAML document deserializes as unit, not as an empty map.
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?
        };
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_depth() {
        assert_eq!(ValidatorConfig::default().max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn parse_explicit_depth() {
        let config = ValidatorConfig::from_yaml_str("max_depth: 16\n").unwrap();
        assert_eq!(config.max_depth, 16);
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = ValidatorConfig::from_yaml_str("  \n").unwrap();
        assert_eq!(config, ValidatorConfig::default());
    }

    #[test]
    fn zero_depth_rejected() {
        let err = ValidatorConfig::from_yaml_str("max_depth: 0").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidValue { field: "max_depth", .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let err = ValidatorConfig::from_yaml_str("max_dept: 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }), "unexpected error: {err}");
    }

    #[test]
    fn from_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth: 7").unwrap();
        let config = ValidatorConfig::from_file(file.path()).unwrap();
        assert_eq!(config.max_depth, 7);
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ValidatorConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
        assert!(err.to_string().contains("absent.yaml"));
    }

    #[test]
    fn with_max_depth_overrides() {
        let config = ValidatorConfig::default().with_max_depth(3);
        assert_eq!(config.max_depth, 3);
        assert!(config.validate().is_ok());
    }
}
