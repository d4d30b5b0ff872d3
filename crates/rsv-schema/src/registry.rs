//! # Schema Registry
//!
//! The process-wide set of named schemas, populated once by an explicit
//! registration step and immutable afterwards.
//!
//! ## Registration Invariants
//!
//! [`SchemaRegistryBuilder::build`] fails fast, before any payload is seen,
//! when the registered schemas cannot be evaluated safely:
//!
//! - every `Ref` must name a registered schema (`UnknownSchemaRef`);
//! - no chain of references may loop back to its start without first
//!   descending into a property, element or additional-property value
//!   (`CircularRef`). Such a loop would re-apply the same schema to the same
//!   value forever.
//!
//! Loops that do descend (tree-shaped schemas) are legal; their evaluation
//! is bounded by the payload's own depth and by
//! [`ValidatorConfig::max_depth`].
//!
//! ## Thread Safety
//!
//! `SchemaRegistry` is `Send + Sync`. Validation only reads it, so one
//! registry can serve any number of concurrent callers through `&` or `Arc`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde_json::Value;

use rsv_core::ValidatorConfig;

use crate::builtin::BuiltinSchema;
use crate::compile::compile_document;
use crate::error::SchemaError;
use crate::node::Schema;
use crate::result::ValidationResult;
use crate::validate::evaluate;

/// File suffix of schema documents loaded from a directory.
pub const SCHEMA_FILE_SUFFIX: &str = ".schema.json";

/// Immutable registry of named schemas.
#[derive(Debug)]
pub struct SchemaRegistry {
    schemas: BTreeMap<String, Schema>,
    roots: BTreeSet<String>,
    config: ValidatorConfig,
}

/// Collects schemas and checks them in [`SchemaRegistryBuilder::build`].
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    schemas: BTreeMap<String, Schema>,
    roots: BTreeSet<String>,
    config: ValidatorConfig,
}

impl SchemaRegistryBuilder {
    /// An empty builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the evaluator configuration.
    pub fn with_config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Register a hand-built schema under `name`.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateSchema` if the name is taken.
    pub fn register_schema(
        mut self,
        name: impl Into<String>,
        schema: Schema,
    ) -> Result<Self, SchemaError> {
        let name = name.into();
        self.insert(name.clone(), schema)?;
        self.roots.insert(name);
        Ok(self)
    }

    /// Compile and register a JSON Schema document: its root under `name`
    /// and each definition under its qualified name.
    ///
    /// # Errors
    ///
    /// Returns the compiler's error for a malformed document, or
    /// `DuplicateSchema` if any produced name is taken.
    pub fn register_document(mut self, name: &str, document: &Value) -> Result<Self, SchemaError> {
        let compiled = compile_document(name, document)?;
        let definitions = compiled.definitions.len();
        self.insert(compiled.name.clone(), compiled.root)?;
        for (def_name, schema) in compiled.definitions {
            self.insert(def_name, schema)?;
        }
        self.roots.insert(compiled.name);
        tracing::debug!(schema = %name, definitions, "registered schema document");
        Ok(self)
    }

    /// Register one embedded contract.
    pub fn register_builtin(self, builtin: BuiltinSchema) -> Result<Self, SchemaError> {
        let document = builtin.document()?;
        self.register_document(builtin.name(), &document)
    }

    /// Register every embedded contract.
    pub fn with_builtin(self) -> Result<Self, SchemaError> {
        BuiltinSchema::ALL
            .into_iter()
            .try_fold(self, |builder, builtin| builder.register_builtin(builtin))
    }

    /// Register every `*.schema.json` file in `dir`, named after the file
    /// with the suffix removed (`quotes.schema.json` → `quotes`).
    ///
    /// Files are registered in name order so failures are reproducible.
    ///
    /// # Errors
    ///
    /// Returns `SchemaLoadError` if the directory or a file cannot be read
    /// or parsed, and any registration error of the documents.
    pub fn load_dir(mut self, dir: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let dir = dir.as_ref();
        let entries = std::fs::read_dir(dir).map_err(|e| SchemaError::SchemaLoadError {
            schema_name: dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if let Some(stem) = file_name.strip_suffix(SCHEMA_FILE_SUFFIX) {
                files.push((stem.to_string(), path.clone()));
            }
        }
        files.sort();

        for (name, path) in files {
            let content = std::fs::read_to_string(&path)?;
            let document: Value =
                serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoadError {
                    schema_name: name.clone(),
                    reason: format!("invalid JSON: {e}"),
                })?;
            self = self.register_document(&name, &document)?;
        }
        Ok(self)
    }

    /// Check references and freeze the registry.
    ///
    /// # Errors
    ///
    /// Returns `Config` for an invalid configuration, `UnknownSchemaRef` for
    /// a dangling reference and `CircularRef` for a non-descending loop.
    pub fn build(self) -> Result<SchemaRegistry, SchemaError> {
        self.config.validate()?;

        let mut shallow: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, schema) in &self.schemas {
            let mut missing = None;
            let edges = shallow.entry(name.as_str()).or_default();
            schema.visit_refs(&mut |target, consuming| {
                if !self.schemas.contains_key(target) {
                    missing.get_or_insert_with(|| target.to_string());
                } else if !consuming {
                    edges.push(target);
                }
            });
            if let Some(reference) = missing {
                return Err(SchemaError::UnknownSchemaRef {
                    reference,
                    referenced_from: name.clone(),
                });
            }
        }

        if let Some(cycle) = find_cycle(&shallow) {
            return Err(SchemaError::CircularRef {
                cycle: cycle.join(" -> "),
            });
        }

        tracing::info!(
            schemas = self.schemas.len(),
            roots = self.roots.len(),
            max_depth = self.config.max_depth,
            "schema registry built"
        );

        Ok(SchemaRegistry {
            schemas: self.schemas,
            roots: self.roots,
            config: self.config,
        })
    }

    fn insert(&mut self, name: String, schema: Schema) -> Result<(), SchemaError> {
        if self.schemas.contains_key(&name) {
            return Err(SchemaError::DuplicateSchema { schema_name: name });
        }
        self.schemas.insert(name, schema);
        Ok(())
    }
}

impl SchemaRegistry {
    /// Start a registration.
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// A registry holding exactly the embedded contracts.
    pub fn builtin() -> Result<Self, SchemaError> {
        Self::builder().with_builtin()?.build()
    }

    /// Validate `value` against the schema registered under `schema_name`.
    ///
    /// Malformed payloads never produce `Err`: every violation is reported
    /// in the returned [`ValidationResult`].
    ///
    /// # Errors
    ///
    /// Returns `UnknownSchema` if nothing is registered under the name.
    pub fn validate(&self, schema_name: &str, value: &Value) -> Result<ValidationResult, SchemaError> {
        let schema = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| SchemaError::UnknownSchema {
                schema_name: schema_name.to_string(),
            })?;

        let result = evaluate(self, schema, value);
        if result.is_valid() {
            tracing::trace!(schema = %schema_name, "payload accepted");
        } else {
            tracing::debug!(
                schema = %schema_name,
                errors = result.errors.len(),
                "payload rejected"
            );
        }
        Ok(result)
    }

    /// Validate against an embedded contract.
    pub fn validate_builtin(
        &self,
        builtin: BuiltinSchema,
        value: &Value,
    ) -> Result<ValidationResult, SchemaError> {
        self.validate(builtin.name(), value)
    }

    /// Names of root schemas (documents and hand-registered schemas), sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.roots.iter().map(String::as_str)
    }

    /// Every registered name, definitions included, sorted.
    pub fn all_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    /// Whether a schema is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Look up a schema by name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Number of registered schemas, definitions included.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The evaluator configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }
}

/// Depth-first search for a loop; returns it closed (`a -> b -> a`).
fn find_cycle<'a>(graph: &BTreeMap<&'a str, Vec<&'a str>>) -> Option<Vec<&'a str>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Active,
        Done,
    }

    fn visit<'a>(
        node: &'a str,
        graph: &BTreeMap<&'a str, Vec<&'a str>>,
        marks: &mut BTreeMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<&'a str>> {
        match marks.get(node) {
            Some(Mark::Done) => return None,
            Some(Mark::Active) => {
                let start = stack.iter().position(|n| *n == node).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(node);
                return Some(cycle);
            }
            None => {}
        }
        marks.insert(node, Mark::Active);
        stack.push(node);
        for next in graph.get(node).into_iter().flatten() {
            if let Some(cycle) = visit(*next, graph, marks, stack) {
                return Some(cycle);
            }
        }
        stack.pop();
        marks.insert(node, Mark::Done);
        None
    }

    let mut marks = BTreeMap::new();
    let mut stack = Vec::new();
    graph
        .keys()
        .find_map(|node| visit(*node, graph, &mut marks, &mut stack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{ArrayShape, SchemaNode};
    use rsv_core::JsonType;
    use serde_json::json;

    #[test]
    fn builtin_registers_all_contracts() {
        let registry = SchemaRegistry::builtin().unwrap();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(
            names,
            vec!["0x-swap-price", "0x-swap-quote", "coingecko-price", "uniswap-token-list"]
        );
        assert!(registry.contains("uniswap-token-list#/definitions/TokenInfo"));
        assert!(registry.len() > names.len());
    }

    #[test]
    fn quote_requires_price_definitions() {
        let err = SchemaRegistry::builder()
            .register_builtin(BuiltinSchema::ZeroExSwapQuote)
            .unwrap()
            .build()
            .unwrap_err();
        match err {
            SchemaError::UnknownSchemaRef { reference, .. } => {
                assert!(reference.starts_with("0x-swap-price#/definitions/"));
            }
            other => panic!("Expected UnknownSchemaRef, got: {other}"),
        }
    }

    #[test]
    fn unresolved_ref_fails_at_build() {
        let err = SchemaRegistry::builder()
            .register_schema("a", Schema::reference("missing"))
            .unwrap()
            .build()
            .unwrap_err();
        match err {
            SchemaError::UnknownSchemaRef {
                reference,
                referenced_from,
            } => {
                assert_eq!(reference, "missing");
                assert_eq!(referenced_from, "a");
            }
            other => panic!("Expected UnknownSchemaRef, got: {other}"),
        }
    }

    #[test]
    fn shallow_cycle_fails_at_build() {
        let err = SchemaRegistry::builder()
            .register_schema("a", Schema::reference("b"))
            .unwrap()
            .register_schema(
                "b",
                Schema::new(vec![SchemaNode::AnyOf(vec![
                    Schema::of_type(JsonType::Null),
                    Schema::reference("a"),
                ])]),
            )
            .unwrap()
            .build()
            .unwrap_err();
        match err {
            SchemaError::CircularRef { cycle } => assert_eq!(cycle, "a -> b -> a"),
            other => panic!("Expected CircularRef, got: {other}"),
        }
    }

    #[test]
    fn self_reference_fails_at_build() {
        let err = SchemaRegistry::builder()
            .register_schema("loop", Schema::reference("loop"))
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::CircularRef { .. }));
    }

    #[test]
    fn descending_recursion_is_allowed() {
        let tree = Schema::new(vec![
            SchemaNode::TypeCheck(vec![JsonType::Array]),
            SchemaNode::ArrayShape(ArrayShape {
                items: Some(Box::new(Schema::reference("tree"))),
                ..ArrayShape::default()
            }),
        ]);
        let registry = SchemaRegistry::builder()
            .register_schema("tree", tree)
            .unwrap()
            .build()
            .unwrap();
        assert!(registry.validate("tree", &json!([[], [[]]])).unwrap().is_valid());
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = SchemaRegistry::builder()
            .register_schema("x", Schema::any())
            .unwrap()
            .register_schema("x", Schema::any())
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateSchema { schema_name } if schema_name == "x"));
    }

    #[test]
    fn unknown_schema_name_is_caller_error() {
        let registry = SchemaRegistry::builtin().unwrap();
        let err = registry.validate("etherscan-gas", &json!({})).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSchema { .. }));
    }

    #[test]
    fn invalid_config_rejected_at_build() {
        let err = SchemaRegistry::builder()
            .with_config(ValidatorConfig::default().with_max_depth(0))
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::Config(_)));
    }

    #[test]
    fn load_dir_registers_by_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("gas-oracle.schema.json"),
            r#"{"type": "object", "required": ["fast"]}"#,
        )
        .unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not a schema").unwrap();

        let registry = SchemaRegistry::builder()
            .load_dir(dir.path())
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["gas-oracle"]);
        let result = registry.validate("gas-oracle", &json!({})).unwrap();
        assert!(!result.is_valid());
    }

    #[test]
    fn load_dir_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.schema.json"), "{").unwrap();
        let err = SchemaRegistry::builder().load_dir(dir.path()).unwrap_err();
        match err {
            SchemaError::SchemaLoadError { schema_name, .. } => assert_eq!(schema_name, "broken"),
            other => panic!("Expected SchemaLoadError, got: {other}"),
        }
    }

    #[test]
    fn load_dir_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchemaRegistry::builder()
            .load_dir(dir.path().join("absent"))
            .unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoadError { .. }));
    }

    #[test]
    fn registry_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
    }
}
