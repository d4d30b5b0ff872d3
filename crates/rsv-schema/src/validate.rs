//! # Schema Evaluation
//!
//! One recursive-descent evaluator shared by every registered schema. It is
//! a pure function of the registry, the schema and the value: each call
//! builds its own error list and touches no shared mutable state.
//!
//! ## Security Invariant
//!
//! Evaluation is a trust boundary. It must never panic and never recurse
//! without bound on hostile input: every descent (property, element,
//! combinator branch, `$ref`) counts against `max_depth`, and exceeding it
//! produces a `DepthExceeded` violation instead of another stack frame.
//! Value equality (`const`, `enum`, `uniqueItems`) walks an explicit work
//! list, so it is bounded by heap rather than stack.
//!
//! ## Error Reporting
//!
//! - `type` failures stop the remaining checks of the same schema.
//! - Object checks run as limits, `required` (one error per missing key),
//!   `propertyNames`, `additionalProperties`, then declared properties.
//! - `oneOf` keeps the failing branches' errors and appends one summary.
//! - `anyOf` evaluates every branch but reports only its summary; branch
//!   detail is discarded.

use std::cmp::Ordering;

use serde_json::{json, Map, Number, Value};

use rsv_core::pointer::{escape_segment, join, join_index};
use rsv_core::value::{is_finite, is_integral};
use rsv_core::{compare_numbers, json_equal, utf16_len, JsonType};

use crate::node::{
    AdditionalPolicy, ArrayShape, NumberConstraint, ObjectShape, Schema, SchemaNode,
    StringConstraint,
};
use crate::registry::SchemaRegistry;
use crate::result::{ErrorKind, ValidationError, ValidationResult};

/// Evaluate `value` against `schema`, resolving references through
/// `registry`.
pub(crate) fn evaluate(registry: &SchemaRegistry, schema: &Schema, value: &Value) -> ValidationResult {
    let evaluator = Evaluator {
        registry,
        max_depth: registry.config().max_depth,
    };
    let mut errors = Vec::new();
    evaluator.schema(schema, value, &Location::root(), 0, &mut errors);
    ValidationResult::from_errors(errors)
}

/// Where the evaluator currently is, in the instance and in the schema.
struct Location {
    instance: String,
    schema: String,
}

impl Location {
    fn root() -> Self {
        Self {
            instance: String::new(),
            schema: "#".to_string(),
        }
    }

    fn keyword(&self, keyword: &str) -> String {
        format!("{}/{keyword}", self.schema)
    }

    /// Same instance, deeper schema.
    fn within(&self, schema_suffix: &str) -> Self {
        Self {
            instance: self.instance.clone(),
            schema: format!("{}/{schema_suffix}", self.schema),
        }
    }

    /// Child instance, deeper schema.
    fn child(&self, instance: String, schema_suffix: &str) -> Self {
        Self {
            instance,
            schema: format!("{}/{schema_suffix}", self.schema),
        }
    }
}

/// Whether the remaining nodes of a schema still run.
#[derive(PartialEq)]
enum Flow {
    Continue,
    Abort,
}

struct Evaluator<'r> {
    registry: &'r SchemaRegistry,
    max_depth: usize,
}

impl Evaluator<'_> {
    fn schema(
        &self,
        schema: &Schema,
        value: &Value,
        at: &Location,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) {
        if depth >= self.max_depth {
            errors.push(violation(
                ErrorKind::DepthExceeded,
                "maxDepth",
                &at.instance,
                at.schema.clone(),
                params([("limit", json!(self.max_depth))]),
                format!("exceeds maximum validation depth of {}", self.max_depth),
            ));
            return;
        }

        for node in schema.nodes() {
            let flow = match node {
                SchemaNode::TypeCheck(kinds) => self.type_check(kinds, value, at, errors),
                SchemaNode::Const(expected) => {
                    if !json_equal(value, expected) {
                        errors.push(violation(
                            ErrorKind::ConstMismatch,
                            "const",
                            &at.instance,
                            at.keyword("const"),
                            params([("allowedValue", expected.clone())]),
                            "must be equal to constant".to_string(),
                        ));
                    }
                    Flow::Continue
                }
                SchemaNode::Enum(allowed) => {
                    if !allowed.iter().any(|candidate| json_equal(value, candidate)) {
                        errors.push(violation(
                            ErrorKind::EnumMismatch,
                            "enum",
                            &at.instance,
                            at.keyword("enum"),
                            params([("allowedValues", Value::Array(allowed.clone()))]),
                            "must be equal to one of the allowed values".to_string(),
                        ));
                    }
                    Flow::Continue
                }
                SchemaNode::AnyOf(branches) => {
                    self.any_of(branches, value, at, depth, errors);
                    Flow::Continue
                }
                SchemaNode::OneOf(branches) => {
                    self.one_of(branches, value, at, depth, errors);
                    Flow::Continue
                }
                SchemaNode::NumberConstraint(constraint) => match value {
                    Value::Number(n) => self.number(constraint, n, at, errors),
                    _ => Flow::Continue,
                },
                SchemaNode::StringConstraint(constraint) => {
                    if let Value::String(s) = value {
                        self.string(constraint, s, at, errors);
                    }
                    Flow::Continue
                }
                SchemaNode::ArrayShape(shape) => {
                    if let Value::Array(items) = value {
                        self.array(shape, items, at, depth, errors);
                    }
                    Flow::Continue
                }
                SchemaNode::ObjectShape(shape) => {
                    if let Value::Object(map) = value {
                        self.object(shape, map, at, depth, errors);
                    }
                    Flow::Continue
                }
                SchemaNode::Ref(name) => {
                    self.reference(name, value, at, depth, errors);
                    Flow::Continue
                }
            };
            if flow == Flow::Abort {
                return;
            }
        }
    }

    fn type_check(
        &self,
        kinds: &[JsonType],
        value: &Value,
        at: &Location,
        errors: &mut Vec<ValidationError>,
    ) -> Flow {
        if kinds.iter().any(|kind| kind.matches(value)) {
            return Flow::Continue;
        }
        let expected = kinds
            .iter()
            .map(|kind| kind.as_str())
            .collect::<Vec<_>>()
            .join(",");
        errors.push(violation(
            ErrorKind::TypeMismatch,
            "type",
            &at.instance,
            at.keyword("type"),
            params([("type", json!(expected))]),
            format!("must be {expected}"),
        ));
        Flow::Abort
    }

    fn reference(
        &self,
        name: &str,
        value: &Value,
        at: &Location,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) {
        // Registration guarantees every reference resolves.
        let Some(target) = self.registry.get(name) else {
            tracing::error!(reference = %name, "unresolved reference reached evaluation");
            return;
        };
        let schema_path = if name.contains('#') {
            name.to_string()
        } else {
            format!("{name}#")
        };
        let inner = Location {
            instance: at.instance.clone(),
            schema: schema_path,
        };
        self.schema(target, value, &inner, depth + 1, errors);
    }

    /// Evaluate every branch of a combinator, returning the indices that
    /// passed and the errors of those that did not.
    fn branches(
        &self,
        keyword: &str,
        branches: &[Schema],
        value: &Value,
        at: &Location,
        depth: usize,
    ) -> (Vec<usize>, Vec<ValidationError>) {
        let mut passing = Vec::new();
        let mut failures = Vec::new();
        for (i, branch) in branches.iter().enumerate() {
            let mut branch_errors = Vec::new();
            let inner = at.within(&format!("{keyword}/{i}"));
            self.schema(branch, value, &inner, depth + 1, &mut branch_errors);
            if branch_errors.is_empty() {
                passing.push(i);
            } else {
                failures.extend(branch_errors);
            }
        }
        (passing, failures)
    }

    fn any_of(
        &self,
        branches: &[Schema],
        value: &Value,
        at: &Location,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) {
        let (passing, _) = self.branches("anyOf", branches, value, at, depth);
        if !passing.is_empty() {
            return;
        }
        errors.push(violation(
            ErrorKind::AnyOfViolation,
            "anyOf",
            &at.instance,
            at.keyword("anyOf"),
            Map::new(),
            "must match a schema in anyOf".to_string(),
        ));
    }

    fn one_of(
        &self,
        branches: &[Schema],
        value: &Value,
        at: &Location,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) {
        let (passing, failures) = self.branches("oneOf", branches, value, at, depth);
        if passing.len() == 1 {
            return;
        }
        errors.extend(failures);
        errors.push(violation(
            ErrorKind::OneOfViolation,
            "oneOf",
            &at.instance,
            at.keyword("oneOf"),
            params([("passingSchemas", json!(passing))]),
            "must match exactly one schema in oneOf".to_string(),
        ));
    }

    fn number(
        &self,
        constraint: &NumberConstraint,
        n: &Number,
        at: &Location,
        errors: &mut Vec<ValidationError>,
    ) -> Flow {
        if constraint.integer_only && !is_integral(n) {
            errors.push(violation(
                ErrorKind::TypeMismatch,
                "type",
                &at.instance,
                at.keyword("type"),
                params([("type", json!("integer"))]),
                "must be integer".to_string(),
            ));
            return Flow::Abort;
        }

        let bounds: [(&'static str, &Option<Number>, &str, fn(Ordering) -> bool); 4] = [
            ("maximum", &constraint.maximum, "<=", Ordering::is_le),
            ("minimum", &constraint.minimum, ">=", Ordering::is_ge),
            ("exclusiveMaximum", &constraint.exclusive_maximum, "<", Ordering::is_lt),
            ("exclusiveMinimum", &constraint.exclusive_minimum, ">", Ordering::is_gt),
        ];
        for (keyword, limit, comparison, accepts) in bounds {
            let Some(limit) = limit else {
                continue;
            };
            // A non-finite value fails every bound, whatever the comparison says.
            let within = is_finite(n) && compare_numbers(n, limit).is_some_and(accepts);
            if !within {
                errors.push(violation(
                    ErrorKind::RangeOutOfBounds,
                    keyword,
                    &at.instance,
                    at.keyword(keyword),
                    params([
                        ("comparison", json!(comparison)),
                        ("limit", Value::Number(limit.clone())),
                    ]),
                    format!("must be {comparison} {limit}"),
                ));
            }
        }
        Flow::Continue
    }

    fn string(
        &self,
        constraint: &StringConstraint,
        s: &str,
        at: &Location,
        errors: &mut Vec<ValidationError>,
    ) {
        let length = utf16_len(s);
        if let Some(limit) = constraint.max_length {
            if length > limit {
                errors.push(length_error(
                    "maxLength",
                    at,
                    limit,
                    format!("must NOT have more than {limit} characters"),
                ));
            }
        }
        if let Some(limit) = constraint.min_length {
            if length < limit {
                errors.push(length_error(
                    "minLength",
                    at,
                    limit,
                    format!("must NOT have fewer than {limit} characters"),
                ));
            }
        }
        if let Some(pattern) = &constraint.pattern {
            if !pattern.is_match(s) {
                errors.push(violation(
                    ErrorKind::PatternMismatch,
                    "pattern",
                    &at.instance,
                    at.keyword("pattern"),
                    params([("pattern", json!(pattern.as_str()))]),
                    format!("must match pattern \"{pattern}\""),
                ));
            }
        }
    }

    fn array(
        &self,
        shape: &ArrayShape,
        items: &[Value],
        at: &Location,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) {
        if let Some(limit) = shape.max_items {
            if items.len() > limit {
                errors.push(length_error(
                    "maxItems",
                    at,
                    limit,
                    format!("must NOT have more than {limit} items"),
                ));
            }
        }
        if let Some(limit) = shape.min_items {
            if items.len() < limit {
                errors.push(length_error(
                    "minItems",
                    at,
                    limit,
                    format!("must NOT have fewer than {limit} items"),
                ));
            }
        }
        if shape.unique_items {
            if let Some((i, j)) = first_duplicate(items) {
                errors.push(violation(
                    ErrorKind::DuplicateItem,
                    "uniqueItems",
                    &at.instance,
                    at.keyword("uniqueItems"),
                    params([("i", json!(i)), ("j", json!(j))]),
                    format!("must NOT have duplicate items (items ## {j} and {i} are identical)"),
                ));
            }
        }
        if let Some(item_schema) = &shape.items {
            for (index, item) in items.iter().enumerate() {
                let inner = at.child(join_index(&at.instance, index), "items");
                self.schema(item_schema, item, &inner, depth + 1, errors);
            }
        }
    }

    fn object(
        &self,
        shape: &ObjectShape,
        map: &Map<String, Value>,
        at: &Location,
        depth: usize,
        errors: &mut Vec<ValidationError>,
    ) {
        if let Some(limit) = shape.max_properties {
            if map.len() > limit {
                errors.push(length_error(
                    "maxProperties",
                    at,
                    limit,
                    format!("must NOT have more than {limit} properties"),
                ));
            }
        }
        if let Some(limit) = shape.min_properties {
            if map.len() < limit {
                errors.push(length_error(
                    "minProperties",
                    at,
                    limit,
                    format!("must NOT have fewer than {limit} properties"),
                ));
            }
        }

        for key in &shape.required {
            if !map.contains_key(key) {
                errors.push(violation(
                    ErrorKind::MissingRequiredProperty,
                    "required",
                    &at.instance,
                    at.keyword("required"),
                    params([("missingProperty", json!(key))]),
                    format!("must have required property '{key}'"),
                ));
            }
        }

        if let Some(name_schema) = &shape.property_names {
            let inner = at.within("propertyNames");
            for key in map.keys() {
                let mut name_errors = Vec::new();
                let name = Value::String(key.clone());
                self.schema(name_schema, &name, &inner, depth + 1, &mut name_errors);
                if name_errors.is_empty() {
                    continue;
                }
                for mut error in name_errors {
                    error.params.insert("propertyName".to_string(), json!(key));
                    errors.push(error);
                }
                errors.push(violation(
                    ErrorKind::PropertyNameInvalid,
                    "propertyNames",
                    &at.instance,
                    at.keyword("propertyNames"),
                    params([("propertyName", json!(key))]),
                    "property name must be valid".to_string(),
                ));
            }
        }

        match &shape.additional {
            AdditionalPolicy::Allow => {}
            AdditionalPolicy::Deny => {
                for key in map.keys().filter(|key| shape.property(key).is_none()) {
                    errors.push(violation(
                        ErrorKind::UnexpectedProperty,
                        "additionalProperties",
                        &at.instance,
                        at.keyword("additionalProperties"),
                        params([("additionalProperty", json!(key))]),
                        "must NOT have additional properties".to_string(),
                    ));
                }
            }
            AdditionalPolicy::Schema(additional) => {
                for (key, item) in map.iter().filter(|(key, _)| shape.property(key).is_none()) {
                    let inner = at.child(join(&at.instance, key), "additionalProperties");
                    self.schema(additional, item, &inner, depth + 1, errors);
                }
            }
        }

        for (name, property) in &shape.properties {
            if let Some(item) = map.get(name) {
                let inner = at.child(
                    join(&at.instance, name),
                    &format!("properties/{}", escape_segment(name)),
                );
                self.schema(property, item, &inner, depth + 1, errors);
            }
        }
    }
}

/// First equal pair scanning `i` from the end and `j` below it; `i > j`.
fn first_duplicate(items: &[Value]) -> Option<(usize, usize)> {
    (0..items.len())
        .rev()
        .find_map(|i| (0..i).rev().find(|&j| json_equal(&items[i], &items[j])).map(|j| (i, j)))
}

fn length_error(keyword: &'static str, at: &Location, limit: usize, message: String) -> ValidationError {
    violation(
        ErrorKind::LengthOutOfRange,
        keyword,
        &at.instance,
        at.keyword(keyword),
        params([("limit", json!(limit))]),
        message,
    )
}

fn violation(
    kind: ErrorKind,
    keyword: &'static str,
    instance_path: &str,
    schema_path: String,
    params: Map<String, Value>,
    message: String,
) -> ValidationError {
    ValidationError {
        kind,
        instance_path: instance_path.to_string(),
        schema_path,
        keyword,
        params,
        message,
    }
}

fn params<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SchemaRegistryBuilder;
    use rsv_core::ValidatorConfig;

    fn registry(document: Value) -> SchemaRegistry {
        SchemaRegistry::builder()
            .register_document("t", &document)
            .unwrap()
            .build()
            .unwrap()
    }

    fn check(document: Value, value: Value) -> ValidationResult {
        registry(document).validate("t", &value).unwrap()
    }

    // Nested `Value`s drop recursively; release them one level at a time.
    fn release(value: Value) {
        let mut stack = vec![value];
        while let Some(v) = stack.pop() {
            match v {
                Value::Array(items) => stack.extend(items),
                Value::Object(map) => stack.extend(map.into_iter().map(|(_, v)| v)),
                _ => {}
            }
        }
    }

    fn keywords(result: &ValidationResult) -> Vec<&'static str> {
        result.errors.iter().map(|e| e.keyword).collect()
    }

    #[test]
    fn empty_schema_accepts_everything() {
        for value in [json!(null), json!(1), json!("x"), json!([1]), json!({"a": {}})] {
            assert!(check(json!({}), value).is_valid());
        }
    }

    #[test]
    fn type_failure_stops_sibling_checks() {
        let result = check(json!({"type": "string", "minLength": 3, "enum": ["abc"]}), json!(7));
        assert_eq!(keywords(&result), vec!["type"]);
        assert_eq!(result.errors[0].message, "must be string");
        assert_eq!(result.errors[0].schema_path, "#/type");
    }

    #[test]
    fn union_type_is_one_error() {
        let result = check(json!({"type": ["number", "null"]}), json!("42000"));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].message, "must be number,null");
        assert_eq!(result.errors[0].params["type"], json!("number,null"));
    }

    #[test]
    fn integer_type_accepts_integral_floats() {
        let schema = json!({"type": "integer"});
        assert!(check(schema.clone(), json!(2.0)).is_valid());
        assert!(!check(schema, json!(2.5)).is_valid());
    }

    #[test]
    fn every_missing_required_key_reported() {
        let result = check(json!({"required": ["a", "b", "c"]}), json!({"b": 1}));
        assert_eq!(result.count(ErrorKind::MissingRequiredProperty), 2);
        let missing: Vec<&Value> = result
            .errors
            .iter()
            .map(|e| &e.params["missingProperty"])
            .collect();
        assert_eq!(missing, vec![&json!("a"), &json!("c")]);
    }

    #[test]
    fn object_error_order() {
        let result = check(
            json!({
                "properties": {"a": {"type": "string"}},
                "required": ["z"],
                "additionalProperties": false
            }),
            json!({"a": 1, "extra": true}),
        );
        assert_eq!(
            keywords(&result),
            vec!["required", "additionalProperties", "type"]
        );
        assert_eq!(result.errors[1].params["additionalProperty"], json!("extra"));
        assert_eq!(result.errors[2].instance_path, "/a");
        assert_eq!(result.errors[2].schema_path, "#/properties/a/type");
    }

    #[test]
    fn additional_schema_applies_to_undeclared_keys() {
        let result = check(
            json!({
                "properties": {"last_updated_at": {"type": "number"}},
                "additionalProperties": {"type": ["number", "null"]}
            }),
            json!({"last_updated_at": 1, "usd": null, "eur": "x", "a/b": "y"}),
        );
        let paths: Vec<&str> = result.errors.iter().map(|e| e.instance_path.as_str()).collect();
        assert_eq!(paths, vec!["/eur", "/a~1b"]);
        assert!(result
            .errors
            .iter()
            .all(|e| e.schema_path == "#/additionalProperties/type"));
    }

    #[test]
    fn property_names_wrap_inner_errors() {
        let result = check(
            json!({"propertyNames": {"maxLength": 3, "pattern": "^[a-z]+$"}}),
            json!({"ok": 1, "TOO_LONG": 2}),
        );
        assert_eq!(keywords(&result), vec!["maxLength", "pattern", "propertyNames"]);
        for error in &result.errors {
            assert_eq!(error.params["propertyName"], json!("TOO_LONG"));
            assert_eq!(error.instance_path, "");
        }
        assert_eq!(result.errors[2].kind, ErrorKind::PropertyNameInvalid);
    }

    #[test]
    fn property_count_limits() {
        let schema = json!({"minProperties": 1, "maxProperties": 2});
        assert_eq!(
            check(schema.clone(), json!({})).errors[0].kind,
            ErrorKind::LengthOutOfRange
        );
        assert!(check(schema.clone(), json!({"a": 1})).is_valid());
        let result = check(schema, json!({"a": 1, "b": 2, "c": 3}));
        assert_eq!(keywords(&result), vec!["maxProperties"]);
        assert_eq!(result.errors[0].params["limit"], json!(2));
    }

    #[test]
    fn utf16_length_counts_astral_characters_twice() {
        let schema = json!({"type": "string", "maxLength": 1});
        let result = check(schema, json!("\u{1F600}"));
        assert_eq!(result.count(ErrorKind::LengthOutOfRange), 1);
        assert!(check(json!({"minLength": 2}), json!("\u{1F600}")).is_valid());
        assert!(!check(json!({"minLength": 2}), json!("é")).is_valid());
    }

    #[test]
    fn pattern_mismatch_reports_pattern() {
        let result = check(json!({"pattern": "^0x[a-fA-F0-9]{40}$"}), json!("0x123"));
        assert_eq!(result.errors[0].kind, ErrorKind::PatternMismatch);
        assert_eq!(result.errors[0].params["pattern"], json!("^0x[a-fA-F0-9]{40}$"));
    }

    #[test]
    fn format_is_not_enforced() {
        assert!(check(json!({"type": "string", "format": "uri"}), json!("not a uri")).is_valid());
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let schema = json!({"minimum": 0, "maximum": 255});
        assert!(check(schema.clone(), json!(0)).is_valid());
        assert!(check(schema.clone(), json!(255)).is_valid());
        let result = check(schema.clone(), json!(256));
        assert_eq!(keywords(&result), vec!["maximum"]);
        assert_eq!(result.errors[0].message, "must be <= 255");
        assert_eq!(check(schema, json!(-0.5)).errors[0].kind, ErrorKind::RangeOutOfBounds);
    }

    #[test]
    fn exclusive_bounds() {
        let schema = json!({"exclusiveMinimum": 0, "exclusiveMaximum": 1});
        assert!(check(schema.clone(), json!(0.5)).is_valid());
        assert_eq!(
            keywords(&check(schema.clone(), json!(0))),
            vec!["exclusiveMinimum"]
        );
        assert_eq!(keywords(&check(schema, json!(1))), vec!["exclusiveMaximum"]);
    }

    #[test]
    fn bounds_ignore_other_types() {
        assert!(check(json!({"minimum": 10, "minLength": 5}), json!(true)).is_valid());
    }

    #[test]
    fn const_and_enum_use_numeric_equality() {
        assert!(check(json!({"const": 1}), json!(1.0)).is_valid());
        let result = check(json!({"const": true}), json!(false));
        assert_eq!(result.errors[0].kind, ErrorKind::ConstMismatch);
        assert_eq!(result.errors[0].params["allowedValue"], json!(true));

        assert!(check(json!({"enum": ["a", {"b": [1]}]}), json!({"b": [1.0]})).is_valid());
        let result = check(json!({"enum": ["a", "b"]}), json!("c"));
        assert_eq!(result.errors[0].kind, ErrorKind::EnumMismatch);
        assert_eq!(result.errors[0].params["allowedValues"], json!(["a", "b"]));
    }

    #[test]
    fn array_length_limits() {
        let schema = json!({"minItems": 1, "maxItems": 2});
        assert_eq!(keywords(&check(schema.clone(), json!([]))), vec!["minItems"]);
        assert_eq!(keywords(&check(schema, json!([1, 2, 3]))), vec!["maxItems"]);
    }

    #[test]
    fn unique_items_reports_one_pair_scanning_backwards() {
        let result = check(json!({"uniqueItems": true}), json!(["a", "b", "a", "b"]));
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::DuplicateItem);
        assert_eq!(result.errors[0].params["i"], json!(3));
        assert_eq!(result.errors[0].params["j"], json!(1));
        assert_eq!(
            result.errors[0].message,
            "must NOT have duplicate items (items ## 1 and 3 are identical)"
        );
    }

    #[test]
    fn unique_items_uses_deep_equality() {
        let schema = json!({"uniqueItems": true});
        assert!(!check(schema.clone(), json!([{"a": [1]}, {"a": [1.0]}])).is_valid());
        assert!(check(schema, json!([{"a": 1}, {"a": 2}, 1, "1"])).is_valid());
    }

    #[test]
    fn unique_items_compares_deep_values_iteratively() {
        let nested = |leaf: Value| {
            let mut value = leaf;
            for _ in 0..200_000 {
                value = Value::Array(vec![value]);
            }
            value
        };
        let value = Value::Array(vec![nested(json!(1)), nested(json!(1.0))]);
        let result = registry(json!({"uniqueItems": true})).validate("t", &value).unwrap();
        assert_eq!(result.count(ErrorKind::DuplicateItem), 1);
        release(value);
    }

    #[test]
    fn items_validated_at_indexed_paths() {
        let result = check(json!({"items": {"type": "string"}}), json!(["a", 1, "b", null]));
        let paths: Vec<&str> = result.errors.iter().map(|e| e.instance_path.as_str()).collect();
        assert_eq!(paths, vec!["/1", "/3"]);
        assert_eq!(result.errors[0].schema_path, "#/items/type");
    }

    #[test]
    fn one_of_single_match_discards_branch_errors() {
        let result = check(
            json!({"oneOf": [{"type": "string"}, {"type": "number"}]}),
            json!(3),
        );
        assert!(result.is_valid());
        assert!(result.errors.is_empty());
    }

    #[test]
    fn one_of_double_match_lists_both() {
        let result = check(
            json!({"oneOf": [{"type": "number"}, {"minimum": 0}]}),
            json!(3),
        );
        assert_eq!(keywords(&result), vec!["oneOf"]);
        assert_eq!(result.errors[0].params["passingSchemas"], json!([0, 1]));
        assert_eq!(result.errors[0].kind, ErrorKind::OneOfViolation);
    }

    #[test]
    fn one_of_no_match_keeps_branch_detail() {
        let result = check(
            json!({"oneOf": [
                {"required": ["a", "b"]},
                {"properties": {"kind": {"const": "none"}}, "required": ["kind"]}
            ]}),
            json!({"kind": "some"}),
        );
        assert_eq!(
            keywords(&result),
            vec!["required", "required", "const", "oneOf"]
        );
        assert_eq!(result.errors[0].schema_path, "#/oneOf/0/required");
        assert_eq!(result.errors[3].params["passingSchemas"], json!([]));
    }

    #[test]
    fn any_of_failure_is_summary_only() {
        let result = check(
            json!({"anyOf": [{"type": "string", "minLength": 1}, {"type": "boolean"}]}),
            json!(""),
        );
        assert_eq!(keywords(&result), vec!["anyOf"]);
        assert_eq!(result.errors[0].kind, ErrorKind::AnyOfViolation);
        assert!(result.errors[0].params.is_empty());
    }

    #[test]
    fn any_of_evaluates_every_branch() {
        let registry = registry(json!({
            "anyOf": [{"type": "string"}, {"minLength": 2}, {"type": "null"}]
        }));
        let evaluator = Evaluator {
            registry: &registry,
            max_depth: 128,
        };
        let schema = registry.get("t").unwrap();
        let SchemaNode::AnyOf(branches) = &schema.nodes()[0] else {
            panic!("expected anyOf: {schema:?}");
        };
        let (passing, failures) =
            evaluator.branches("anyOf", branches, &json!("ab"), &Location::root(), 0);
        assert_eq!(passing, vec![0, 1]);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].schema_path, "#/anyOf/2/type");
        assert!(registry.validate("t", &json!("ab")).unwrap().is_valid());
    }

    #[test]
    fn any_of_success_is_clean() {
        let result = check(json!({"anyOf": [{"type": "string"}, {"type": "null"}]}), json!(null));
        assert!(result.is_valid());
    }

    #[test]
    fn ref_errors_use_target_schema_path() {
        let result = check(
            json!({
                "definitions": {"Version": {"required": ["major"]}},
                "properties": {"version": {"$ref": "#/definitions/Version"}}
            }),
            json!({"version": {}}),
        );
        assert_eq!(result.errors[0].instance_path, "/version");
        assert_eq!(result.errors[0].schema_path, "t#/definitions/Version/required");
    }

    #[test]
    fn integer_only_number_constraint() {
        let schema = Schema::new(vec![SchemaNode::NumberConstraint(NumberConstraint {
            minimum: Some(Number::from(10)),
            integer_only: true,
            ..NumberConstraint::default()
        })]);
        let registry = SchemaRegistry::builder()
            .register_schema("int", schema)
            .unwrap()
            .build()
            .unwrap();
        let result = registry.validate("int", &json!(1.5)).unwrap();
        assert_eq!(keywords(&result), vec!["type"]);
        assert_eq!(result.errors[0].message, "must be integer");
        let result = registry.validate("int", &json!(3)).unwrap();
        assert_eq!(keywords(&result), vec!["minimum"]);
        assert!(registry.validate("int", &json!("x")).unwrap().is_valid());
    }

    #[test]
    fn depth_bound_stops_recursion() {
        let registry = SchemaRegistryBuilder::new()
            .with_config(ValidatorConfig::default().with_max_depth(8))
            .register_document(
                "t",
                &json!({"type": "array", "items": {"$ref": "#"}}),
            )
            .unwrap()
            .build()
            .unwrap();

        let mut value = json!([]);
        for _ in 0..50 {
            value = json!([value]);
        }
        let result = registry.validate("t", &value).unwrap();
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, ErrorKind::DepthExceeded);
        assert_eq!(result.errors[0].params["limit"], json!(8));

        assert!(registry.validate("t", &json!([[]])).unwrap().is_valid());
    }

    #[test]
    fn deeply_nested_payload_does_not_overflow() {
        let registry = registry(json!({
            "type": "object",
            "additionalProperties": {"$ref": "#"}
        }));
        let mut value = Value::Object(Map::new());
        for _ in 0..10_000 {
            let mut wrapper = Map::new();
            wrapper.insert("n".to_string(), value);
            value = Value::Object(wrapper);
        }
        let result = registry.validate("t", &value).unwrap();
        assert_eq!(result.count(ErrorKind::DepthExceeded), 1);
        release(value);
    }

    #[test]
    fn first_duplicate_scan_order() {
        assert_eq!(first_duplicate(&[json!(1), json!(2)]), None);
        assert_eq!(first_duplicate(&[json!(1), json!(1), json!(1)]), Some((2, 1)));
        assert_eq!(first_duplicate(&[]), None);
    }
}
