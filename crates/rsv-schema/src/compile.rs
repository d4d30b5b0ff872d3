//! # Schema Document Compiler
//!
//! Turns draft-07 JSON Schema documents into [`Schema`] trees. The documents
//! are the source of truth for every contract; this module is the only place
//! that reads JSON Schema syntax.
//!
//! ## Strictness
//!
//! Keywords the evaluator does not implement are rejected with
//! [`SchemaError::UnsupportedKeyword`] rather than ignored: an ignored
//! constraint would silently widen the contract. Pure annotations (`title`,
//! `description`, `examples`, ...) are accepted and dropped.
//!
//! ## Names
//!
//! A document compiled under `name` yields its root schema under `name` and
//! each definition under `name#/definitions/<Def>` (or `name#/$defs/<Def>`).
//! Local references (`#/definitions/X`) are rewritten to those qualified
//! names, so documents never collide. A reference without a `#` names
//! another registered document; `other#/definitions/X` names one of its
//! definitions.
//!
//! ## Node Order
//!
//! Keywords of one schema object compile to nodes in evaluation order:
//! `type`, `const`, `enum`, `anyOf`, `oneOf`, number, string, array, object.
//! `$ref` replaces its siblings, as in draft-07.

use serde_json::{Map, Number, Value};

use rsv_core::pointer::escape_segment;
use rsv_core::JsonType;

use crate::error::SchemaError;
use crate::node::{
    AdditionalPolicy, ArrayShape, NumberConstraint, ObjectShape, Schema, SchemaNode,
    StringConstraint,
};
use crate::pattern::Pattern;

/// Keywords that carry no validation semantics.
const ANNOTATIONS: &[&str] = &[
    "$schema",
    "$id",
    "$comment",
    "title",
    "description",
    "examples",
    "default",
    "readOnly",
    "writeOnly",
    "deprecated",
];

/// Keywords the compiler turns into nodes.
const SUPPORTED: &[&str] = &[
    "$ref",
    "type",
    "const",
    "enum",
    "anyOf",
    "oneOf",
    "minimum",
    "maximum",
    "exclusiveMinimum",
    "exclusiveMaximum",
    "minLength",
    "maxLength",
    "pattern",
    "format",
    "items",
    "minItems",
    "maxItems",
    "uniqueItems",
    "properties",
    "required",
    "additionalProperties",
    "propertyNames",
    "minProperties",
    "maxProperties",
];

/// Definition containers, accepted only at the document root.
const DEFINITION_KEYWORDS: &[&str] = &["definitions", "$defs"];

/// A compiled document: its root schema and its named definitions.
#[derive(Debug, Clone)]
pub struct CompiledDocument {
    /// Registration name of the root schema.
    pub name: String,
    /// The root schema.
    pub root: Schema,
    /// `(qualified name, schema)` for every definition, in document order.
    pub definitions: Vec<(String, Schema)>,
}

impl CompiledDocument {
    /// Iterate over every `(name, schema)` pair the document contributes.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Schema)> {
        std::iter::once((self.name.as_str(), &self.root))
            .chain(self.definitions.iter().map(|(n, s)| (n.as_str(), s)))
    }
}

/// Compile a JSON Schema document registered under `name`.
///
/// # Errors
///
/// Returns `UnsupportedKeyword`, `MalformedSchema` or `InvalidPattern` for
/// the first problem found, with the JSON-pointer location inside the
/// document.
pub fn compile_document(name: &str, document: &Value) -> Result<CompiledDocument, SchemaError> {
    let compiler = Compiler { document: name };

    let mut definitions = Vec::new();
    if let Value::Object(root) = document {
        for keyword in DEFINITION_KEYWORDS {
            let Some(defs) = root.get(*keyword) else {
                continue;
            };
            let defs = defs.as_object().ok_or_else(|| SchemaError::MalformedSchema {
                schema_path: format!("#/{keyword}"),
                reason: "must be an object".to_string(),
            })?;
            for (def_name, def) in defs {
                let pointer = format!("#/{keyword}/{}", escape_segment(def_name));
                let schema = compiler.compile(def, &pointer)?;
                definitions.push((format!("{name}{pointer}"), schema));
            }
        }
    }

    let root = compiler.compile_root(document)?;
    Ok(CompiledDocument {
        name: name.to_string(),
        root,
        definitions,
    })
}

/// Compile a standalone schema value (no definitions, references resolved
/// against `document`).
pub fn compile_schema(document: &str, value: &Value) -> Result<Schema, SchemaError> {
    Compiler { document }.compile(value, "#")
}

struct Compiler<'a> {
    document: &'a str,
}

impl Compiler<'_> {
    fn compile_root(&self, value: &Value) -> Result<Schema, SchemaError> {
        match value {
            Value::Object(obj) => self.compile_object(obj, "#", true),
            other => self.compile(other, "#"),
        }
    }

    fn compile(&self, value: &Value, path: &str) -> Result<Schema, SchemaError> {
        match value {
            Value::Bool(true) => Ok(Schema::any()),
            Value::Bool(false) => Err(malformed(
                path,
                "the `false` schema is only supported as additionalProperties",
            )),
            Value::Object(obj) => self.compile_object(obj, path, false),
            _ => Err(malformed(path, "a schema must be an object or a boolean")),
        }
    }

    fn compile_object(
        &self,
        obj: &Map<String, Value>,
        path: &str,
        is_root: bool,
    ) -> Result<Schema, SchemaError> {
        for keyword in obj.keys() {
            let known = SUPPORTED.contains(&keyword.as_str())
                || ANNOTATIONS.contains(&keyword.as_str())
                || (is_root && DEFINITION_KEYWORDS.contains(&keyword.as_str()));
            if !known {
                return Err(SchemaError::UnsupportedKeyword {
                    keyword: keyword.clone(),
                    schema_path: path.to_string(),
                });
            }
        }

        if let Some(reference) = obj.get("$ref") {
            let reference = reference
                .as_str()
                .ok_or_else(|| malformed(&kw_path(path, "$ref"), "must be a string"))?;
            return Ok(Schema::reference(self.resolve_ref(reference)));
        }

        let mut nodes = Vec::new();

        if let Some(types) = obj.get("type") {
            nodes.push(SchemaNode::TypeCheck(parse_types(types, &kw_path(path, "type"))?));
        }
        if let Some(value) = obj.get("const") {
            nodes.push(SchemaNode::Const(value.clone()));
        }
        if let Some(values) = obj.get("enum") {
            let values = values
                .as_array()
                .ok_or_else(|| malformed(&kw_path(path, "enum"), "must be an array"))?;
            nodes.push(SchemaNode::Enum(values.clone()));
        }
        if let Some(branches) = obj.get("anyOf") {
            nodes.push(SchemaNode::AnyOf(self.compile_branches(branches, path, "anyOf")?));
        }
        if let Some(branches) = obj.get("oneOf") {
            nodes.push(SchemaNode::OneOf(self.compile_branches(branches, path, "oneOf")?));
        }

        let number = NumberConstraint {
            minimum: get_number(obj, "minimum", path)?,
            maximum: get_number(obj, "maximum", path)?,
            exclusive_minimum: get_number(obj, "exclusiveMinimum", path)?,
            exclusive_maximum: get_number(obj, "exclusiveMaximum", path)?,
            integer_only: false,
        };
        if number.minimum.is_some()
            || number.maximum.is_some()
            || number.exclusive_minimum.is_some()
            || number.exclusive_maximum.is_some()
        {
            nodes.push(SchemaNode::NumberConstraint(number));
        }

        let string = StringConstraint {
            min_length: get_usize(obj, "minLength", path)?,
            max_length: get_usize(obj, "maxLength", path)?,
            pattern: self.compile_pattern(obj, path)?,
            format: get_string(obj, "format", path)?,
        };
        if string.min_length.is_some()
            || string.max_length.is_some()
            || string.pattern.is_some()
            || string.format.is_some()
        {
            nodes.push(SchemaNode::StringConstraint(string));
        }

        let array = ArrayShape {
            items: match obj.get("items") {
                Some(Value::Array(_)) => {
                    return Err(malformed(
                        &kw_path(path, "items"),
                        "tuple-form items is not supported",
                    ))
                }
                Some(items) => Some(Box::new(self.compile(items, &kw_path(path, "items"))?)),
                None => None,
            },
            min_items: get_usize(obj, "minItems", path)?,
            max_items: get_usize(obj, "maxItems", path)?,
            unique_items: get_bool(obj, "uniqueItems", path)?.unwrap_or(false),
        };
        if array.items.is_some()
            || array.min_items.is_some()
            || array.max_items.is_some()
            || array.unique_items
        {
            nodes.push(SchemaNode::ArrayShape(array));
        }

        let object = self.compile_object_shape(obj, path)?;
        let has_object_keywords = !object.properties.is_empty()
            || !object.required.is_empty()
            || !matches!(object.additional, AdditionalPolicy::Allow)
            || object.property_names.is_some()
            || object.min_properties.is_some()
            || object.max_properties.is_some();
        if has_object_keywords {
            nodes.push(SchemaNode::ObjectShape(object));
        }

        Ok(Schema::new(nodes))
    }

    fn compile_object_shape(
        &self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<ObjectShape, SchemaError> {
        let mut shape = ObjectShape {
            min_properties: get_usize(obj, "minProperties", path)?,
            max_properties: get_usize(obj, "maxProperties", path)?,
            ..ObjectShape::default()
        };

        if let Some(properties) = obj.get("properties") {
            let properties_path = kw_path(path, "properties");
            let properties = properties
                .as_object()
                .ok_or_else(|| malformed(&properties_path, "must be an object"))?;
            for (name, schema) in properties {
                let property_path = kw_path(&properties_path, &escape_segment(name));
                shape
                    .properties
                    .push((name.clone(), self.compile(schema, &property_path)?));
            }
        }

        if let Some(required) = obj.get("required") {
            let required_path = kw_path(path, "required");
            let required = required
                .as_array()
                .ok_or_else(|| malformed(&required_path, "must be an array"))?;
            for key in required {
                let key = key
                    .as_str()
                    .ok_or_else(|| malformed(&required_path, "entries must be strings"))?;
                shape.required.push(key.to_string());
            }
        }

        shape.additional = match obj.get("additionalProperties") {
            None | Some(Value::Bool(true)) => AdditionalPolicy::Allow,
            Some(Value::Bool(false)) => AdditionalPolicy::Deny,
            Some(schema) => AdditionalPolicy::Schema(Box::new(
                self.compile(schema, &kw_path(path, "additionalProperties"))?,
            )),
        };

        if let Some(names) = obj.get("propertyNames") {
            shape.property_names = Some(Box::new(
                self.compile(names, &kw_path(path, "propertyNames"))?,
            ));
        }

        Ok(shape)
    }

    fn compile_branches(
        &self,
        branches: &Value,
        path: &str,
        keyword: &str,
    ) -> Result<Vec<Schema>, SchemaError> {
        let keyword_path = kw_path(path, keyword);
        let branches = branches
            .as_array()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| malformed(&keyword_path, "must be a non-empty array"))?;
        branches
            .iter()
            .enumerate()
            .map(|(i, branch)| self.compile(branch, &format!("{keyword_path}/{i}")))
            .collect()
    }

    fn compile_pattern(
        &self,
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<Option<Pattern>, SchemaError> {
        let Some(source) = get_string(obj, "pattern", path)? else {
            return Ok(None);
        };
        Pattern::new(&source)
            .map(Some)
            .map_err(|e| SchemaError::InvalidPattern {
                pattern: source.clone(),
                schema_path: kw_path(path, "pattern"),
                reason: e.to_string(),
            })
    }

    fn resolve_ref(&self, reference: &str) -> String {
        match reference.strip_prefix('#') {
            Some("") => self.document.to_string(),
            Some(local) => format!("{}#{local}", self.document),
            None => reference.strip_suffix('#').unwrap_or(reference).to_string(),
        }
    }
}

fn parse_types(types: &Value, path: &str) -> Result<Vec<JsonType>, SchemaError> {
    let parse_one = |name: &Value| {
        name.as_str()
            .and_then(JsonType::parse)
            .ok_or_else(|| malformed(path, format!("unknown type {name}")))
    };
    match types {
        Value::Array(names) if !names.is_empty() => names.iter().map(parse_one).collect(),
        Value::Array(_) => Err(malformed(path, "type list must not be empty")),
        single => Ok(vec![parse_one(single)?]),
    }
}

fn get_usize(
    obj: &Map<String, Value>,
    keyword: &str,
    path: &str,
) -> Result<Option<usize>, SchemaError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| malformed(&kw_path(path, keyword), "must be a non-negative integer")),
    }
}

fn get_number(
    obj: &Map<String, Value>,
    keyword: &str,
    path: &str,
) -> Result<Option<Number>, SchemaError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(Value::Number(n)) => Ok(Some(n.clone())),
        Some(_) => Err(malformed(&kw_path(path, keyword), "must be a number")),
    }
}

fn get_bool(
    obj: &Map<String, Value>,
    keyword: &str,
    path: &str,
) -> Result<Option<bool>, SchemaError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(malformed(&kw_path(path, keyword), "must be a boolean")),
    }
}

fn get_string(
    obj: &Map<String, Value>,
    keyword: &str,
    path: &str,
) -> Result<Option<String>, SchemaError> {
    match obj.get(keyword) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(malformed(&kw_path(path, keyword), "must be a string")),
    }
}

fn kw_path(path: &str, keyword: &str) -> String {
    format!("{path}/{keyword}")
}

fn malformed(path: &str, reason: impl Into<String>) -> SchemaError {
    SchemaError::MalformedSchema {
        schema_path: path.to_string(),
        reason: reason.into(),
    }
}
