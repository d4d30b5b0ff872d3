//! # Schema Model
//!
//! A [`Schema`] is an ordered conjunction of [`SchemaNode`] constraint
//! units. A JSON Schema object such as
//!
//! ```json
//! { "type": "string", "minLength": 1, "pattern": "^\\w+$" }
//! ```
//!
//! becomes two nodes: a `TypeCheck` followed by a `StringConstraint`. The
//! evaluator walks the nodes in order, so node order is error order.
//!
//! Schemas are plain data. They can be produced by the document compiler
//! ([`crate::compile`]) or built by hand with the constructors below, and
//! only become usable once registered in a [`crate::SchemaRegistry`], which
//! checks that every [`SchemaNode::Ref`] resolves.

use serde_json::{Number, Value};

use rsv_core::JsonType;

use crate::pattern::Pattern;

/// An ordered conjunction of constraint units. The empty schema accepts
/// every value.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    nodes: Vec<SchemaNode>,
}

/// One constraint unit.
#[derive(Debug, Clone)]
pub enum SchemaNode {
    /// The value must be of one of the listed kinds. A failure stops the
    /// evaluation of the remaining nodes of the same schema.
    TypeCheck(Vec<JsonType>),
    /// Constraints on objects. Ignored for non-objects.
    ObjectShape(ObjectShape),
    /// Constraints on arrays. Ignored for non-arrays.
    ArrayShape(ArrayShape),
    /// Constraints on strings. Ignored for non-strings.
    StringConstraint(StringConstraint),
    /// Constraints on numbers. Ignored for non-numbers.
    NumberConstraint(NumberConstraint),
    /// The value must equal this literal.
    Const(Value),
    /// The value must equal one of these literals.
    Enum(Vec<Value>),
    /// Exactly one branch must accept the value.
    OneOf(Vec<Schema>),
    /// At least one branch must accept the value.
    AnyOf(Vec<Schema>),
    /// Delegate to a registered schema by name.
    Ref(String),
}

/// Treatment of object keys not declared in [`ObjectShape::properties`].
#[derive(Debug, Clone, Default)]
pub enum AdditionalPolicy {
    /// Undeclared keys are accepted without inspection.
    #[default]
    Allow,
    /// Every undeclared key is an error.
    Deny,
    /// Every undeclared key's value must satisfy this schema.
    Schema(Box<Schema>),
}

/// Object constraints.
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    /// Declared properties, in declaration order.
    pub properties: Vec<(String, Schema)>,
    /// Keys that must be present.
    pub required: Vec<String>,
    /// Policy for undeclared keys.
    pub additional: AdditionalPolicy,
    /// Schema every key string must satisfy.
    pub property_names: Option<Box<Schema>>,
    /// Lower bound on the number of keys.
    pub min_properties: Option<usize>,
    /// Upper bound on the number of keys.
    pub max_properties: Option<usize>,
}

/// Array constraints.
#[derive(Debug, Clone, Default)]
pub struct ArrayShape {
    /// Schema applied to every element.
    pub items: Option<Box<Schema>>,
    /// Lower bound on the length.
    pub min_items: Option<usize>,
    /// Upper bound on the length.
    pub max_items: Option<usize>,
    /// Whether all elements must be pairwise distinct.
    pub unique_items: bool,
}

/// String constraints. Lengths are in UTF-16 code units.
#[derive(Debug, Clone, Default)]
pub struct StringConstraint {
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Pattern>,
    /// Informational only; never enforced.
    pub format: Option<String>,
}

/// Number constraints. `minimum` and `maximum` are inclusive.
#[derive(Debug, Clone, Default)]
pub struct NumberConstraint {
    pub minimum: Option<Number>,
    pub maximum: Option<Number>,
    pub exclusive_minimum: Option<Number>,
    pub exclusive_maximum: Option<Number>,
    /// Reject numbers with a fractional part.
    pub integer_only: bool,
}

impl Schema {
    /// Build a schema from nodes, evaluated in the given order.
    pub fn new(nodes: Vec<SchemaNode>) -> Self {
        Self { nodes }
    }

    /// The schema that accepts every value.
    pub fn any() -> Self {
        Self::default()
    }

    /// A schema requiring one of the given kinds.
    pub fn of_types(kinds: impl IntoIterator<Item = JsonType>) -> Self {
        Self::new(vec![SchemaNode::TypeCheck(kinds.into_iter().collect())])
    }

    /// A schema requiring a single kind.
    pub fn of_type(kind: JsonType) -> Self {
        Self::of_types([kind])
    }

    /// A schema delegating to a registered schema.
    pub fn reference(name: impl Into<String>) -> Self {
        Self::new(vec![SchemaNode::Ref(name.into())])
    }

    /// Append a node.
    pub fn with(mut self, node: SchemaNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// The constraint units, in evaluation order.
    pub fn nodes(&self) -> &[SchemaNode] {
        &self.nodes
    }

    /// Whether this schema accepts every value.
    pub fn is_any(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visit every `Ref` reachable from this schema.
    ///
    /// The callback receives the referenced name and whether the reference
    /// sits below an input-consuming step (a property, element, additional
    /// property value or property name). References reached only through
    /// combinator branches are applied to the same value as their parent.
    pub fn visit_refs<'s, F: FnMut(&'s str, bool)>(&'s self, visit: &mut F) {
        self.visit_refs_at(false, visit);
    }

    fn visit_refs_at<'s, F: FnMut(&'s str, bool)>(&'s self, consuming: bool, visit: &mut F) {
        for node in &self.nodes {
            match node {
                SchemaNode::Ref(name) => visit(name, consuming),
                SchemaNode::OneOf(branches) | SchemaNode::AnyOf(branches) => {
                    for branch in branches {
                        branch.visit_refs_at(consuming, visit);
                    }
                }
                SchemaNode::ObjectShape(shape) => {
                    for (_, property) in &shape.properties {
                        property.visit_refs_at(true, visit);
                    }
                    if let AdditionalPolicy::Schema(additional) = &shape.additional {
                        additional.visit_refs_at(true, visit);
                    }
                    if let Some(names) = &shape.property_names {
                        names.visit_refs_at(true, visit);
                    }
                }
                SchemaNode::ArrayShape(shape) => {
                    if let Some(items) = &shape.items {
                        items.visit_refs_at(true, visit);
                    }
                }
                SchemaNode::TypeCheck(_)
                | SchemaNode::StringConstraint(_)
                | SchemaNode::NumberConstraint(_)
                | SchemaNode::Const(_)
                | SchemaNode::Enum(_) => {}
            }
        }
    }
}

impl ObjectShape {
    /// Look up a declared property schema.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find(|(declared, _)| declared == name)
            .map(|(_, schema)| schema)
    }
}

impl From<SchemaNode> for Schema {
    fn from(node: SchemaNode) -> Self {
        Self::new(vec![node])
    }
}
