//! Declarative per-kind rules and their JSON Schema rendering.

use crate::document::{POSITION_KEYS, ROOT_KEY};
use crate::tree::NodeKind;
use serde_json::{Map, Value, json};
use std::collections::{BTreeMap, BTreeSet};

/// Field of a call node holding the call target
pub const CALL_TARGET_FIELD: &str = "func";

/// Field of a name node holding the identifier
pub const NAME_ID_FIELD: &str = "id";

/// Field of an attribute node holding the attribute name
pub const ATTRIBUTE_NAME_FIELD: &str = "attr";

/// JSON type a scalar field must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Integer,
    Number,
    Boolean,
    Null,
}

impl ValueType {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Integer => "integer",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Null => "null",
        }
    }
}

/// Literal constraint on a string field: either the only admitted values,
/// or values that are never admitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralSet {
    /// Closed allow-list
    Permitted(BTreeSet<String>),
    /// Deny-list; anything else is admitted
    Forbidden(BTreeSet<String>),
}

impl LiteralSet {
    /// Build an allow-list
    pub fn permitted<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LiteralSet::Permitted(names.into_iter().map(Into::into).collect())
    }

    /// Build a deny-list
    pub fn forbidden<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        LiteralSet::Forbidden(names.into_iter().map(Into::into).collect())
    }

    /// Whether this is an allow-list
    pub fn is_permitted(&self) -> bool {
        matches!(self, LiteralSet::Permitted(_))
    }

    /// Listed names
    pub fn names(&self) -> &BTreeSet<String> {
        match self {
            LiteralSet::Permitted(names) | LiteralSet::Forbidden(names) => names,
        }
    }

    /// Listed names, mutable
    pub fn names_mut(&mut self) -> &mut BTreeSet<String> {
        match self {
            LiteralSet::Permitted(names) | LiteralSet::Forbidden(names) => names,
        }
    }

    /// Whether `value` satisfies the constraint
    pub fn admits(&self, value: &str) -> bool {
        match self {
            LiteralSet::Permitted(names) => names.contains(value),
            LiteralSet::Forbidden(names) => !names.contains(value),
        }
    }

    fn to_schema(&self) -> (String, Value) {
        match self {
            LiteralSet::Permitted(names) => ("enum".to_string(), json!(names)),
            LiteralSet::Forbidden(names) => ("not".to_string(), json!({ "enum": names })),
        }
    }
}

/// Constraint on a scalar field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScalarRule {
    /// Required JSON type
    pub value_type: Option<ValueType>,
    /// Permitted or forbidden literals
    pub literals: Option<LiteralSet>,
    /// Regex the value must match (ECMA-262 dialect, lookaround allowed)
    pub pattern: Option<String>,
}

impl ScalarRule {
    /// A rule requiring a string value
    pub fn string() -> Self {
        Self {
            value_type: Some(ValueType::String),
            ..Default::default()
        }
    }

    /// Add a literal constraint
    pub fn with_literals(mut self, literals: LiteralSet) -> Self {
        self.literals = Some(literals);
        self
    }

    /// Add a pattern constraint
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    fn to_schema(&self) -> Value {
        let mut schema = Map::new();
        if let Some(value_type) = self.value_type {
            schema.insert("type".to_string(), json!(value_type.as_str()));
        }
        if let Some(literals) = &self.literals {
            let (keyword, value) = literals.to_schema();
            schema.insert(keyword, value);
        }
        if let Some(pattern) = &self.pattern {
            schema.insert("pattern".to_string(), json!(pattern));
        }
        Value::Object(schema)
    }
}

/// Constraint on one field of a node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// The field holds a scalar
    Scalar(ScalarRule),
    /// The field holds a single child node; rules are keyed by the child's kind
    Node(BTreeMap<NodeKind, KindRule>),
    /// The field holds a list; rules apply to the per-kind sub-lists
    List(BTreeMap<NodeKind, KindRule>),
}

impl FieldRule {
    fn to_schema(&self) -> Value {
        match self {
            FieldRule::Scalar(rule) => rule.to_schema(),
            FieldRule::Node(children) => {
                let properties: Map<String, Value> = children
                    .iter()
                    .map(|(kind, rule)| (kind.as_str().to_string(), rule.node_schema()))
                    .collect();
                json!({ "type": ["object", "null"], "properties": properties })
            }
            FieldRule::List(children) => {
                let properties: Map<String, Value> = children
                    .iter()
                    .map(|(kind, rule)| (kind.as_str().to_string(), rule.occurrences_schema()))
                    .collect();
                json!({ "type": "object", "properties": properties })
            }
        }
    }
}

/// Constraint on the field map of one node occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeRule {
    /// Per-field constraints
    pub fields: BTreeMap<String, FieldRule>,
    /// Whether fields without a rule are admitted
    pub allow_unknown: bool,
}

impl ShapeRule {
    /// A shape that admits fields it does not mention
    pub fn open() -> Self {
        Self {
            fields: BTreeMap::new(),
            allow_unknown: true,
        }
    }

    /// A shape that rejects fields it does not mention
    pub fn closed() -> Self {
        Self {
            fields: BTreeMap::new(),
            allow_unknown: false,
        }
    }

    /// Add a field rule
    pub fn with_field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    fn to_schema(&self) -> Value {
        let mut properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, rule)| (name.clone(), rule.to_schema()))
            .collect();
        if !self.allow_unknown {
            // Position metadata is never policy-relevant
            for key in POSITION_KEYS {
                properties
                    .entry(key.to_string())
                    .or_insert_with(|| json!({ "type": "integer" }));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": self.allow_unknown,
        })
    }
}

/// What is permitted for every occurrence of one node kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindRule {
    /// Structurally unconstrained
    Anything,
    /// No occurrence permitted
    Forbidden,
    /// Every occurrence must match the shape
    Shape(ShapeRule),
}

impl KindRule {
    /// Schema for the list of all occurrences of a kind
    fn occurrences_schema(&self) -> Value {
        match self {
            KindRule::Anything => Value::Bool(true),
            KindRule::Forbidden => json!({ "type": "array", "maxItems": 0 }),
            KindRule::Shape(shape) => json!({ "type": "array", "items": shape.to_schema() }),
        }
    }

    /// Schema for a single occurrence
    fn node_schema(&self) -> Value {
        match self {
            KindRule::Anything => Value::Bool(true),
            KindRule::Forbidden => Value::Bool(false),
            KindRule::Shape(shape) => shape.to_schema(),
        }
    }

    /// Run `update` against this rule's shape, turning any other rule
    /// into an open shape first
    pub fn update_shape(&mut self, update: impl FnOnce(&mut ShapeRule)) {
        let mut shape = match std::mem::replace(self, KindRule::Anything) {
            KindRule::Shape(shape) => shape,
            KindRule::Anything | KindRule::Forbidden => ShapeRule::open(),
        };
        update(&mut shape);
        *self = KindRule::Shape(shape);
    }
}

/// Complete policy: one rule per node kind
///
/// Kinds without a rule are rejected when they occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicySchema {
    rules: BTreeMap<NodeKind, KindRule>,
    root: KindRule,
}

impl Default for PolicySchema {
    fn default() -> Self {
        Self::empty()
    }
}

impl PolicySchema {
    /// A schema with no kind rules: every kind fails closed
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
            root: KindRule::Anything,
        }
    }

    /// Every known kind maps to [`KindRule::Anything`]
    pub fn permit_all() -> Self {
        let mut schema = Self::empty();
        schema.fill_missing(KindRule::Anything);
        schema
    }

    /// Give every kind without a rule the given rule
    pub fn fill_missing(&mut self, rule: KindRule) {
        for kind in NodeKind::ALL {
            self.rules.entry(*kind).or_insert_with(|| rule.clone());
        }
    }

    /// Rule for `kind`, if any
    pub fn rule(&self, kind: NodeKind) -> Option<&KindRule> {
        self.rules.get(&kind)
    }

    /// All kind rules
    pub fn rules(&self) -> impl Iterator<Item = (NodeKind, &KindRule)> {
        self.rules.iter().map(|(kind, rule)| (*kind, rule))
    }

    /// Set the rule for `kind`
    pub fn set_rule(&mut self, kind: NodeKind, rule: KindRule) {
        self.rules.insert(kind, rule);
    }

    /// Drop the rule for `kind`, making it fail closed
    pub fn remove_rule(&mut self, kind: NodeKind) -> Option<KindRule> {
        self.rules.remove(&kind)
    }

    /// Set a field rule on `kind`, converting its rule to a shape if needed
    pub fn set_field_rule(&mut self, kind: NodeKind, field: impl Into<String>, rule: FieldRule) {
        let field = field.into();
        self.rules
            .entry(kind)
            .or_insert(KindRule::Anything)
            .update_shape(|shape| {
                shape.fields.insert(field, rule);
            });
    }

    /// Constrain call targets named directly (`Call.func → Name.id`)
    pub fn set_call_targets(&mut self, targets: LiteralSet) {
        let callee = ShapeRule::open().with_field(
            NAME_ID_FIELD,
            FieldRule::Scalar(ScalarRule::string().with_literals(targets)),
        );
        self.set_field_rule(
            NodeKind::Call,
            CALL_TARGET_FIELD,
            FieldRule::Node(BTreeMap::from([(NodeKind::Name, KindRule::Shape(callee))])),
        );
    }

    /// Literal constraint on directly named call targets, if configured
    pub fn call_targets(&self) -> Option<&LiteralSet> {
        let KindRule::Shape(call) = self.rules.get(&NodeKind::Call)? else {
            return None;
        };
        let FieldRule::Node(targets) = call.fields.get(CALL_TARGET_FIELD)? else {
            return None;
        };
        let KindRule::Shape(name) = targets.get(&NodeKind::Name)? else {
            return None;
        };
        let FieldRule::Scalar(id) = name.fields.get(NAME_ID_FIELD)? else {
            return None;
        };
        id.literals.as_ref()
    }

    /// Mutable literal constraint on directly named call targets
    pub fn call_targets_mut(&mut self) -> Option<&mut LiteralSet> {
        let KindRule::Shape(call) = self.rules.get_mut(&NodeKind::Call)? else {
            return None;
        };
        let FieldRule::Node(targets) = call.fields.get_mut(CALL_TARGET_FIELD)? else {
            return None;
        };
        let KindRule::Shape(name) = targets.get_mut(&NodeKind::Name)? else {
            return None;
        };
        let FieldRule::Scalar(id) = name.fields.get_mut(NAME_ID_FIELD)? else {
            return None;
        };
        id.literals.as_mut()
    }

    /// Reject attribute and identifier names starting with `prefix`
    pub fn set_reserved_prefix(&mut self, prefix: &str) {
        let pattern = format!("^(?!{})", regex::escape(prefix));
        for (kind, field) in [
            (NodeKind::Attribute, ATTRIBUTE_NAME_FIELD),
            (NodeKind::Name, NAME_ID_FIELD),
        ] {
            self.set_field_rule(
                kind,
                field,
                FieldRule::Scalar(ScalarRule::string().with_pattern(pattern.clone())),
            );
        }
    }

    /// Render as a JSON Schema over the canonical document
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        properties.insert(ROOT_KEY.to_string(), self.root.node_schema());
        for (kind, rule) in &self.rules {
            properties.insert(kind.as_str().to_string(), rule.occurrences_schema());
        }
        json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        })
    }
}
