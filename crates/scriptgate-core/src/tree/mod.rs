//! Typed syntax tree consumed by the policy gate.
//!
//! Trees are produced by an external parser (see [`SourceParser`](crate::sandbox::SourceParser))
//! and are read-only from the gate's point of view. Child links are
//! reference-counted so that a parser can share marker nodes such as
//! expression contexts between parents.

mod kind;

pub use kind::{KindCategory, NodeKind, UnknownNodeKind};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Shared handle to a tree node
pub type NodeRef = Arc<Node>;

/// Source position of a node (one-based line, zero-based column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Start line
    pub line: u32,
    /// Start column
    pub column: u32,
    /// End line, when the parser tracks it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_line: Option<u32>,
    /// End column, when the parser tracks it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_column: Option<u32>,
}

impl Position {
    /// Create a start-only position
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    /// Attach an end position
    pub fn with_end(mut self, end_line: u32, end_column: u32) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Scalar field value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean literal
    Bool(bool),
    /// Integer literal
    Int(i64),
    /// Floating point literal
    Float(f64),
    /// String (identifiers, string literals)
    Str(String),
    /// Absent optional value
    None,
}

impl Scalar {
    /// Type name used to group scalars inside list fields
    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "int",
            Scalar::Float(_) => "float",
            Scalar::Str(_) => "str",
            Scalar::None => "none",
        }
    }

    /// String content, if this is a string scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Str(s) => Some(s),
            _ => None,
        }
    }

    /// JSON form used in the canonical document
    pub fn to_value(&self) -> Value {
        match self {
            Scalar::Bool(b) => Value::Bool(*b),
            Scalar::Int(i) => Value::from(*i),
            Scalar::Float(f) => Value::from(*f),
            Scalar::Str(s) => Value::String(s.clone()),
            Scalar::None => Value::Null,
        }
    }
}

/// Element of a list field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListItem {
    /// Child node
    Node(NodeRef),
    /// Scalar element (e.g. names in a `global` statement)
    Scalar(Scalar),
}

/// Value held by a named node field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Single child node
    Node(NodeRef),
    /// Ordered list of children and/or scalars
    List(Vec<ListItem>),
    /// Scalar value
    Scalar(Scalar),
}

impl FieldValue {
    /// An absent optional field
    pub fn none() -> Self {
        FieldValue::Scalar(Scalar::None)
    }

    /// Scalar content, if any
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }
}

/// Named field of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    /// Field name as declared by the grammar
    pub name: String,
    /// Field value
    pub value: FieldValue,
}

/// One occurrence of a node kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    kind: NodeKind,
    #[serde(default)]
    fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
}

impl Node {
    /// Create a node without fields
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            position: None,
        }
    }

    /// Append a field, keeping declaration order
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Set the start position
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.position = Some(Position::new(line, column));
        self
    }

    /// Set a full position
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Wrap in a shared handle
    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    /// Node kind
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Position metadata, if the parser recorded it
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Direct child nodes in field order
    pub fn children(&self) -> Vec<&NodeRef> {
        let mut children = Vec::new();
        for field in &self.fields {
            match &field.value {
                FieldValue::Node(child) => children.push(child),
                FieldValue::List(items) => {
                    children.extend(items.iter().filter_map(|item| match item {
                        ListItem::Node(child) => Some(child),
                        ListItem::Scalar(_) => None,
                    }));
                }
                FieldValue::Scalar(_) => {}
            }
        }
        children
    }
}

impl From<Scalar> for FieldValue {
    fn from(value: Scalar) -> Self {
        FieldValue::Scalar(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Scalar(Scalar::Str(value))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Scalar(Scalar::Int(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Scalar(Scalar::Bool(value))
    }
}

impl From<Node> for FieldValue {
    fn from(value: Node) -> Self {
        FieldValue::Node(Arc::new(value))
    }
}

impl From<NodeRef> for FieldValue {
    fn from(value: NodeRef) -> Self {
        FieldValue::Node(value)
    }
}

impl From<Vec<ListItem>> for FieldValue {
    fn from(value: Vec<ListItem>) -> Self {
        FieldValue::List(value)
    }
}

impl From<Vec<Node>> for FieldValue {
    fn from(value: Vec<Node>) -> Self {
        FieldValue::List(value.into_iter().map(ListItem::from).collect())
    }
}

impl From<Vec<NodeRef>> for FieldValue {
    fn from(value: Vec<NodeRef>) -> Self {
        FieldValue::List(value.into_iter().map(ListItem::Node).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_else(FieldValue::none)
    }
}

impl From<Node> for ListItem {
    fn from(value: Node) -> Self {
        ListItem::Node(Arc::new(value))
    }
}

impl From<NodeRef> for ListItem {
    fn from(value: NodeRef) -> Self {
        ListItem::Node(value)
    }
}

impl From<&str> for ListItem {
    fn from(value: &str) -> Self {
        ListItem::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<Scalar> for ListItem {
    fn from(value: Scalar) -> Self {
        ListItem::Scalar(value)
    }
}
