//! Canonical document builder.
//!
//! Rewrites a syntax tree into a flattened, kind-indexed JSON document:
//! every occurrence of kind `K` anywhere in the tree is appended to the
//! list stored under `K`, so a schema can constrain "all `K`s" at once.
//! Each field map still nests its children keyed by their kind, which is
//! what lets a rule look through a field (e.g. `Call.func → Name.id`).

use crate::tree::{FieldValue, KindCategory, ListItem, Node, NodeKind, Position};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};

/// Document key holding the converted root
pub const ROOT_KEY: &str = "code";

/// Field-map keys reserved for position metadata
pub const POSITION_KEYS: [&str; 4] = ["lineno", "col_offset", "end_lineno", "end_col_offset"];

/// Errors raised when a tree breaks the builder's structural assumptions
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The same node is reachable twice (shared subtree or cycle)
    #[error("Node of kind {kind} is reachable more than once")]
    SharedNode { kind: NodeKind },

    /// Tree nesting exceeds the configured limit
    #[error("Tree depth limit {limit} exceeded at node of kind {kind}")]
    DepthExceeded { kind: NodeKind, limit: usize },

    /// A node declares the same field twice
    #[error("Node of kind {kind} declares field `{field}` more than once")]
    DuplicateField { kind: NodeKind, field: String },

    /// A node field collides with a reserved position key
    #[error("Node of kind {kind} uses reserved field name `{field}`")]
    ReservedField { kind: NodeKind, field: String },
}

/// Options controlling tree conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionOptions {
    /// Maximum nesting depth before conversion fails
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    /// Copy node positions into field maps
    #[serde(default = "default_true")]
    pub include_positions: bool,
}

fn default_max_depth() -> usize {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            include_positions: true,
        }
    }
}

/// Flattened, kind-indexed rewrite of a syntax tree
///
/// Held as the JSON object the structural validator checks: the converted
/// root under [`ROOT_KEY`] plus one occurrence list per present kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalDocument {
    value: Value,
}

static NULL: Value = Value::Null;

impl CanonicalDocument {
    /// Convert a tree with default options
    pub fn build(root: &Node) -> Result<Self, ConversionError> {
        DocumentBuilder::new(ConversionOptions::default()).build(root)
    }

    /// Converted root field map
    pub fn root(&self) -> &Value {
        self.value.get(ROOT_KEY).unwrap_or(&NULL)
    }

    /// Every occurrence of `kind`, in traversal order
    pub fn occurrences(&self, kind: NodeKind) -> &[Value] {
        self.value
            .get(kind.as_str())
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of occurrences of `kind`
    pub fn count(&self, kind: NodeKind) -> usize {
        self.occurrences(kind).len()
    }

    /// Kinds present in the tree
    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.value
            .as_object()
            .into_iter()
            .flat_map(|document| document.keys())
            .filter_map(|key| key.parse().ok())
    }

    /// Total number of converted nodes
    pub fn len(&self) -> usize {
        self.kinds().map(|kind| self.count(kind)).sum()
    }

    /// Whether the document holds no nodes
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position recorded for an occurrence, if positions were included
    pub fn position_of(&self, kind: NodeKind, index: usize) -> Option<Position> {
        let entry = self.occurrences(kind).get(index)?;
        let line = entry.get("lineno")?.as_u64()?;
        let column = entry.get("col_offset")?.as_u64()?;
        let mut position = Position::new(u32::try_from(line).ok()?, u32::try_from(column).ok()?);
        if let (Some(end_line), Some(end_column)) = (
            entry.get("end_lineno").and_then(Value::as_u64),
            entry.get("end_col_offset").and_then(Value::as_u64),
        ) {
            if let (Ok(end_line), Ok(end_column)) =
                (u32::try_from(end_line), u32::try_from(end_column))
            {
                position = position.with_end(end_line, end_column);
            }
        }
        Some(position)
    }

    /// JSON form handed to the structural validator
    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Take the JSON form
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Single-use converter from a tree to a [`CanonicalDocument`]
#[derive(Debug)]
pub struct DocumentBuilder {
    options: ConversionOptions,
    index: BTreeMap<NodeKind, Vec<Value>>,
    visited: HashSet<usize>,
    depth: usize,
}

impl DocumentBuilder {
    /// Create a builder
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            index: BTreeMap::new(),
            visited: HashSet::new(),
            depth: 0,
        }
    }

    /// Convert `root` and every node reachable from it
    pub fn build(mut self, root: &Node) -> Result<CanonicalDocument, ConversionError> {
        let root = self.convert_node(root)?;
        let mut document = Map::new();
        document.insert(ROOT_KEY.to_string(), root);
        for (kind, entries) in self.index {
            document.insert(kind.as_str().to_string(), Value::Array(entries));
        }
        Ok(CanonicalDocument {
            value: Value::Object(document),
        })
    }

    fn convert_node(&mut self, node: &Node) -> Result<Value, ConversionError> {
        let kind = node.kind();
        if self.depth >= self.options.max_depth {
            return Err(ConversionError::DepthExceeded {
                kind,
                limit: self.options.max_depth,
            });
        }

        self.depth += 1;
        let converted = match kind.category() {
            // Markers are field-less leaves that parsers may share between
            // parents; they cannot close a cycle.
            KindCategory::Context | KindCategory::Operator => self.convert_fields(node),
            KindCategory::Module
            | KindCategory::Statement
            | KindCategory::Expression
            | KindCategory::Pattern
            | KindCategory::Auxiliary => {
                let identity = node as *const Node as usize;
                if self.visited.insert(identity) {
                    self.convert_fields(node)
                } else {
                    Err(ConversionError::SharedNode { kind })
                }
            }
        };
        self.depth -= 1;

        let converted = Value::Object(converted?);
        self.index.entry(kind).or_default().push(converted.clone());
        Ok(converted)
    }

    fn convert_fields(&mut self, node: &Node) -> Result<Map<String, Value>, ConversionError> {
        let kind = node.kind();
        let mut repr = Map::new();

        for field in node.fields() {
            if POSITION_KEYS.contains(&field.name.as_str()) {
                return Err(ConversionError::ReservedField {
                    kind,
                    field: field.name.clone(),
                });
            }
            if repr.contains_key(&field.name) {
                return Err(ConversionError::DuplicateField {
                    kind,
                    field: field.name.clone(),
                });
            }

            let value = match &field.value {
                FieldValue::Scalar(scalar) => scalar.to_value(),
                FieldValue::Node(child) => {
                    let mut keyed = Map::new();
                    keyed.insert(child.kind().as_str().to_string(), self.convert_node(child)?);
                    Value::Object(keyed)
                }
                FieldValue::List(items) => {
                    let mut grouped: Map<String, Value> = Map::new();
                    for item in items {
                        let (key, value) = match item {
                            ListItem::Node(child) => {
                                (child.kind().as_str(), self.convert_node(child)?)
                            }
                            ListItem::Scalar(scalar) => (scalar.type_name(), scalar.to_value()),
                        };
                        if let Value::Array(group) = grouped
                            .entry(key.to_string())
                            .or_insert_with(|| Value::Array(Vec::new()))
                        {
                            group.push(value);
                        }
                    }
                    Value::Object(grouped)
                }
            };
            repr.insert(field.name.clone(), value);
        }

        if self.options.include_positions {
            if let Some(position) = node.position() {
                repr.insert("lineno".to_string(), Value::from(position.line));
                repr.insert("col_offset".to_string(), Value::from(position.column));
                if let (Some(end_line), Some(end_column)) = (position.end_line, position.end_column)
                {
                    repr.insert("end_lineno".to_string(), Value::from(end_line));
                    repr.insert("end_col_offset".to_string(), Value::from(end_column));
                }
            }
        }

        Ok(repr)
    }
}

#[cfg(test)]
mod tests;
