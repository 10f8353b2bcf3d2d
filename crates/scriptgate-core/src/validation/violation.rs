//! Policy violation types.

use crate::tree::{NodeKind, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which kind of rule a violation broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationRule {
    /// A kind the policy has no rule for
    UnknownKind,
    /// A kind the policy forbids outright
    ForbiddenKind,
    /// A field value of the wrong JSON type
    TypeMismatch,
    /// A value outside an allow-list
    DisallowedValue,
    /// A value on a deny-list
    ForbiddenValue,
    /// A value not matching a required pattern
    PatternMismatch,
    /// A field a closed shape does not mention
    UnknownField,
    /// Anything else the schema rejected
    Other,
}

impl ViolationRule {
    /// Short machine-readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            ViolationRule::UnknownKind => "unknown_kind",
            ViolationRule::ForbiddenKind => "forbidden_kind",
            ViolationRule::TypeMismatch => "type_mismatch",
            ViolationRule::DisallowedValue => "disallowed_value",
            ViolationRule::ForbiddenValue => "forbidden_value",
            ViolationRule::PatternMismatch => "pattern_mismatch",
            ViolationRule::UnknownField => "unknown_field",
            ViolationRule::Other => "other",
        }
    }
}

impl fmt::Display for ViolationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way in which a document breaks its policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Broken rule
    pub rule: ViolationRule,
    /// Offending kind, when the path starts at a kind entry
    pub kind: Option<NodeKind>,
    /// JSON pointer into the document
    pub path: String,
    /// JSON pointer into the rendered schema
    pub schema_path: String,
    /// Human-readable description
    pub message: String,
    /// Source position of the offending occurrence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Violation {
    /// Create a violation; the kind is read from the first path segment
    pub fn new(
        rule: ViolationRule,
        path: impl Into<String>,
        schema_path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let kind = path_segments(&path)
            .next()
            .and_then(|segment| segment.parse().ok());
        Self {
            rule,
            kind,
            path,
            schema_path: schema_path.into(),
            message: message.into(),
            position: None,
        }
    }

    /// Attach a source position
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Index of the offending occurrence within its kind list, when the
    /// path names one
    pub fn occurrence(&self) -> Option<usize> {
        self.kind?;
        path_segments(&self.path).nth(1)?.parse().ok()
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.rule, self.message)?;
        if let Some(position) = &self.position {
            write!(f, " at {}", position)?;
        }
        if !self.path.is_empty() {
            write!(f, " ({})", self.path)?;
        }
        Ok(())
    }
}

fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_occurrence_from_path() {
        let violation = Violation::new(
            ViolationRule::DisallowedValue,
            "/Call/2/func/Name/id",
            "/properties/Call/items/properties/func",
            "\"eval\" is not one of the permitted values",
        );

        assert_eq!(violation.kind, Some(NodeKind::Call));
        assert_eq!(violation.occurrence(), Some(2));
    }

    #[test]
    fn test_kind_list_without_index() {
        let violation = Violation::new(
            ViolationRule::ForbiddenKind,
            "/Import",
            "/properties/Import/maxItems",
            "Import is forbidden",
        );

        assert_eq!(violation.kind, Some(NodeKind::Import));
        assert_eq!(violation.occurrence(), None);
    }

    #[test]
    fn test_root_key_has_no_kind() {
        let violation = Violation::new(ViolationRule::Other, "/code/body", "", "rejected");

        assert_eq!(violation.kind, None);
        assert_eq!(violation.occurrence(), None);
    }

    #[test]
    fn test_display_includes_position() {
        let violation = Violation::new(
            ViolationRule::PatternMismatch,
            "/Attribute/0/attr",
            "/properties/Attribute/items/properties/attr/pattern",
            "\"__class__\" uses a reserved prefix",
        )
        .with_position(Position::new(3, 4));

        let rendered = violation.to_string();
        assert!(rendered.starts_with("[pattern_mismatch]"));
        assert!(rendered.contains("at 3:4"));
        assert!(rendered.contains("/Attribute/0/attr"));
    }

    #[test]
    fn test_rule_names() {
        assert_eq!(ViolationRule::UnknownKind.as_str(), "unknown_kind");
        assert_eq!(ViolationRule::ForbiddenValue.to_string(), "forbidden_value");
    }
}
