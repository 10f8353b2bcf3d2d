//! Validation stages and reports.

use crate::document::CanonicalDocument;
use crate::policy::PolicySchema;
use crate::validation::Violation;
use std::fmt;

/// Final decision of a validation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Accepted => "accepted",
            Verdict::Rejected => "rejected",
        }
    }
}

/// Where a validation run is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationStage {
    /// Nothing received yet
    #[default]
    Idle,
    /// A syntax tree is available
    Parsed,
    /// The canonical document is built
    Converted,
    /// The schema copy is adjusted for the document
    Adjusted,
    /// The structural validator has decided
    Validated(Verdict),
}

impl ValidationStage {
    /// Short name for logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationStage::Idle => "idle",
            ValidationStage::Parsed => "parsed",
            ValidationStage::Converted => "converted",
            ValidationStage::Adjusted => "adjusted",
            ValidationStage::Validated(verdict) => verdict.as_str(),
        }
    }

    /// Whether the run has reached a decision
    pub fn is_final(&self) -> bool {
        matches!(self, ValidationStage::Validated(_))
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything one validation run produced
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Name of the profile applied
    pub profile: String,
    /// Canonical document the policy was checked against
    pub document: CanonicalDocument,
    /// Schema copy after adjustment
    pub schema: PolicySchema,
    /// Violations, with source positions where known
    pub violations: Vec<Violation>,
    /// Final stage reached
    pub stage: ValidationStage,
}

impl ValidationReport {
    /// Decision, once the run is final
    pub fn verdict(&self) -> Option<Verdict> {
        match self.stage {
            ValidationStage::Validated(verdict) => Some(verdict),
            _ => None,
        }
    }

    /// Whether the tree was accepted
    pub fn is_accepted(&self) -> bool {
        self.verdict() == Some(Verdict::Accepted)
    }
}
