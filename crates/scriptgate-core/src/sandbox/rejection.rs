//! Structured rejection raised when a tree violates its policy.

use crate::tree::{NodeKind, NodeRef};
use crate::validation::Violation;
use std::collections::BTreeSet;
use std::fmt;

/// A program refused by policy, with everything needed to explain why
#[derive(Debug, Clone)]
pub struct SandboxRejection {
    profile: String,
    violations: Vec<Violation>,
    root: NodeRef,
}

impl SandboxRejection {
    /// Create a rejection for `root`
    pub fn new(profile: impl Into<String>, violations: Vec<Violation>, root: NodeRef) -> Self {
        Self {
            profile: profile.into(),
            violations,
            root,
        }
    }

    /// Profile that rejected the tree
    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Every violation found
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Root of the rejected tree
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    /// Kinds named by the violations
    pub fn kinds(&self) -> BTreeSet<NodeKind> {
        self.violations.iter().filter_map(|v| v.kind).collect()
    }

    /// Take the violations
    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for SandboxRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.violations.len();
        write!(
            f,
            "Program rejected by policy `{}`: {} violation{}",
            self.profile,
            count,
            if count == 1 { "" } else { "s" }
        )?;
        for violation in &self.violations {
            write!(f, "\n  - {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for SandboxRejection {}
