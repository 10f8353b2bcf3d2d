//! Sandbox validator: the gate between a parsed program and its execution.
//!
//! Each call builds its own canonical document and schema copy, so one
//! validator can serve many threads. The only shared state is the
//! immutable profile and the process-wide structural validator.

mod rejection;
mod report;

pub use rejection::SandboxRejection;
pub use report::{ValidationReport, ValidationStage, Verdict};

use crate::document::{CanonicalDocument, ConversionOptions, DocumentBuilder};
use crate::error::{GateError, GateResult};
use crate::policy::{ConfigurationError, PolicyProfile};
use crate::tree::{Node, NodeRef};
use crate::validation::{StructuralValidator, Violation};
use std::sync::Arc;
use tracing::{Level, debug, warn};

/// Turns source text into a syntax tree
pub trait SourceParser {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Parse a whole program
    fn parse(&self, source: &str) -> Result<NodeRef, Self::Error>;
}

/// Runs an accepted syntax tree
pub trait Executor {
    /// Bindings handed to the program, passed through untouched
    type Namespace;
    type Output;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Execute an accepted program
    fn execute(
        &self,
        tree: &NodeRef,
        namespace: Self::Namespace,
    ) -> Result<Self::Output, Self::Error>;
}

/// Validates syntax trees against one policy profile
#[derive(Debug, Clone)]
pub struct SandboxValidator {
    profile: Arc<PolicyProfile>,
    options: ConversionOptions,
    structural: &'static StructuralValidator,
}

impl Default for SandboxValidator {
    fn default() -> Self {
        Self::new(PolicyProfile::restricted())
    }
}

impl SandboxValidator {
    /// Create a validator for `profile`
    pub fn new(profile: impl Into<Arc<PolicyProfile>>) -> Self {
        Self {
            profile: profile.into(),
            options: ConversionOptions::default(),
            structural: StructuralValidator::global(),
        }
    }

    /// Use custom conversion options
    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Use a structural validator other than the process-wide one
    pub fn with_structural_validator(mut self, structural: &'static StructuralValidator) -> Self {
        self.structural = structural;
        self
    }

    /// Active profile
    pub fn profile(&self) -> &Arc<PolicyProfile> {
        &self.profile
    }

    /// Conversion options
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Run every stage and report the outcome without raising on rejection
    pub fn inspect(&self, root: &Node) -> GateResult<ValidationReport> {
        let profile = self.profile.name();
        let mut stage = ValidationStage::Parsed;
        debug!(profile, stage = %stage, root = %root.kind(), "Validating syntax tree");

        let document = DocumentBuilder::new(self.options).build(root)?;
        advance(&mut stage, ValidationStage::Converted, profile);
        let rendered = document.as_value();
        if tracing::enabled!(Level::DEBUG) {
            match serde_json::to_string_pretty(rendered) {
                Ok(pretty) => {
                    debug!(profile, nodes = document.len(), "Canonical document:\n{}", pretty)
                }
                Err(err) => debug!(profile, error = %err, "Canonical document is not printable"),
            }
        }

        let schema = self.profile.adjusted_schema(&document)?;
        advance(&mut stage, ValidationStage::Adjusted, profile);

        let compiled = self
            .structural
            .compile(&schema.to_json_schema())
            .map_err(|err| ConfigurationError::InvalidSchema {
                profile: profile.to_string(),
                reason: err.reason,
            })?;
        let violations: Vec<Violation> = compiled
            .validate(rendered)
            .into_iter()
            .map(|violation| locate(violation, &document))
            .collect();

        let verdict = if violations.is_empty() {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        };
        advance(&mut stage, ValidationStage::Validated(verdict), profile);

        Ok(ValidationReport {
            profile: profile.to_string(),
            document,
            schema,
            violations,
            stage,
        })
    }

    /// Validate a tree, handing back the same tree on acceptance
    pub fn validate(&self, root: &NodeRef) -> GateResult<NodeRef> {
        let report = self.inspect(root)?;
        if report.is_accepted() {
            return Ok(Arc::clone(root));
        }

        warn!(
            profile = %report.profile,
            violations = report.violations.len(),
            "Syntax tree rejected by policy"
        );
        for violation in &report.violations {
            debug!(
                rule = violation.rule.as_str(),
                path = %violation.path,
                "{}",
                violation.message
            );
        }
        Err(SandboxRejection::new(report.profile, report.violations, Arc::clone(root)).into())
    }

    /// Parse `source` with `parser`, then validate the tree
    pub fn validate_source<P>(&self, parser: &P, source: &str) -> GateResult<NodeRef>
    where
        P: SourceParser + ?Sized,
    {
        let root = parser
            .parse(source)
            .map_err(|err| GateError::Parse(Box::new(err)))?;
        self.validate(&root)
    }

    /// Validate a tree and, only if accepted, hand it to `executor`
    pub fn validate_and_run<E>(
        &self,
        root: &NodeRef,
        executor: &E,
        namespace: E::Namespace,
    ) -> GateResult<E::Output>
    where
        E: Executor + ?Sized,
    {
        let accepted = self.validate(root)?;
        executor
            .execute(&accepted, namespace)
            .map_err(|err| GateError::Execution(Box::new(err)))
    }
}

fn advance(stage: &mut ValidationStage, next: ValidationStage, profile: &str) {
    debug!(profile, from = %stage, to = %next, "Validation stage");
    *stage = next;
}

/// Attach the source position of the offending occurrence
fn locate(violation: Violation, document: &CanonicalDocument) -> Violation {
    let Some(kind) = violation.kind else {
        return violation;
    };
    let occurrence = violation.occurrence().unwrap_or(0);
    match document.position_of(kind, occurrence) {
        Some(position) => violation.with_position(position),
        None => violation,
    }
}
