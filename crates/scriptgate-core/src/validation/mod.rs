//! Structural validation of canonical documents against rendered policies.
//!
//! Schemas are compiled once per validation run, because adjustment makes
//! the schema depend on the document. The validator itself only carries
//! settings, so a single process-wide instance serves every thread.

mod violation;

pub use violation::{Violation, ViolationRule};

use jsonschema::error::ValidationErrorKind;
use jsonschema::{Draft, JSONSchema, ValidationError};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

static GLOBAL: OnceCell<StructuralValidator> = OnceCell::new();

/// Schema dialect used to compile policies
///
/// Rendered policies use boolean subschemas, so only drafts from 6 on apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaDraft {
    Draft6,
    #[default]
    Draft7,
}

impl SchemaDraft {
    /// Every supported dialect
    pub const ALL: &'static [SchemaDraft] = &[SchemaDraft::Draft6, SchemaDraft::Draft7];
}

impl From<SchemaDraft> for Draft {
    fn from(draft: SchemaDraft) -> Self {
        match draft {
            SchemaDraft::Draft6 => Draft::Draft6,
            SchemaDraft::Draft7 => Draft::Draft7,
        }
    }
}

/// Structural validator settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidatorSettings {
    /// Schema dialect
    #[serde(default)]
    pub draft: SchemaDraft,
}

/// A rendered policy that does not compile
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid policy schema: {reason}")]
pub struct SchemaCompileError {
    pub reason: String,
}

/// Compiles rendered policies and checks documents against them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructuralValidator {
    settings: ValidatorSettings,
}

impl StructuralValidator {
    /// Create a validator
    pub fn new(settings: ValidatorSettings) -> Self {
        Self { settings }
    }

    /// Process-wide validator, initialised with default settings on first use
    pub fn global() -> &'static StructuralValidator {
        GLOBAL.get_or_init(StructuralValidator::default)
    }

    /// Initialise the process-wide validator.
    ///
    /// Fails, handing the settings back, when the validator was already
    /// initialised by an earlier call or by first use.
    pub fn install(settings: ValidatorSettings) -> Result<(), ValidatorSettings> {
        GLOBAL
            .set(Self::new(settings))
            .map_err(|rejected| rejected.settings)
    }

    /// Active settings
    pub fn settings(&self) -> &ValidatorSettings {
        &self.settings
    }

    /// Compile a rendered policy
    pub fn compile(&self, schema: &Value) -> Result<CompiledPolicy, SchemaCompileError> {
        let compiled = JSONSchema::options()
            .with_draft(self.settings.draft.into())
            .compile(schema)
            .map_err(|err| SchemaCompileError {
                reason: err.to_string(),
            })?;
        trace!(draft = ?self.settings.draft, "Compiled policy schema");
        Ok(CompiledPolicy { schema: compiled })
    }
}

/// A compiled policy, ready to check documents
pub struct CompiledPolicy {
    schema: JSONSchema,
}

impl std::fmt::Debug for CompiledPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledPolicy").finish_non_exhaustive()
    }
}

impl CompiledPolicy {
    /// Every violation of the policy in `document`; empty when it conforms
    pub fn validate(&self, document: &Value) -> Vec<Violation> {
        match self.schema.validate(document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.flat_map(|error| to_violations(&error)).collect(),
        }
    }

    /// Whether `document` conforms
    pub fn is_valid(&self, document: &Value) -> bool {
        self.schema.is_valid(document)
    }
}

fn to_violations(error: &ValidationError<'_>) -> Vec<Violation> {
    let path = error.instance_path.to_string();
    let schema_path = error.schema_path.to_string();

    if let ValidationErrorKind::AdditionalProperties { unexpected } = &error.kind {
        // At the document root every key is a kind list
        return unexpected
            .iter()
            .map(|key| {
                let key_path = format!("{}/{}", path, key);
                if path.is_empty() {
                    Violation::new(
                        ViolationRule::UnknownKind,
                        key_path,
                        schema_path.clone(),
                        format!("Node kind `{}` is not permitted by the policy", key),
                    )
                } else {
                    Violation::new(
                        ViolationRule::UnknownField,
                        key_path,
                        schema_path.clone(),
                        format!("Field `{}` is not permitted here", key),
                    )
                }
            })
            .collect();
    }

    // Without sibling `properties`, each extra key fails the `false`
    // subschema on its own, with the key in the instance path
    if matches!(error.kind, ValidationErrorKind::FalseSchema)
        && schema_path.ends_with("/additionalProperties")
    {
        let key = subject(&path);
        let at_root = path.split('/').filter(|segment| !segment.is_empty()).count() == 1;
        let violation = if at_root {
            Violation::new(
                ViolationRule::UnknownKind,
                path.clone(),
                schema_path.clone(),
                format!("Node kind `{}` is not permitted by the policy", key),
            )
        } else {
            Violation::new(
                ViolationRule::UnknownField,
                path.clone(),
                schema_path.clone(),
                format!("Field `{}` is not permitted here", key),
            )
        };
        return vec![violation];
    }

    let instance = &error.instance;
    let (rule, message) = match &error.kind {
        ValidationErrorKind::Type { .. } => (ViolationRule::TypeMismatch, error.to_string()),
        ValidationErrorKind::Enum { .. } => (
            ViolationRule::DisallowedValue,
            format!("{} is not a permitted value", instance),
        ),
        ValidationErrorKind::Not { .. } => (
            ViolationRule::ForbiddenValue,
            format!("{} is a forbidden value", instance),
        ),
        ValidationErrorKind::Pattern { pattern } => (
            ViolationRule::PatternMismatch,
            format!("{} does not match `{}`", instance, pattern),
        ),
        ValidationErrorKind::MaxItems { .. } | ValidationErrorKind::FalseSchema => (
            ViolationRule::ForbiddenKind,
            format!("{} is forbidden", subject(&path)),
        ),
        _ => (ViolationRule::Other, error.to_string()),
    };
    vec![Violation::new(rule, path, schema_path, message)]
}

/// Last non-index path segment: the kind or field the error is about
fn subject(path: &str) -> &str {
    path.rsplit('/')
        .find(|segment| !segment.is_empty() && segment.parse::<usize>().is_err())
        .unwrap_or("document")
}

#[cfg(test)]
mod tests;
