//! Per-run schema adjustment.
//!
//! Adjustments derive facts from the document being validated and fold
//! them into a copy of the profile schema, so a policy can express rules
//! relative to the program ("calls only to what this script defines, or
//! to the allow-list").

use super::error::ConfigurationError;
use super::rules::{LiteralSet, PolicySchema};
use crate::document::CanonicalDocument;
use crate::tree::NodeKind;
use serde_json::Value;
use tracing::debug;

/// Field holding the declared name of a definition
const DEFINITION_NAME_FIELD: &str = "name";

/// Schema adjustment applied once per validation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Adjustment {
    /// Add the names declared by `definitions` to the permitted call targets
    PermitDefinedCalls { definitions: Vec<NodeKind> },
}

impl Adjustment {
    /// Permit calls to functions the script defines itself
    pub fn permit_defined_calls() -> Self {
        Adjustment::PermitDefinedCalls {
            definitions: super::defaults::DEFINITION_KINDS.to_vec(),
        }
    }

    /// Apply to a schema copy
    pub fn apply(
        &self,
        schema: &mut PolicySchema,
        document: &CanonicalDocument,
        profile: &str,
    ) -> Result<(), ConfigurationError> {
        match self {
            Adjustment::PermitDefinedCalls { definitions } => {
                let Some(targets) = schema.call_targets_mut() else {
                    return Err(ConfigurationError::MissingCallTargetRule {
                        profile: profile.to_string(),
                    });
                };
                // A deny-list already admits every defined name
                let LiteralSet::Permitted(permitted) = targets else {
                    return Ok(());
                };

                for kind in definitions {
                    for entry in document.occurrences(*kind) {
                        if let Some(name) = entry.get(DEFINITION_NAME_FIELD).and_then(Value::as_str)
                        {
                            if permitted.insert(name.to_string()) {
                                debug!(profile, name, "Permitting call to defined function");
                            }
                        }
                    }
                }
                Ok(())
            }
        }
    }

    /// Whether this adjustment needs a call-target rule in the schema
    pub fn requires_call_targets(&self) -> bool {
        matches!(self, Adjustment::PermitDefinedCalls { .. })
    }
}

/// Adjust a copy of `schema` for `document`
pub fn adjust(
    schema: &PolicySchema,
    adjustments: &[Adjustment],
    document: &CanonicalDocument,
    profile: &str,
) -> Result<PolicySchema, ConfigurationError> {
    let mut adjusted = schema.clone();
    for adjustment in adjustments {
        adjustment.apply(&mut adjusted, document, profile)?;
    }
    Ok(adjusted)
}
