//! Named policy profiles and their builder.

use super::adjust::{Adjustment, adjust};
use super::defaults::{
    DANGEROUS_CALL_TARGETS, IMPORT_KINDS, RESERVED_PREFIX, SAFE_CALL_TARGETS,
};
use super::error::ConfigurationError;
use super::rules::{FieldRule, KindRule, LiteralSet, PolicySchema};
use crate::document::CanonicalDocument;
use crate::tree::NodeKind;
use crate::validation::StructuralValidator;

/// Immutable policy template: a complete schema plus the adjustments it
/// needs at validation time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyProfile {
    name: String,
    schema: PolicySchema,
    adjustments: Vec<Adjustment>,
}

impl PolicyProfile {
    /// Profile with no kind rules; rejects every tree
    pub fn empty() -> Self {
        Self {
            name: "empty".to_string(),
            schema: PolicySchema::empty(),
            adjustments: Vec::new(),
        }
    }

    /// Every known kind is structurally unconstrained
    pub fn baseline() -> Self {
        Self {
            name: "baseline".to_string(),
            schema: PolicySchema::permit_all(),
            adjustments: Vec::new(),
        }
    }

    /// Restricted script profile, allow-list variant.
    ///
    /// - import statements are forbidden outright
    /// - calls by name are limited to [`SAFE_CALL_TARGETS`] plus the
    ///   functions the script defines itself
    /// - attribute and identifier names may not start with `_`
    ///
    /// This is a syntactic filter. Reflection chains that reach restricted
    /// objects without naming them (through subscripts, string keys or
    /// objects handed in by the host namespace) are not detected.
    pub fn restricted() -> Self {
        let mut schema = restricted_base();
        schema.set_call_targets(LiteralSet::permitted(SAFE_CALL_TARGETS.iter().copied()));
        Self {
            name: "restricted".to_string(),
            schema,
            adjustments: vec![Adjustment::permit_defined_calls()],
        }
    }

    /// Restricted script profile, deny-list variant: any call target except
    /// [`DANGEROUS_CALL_TARGETS`]. Same limitations as [`Self::restricted`].
    pub fn restricted_denylist() -> Self {
        let mut schema = restricted_base();
        schema.set_call_targets(LiteralSet::forbidden(
            DANGEROUS_CALL_TARGETS.iter().copied(),
        ));
        Self {
            name: "restricted-denylist".to_string(),
            schema,
            adjustments: Vec::new(),
        }
    }

    /// Start a new profile from an empty schema
    pub fn builder(name: impl Into<String>) -> ProfileBuilder {
        ProfileBuilder::new(name)
    }

    /// Start a new profile derived from this one
    pub fn derive(&self, name: impl Into<String>) -> ProfileBuilder {
        ProfileBuilder {
            name: name.into(),
            schema: self.schema.clone(),
            adjustments: self.adjustments.clone(),
            error: None,
        }
    }

    /// Profile name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Template schema (never mutated by validation)
    pub fn schema(&self) -> &PolicySchema {
        &self.schema
    }

    /// Per-run adjustments
    pub fn adjustments(&self) -> &[Adjustment] {
        &self.adjustments
    }

    /// Schema copy adjusted for `document`
    pub fn adjusted_schema(
        &self,
        document: &CanonicalDocument,
    ) -> Result<PolicySchema, ConfigurationError> {
        adjust(&self.schema, &self.adjustments, document, &self.name)
    }

    /// Check that the profile is usable: adjustments find the rules they
    /// need and the rendered schema compiles
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let needs_call_targets = self
            .adjustments
            .iter()
            .any(Adjustment::requires_call_targets);
        if needs_call_targets && self.schema.call_targets().is_none() {
            return Err(ConfigurationError::MissingCallTargetRule {
                profile: self.name.clone(),
            });
        }

        StructuralValidator::global()
            .compile(&self.schema.to_json_schema())
            .map_err(|err| ConfigurationError::InvalidSchema {
                profile: self.name.clone(),
                reason: err.to_string(),
            })?;
        Ok(())
    }
}

impl Default for PolicyProfile {
    fn default() -> Self {
        Self::restricted()
    }
}

fn restricted_base() -> PolicySchema {
    let mut schema = PolicySchema::permit_all();
    for kind in IMPORT_KINDS {
        schema.set_rule(*kind, KindRule::Forbidden);
    }
    schema.set_reserved_prefix(RESERVED_PREFIX);
    schema
}

/// Builder for policy profiles
#[derive(Debug)]
pub struct ProfileBuilder {
    name: String,
    schema: PolicySchema,
    adjustments: Vec<Adjustment>,
    error: Option<ConfigurationError>,
}

impl ProfileBuilder {
    /// Create a builder over an empty schema
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: PolicySchema::empty(),
            adjustments: Vec::new(),
            error: None,
        }
    }

    /// Give every kind without a rule the "anything" rule
    pub fn extend_baseline(mut self) -> Self {
        self.schema.fill_missing(KindRule::Anything);
        self
    }

    /// Set the rule for a kind
    pub fn rule(mut self, kind: NodeKind, rule: KindRule) -> Self {
        self.schema.set_rule(kind, rule);
        self
    }

    /// Forbid every occurrence of a kind
    pub fn forbid_kind(self, kind: NodeKind) -> Self {
        self.rule(kind, KindRule::Forbidden)
    }

    /// Leave a kind structurally unconstrained
    pub fn allow_kind(self, kind: NodeKind) -> Self {
        self.rule(kind, KindRule::Anything)
    }

    /// Remove a kind's rule so that any occurrence fails closed
    pub fn drop_kind(mut self, kind: NodeKind) -> Self {
        self.schema.remove_rule(kind);
        self
    }

    /// Constrain one field of a kind
    pub fn field_rule(mut self, kind: NodeKind, field: impl Into<String>, rule: FieldRule) -> Self {
        self.schema.set_field_rule(kind, field, rule);
        self
    }

    /// Replace the call-target constraint
    pub fn call_targets(mut self, targets: LiteralSet) -> Self {
        self.schema.set_call_targets(targets);
        self
    }

    /// Add names to the existing call-target list, whichever kind it is
    pub fn extend_call_targets<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.schema.call_targets_mut() {
            Some(targets) => targets.names_mut().extend(names.into_iter().map(Into::into)),
            None => {
                self.error.get_or_insert(ConfigurationError::MissingCallTargetRule {
                    profile: self.name.clone(),
                });
            }
        }
        self
    }

    /// Reject attribute and identifier names starting with `prefix`
    pub fn reserved_prefix(mut self, prefix: &str) -> Self {
        if prefix.is_empty() {
            self.error
                .get_or_insert(ConfigurationError::EmptyReservedPrefix);
        } else {
            self.schema.set_reserved_prefix(prefix);
        }
        self
    }

    /// Toggle granting call permission to functions the script defines
    pub fn permit_defined_calls(mut self, enabled: bool) -> Self {
        self.adjustments
            .retain(|adjustment| !matches!(adjustment, Adjustment::PermitDefinedCalls { .. }));
        if enabled {
            self.adjustments.push(Adjustment::permit_defined_calls());
        }
        self
    }

    /// Validate and build the profile
    pub fn build(self) -> Result<PolicyProfile, ConfigurationError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let profile = PolicyProfile {
            name: self.name,
            schema: self.schema,
            adjustments: self.adjustments,
        };
        profile.validate()?;
        Ok(profile)
    }
}
