//! Policy profiles as configuration data.
//!
//! A profile file names a base profile and lists overrides:
//!
//! ```toml
//! name = "classroom"
//! base = "restricted"
//! forbid = ["Lambda", "ClassDef"]
//!
//! [calls]
//! permitted = ["print_allowed"]
//! ```

use super::error::ConfigurationError;
use super::profile::PolicyProfile;
use super::rules::LiteralSet;
use crate::tree::NodeKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Serialized form of a policy profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    /// Profile name
    pub name: String,

    /// Registered profile to start from
    #[serde(default = "default_base")]
    pub base: String,

    /// Override the reserved attribute/identifier prefix
    #[serde(default)]
    pub reserved_prefix: Option<String>,

    /// Kinds to forbid outright
    #[serde(default)]
    pub forbid: Vec<String>,

    /// Kinds to leave unconstrained
    #[serde(default)]
    pub allow: Vec<String>,

    /// Call-target constraint
    #[serde(default)]
    pub calls: Option<CallsConfig>,
}

/// Call-target section of a profile file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallsConfig {
    /// Allow-list of call targets
    #[serde(default)]
    pub permitted: Option<Vec<String>>,

    /// Deny-list of call targets
    #[serde(default)]
    pub forbidden: Option<Vec<String>>,

    /// Merge with the base profile's list of the same variant
    #[serde(default = "default_true")]
    pub extend: bool,

    /// Permit calls to functions the script defines
    #[serde(default)]
    pub permit_defined: Option<bool>,
}

fn default_base() -> String {
    "baseline".to_string()
}

fn default_true() -> bool {
    true
}

fn parse_kind(name: &str) -> Result<NodeKind, ConfigurationError> {
    name.parse().map_err(|_| ConfigurationError::UnknownKind {
        name: name.to_string(),
    })
}

impl ProfileConfig {
    /// Parse from TOML
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        Ok(toml::from_str(source)?)
    }

    /// Build the profile on top of its base from `registry`
    pub fn build(&self, registry: &ProfileRegistry) -> Result<PolicyProfile, ConfigurationError> {
        let base = registry.get(&self.base)?;
        let mut builder = base.derive(self.name.clone());

        if let Some(prefix) = &self.reserved_prefix {
            builder = builder.reserved_prefix(prefix);
        }
        for name in &self.forbid {
            builder = builder.forbid_kind(parse_kind(name)?);
        }
        for name in &self.allow {
            builder = builder.allow_kind(parse_kind(name)?);
        }

        if let Some(calls) = &self.calls {
            let requested = match (&calls.permitted, &calls.forbidden) {
                (Some(_), Some(_)) => return Err(ConfigurationError::ConflictingCallTargets),
                (Some(names), None) => Some(LiteralSet::permitted(names.iter().cloned())),
                (None, Some(names)) => Some(LiteralSet::forbidden(names.iter().cloned())),
                (None, None) => None,
            };
            if let Some(requested) = requested {
                let same_variant = base
                    .schema()
                    .call_targets()
                    .is_some_and(|current| current.is_permitted() == requested.is_permitted());
                builder = if calls.extend && same_variant {
                    builder.extend_call_targets(requested.names().iter().cloned())
                } else {
                    builder.call_targets(requested)
                };
            }
            if let Some(enabled) = calls.permit_defined {
                builder = builder.permit_defined_calls(enabled);
            }
        }

        builder.build()
    }
}

/// Named, immutable profile templates shared across validations
#[derive(Debug, Clone)]
pub struct ProfileRegistry {
    profiles: BTreeMap<String, Arc<PolicyProfile>>,
}

impl Default for ProfileRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileRegistry {
    /// Registry holding the built-in profiles
    pub fn builtin() -> Self {
        let mut profiles = BTreeMap::new();
        for profile in [
            PolicyProfile::empty(),
            PolicyProfile::baseline(),
            PolicyProfile::restricted(),
            PolicyProfile::restricted_denylist(),
        ] {
            profiles.insert(profile.name().to_string(), Arc::new(profile));
        }
        Self { profiles }
    }

    /// Look up a profile by name
    pub fn get(&self, name: &str) -> Result<Arc<PolicyProfile>, ConfigurationError> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownProfile {
                name: name.to_string(),
            })
    }

    /// Registered profile names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// Validate and register a profile, replacing any profile of the same name
    pub fn register(
        &mut self,
        profile: PolicyProfile,
    ) -> Result<Arc<PolicyProfile>, ConfigurationError> {
        profile.validate()?;
        let profile = Arc::new(profile);
        debug!(profile = profile.name(), "Registered policy profile");
        self.profiles
            .insert(profile.name().to_string(), Arc::clone(&profile));
        Ok(profile)
    }

    /// Build and register a profile from TOML
    pub fn load_str(&mut self, source: &str) -> Result<Arc<PolicyProfile>, ConfigurationError> {
        let config = ProfileConfig::from_toml_str(source)?;
        let profile = config.build(self)?;
        self.register(profile)
    }

    /// Build and register a profile from a TOML file
    pub fn load_file(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<Arc<PolicyProfile>, ConfigurationError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_str(&source)
    }
}

impl PolicyProfile {
    /// Build a profile from TOML against the built-in profiles
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        ProfileConfig::from_toml_str(source)?.build(&ProfileRegistry::builtin())
    }

    /// Build a profile from a TOML file against the built-in profiles
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}
