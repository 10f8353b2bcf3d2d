//! Policy configuration errors.

use std::path::PathBuf;

/// A policy profile that cannot be used
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    /// A kind name outside the grammar vocabulary
    #[error("Unknown node kind in policy: {name}")]
    UnknownKind { name: String },

    /// The profile adjusts call targets but has no call-target rule
    #[error("Profile `{profile}` permits defined calls but has no Call.func.Name.id literal rule")]
    MissingCallTargetRule { profile: String },

    /// The rendered schema does not compile
    #[error("Profile `{profile}` renders an invalid schema: {reason}")]
    InvalidSchema { profile: String, reason: String },

    /// An empty reserved prefix would reject every name
    #[error("Reserved prefix must not be empty")]
    EmptyReservedPrefix,

    /// Both an allow-list and a deny-list were given for call targets
    #[error("Call targets must be either permitted or forbidden, not both")]
    ConflictingCallTargets,

    /// Lookup of a profile that is not registered
    #[error("Unknown policy profile: {name}")]
    UnknownProfile { name: String },

    /// Malformed profile file
    #[error("Failed to parse policy profile: {0}")]
    Parse(#[from] toml::de::Error),

    /// Profile file could not be read
    #[error("Failed to read policy profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
