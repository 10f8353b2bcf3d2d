//! Error types for scriptgate

use crate::document::ConversionError;
use crate::policy::ConfigurationError;
use crate::sandbox::SandboxRejection;
use thiserror::Error;

/// Boxed error raised by a host-supplied parser or executor
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for scriptgate operations
pub type GateResult<T> = Result<T, GateError>;

/// Main error type for scriptgate
#[derive(Error, Debug)]
pub enum GateError {
    /// The tree violates the policy
    #[error(transparent)]
    Rejected(#[from] SandboxRejection),

    /// The tree could not be converted
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// The policy profile is unusable
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The host parser failed
    #[error("Parse error: {0}")]
    Parse(#[source] BoxedError),

    /// The host executor failed
    #[error("Execution error: {0}")]
    Execution(#[source] BoxedError),
}

impl GateError {
    /// The rejection, if the tree was rejected by policy
    pub fn rejection(&self) -> Option<&SandboxRejection> {
        match self {
            GateError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }

    /// Whether the tree was rejected by policy
    pub fn is_rejection(&self) -> bool {
        matches!(self, GateError::Rejected(_))
    }
}
