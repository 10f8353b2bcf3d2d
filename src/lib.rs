//! Scriptgate
//!
//! Static syntax-tree policy gate for running untrusted scripts in a
//! restricted language subset. See [`scriptgate_core`] for the building
//! blocks; most hosts only need the [`prelude`].

pub use scriptgate_core::*;

/// Types needed to validate and run a script
pub mod prelude {
    pub use scriptgate_core::policy::ProfileRegistry;
    pub use scriptgate_core::{
        Executor, GateError, GateResult, Node, NodeKind, NodeRef, PolicyProfile, SandboxRejection,
        SandboxValidator, SourceParser, Violation, ViolationRule,
    };
}
