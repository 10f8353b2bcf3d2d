//! Scriptgate core library
//!
//! Static policy gate for parsed scripts. A syntax tree is rewritten into a
//! flattened, kind-indexed document, a policy profile renders a schema over
//! that document, and the tree is admitted only when the document conforms.
//! Kinds the policy does not mention are rejected.
//!
//! Parsing and execution belong to the host, behind the
//! [`SourceParser`](sandbox::SourceParser) and [`Executor`](sandbox::Executor)
//! traits.

pub mod document;
pub mod error;
pub mod policy;
pub mod sandbox;
pub mod tree;
pub mod validation;

// Re-export commonly used types
pub use document::{CanonicalDocument, ConversionError, ConversionOptions, DocumentBuilder};
pub use error::{GateError, GateResult};
pub use policy::{
    Adjustment, ConfigurationError, FieldRule, KindRule, LiteralSet, PolicyProfile, PolicySchema,
    ProfileBuilder, ProfileConfig, ProfileRegistry, ScalarRule, ShapeRule,
};
pub use sandbox::{
    Executor, SandboxRejection, SandboxValidator, SourceParser, ValidationReport, ValidationStage,
    Verdict,
};
pub use tree::{Node, NodeKind, NodeRef, Position, Scalar};
pub use validation::{StructuralValidator, ValidatorSettings, Violation, ViolationRule};
