//! Policy schemas: per-kind rules, named profiles and per-run adjustment.
//!
//! A [`PolicySchema`] maps every admitted node kind to a [`KindRule`] and
//! renders to a JSON Schema over the canonical document. Kinds without a
//! rule are rejected, so a schema is an allow-list of kinds by construction.
//!
//! Profiles are immutable templates. Validation never changes a profile;
//! [`adjust`] works on a copy.

pub mod adjust;
pub mod config;
pub mod defaults;
pub mod error;
pub mod profile;
pub mod rules;

pub use adjust::{Adjustment, adjust};
pub use config::{CallsConfig, ProfileConfig, ProfileRegistry};
pub use error::ConfigurationError;
pub use profile::{PolicyProfile, ProfileBuilder};
pub use rules::{FieldRule, KindRule, LiteralSet, PolicySchema, ScalarRule, ShapeRule, ValueType};
