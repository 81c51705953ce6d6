//! YAML DSL schema types with serde deserialization.
//!
//! Defines the type hierarchy for rule documents:
//! - `RuleDocument`: one `kind: Rule` document (metadata, pattern, timer, actions)
//! - `Action`: declarative consequence steps, internally tagged by `action`
//! - `ActionConsequence`: runs a compiled action list against a rule context

mod action;
mod document;
mod kind;
mod metadata;

pub use action::*;
pub use document::*;
pub use kind::*;
pub use metadata::*;
