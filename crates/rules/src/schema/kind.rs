//! Document kind tag.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported document kinds. Unknown kinds fail deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleKind {
    Rule,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleKind::Rule => write!(f, "Rule"),
        }
    }
}

impl FromStr for RuleKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Rule" => Ok(RuleKind::Rule),
            other => Err(format!("unknown rule kind: '{}'", other)),
        }
    }
}
