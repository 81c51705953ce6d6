//! Single-fact patterns.

use std::collections::BTreeMap;

use tempo_core::{Fact, FieldValue};

/// Matches facts of one type whose fields equal every constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    fact_type: String,
    constraints: BTreeMap<String, FieldValue>,
}

impl Pattern {
    pub fn of_type(fact_type: impl Into<String>) -> Self {
        Self {
            fact_type: fact_type.into(),
            constraints: BTreeMap::new(),
        }
    }

    /// Require `field == value`.
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.constraints.insert(field.into(), value.into());
        self
    }

    pub fn fact_type(&self) -> &str {
        &self.fact_type
    }

    pub fn constraints(&self) -> &BTreeMap<String, FieldValue> {
        &self.constraints
    }

    pub fn matches(&self, fact: &Fact) -> bool {
        fact.fact_type == self.fact_type
            && self
                .constraints
                .iter()
                .all(|(field, expected)| fact.field(field) == Some(expected))
    }
}
