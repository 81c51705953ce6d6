//! Rule document and its compilation into a runtime [`Rule`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempo_core::{EngineError, FieldValue};

use crate::rule::{Pattern, Rule};
use crate::timer::TimerSpec;

use super::{Action, ActionConsequence, RuleKind, RuleMetadata};

/// A fully deserialized `kind: Rule` document.
///
/// ```yaml
/// apiVersion: v1
/// kind: Rule
/// metadata:
///   id: xxx
/// timer: "int: 10s 10s"
/// when:
///   type: SimpleEvent
/// then:
///   - action: append
///     global: list
///     value: fired
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    #[serde(rename = "apiVersion", default = "default_api_version")]
    pub api_version: String,
    pub kind: RuleKind,
    pub metadata: RuleMetadata,
    #[serde(default)]
    pub salience: i32,
    /// Textual timer, `int: <delay> [<period>]` or `cron: <expr>`.
    #[serde(default)]
    pub timer: Option<String>,
    pub when: WhenClause,
    #[serde(default)]
    pub then: Vec<Action>,
}

/// Single-fact pattern: a type plus field equality constraints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct WhenClause {
    #[serde(rename = "type")]
    pub fact_type: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
}

fn default_api_version() -> String {
    "v1".to_string()
}

impl RuleDocument {
    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.metadata.enabled
    }

    /// Parse the textual timer, if any.
    pub fn timer_spec(&self) -> Result<Option<TimerSpec>, EngineError> {
        self.timer.as_deref().map(str::parse::<TimerSpec>).transpose()
    }

    pub fn pattern(&self) -> Pattern {
        self.when
            .fields
            .iter()
            .fold(Pattern::of_type(self.when.fact_type.clone()), |p, (k, v)| {
                p.with_field(k.clone(), v.clone())
            })
    }

    /// Compile into a runtime rule. Fails on an empty id, an empty `when.type`
    /// or an unparseable timer.
    pub fn compile(&self) -> Result<Rule, EngineError> {
        if self.metadata.id.trim().is_empty() {
            return Err(EngineError::Config("rule metadata.id must not be empty".to_string()));
        }
        if self.when.fact_type.trim().is_empty() {
            return Err(EngineError::Config(format!(
                "rule '{}': when.type must not be empty",
                self.metadata.id
            )));
        }

        let mut builder = Rule::builder(self.metadata.id.clone(), self.pattern())
            .name(self.metadata.display_name())
            .salience(self.salience);
        if let Some(timer) = self.timer_spec()? {
            builder = builder.timer(timer);
        }
        Ok(builder.then_consequence(Arc::new(ActionConsequence::new(self.then.clone()))))
    }
}
