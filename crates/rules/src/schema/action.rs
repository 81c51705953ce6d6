//! Declarative rule actions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempo_core::{Fact, FieldValue};
use tracing::info;

use crate::rule::{Consequence, RuleContext};

/// One step of a rule's `then` list.
///
/// ```yaml
/// then:
///   - action: append
///     global: list
///     value: fired
///   - action: insert
///     type: Reminder
///     fields: { kind: overdue }
///   - action: retract_matched
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Action {
    /// Append `value` to a list global, creating it when absent.
    Append { global: String, value: Value },
    /// Overwrite a global.
    Set { global: String, value: Value },
    /// Add `by` (default 1) to an integer global, creating it at 0 when absent.
    Increment {
        global: String,
        #[serde(default = "default_step")]
        by: i64,
    },
    /// Insert a new fact.
    Insert {
        #[serde(rename = "type")]
        fact_type: String,
        #[serde(default)]
        fields: BTreeMap<String, FieldValue>,
    },
    /// Retract every fact the activation matched.
    RetractMatched,
    /// Emit an info log line.
    Log { message: String },
}

fn default_step() -> i64 {
    1
}

impl Action {
    pub fn apply(&self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        match self {
            Action::Append { global, value } => {
                ctx.globals_mut().append(global, value.clone())?;
            }
            Action::Set { global, value } => {
                ctx.globals_mut().set(global.clone(), value.clone());
            }
            Action::Increment { global, by } => {
                ctx.globals_mut().increment(global, *by)?;
            }
            Action::Insert { fact_type, fields } => {
                ctx.insert(Fact {
                    fact_type: fact_type.clone(),
                    fields: fields.clone(),
                });
            }
            Action::RetractMatched => {
                let ids: Vec<_> = ctx.facts().iter().map(|(id, _)| *id).collect();
                for id in ids {
                    ctx.retract(id);
                }
            }
            Action::Log { message } => {
                info!(
                    rule_id = %ctx.rule_id(),
                    now = ctx.now(),
                    fact_id = ?ctx.fact_id(),
                    "{}",
                    message
                );
            }
        }
        Ok(())
    }
}

/// Consequence that runs actions in order, stopping at the first failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionConsequence {
    actions: Vec<Action>,
}

impl ActionConsequence {
    pub fn new(actions: Vec<Action>) -> Self {
        Self { actions }
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

impl Consequence for ActionConsequence {
    fn execute(&self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        for (i, action) in self.actions.iter().enumerate() {
            action
                .apply(ctx)
                .map_err(|e| e.context(format!("action #{} failed", i + 1)))?;
        }
        Ok(())
    }
}
