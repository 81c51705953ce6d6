use std::sync::Arc;

use tempo_core::{EngineError, Result};
use tracing::{debug, warn};

use crate::agenda::Activation;
use crate::rule::{FactOp, RuleContext};

use super::core::{EngineState, Session};

impl Session {
    /// Fire every pending activation, including those produced by cascading
    /// insertions, until the agenda is empty. Honors `config.fire_limit`.
    ///
    /// Returns the number of consequences executed.
    pub fn fire_all(&mut self) -> Result<usize> {
        self.fire(self.config.fire_limit)
    }

    /// Fire at most `limit` activations.
    pub fn fire_limit(&mut self, limit: usize) -> Result<usize> {
        self.fire(Some(limit))
    }

    pub(super) fn fire(&mut self, limit: Option<usize>) -> Result<usize> {
        self.ensure_live()?;
        self.evaluate();

        self.state = EngineState::Firing;
        let limit = limit.unwrap_or(usize::MAX);
        let mut fired = 0;

        while fired < limit {
            // Removed before execution so a consequence can never re-fire itself.
            let Some(activation) = self.agenda.pop() else {
                break;
            };
            if let Err(e) = self.execute(&activation) {
                self.state = EngineState::Idle;
                return Err(e);
            }
            fired += 1;
        }

        self.state = EngineState::Idle;
        if fired > 0 {
            debug!(fired, pending = self.agenda.len(), "fire pass complete");
        }
        Ok(fired)
    }

    fn execute(&mut self, activation: &Activation) -> Result<()> {
        let Some(rule) = self.kb.get(&activation.rule_id).map(Arc::clone) else {
            return Ok(());
        };
        let now = self.clock.now();

        let matched = activation
            .facts
            .iter()
            .map(|id| {
                self.facts
                    .get(*id)
                    .map(|fact| (*id, fact))
                    .ok_or(EngineError::UnknownFact(*id))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut ctx = RuleContext::new(rule.id(), now, activation.scheduled_at, matched, &mut self.globals);
        let outcome = rule.consequence().execute(&mut ctx);
        let ops = ctx.into_ops();

        if let Err(e) = outcome {
            self.metrics.faults += 1;
            warn!(rule_id = %rule.id(), error = %e, pending = self.agenda.len(), "consequence failed");
            return Err(EngineError::ConsequenceFault {
                rule_id: rule.id().to_string(),
                message: format!("{:#}", e),
            });
        }

        self.metrics.record_fire(rule.id(), now);
        debug!(
            rule_id = %rule.id(),
            facts = ?activation.facts,
            scheduled_at = ?activation.scheduled_at,
            "activation fired"
        );

        for op in ops {
            match op {
                FactOp::Insert(fact) => {
                    self.insert_and_match(fact)?;
                }
                FactOp::Retract(id) => {
                    self.remove_fact(id)?;
                }
            }
        }
        self.evaluate();
        Ok(())
    }
}
