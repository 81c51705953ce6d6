use std::time::Duration;

use tempo_core::{EngineError, Fact, FactId, Result, Timestamp};
use tracing::debug;

use crate::agenda::Activation;
use crate::clock::ClockAdvance;

use super::core::{Advance, EngineState, Session};

impl Session {
    /// Insert a fact, match it against every rule and evaluate due timers.
    ///
    /// Matches of rules without a timer land on the agenda; matches of
    /// timer-bound rules register a timer. Nothing fires until a fire request.
    pub fn insert_fact(&mut self, fact: Fact) -> Result<FactId> {
        self.ensure_live()?;
        let id = self.insert_and_match(fact)?;
        self.evaluate();
        Ok(id)
    }

    /// Retract a fact, cancelling its timers and pending activations.
    pub fn retract_fact(&mut self, id: FactId) -> Result<Fact> {
        self.ensure_live()?;
        self.remove_fact(id)
    }

    /// Move the clock forward by `delta` and evaluate due timers.
    pub fn advance_clock(&mut self, delta: Duration) -> Result<Advance> {
        self.advance(ClockAdvance::By(delta))
    }

    /// Move the clock to the absolute time `at` and evaluate due timers.
    ///
    /// Fails with [`EngineError::InvalidTime`] when `at` is before `now()`;
    /// nothing changes in that case.
    pub fn advance_clock_to(&mut self, at: Timestamp) -> Result<Advance> {
        self.advance(ClockAdvance::To(at))
    }

    fn advance(&mut self, step: ClockAdvance) -> Result<Advance> {
        self.ensure_live()?;
        let now = self.clock.advance(step)?;
        let activated = self.evaluate();
        let fired = if self.config.timed_execution {
            self.fire(self.config.fire_limit)?
        } else {
            0
        };
        debug!(now, activated, fired, "clock advanced");
        Ok(Advance {
            now,
            activated,
            fired,
        })
    }

    /// Store a fact and create its matches. Rolls the insert back if a timer
    /// cannot be registered.
    pub(super) fn insert_and_match(&mut self, fact: Fact) -> Result<FactId> {
        let id = self.facts.insert(fact);
        if let Err(e) = self.match_fact(id) {
            self.remove_fact(id)?;
            return Err(e);
        }
        Ok(id)
    }

    fn match_fact(&mut self, id: FactId) -> Result<()> {
        let fact = self.facts.get(id).ok_or(EngineError::UnknownFact(id))?;
        let now = self.clock.now();

        for rule in self.kb.matching(fact) {
            match rule.timer() {
                Some(spec) => {
                    self.timers.register(rule.id(), id, spec.clone(), now)?;
                }
                None => {
                    if self.agenda.enqueue(Activation::new(rule.id(), vec![id], rule.salience())) {
                        self.metrics.immediate_activations += 1;
                    }
                }
            }
        }
        debug!(fact_id = %id, fact_type = %fact.fact_type, "fact inserted");
        Ok(())
    }

    pub(super) fn remove_fact(&mut self, id: FactId) -> Result<Fact> {
        let fact = self.facts.retract(id)?;
        let cancelled = self.timers.unregister_fact(id);
        let dropped = self.agenda.remove_for_fact(id);
        self.metrics.timers_cancelled += cancelled as u64;
        debug!(fact_id = %id, cancelled, dropped, "fact retracted");
        Ok(fact)
    }

    /// Collect due timers into the agenda. Returns the number of activations added.
    pub(super) fn evaluate(&mut self) -> usize {
        let previous = self.state;
        self.state = EngineState::Evaluating;

        let now = self.clock.now();
        let mut added = 0;
        for due in self.timers.collect_due(now) {
            let Some(rule) = self.kb.get(&due.rule_id) else {
                continue;
            };
            let activation =
                Activation::new(due.rule_id.as_str(), vec![due.fact_id], rule.salience()).scheduled(due.fire_at);
            if self.agenda.enqueue(activation) {
                debug!(rule_id = %due.rule_id, fact_id = %due.fact_id, fire_at = due.fire_at, "timer due");
                self.metrics.timer_activations += 1;
                added += 1;
            }
        }

        self.state = previous;
        added
    }
}
