//! Agenda: activations awaiting an explicit fire request.
//!
//! Activations are ordered by salience (higher first) and, within one
//! salience level, by insertion order. Each level is a FIFO queue so
//! enqueueing stays O(1) amortized for a fixed set of salience values.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashSet, VecDeque};

use serde::Serialize;
use tempo_core::{FactId, RuleId, Timestamp};

/// A pending (rule, matched facts) pair eligible to execute its consequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    pub rule_id: RuleId,
    /// Matched facts in ascending id order.
    pub facts: Vec<FactId>,
    pub salience: i32,
    /// Timer tick that produced this activation; `None` for immediate matches.
    pub scheduled_at: Option<Timestamp>,
    /// Assigned by the agenda on enqueue.
    pub sequence: u64,
}

impl Activation {
    pub fn new(rule_id: impl Into<RuleId>, facts: Vec<FactId>, salience: i32) -> Self {
        let mut facts = facts;
        facts.sort_unstable();
        facts.dedup();
        Self {
            rule_id: rule_id.into(),
            facts,
            salience,
            scheduled_at: None,
            sequence: 0,
        }
    }

    /// Mark this activation as produced by the timer tick `at`.
    pub fn scheduled(mut self, at: Timestamp) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    fn key(&self) -> ActivationKey {
        ActivationKey {
            rule_id: self.rule_id.clone(),
            facts: self.facts.clone(),
            scheduled_at: self.scheduled_at,
        }
    }

    pub fn involves(&self, fact_id: FactId) -> bool {
        self.facts.binary_search(&fact_id).is_ok()
    }
}

/// Identity of one logical match. A timer tick is its own match, so two
/// elapsed periods of the same (rule, fact) are two activations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ActivationKey {
    rule_id: RuleId,
    facts: Vec<FactId>,
    scheduled_at: Option<Timestamp>,
}

#[derive(Debug, Default)]
pub struct Agenda {
    levels: BTreeMap<Reverse<i32>, VecDeque<Activation>>,
    pending: HashSet<ActivationKey>,
    next_sequence: u64,
}

impl Agenda {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an activation unless the same logical match is already pending.
    /// Returns whether it was added.
    pub fn enqueue(&mut self, mut activation: Activation) -> bool {
        if !self.pending.insert(activation.key()) {
            return false;
        }
        activation.sequence = self.next_sequence;
        self.next_sequence += 1;
        self.levels
            .entry(Reverse(activation.salience))
            .or_default()
            .push_back(activation);
        true
    }

    /// Remove and return the next activation to fire.
    pub fn pop(&mut self) -> Option<Activation> {
        let mut level = self.levels.first_entry()?;
        let activation = level.get_mut().pop_front();
        if level.get().is_empty() {
            level.remove();
        }
        let activation = activation?;
        self.pending.remove(&activation.key());
        Some(activation)
    }

    /// Remove up to `limit` activations (all when `None`) in firing order.
    pub fn drain(&mut self, limit: Option<usize>) -> Vec<Activation> {
        let limit = limit.unwrap_or(usize::MAX);
        let mut out = Vec::new();
        while out.len() < limit {
            match self.pop() {
                Some(activation) => out.push(activation),
                None => break,
            }
        }
        out
    }

    /// Drop pending activations that reference `fact_id`. Returns how many.
    pub fn remove_for_fact(&mut self, fact_id: FactId) -> usize {
        let mut removed = 0;
        for queue in self.levels.values_mut() {
            queue.retain(|activation| {
                if activation.involves(fact_id) {
                    self.pending.remove(&activation.key());
                    removed += 1;
                    false
                } else {
                    true
                }
            });
        }
        self.levels.retain(|_, queue| !queue.is_empty());
        removed
    }

    /// Pending activations in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &Activation> {
        self.levels.values().flat_map(|queue| queue.iter())
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.levels.clear();
        self.pending.clear();
    }
}
