//! Session-local fact storage.

use std::collections::BTreeMap;

use tempo_core::{EngineError, Fact, FactId, Result};

/// Holds inserted facts keyed by sequential [`FactId`]s.
///
/// Ids are never reused within a session, so a retracted id stays unknown.
#[derive(Debug, Default)]
pub struct FactStore {
    facts: BTreeMap<FactId, Fact>,
    next_id: u64,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, fact: Fact) -> FactId {
        let id = FactId(self.next_id);
        self.next_id += 1;
        self.facts.insert(id, fact);
        id
    }

    pub fn retract(&mut self, id: FactId) -> Result<Fact> {
        self.facts.remove(&id).ok_or(EngineError::UnknownFact(id))
    }

    pub fn get(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(&id)
    }

    pub fn contains(&self, id: FactId) -> bool {
        self.facts.contains_key(&id)
    }

    /// Facts in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (FactId, &Fact)> {
        self.facts.iter().map(|(id, fact)| (*id, fact))
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }
}
