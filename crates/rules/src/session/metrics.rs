use std::collections::BTreeMap;

use serde::Serialize;
use tempo_core::Timestamp;

/// Per-session counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionMetrics {
    /// Fired activations by rule id.
    pub fired_by_rule: BTreeMap<String, u64>,
    pub total_fired: u64,
    /// Activations created by due timers.
    pub timer_activations: u64,
    /// Activations created directly by a match on a rule without timer.
    pub immediate_activations: u64,
    pub timers_cancelled: u64,
    pub faults: u64,
    /// Pseudo-clock time of the most recent fire.
    pub last_fire_at: Option<Timestamp>,
}

impl SessionMetrics {
    /// Record a successful consequence execution.
    pub fn record_fire(&mut self, rule_id: &str, at: Timestamp) {
        *self.fired_by_rule.entry(rule_id.to_string()).or_default() += 1;
        self.total_fired += 1;
        self.last_fire_at = Some(at);
    }

    pub fn fired(&self, rule_id: &str) -> u64 {
        self.fired_by_rule.get(rule_id).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_fire_accumulates_per_rule() {
        let mut m = SessionMetrics::default();
        m.record_fire("a", 10);
        m.record_fire("a", 20);
        m.record_fire("b", 30);

        assert_eq!(m.fired("a"), 2);
        assert_eq!(m.fired("b"), 1);
        assert_eq!(m.fired("c"), 0);
        assert_eq!(m.total_fired, 3);
        assert_eq!(m.last_fire_at, Some(30));
    }
}
