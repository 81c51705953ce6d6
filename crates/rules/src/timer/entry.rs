//! Registry entry types.

use tempo_core::{FactId, RuleId, TimerHandle, Timestamp};

use super::spec::TimerSpec;

/// A pending timer bound to one (rule, fact) match.
#[derive(Debug, Clone)]
pub struct ScheduledTimer {
    pub handle: TimerHandle,
    pub rule_id: RuleId,
    pub fact_id: FactId,
    pub spec: TimerSpec,
    /// Next pseudo-clock instant this timer is due.
    pub next_fire_at: Timestamp,
    /// Number of due entries produced so far.
    pub fire_count: u64,
}

/// One due firing handed out by [`TimerRegistry::collect_due`](super::TimerRegistry::collect_due).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueTimer {
    pub handle: TimerHandle,
    pub rule_id: RuleId,
    pub fact_id: FactId,
    /// The scheduled tick this entry stands for (not the collection time).
    pub fire_at: Timestamp,
}
