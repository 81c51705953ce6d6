use serde::{Deserialize, Serialize};

/// Pseudo-clock time in milliseconds.
pub type Timestamp = i64;

/// Rule identifier (matches `metadata.id` of a rule document).
pub type RuleId = String;

/// Identifier assigned to a fact on insertion. Sequential per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactId(pub u64);

/// Handle returned when a timer is registered against a fact match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(pub u64);

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "fact#{}", self.0)
    }
}

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}
