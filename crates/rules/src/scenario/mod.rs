//! Deterministic scenario replay.
//!
//! A scenario YAML names a rule set, optional session overrides and a list of
//! steps (clock advances, fact insertions, fire requests, expectations).
//! [`replay`] runs the steps against a fresh [`Session`](crate::session::Session)
//! and returns a [`ReplayReport`]. The pseudo clock only moves when a step says
//! so, which makes every run reproducible.

mod replay;
mod types;

#[cfg(test)]
mod tests;

pub use self::replay::{replay, ReplayReport, StepOutcome};
pub use self::types::{ConfigOverrides, Scenario, Step};
