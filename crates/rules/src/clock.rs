//! Manually advanced pseudo clock.
//!
//! The clock is the only time source a session consults. It starts at a
//! configured origin and moves forward exclusively through
//! [`PseudoClock::advance`]; nothing in the engine reads wall-clock time.

use std::time::Duration;

use tempo_core::{EngineError, Result, Timestamp};

/// A requested clock movement, relative or absolute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockAdvance {
    By(Duration),
    To(Timestamp),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PseudoClock {
    now: Timestamp,
}

impl PseudoClock {
    pub fn new(start: Timestamp) -> Self {
        Self { now: start }
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    pub fn advance(&mut self, step: ClockAdvance) -> Result<Timestamp> {
        match step {
            ClockAdvance::By(delta) => self.advance_by(delta),
            ClockAdvance::To(at) => self.advance_to(at),
        }
    }

    /// Move forward by `delta`. Fails only when the result overflows.
    pub fn advance_by(&mut self, delta: Duration) -> Result<Timestamp> {
        let target = i64::try_from(delta.as_millis())
            .ok()
            .and_then(|ms| self.now.checked_add(ms))
            .ok_or(EngineError::InvalidTime {
                requested: Timestamp::MAX,
                current: self.now,
            })?;
        self.advance_to(target)
    }

    /// Move to the absolute time `at`. Moving to `now` is a no-op; moving
    /// backwards fails and leaves the clock untouched.
    pub fn advance_to(&mut self, at: Timestamp) -> Result<Timestamp> {
        if at < self.now {
            return Err(EngineError::InvalidTime {
                requested: at,
                current: self.now,
            });
        }
        self.now = at;
        Ok(self.now)
    }
}

impl Default for PseudoClock {
    fn default() -> Self {
        Self::new(0)
    }
}
