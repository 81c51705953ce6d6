//! Timer specifications attached to rules.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use cron::Schedule;
use tempo_core::{EngineError, Timestamp};

use super::cron::{next_tick, normalize_cron};
use super::duration::{format_duration, parse_duration};

/// When a timer-bound activation becomes eligible.
///
/// Textual form: `int: <delay> [<period>]` or `cron: <expression>`.
/// An interval with a zero period is one-shot.
#[derive(Debug, Clone, PartialEq)]
pub enum TimerSpec {
    Interval { delay: Duration, period: Duration },
    Cron(CronTimer),
}

/// A parsed cron schedule together with its normalized expression.
#[derive(Debug, Clone)]
pub struct CronTimer {
    expression: String,
    schedule: Schedule,
}

impl CronTimer {
    pub fn parse(expression: &str) -> Result<Self, EngineError> {
        let normalized = normalize_cron(expression);
        let schedule = Schedule::from_str(&normalized).map_err(|e| {
            EngineError::InvalidTimer(format!("invalid cron expression '{}': {}", expression.trim(), e))
        })?;
        Ok(Self {
            expression: normalized,
            schedule,
        })
    }

    /// Normalized 6-field expression.
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

impl PartialEq for CronTimer {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}

fn to_millis(d: Duration) -> Option<i64> {
    i64::try_from(d.as_millis()).ok()
}

impl TimerSpec {
    pub fn interval(delay: Duration, period: Duration) -> Self {
        TimerSpec::Interval { delay, period }
    }

    pub fn one_shot(delay: Duration) -> Self {
        TimerSpec::Interval {
            delay,
            period: Duration::ZERO,
        }
    }

    pub fn cron(expression: &str) -> Result<Self, EngineError> {
        CronTimer::parse(expression).map(TimerSpec::Cron)
    }

    pub fn is_periodic(&self) -> bool {
        match self {
            TimerSpec::Interval { period, .. } => !period.is_zero(),
            TimerSpec::Cron(_) => true,
        }
    }

    /// First due instant for a timer registered at `now`.
    pub fn first_fire(&self, now: Timestamp) -> Option<Timestamp> {
        match self {
            TimerSpec::Interval { delay, .. } => now.checked_add(to_millis(*delay)?),
            TimerSpec::Cron(c) => next_tick(&c.schedule, now),
        }
    }

    /// The tick following `fired_at`, or `None` when the timer is exhausted.
    pub fn next_fire(&self, fired_at: Timestamp) -> Option<Timestamp> {
        match self {
            TimerSpec::Interval { period, .. } if period.is_zero() => None,
            TimerSpec::Interval { period, .. } => fired_at.checked_add(to_millis(*period)?),
            TimerSpec::Cron(c) => next_tick(&c.schedule, fired_at),
        }
    }

    /// The first tick strictly after `now`, skipping every boundary between
    /// `fired_at` and `now`.
    pub fn next_fire_after(&self, fired_at: Timestamp, now: Timestamp) -> Option<Timestamp> {
        match self {
            TimerSpec::Interval { period, .. } if period.is_zero() => None,
            TimerSpec::Interval { period, .. } => {
                let period = to_millis(*period)?;
                let elapsed = now.saturating_sub(fired_at).max(0);
                let periods = elapsed / period + 1;
                fired_at.checked_add(periods.checked_mul(period)?)
            }
            TimerSpec::Cron(c) => next_tick(&c.schedule, fired_at.max(now)),
        }
    }
}

impl fmt::Display for TimerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerSpec::Interval { delay, period } if period.is_zero() => {
                write!(f, "int: {}", format_duration(*delay))
            }
            TimerSpec::Interval { delay, period } => {
                write!(f, "int: {} {}", format_duration(*delay), format_duration(*period))
            }
            TimerSpec::Cron(c) => write!(f, "cron: {}", c.expression),
        }
    }
}

impl FromStr for TimerSpec {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, body) = s.split_once(':').ok_or_else(|| {
            EngineError::InvalidTimer(format!("expected 'int: ...' or 'cron: ...', got '{}'", s.trim()))
        })?;

        match kind.trim().to_ascii_lowercase().as_str() {
            "int" | "interval" => {
                let parts: Vec<&str> = body.split_whitespace().collect();
                let parse = |raw: &str| {
                    parse_duration(raw).ok_or_else(|| {
                        EngineError::InvalidTimer(format!("invalid duration '{}' in '{}'", raw, s.trim()))
                    })
                };
                match parts.as_slice() {
                    [delay] => Ok(TimerSpec::one_shot(parse(*delay)?)),
                    [delay, period] => Ok(TimerSpec::interval(parse(*delay)?, parse(*period)?)),
                    _ => Err(EngineError::InvalidTimer(format!(
                        "interval timer takes a delay and an optional period, got '{}'",
                        body.trim()
                    ))),
                }
            }
            "cron" => TimerSpec::cron(body),
            other => Err(EngineError::InvalidTimer(format!("unknown timer kind '{}'", other))),
        }
    }
}
