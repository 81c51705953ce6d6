//! Timer registry for timer-bound rule activations.
//!
//! A timer is registered when a fact matches a rule that carries a
//! [`TimerSpec`]. The [`TimerRegistry`] keeps every pending timer ordered by
//! its next fire time and hands out due entries when the session evaluates
//! against the pseudo clock. Periodic timers are rescheduled in place
//! according to the configured [`CatchUpPolicy`](tempo_core::CatchUpPolicy).

mod cron;
mod duration;
mod entry;
mod registry;
mod spec;

#[cfg(test)]
mod tests;

pub use self::cron::normalize_cron;
pub use self::duration::{format_duration, parse_duration};
pub use self::entry::{DueTimer, ScheduledTimer};
pub use self::registry::TimerRegistry;
pub use self::spec::{CronTimer, TimerSpec};
