//! [`TimerRegistry`]: pending timers ordered by next fire time.

use std::collections::{BTreeMap, HashMap};

use tempo_core::{CatchUpPolicy, EngineError, FactId, Result, TimerHandle, Timestamp};
use tracing::debug;

use super::entry::{DueTimer, ScheduledTimer};
use super::spec::TimerSpec;

/// Tracks every scheduled timer of a session.
///
/// Timers are keyed by `(next_fire_at, registration sequence)` so that
/// [`collect_due`](TimerRegistry::collect_due) yields entries in ascending fire
/// time with ties broken by registration order. The handle number doubles as
/// the registration sequence.
#[derive(Debug)]
pub struct TimerRegistry {
    timers: HashMap<TimerHandle, ScheduledTimer>,
    queue: BTreeMap<(Timestamp, u64), TimerHandle>,
    by_fact: HashMap<FactId, Vec<TimerHandle>>,
    next_handle: u64,
    catch_up: CatchUpPolicy,
    strict: bool,
}

impl TimerRegistry {
    pub fn new(catch_up: CatchUpPolicy, strict: bool) -> Self {
        Self {
            timers: HashMap::new(),
            queue: BTreeMap::new(),
            by_fact: HashMap::new(),
            next_handle: 0,
            catch_up,
            strict,
        }
    }

    pub fn catch_up(&self) -> CatchUpPolicy {
        self.catch_up
    }

    /// Schedule a timer for a (rule, fact) match registered at `now`.
    ///
    /// Fails with [`EngineError::InvalidTimer`] when the timer has no tick after
    /// `now` (e.g. an exhausted cron schedule or an overflowing delay).
    pub fn register(
        &mut self,
        rule_id: &str,
        fact_id: FactId,
        spec: TimerSpec,
        now: Timestamp,
    ) -> Result<TimerHandle> {
        let next_fire_at = spec.first_fire(now).ok_or_else(|| {
            EngineError::InvalidTimer(format!(
                "timer '{}' of rule '{}' has no tick after {}",
                spec, rule_id, now
            ))
        })?;

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;

        debug!(rule_id = %rule_id, fact_id = %fact_id, %handle, next_fire_at, "timer registered");

        self.queue.insert((next_fire_at, handle.0), handle);
        self.by_fact.entry(fact_id).or_default().push(handle);
        self.timers.insert(
            handle,
            ScheduledTimer {
                handle,
                rule_id: rule_id.to_string(),
                fact_id,
                spec,
                next_fire_at,
                fire_count: 0,
            },
        );
        Ok(handle)
    }

    /// Remove and return every firing due at or before `now`.
    ///
    /// Under [`CatchUpPolicy::EveryPeriod`] a periodic timer that crossed
    /// several boundaries yields one entry per boundary; under
    /// [`CatchUpPolicy::Coalesce`] it yields a single entry. Either way, every
    /// timer left in the registry afterwards is due strictly after `now`.
    /// Exhausted timers (one-shot, or a cron schedule without further ticks)
    /// are removed.
    ///
    /// Under `EveryPeriod` the returned list grows linearly with the elapsed
    /// time divided by the period: `int: 1ms 1ms` advanced by one day yields
    /// 86.4M entries per timer. Use `Coalesce` for small periods or large
    /// clock jumps.
    pub fn collect_due(&mut self, now: Timestamp) -> Vec<DueTimer> {
        let mut due = Vec::new();

        loop {
            let (key, handle) = match self.queue.first_key_value() {
                Some((&key, &handle)) if key.0 <= now => (key, handle),
                _ => break,
            };
            self.queue.remove(&key);

            let next = match self.timers.get_mut(&handle) {
                Some(timer) => {
                    let fire_at = key.0;
                    timer.fire_count += 1;
                    due.push(DueTimer {
                        handle,
                        rule_id: timer.rule_id.clone(),
                        fact_id: timer.fact_id,
                        fire_at,
                    });
                    let next = match self.catch_up {
                        CatchUpPolicy::EveryPeriod => timer.spec.next_fire(fire_at),
                        CatchUpPolicy::Coalesce => timer.spec.next_fire_after(fire_at, now),
                    };
                    if let Some(next) = next {
                        timer.next_fire_at = next;
                    }
                    next
                }
                None => continue,
            };

            match next {
                Some(next) => {
                    self.queue.insert((next, key.1), handle);
                }
                None => {
                    debug!(%handle, "timer exhausted");
                    self.forget(handle);
                }
            }
        }

        due
    }

    /// Cancel a timer.
    ///
    /// Returns `Ok(true)` when a timer was removed. An unknown handle is a
    /// no-op (`Ok(false)`) unless the registry is strict.
    pub fn unregister(&mut self, handle: TimerHandle) -> Result<bool> {
        if self.forget(handle) {
            debug!(%handle, "timer unregistered");
            return Ok(true);
        }
        if self.strict {
            return Err(EngineError::UnknownHandle(handle));
        }
        Ok(false)
    }

    /// Cancel every timer bound to `fact_id`. Returns the number removed.
    pub fn unregister_fact(&mut self, fact_id: FactId) -> usize {
        let handles = self.by_fact.remove(&fact_id).unwrap_or_default();
        handles
            .into_iter()
            .filter(|handle| self.forget(*handle))
            .count()
    }

    /// Remove a timer from all indexes. Returns whether it existed.
    fn forget(&mut self, handle: TimerHandle) -> bool {
        let Some(timer) = self.timers.remove(&handle) else {
            return false;
        };
        self.queue.remove(&(timer.next_fire_at, handle.0));
        if let Some(handles) = self.by_fact.get_mut(&timer.fact_id) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.by_fact.remove(&timer.fact_id);
            }
        }
        true
    }

    pub fn get(&self, handle: TimerHandle) -> Option<&ScheduledTimer> {
        self.timers.get(&handle)
    }

    pub fn handles_for_fact(&self, fact_id: FactId) -> Vec<TimerHandle> {
        self.by_fact.get(&fact_id).cloned().unwrap_or_default()
    }

    /// Earliest pending fire time, if any.
    pub fn next_due(&self) -> Option<Timestamp> {
        self.queue.first_key_value().map(|(key, _)| key.0)
    }

    /// Pending timers in fire order.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledTimer> {
        self.queue.values().filter_map(|handle| self.timers.get(handle))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Drop every timer. Handles keep counting up.
    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
        self.by_fact.clear();
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new(CatchUpPolicy::default(), false)
    }
}
