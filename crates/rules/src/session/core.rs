//! [`Session`] struct, constructor, accessors and disposal.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use tempo_core::{EngineError, Fact, FactId, Result, SessionConfig, TimerHandle, Timestamp};
use tracing::info;

use crate::agenda::{Activation, Agenda};
use crate::clock::PseudoClock;
use crate::facts::FactStore;
use crate::globals::Globals;
use crate::rule::KnowledgeBase;
use crate::timer::{ScheduledTimer, TimerRegistry};

use super::metrics::SessionMetrics;

/// Engine loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EngineState {
    Idle,
    Evaluating,
    Firing,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Idle => write!(f, "idle"),
            EngineState::Evaluating => write!(f, "evaluating"),
            EngineState::Firing => write!(f, "firing"),
        }
    }
}

/// Outcome of a clock advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Advance {
    /// Clock time after the advance.
    pub now: Timestamp,
    /// Timer activations added to the agenda.
    pub activated: usize,
    /// Activations fired (non-zero only with timed execution).
    pub fired: usize,
}

/// One isolated rule session.
pub struct Session {
    pub(super) config: SessionConfig,
    pub(super) kb: KnowledgeBase,
    pub(super) clock: PseudoClock,
    pub(super) facts: FactStore,
    pub(super) timers: TimerRegistry,
    pub(super) agenda: Agenda,
    pub(super) globals: Globals,
    pub(super) state: EngineState,
    pub(super) metrics: SessionMetrics,
    pub(super) disposed: bool,
}

impl Session {
    /// Create a session over a knowledge base. The clock starts at
    /// `config.clock_start`.
    pub fn new(kb: KnowledgeBase, config: SessionConfig) -> Self {
        info!(
            rules = kb.len(),
            clock_start = config.clock_start,
            catch_up = %config.catch_up,
            "session created"
        );
        Self {
            clock: PseudoClock::new(config.clock_start),
            timers: TimerRegistry::new(config.catch_up, config.strict_handles),
            facts: FactStore::new(),
            agenda: Agenda::new(),
            globals: Globals::new(),
            state: EngineState::Idle,
            metrics: SessionMetrics::default(),
            disposed: false,
            kb,
            config,
        }
    }

    pub(super) fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            return Err(EngineError::Disposed);
        }
        Ok(())
    }

    /// Release every timer, pending activation and fact. Further mutating
    /// calls fail with [`EngineError::Disposed`]. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        info!(
            timers = self.timers.len(),
            pending = self.agenda.len(),
            facts = self.facts.len(),
            "session disposed"
        );
        self.timers.clear();
        self.agenda.clear();
        self.facts.clear();
        self.state = EngineState::Idle;
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Cancel a single timer. See [`TimerRegistry::unregister`].
    pub fn cancel_timer(&mut self, handle: TimerHandle) -> Result<bool> {
        self.ensure_live()?;
        let removed = self.timers.unregister(handle)?;
        if removed {
            self.metrics.timers_cancelled += 1;
        }
        Ok(removed)
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn globals(&self) -> &Globals {
        &self.globals
    }

    pub fn global(&self, name: &str) -> Option<&Value> {
        self.globals.get(name)
    }

    pub fn set_global(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        self.ensure_live()?;
        self.globals.set(name, value);
        Ok(())
    }

    pub fn fact(&self, id: FactId) -> Option<&Fact> {
        self.facts.get(id)
    }

    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn agenda_len(&self) -> usize {
        self.agenda.len()
    }

    /// Pending activations in firing order.
    pub fn pending_activations(&self) -> impl Iterator<Item = &Activation> {
        self.agenda.iter()
    }

    /// Scheduled timers in fire order.
    pub fn scheduled_timers(&self) -> impl Iterator<Item = &ScheduledTimer> {
        self.timers.iter()
    }

    pub fn timers_for_fact(&self, id: FactId) -> Vec<TimerHandle> {
        self.timers.handles_for_fact(id)
    }

    /// Earliest pending timer tick.
    pub fn next_timer_due(&self) -> Option<Timestamp> {
        self.timers.next_due()
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("now", &self.clock.now())
            .field("state", &self.state)
            .field("rules", &self.kb.len())
            .field("facts", &self.facts.len())
            .field("timers", &self.timers.len())
            .field("agenda", &self.agenda.len())
            .field("disposed", &self.disposed)
            .finish()
    }
}
