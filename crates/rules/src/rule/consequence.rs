//! Consequence execution context.

use tempo_core::{Fact, FactId, Timestamp};

use crate::globals::Globals;

/// Side-effecting action run when an activation fires.
///
/// Errors abort the current fire pass and surface to the caller as
/// [`EngineError::ConsequenceFault`](tempo_core::EngineError::ConsequenceFault).
pub trait Consequence: Send + Sync {
    fn execute(&self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()>;
}

/// Adapter for closure consequences (see [`RuleBuilder::then`](super::RuleBuilder::then)).
pub(crate) struct FnConsequence<F>(pub(crate) F);

impl<F> Consequence for FnConsequence<F>
where
    F: Fn(&mut RuleContext<'_>) -> anyhow::Result<()> + Send + Sync,
{
    fn execute(&self, ctx: &mut RuleContext<'_>) -> anyhow::Result<()> {
        (self.0)(ctx)
    }
}

/// Working-memory change requested by a consequence.
///
/// Applied by the session after the consequence returns, so cascading
/// matches are evaluated within the same fire call.
#[derive(Debug, Clone, PartialEq)]
pub enum FactOp {
    Insert(Fact),
    Retract(FactId),
}

/// What a consequence sees while it runs.
pub struct RuleContext<'a> {
    rule_id: &'a str,
    now: Timestamp,
    scheduled_at: Option<Timestamp>,
    matched: Vec<(FactId, &'a Fact)>,
    globals: &'a mut Globals,
    ops: Vec<FactOp>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        rule_id: &'a str,
        now: Timestamp,
        scheduled_at: Option<Timestamp>,
        matched: Vec<(FactId, &'a Fact)>,
        globals: &'a mut Globals,
    ) -> Self {
        Self {
            rule_id,
            now,
            scheduled_at,
            matched,
            globals,
            ops: Vec::new(),
        }
    }

    pub fn rule_id(&self) -> &str {
        self.rule_id
    }

    /// Current pseudo-clock time.
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Timer tick that produced this activation, if timer-bound.
    pub fn scheduled_at(&self) -> Option<Timestamp> {
        self.scheduled_at
    }

    /// Matched facts in ascending id order.
    pub fn facts(&self) -> &[(FactId, &'a Fact)] {
        &self.matched
    }

    /// The first matched fact. Single-fact patterns always have one.
    pub fn fact(&self) -> Option<&'a Fact> {
        self.matched.first().map(|(_, fact)| *fact)
    }

    pub fn fact_id(&self) -> Option<FactId> {
        self.matched.first().map(|(id, _)| *id)
    }

    pub fn globals(&self) -> &Globals {
        &*self.globals
    }

    pub fn globals_mut(&mut self) -> &mut Globals {
        &mut *self.globals
    }

    /// Queue a fact insertion.
    pub fn insert(&mut self, fact: Fact) {
        self.ops.push(FactOp::Insert(fact));
    }

    /// Queue a fact retraction.
    pub fn retract(&mut self, fact_id: FactId) {
        self.ops.push(FactOp::Retract(fact_id));
    }

    pub(crate) fn into_ops(self) -> Vec<FactOp> {
        self.ops
    }
}
