//! [`Rule`] and its builder.

use std::fmt;
use std::sync::Arc;

use tempo_core::RuleId;

use crate::timer::TimerSpec;

use super::consequence::{Consequence, FnConsequence, RuleContext};
use super::pattern::Pattern;

/// A compiled rule: pattern, optional timer, consequence.
pub struct Rule {
    id: RuleId,
    name: String,
    salience: i32,
    pattern: Pattern,
    timer: Option<TimerSpec>,
    consequence: Arc<dyn Consequence>,
}

impl Rule {
    /// Start building a rule. Finish with [`RuleBuilder::then`].
    pub fn builder(id: impl Into<RuleId>, pattern: Pattern) -> RuleBuilder {
        let id = id.into();
        RuleBuilder {
            name: id.clone(),
            id,
            salience: 0,
            pattern,
            timer: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn salience(&self) -> i32 {
        self.salience
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn timer(&self) -> Option<&TimerSpec> {
        self.timer.as_ref()
    }

    pub fn consequence(&self) -> &Arc<dyn Consequence> {
        &self.consequence
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("salience", &self.salience)
            .field("pattern", &self.pattern)
            .field("timer", &self.timer)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct RuleBuilder {
    id: RuleId,
    name: String,
    salience: i32,
    pattern: Pattern,
    timer: Option<TimerSpec>,
}

impl RuleBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn salience(mut self, salience: i32) -> Self {
        self.salience = salience;
        self
    }

    pub fn timer(mut self, timer: TimerSpec) -> Self {
        self.timer = Some(timer);
        self
    }

    /// Finish with a closure consequence.
    pub fn then<F>(self, consequence: F) -> Rule
    where
        F: Fn(&mut RuleContext<'_>) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.then_consequence(Arc::new(FnConsequence(consequence)))
    }

    /// Finish with a shared consequence object.
    pub fn then_consequence(self, consequence: Arc<dyn Consequence>) -> Rule {
        Rule {
            id: self.id,
            name: self.name,
            salience: self.salience,
            pattern: self.pattern,
            timer: self.timer,
            consequence,
        }
    }
}
