//! Rule definitions: patterns, timers, consequences and the knowledge base.
//!
//! A [`Rule`] matches single facts through a [`Pattern`]. When it carries a
//! [`TimerSpec`](crate::timer::TimerSpec) its matches are gated by a timer;
//! otherwise they go straight to the agenda. Rules are immutable once built
//! and shared between sessions through a [`KnowledgeBase`].

mod consequence;
mod definition;
mod knowledge;
mod pattern;

pub use self::consequence::{Consequence, FactOp, RuleContext};
pub use self::definition::{Rule, RuleBuilder};
pub use self::knowledge::KnowledgeBase;
pub use self::pattern::Pattern;
