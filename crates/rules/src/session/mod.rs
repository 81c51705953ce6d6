//! Session: the single-threaded engine loop.
//!
//! A [`Session`] owns the pseudo clock, fact store, timer registry, agenda and
//! globals of one run. It moves through three states:
//!
//! - `Idle` → `Evaluating` on fact insertion, a fire request or a clock
//!   advance. Due timers are collected and turned into activations.
//! - `Evaluating` → `Firing` only on an explicit fire request (or on a clock
//!   advance when timed execution is enabled).
//! - `Firing` → `Idle` once the agenda is drained or the firing limit is hit.
//!   Facts inserted by consequences re-enter `Evaluating` within the same call.
//!
//! Nothing fires in the background: every effect is observable when the call
//! that caused it returns.
//!
//! Split into focused submodules:
//! - `core`: Session struct, constructor, accessors and disposal
//! - `evaluation`: fact insertion/retraction, clock advance and timer collection
//! - `firing`: agenda draining and consequence execution

mod core;
mod evaluation;
mod firing;
mod metrics;


pub use self::core::{Advance, EngineState, Session};
pub use self::metrics::SessionMetrics;
