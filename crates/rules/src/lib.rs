//! Deterministic clock-driven rule engine.
//!
//! This crate provides:
//! - A manually advanced pseudo clock (`clock`) as the only time source
//! - Timer registry for timer-bound rule matches with catch-up policies (`timer`)
//! - Salience-ordered agenda of pending activations (`agenda`)
//! - The single-threaded `Session` engine loop (Idle, Evaluating, Firing)
//! - YAML rule documents with declarative actions and a filesystem loader
//! - Scenario replay for reproducible timer tests

pub mod agenda;
pub mod clock;
pub mod facts;
pub mod globals;
pub mod loader;
pub mod rule;
pub mod scenario;
pub mod schema;
pub mod session;
pub mod timer;

pub use session::{Advance, EngineState, Session, SessionMetrics};
