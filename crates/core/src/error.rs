use thiserror::Error;

use crate::ids::{FactId, RuleId, TimerHandle, Timestamp};

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Clock cannot move backwards: requested {requested}, current {current}")]
    InvalidTime {
        requested: Timestamp,
        current: Timestamp,
    },

    #[error("Unknown timer handle: {0}")]
    UnknownHandle(TimerHandle),

    #[error("Unknown fact: {0}")]
    UnknownFact(FactId),

    #[error("Consequence of rule '{rule_id}' failed: {message}")]
    ConsequenceFault { rule_id: RuleId, message: String },

    #[error("Invalid timer: {0}")]
    InvalidTimer(String),

    #[error("Duplicate rule id: {0}")]
    DuplicateRule(String),

    #[error("Session has been disposed")]
    Disposed,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
