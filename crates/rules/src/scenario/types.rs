//! Scenario document types.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempo_core::{CatchUpPolicy, FieldValue, SessionConfig, Timestamp};

use crate::loader::{Result, RuleError};
use crate::schema::RuleDocument;

/// A replayable sequence of steps against one session.
///
/// ```yaml
/// name: second-wave
/// rules: ../rules
/// clock_start: 1700000000000
/// steps:
///   - op: insert
///     type: SimpleEvent
///   - op: advance
///     by: 10s
///   - op: fire
///   - op: expect
///     global: list
///     len: 1
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Rules directory, relative to the scenario file.
    #[serde(default)]
    pub rules: Option<PathBuf>,
    /// Inline rule documents, added after the rules directory.
    #[serde(default)]
    pub rule_set: Vec<RuleDocument>,
    /// Overrides the configured clock origin.
    #[serde(default)]
    pub clock_start: Option<Timestamp>,
    #[serde(default)]
    pub config: ConfigOverrides,
    pub steps: Vec<Step>,
}

/// Session settings a scenario may pin regardless of the environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default)]
    pub catch_up: Option<CatchUpPolicy>,
    #[serde(default)]
    pub strict_handles: Option<bool>,
    #[serde(default)]
    pub timed_execution: Option<bool>,
    /// 0 means unbounded.
    #[serde(default)]
    pub fire_limit: Option<usize>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut SessionConfig) {
        if let Some(catch_up) = self.catch_up {
            config.catch_up = catch_up;
        }
        if let Some(strict) = self.strict_handles {
            config.strict_handles = strict;
        }
        if let Some(timed) = self.timed_execution {
            config.timed_execution = timed;
        }
        if let Some(limit) = self.fire_limit {
            config.fire_limit = (limit > 0).then_some(limit);
        }
    }
}

/// One scenario step, internally tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    /// Advance the clock by a duration such as `10s` or `1m30s`.
    Advance { by: String },
    /// Advance the clock to an absolute time in milliseconds.
    AdvanceTo { at: Timestamp },
    /// Insert `count` identical facts.
    Insert {
        #[serde(rename = "type")]
        fact_type: String,
        #[serde(default)]
        fields: BTreeMap<String, FieldValue>,
        #[serde(default = "default_count")]
        count: usize,
    },
    /// Retract the n-th fact inserted by this scenario (0-based).
    Retract { fact: usize },
    /// Fire pending activations, optionally bounded.
    Fire {
        #[serde(default)]
        limit: Option<usize>,
    },
    /// Check a global: list length and/or exact value.
    Expect {
        global: String,
        #[serde(default)]
        len: Option<usize>,
        #[serde(default)]
        equals: Option<Value>,
    },
    /// Check the total number of consequences executed so far.
    ExpectFired { total: u64 },
}

fn default_count() -> usize {
    1
}

impl Step {
    /// Short label for reports.
    pub fn label(&self) -> String {
        match self {
            Step::Advance { by } => format!("advance {}", by),
            Step::AdvanceTo { at } => format!("advance_to {}", at),
            Step::Insert { fact_type, count, .. } if *count == 1 => format!("insert {}", fact_type),
            Step::Insert { fact_type, count, .. } => format!("insert {} x{}", fact_type, count),
            Step::Retract { fact } => format!("retract #{}", fact),
            Step::Fire { limit: Some(n) } => format!("fire (limit {})", n),
            Step::Fire { limit: None } => "fire".to_string(),
            Step::Expect { global, .. } => format!("expect {}", global),
            Step::ExpectFired { total } => format!("expect_fired {}", total),
        }
    }
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let scenario: Scenario = serde_yaml::from_str(yaml)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(RuleError::Validation("scenario name must not be empty".to_string()));
        }
        if self.rules.is_none() && self.rule_set.is_empty() {
            return Err(RuleError::Validation(format!(
                "scenario '{}' declares neither `rules` nor `rule_set`",
                self.name
            )));
        }
        Ok(())
    }

    /// Effective session config: `base` with this scenario's overrides applied.
    pub fn session_config(&self, base: &SessionConfig) -> SessionConfig {
        let mut config = base.clone();
        if let Some(start) = self.clock_start {
            config.clock_start = start;
        }
        self.config.apply(&mut config);
        config
    }
}
