//! Scenario execution and reporting.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tempo_core::{Fact, FactId, SessionConfig, Timestamp};
use tracing::{debug, info, warn};

use crate::loader::{build_knowledge_base, LoadStatus, Result, RuleError, RuleLoader};
use crate::rule::KnowledgeBase;
use crate::schema::RuleDocument;
use crate::session::{Session, SessionMetrics};
use crate::timer::parse_duration;

use super::types::{Scenario, Step};

/// Result of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub step: String,
    /// Clock time after the step.
    pub now: Timestamp,
    /// Consequences executed by this step.
    pub fired: usize,
    /// Engine error or failed expectation, if any.
    pub failure: Option<String>,
}

/// Outcome of a full replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayReport {
    pub scenario: String,
    pub steps: Vec<StepOutcome>,
    pub final_now: Timestamp,
    pub metrics: SessionMetrics,
    pub globals: Value,
}

impl ReplayReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(|s| s.failure.is_none())
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| s.failure.is_some())
    }

    pub fn total_fired(&self) -> u64 {
        self.metrics.total_fired
    }
}

/// Run a scenario against a fresh session.
///
/// `base_dir` resolves the scenario's relative `rules` directory (normally the
/// directory holding the scenario file). Setup problems (unloadable rules,
/// duplicate ids) fail the call; engine errors and failed expectations during
/// the steps are recorded in the report and the replay continues.
pub fn replay(scenario: &Scenario, base_dir: &Path, config: &SessionConfig) -> Result<ReplayReport> {
    let kb = knowledge_base(scenario, base_dir)?;
    let config = scenario.session_config(config);
    info!(
        scenario = %scenario.name,
        rules = kb.len(),
        steps = scenario.steps.len(),
        "replaying scenario"
    );

    let mut session = Session::new(kb, config);
    let mut inserted: Vec<FactId> = Vec::new();
    let mut outcomes = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let before = session.metrics().total_fired;
        let failure = run_step(&mut session, step, &mut inserted).err();
        let fired = (session.metrics().total_fired - before) as usize;

        match &failure {
            Some(reason) => warn!(scenario = %scenario.name, index, step = %step.label(), %reason, "step failed"),
            None => debug!(scenario = %scenario.name, index, step = %step.label(), fired, "step ok"),
        }
        outcomes.push(StepOutcome {
            index,
            step: step.label(),
            now: session.now(),
            fired,
            failure,
        });
    }

    let report = ReplayReport {
        scenario: scenario.name.clone(),
        steps: outcomes,
        final_now: session.now(),
        metrics: session.metrics().clone(),
        globals: serde_json::to_value(session.globals())?,
    };
    session.dispose();

    info!(
        scenario = %report.scenario,
        passed = report.passed(),
        fired = report.total_fired(),
        "scenario finished"
    );
    Ok(report)
}

fn knowledge_base(scenario: &Scenario, base_dir: &Path) -> Result<KnowledgeBase> {
    let mut loaded: Vec<RuleDocument> = Vec::new();

    if let Some(rules) = &scenario.rules {
        let mut loader = RuleLoader::new(base_dir.join(rules));
        let failed: Vec<String> = loader
            .load_all()?
            .into_iter()
            .filter_map(|r| match r.status {
                LoadStatus::Failed { error } => Some(format!("{}: {}", r.path.display(), error)),
                _ => None,
            })
            .collect();
        if !failed.is_empty() {
            return Err(RuleError::Validation(format!(
                "scenario '{}': {} rule file(s) failed to load: {}",
                scenario.name,
                failed.len(),
                failed.join("; ")
            )));
        }
        loaded.extend(loader.documents().cloned());
    }

    build_knowledge_base(loaded.iter().chain(scenario.rule_set.iter()))
}

/// Execute one step. `Err` carries a human-readable failure.
fn run_step(session: &mut Session, step: &Step, inserted: &mut Vec<FactId>) -> std::result::Result<(), String> {
    match step {
        Step::Advance { by } => {
            let delta = parse_duration(by).ok_or_else(|| format!("invalid duration '{}'", by))?;
            session.advance_clock(delta).map_err(|e| e.to_string())?;
        }
        Step::AdvanceTo { at } => {
            session.advance_clock_to(*at).map_err(|e| e.to_string())?;
        }
        Step::Insert { fact_type, fields, count } => {
            for _ in 0..*count {
                let fact = Fact {
                    fact_type: fact_type.clone(),
                    fields: fields.clone(),
                };
                inserted.push(session.insert_fact(fact).map_err(|e| e.to_string())?);
            }
        }
        Step::Retract { fact } => {
            let id = inserted
                .get(*fact)
                .copied()
                .ok_or_else(|| format!("no fact #{} inserted by this scenario", fact))?;
            session.retract_fact(id).map_err(|e| e.to_string())?;
        }
        Step::Fire { limit } => {
            let fired = match limit {
                Some(n) => session.fire_limit(*n),
                None => session.fire_all(),
            };
            fired.map_err(|e| e.to_string())?;
        }
        Step::Expect { global, len, equals } => {
            let actual = session.global(global);
            if let Some(expected) = len {
                let found = actual.and_then(Value::as_array).map(Vec::len).unwrap_or(0);
                if found != *expected {
                    return Err(format!("global '{}': expected length {}, found {}", global, expected, found));
                }
            }
            if let Some(expected) = equals {
                if actual != Some(expected) {
                    return Err(format!(
                        "global '{}': expected {}, found {}",
                        global,
                        expected,
                        actual.map(Value::to_string).unwrap_or_else(|| "nothing".to_string())
                    ));
                }
            }
        }
        Step::ExpectFired { total } => {
            let found = session.metrics().total_fired;
            if found != *total {
                return Err(format!("expected {} fires in total, found {}", total, found));
            }
        }
    }
    Ok(())
}
