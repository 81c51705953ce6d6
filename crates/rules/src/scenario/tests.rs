//! Tests for scenario parsing and replay.

use std::fs;
use std::path::Path;

use serde_json::json;
use tempfile::TempDir;
use tempo_core::{CatchUpPolicy, SessionConfig};

use super::*;
use crate::loader::RuleError;

const INLINE_RULE: &str = r#"
rule_set:
  - kind: Rule
    metadata:
      id: xxx
    timer: "int: 10s 10s"
    when:
      type: SimpleEvent
    then:
      - action: append
        global: list
        value: fired
"#;

fn scenario(steps: &str) -> Scenario {
    let yaml = format!("name: test\nclock_start: 1700000000000\n{}\nsteps:\n{}", INLINE_RULE, steps);
    Scenario::from_yaml(&yaml).unwrap()
}

fn run(scenario: &Scenario) -> ReplayReport {
    replay(scenario, Path::new("."), &SessionConfig::default()).unwrap()
}

#[test]
fn parses_every_step_kind() {
    let s = scenario(
        r#"
  - op: insert
    type: SimpleEvent
    fields: { source: test }
    count: 2
  - op: advance
    by: 10s
  - op: advance_to
    at: 1700000030000
  - op: retract
    fact: 0
  - op: fire
    limit: 3
  - op: fire
  - op: expect
    global: list
    len: 2
  - op: expect
    global: list
    equals: [fired, fired]
  - op: expect_fired
    total: 2
"#,
    );
    assert_eq!(s.steps.len(), 9);
    assert!(matches!(&s.steps[0], Step::Insert { count: 2, .. }));
    assert_eq!(s.steps[4], Step::Fire { limit: Some(3) });
    assert_eq!(s.steps[5].label(), "fire");
    assert_eq!(s.steps[0].label(), "insert SimpleEvent x2");
}

#[test]
fn scenario_without_rules_is_rejected() {
    let err = Scenario::from_yaml("name: empty\nsteps: []\n").unwrap_err();
    assert!(matches!(err, RuleError::Validation(_)));
}

#[test]
fn unknown_op_is_rejected() {
    let yaml = format!("name: t\n{}\nsteps:\n  - op: sleep\n    ms: 10\n", INLINE_RULE);
    assert!(matches!(Scenario::from_yaml(&yaml), Err(RuleError::Parse(_))));
}

#[test]
fn misspelled_step_field_is_rejected() {
    let yaml = format!("name: t\n{}\nsteps:\n  - op: fire\n    limt: 3\n", INLINE_RULE);
    assert!(matches!(Scenario::from_yaml(&yaml), Err(RuleError::Parse(_))));
}

#[test]
fn overrides_apply_on_top_of_base_config() {
    let yaml = format!(
        "name: t\nclock_start: 5\nconfig:\n  catch_up: coalesce\n  fire_limit: 0\n{}\nsteps: []\n",
        INLINE_RULE
    );
    let s = Scenario::from_yaml(&yaml).unwrap();
    let base = SessionConfig {
        fire_limit: Some(3),
        strict_handles: true,
        ..SessionConfig::default()
    };
    let config = s.session_config(&base);
    assert_eq!(config.clock_start, 5);
    assert_eq!(config.catch_up, CatchUpPolicy::Coalesce);
    assert_eq!(config.fire_limit, None);
    assert!(config.strict_handles);
}

#[test]
fn replay_second_wave() {
    let s = scenario(
        r#"
  - op: insert
    type: SimpleEvent
  - op: fire
  - op: advance
    by: 10s
  - op: fire
  - op: expect
    global: list
    len: 1
  - op: insert
    type: SimpleEvent
    count: 5
  - op: advance
    by: 10s
  - op: fire
  - op: expect
    global: list
    len: 7
  - op: expect_fired
    total: 7
"#,
    );
    let report = run(&s);
    assert!(report.passed(), "{:?}", report.failures().collect::<Vec<_>>());
    assert_eq!(report.steps[7].fired, 6);
    assert_eq!(report.final_now, 1_700_000_020_000);
    assert_eq!(report.globals["list"].as_array().map(Vec::len), Some(7));

    let encoded = serde_json::to_value(&report).unwrap();
    assert_eq!(encoded["globals"]["list"].as_array().map(Vec::len), Some(7));
    assert!(encoded["globals"].get("values").is_none());
}

#[test]
fn failed_expectation_is_reported_and_replay_continues() {
    let s = scenario(
        r#"
  - op: insert
    type: SimpleEvent
  - op: advance
    by: 10s
  - op: expect
    global: list
    len: 1
  - op: fire
  - op: expect
    global: list
    equals: [fired]
"#,
    );
    let report = run(&s);
    assert!(!report.passed());
    let failures: Vec<_> = report.failures().map(|f| f.index).collect();
    assert_eq!(failures, vec![2]);
    assert!(report.steps[2]
        .failure
        .as_deref()
        .is_some_and(|f| f.contains("expected length 1, found 0")));
    assert_eq!(report.globals, json!({ "list": ["fired"] }));
}

#[test]
fn engine_errors_become_step_failures() {
    let s = scenario(
        r#"
  - op: advance
    by: 10s
  - op: advance_to
    at: 0
  - op: retract
    fact: 4
  - op: advance
    by: whenever
"#,
    );
    let report = run(&s);
    let failed: Vec<_> = report.failures().map(|f| f.index).collect();
    assert_eq!(failed, vec![1, 2, 3]);
    assert!(report.steps[1].failure.as_deref().is_some_and(|f| f.contains("cannot move backwards")));
}

#[test]
fn retract_by_insertion_index() {
    let s = scenario(
        r#"
  - op: insert
    type: SimpleEvent
    count: 3
  - op: retract
    fact: 1
  - op: advance
    by: 10s
  - op: fire
  - op: expect_fired
    total: 2
"#,
    );
    assert!(run(&s).passed());
}

#[test]
fn rules_directory_is_resolved_relative_to_base() {
    let dir = TempDir::new().unwrap();
    let rules = dir.path().join("rules");
    fs::create_dir_all(&rules).unwrap();
    fs::write(
        rules.join("count.yml"),
        "kind: Rule\nmetadata:\n  id: count\nwhen:\n  type: Ping\nthen:\n  - action: increment\n    global: pings\n",
    )
    .unwrap();

    let s = Scenario::from_yaml(
        "name: dir\nrules: rules\nsteps:\n  - op: insert\n    type: Ping\n  - op: fire\n  - op: expect\n    global: pings\n    equals: 1\n",
    )
    .unwrap();
    let report = replay(&s, dir.path(), &SessionConfig::default()).unwrap();
    assert!(report.passed());
}

#[test]
fn broken_rule_file_fails_setup() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("bad.yml"), "kind: Rule\n").unwrap();
    let s = Scenario::from_yaml("name: broken\nrules: .\nsteps: []\n").unwrap();
    let err = replay(&s, dir.path(), &SessionConfig::default()).unwrap_err();
    assert!(matches!(err, RuleError::Validation(msg) if msg.contains("bad.yml")));
}
