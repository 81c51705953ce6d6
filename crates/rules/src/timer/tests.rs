//! Tests for the timer module.

use std::time::Duration;

use tempo_core::{CatchUpPolicy, EngineError, FactId, TimerHandle};

use crate::timer::{format_duration, normalize_cron, parse_duration, TimerRegistry, TimerSpec};

const SEC: i64 = 1_000;

fn every_10s() -> TimerSpec {
    TimerSpec::interval(Duration::from_secs(10), Duration::from_secs(10))
}

fn fire_times(registry: &mut TimerRegistry, now: i64) -> Vec<(u64, i64)> {
    registry
        .collect_due(now)
        .into_iter()
        .map(|d| (d.fact_id.0, d.fire_at))
        .collect()
}

// -- parse_duration ----------------------------------------------------

#[test]
fn parse_duration_units() {
    assert_eq!(parse_duration("10s"), Some(Duration::from_secs(10)));
    assert_eq!(parse_duration("30m"), Some(Duration::from_secs(30 * 60)));
    assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3_600)));
    assert_eq!(parse_duration("1d"), Some(Duration::from_secs(86_400)));
    assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
}

#[test]
fn parse_duration_combined() {
    assert_eq!(
        parse_duration("1m30s"),
        Some(Duration::from_secs(90))
    );
    assert_eq!(
        parse_duration("1s500ms"),
        Some(Duration::from_millis(1_500))
    );
}

#[test]
fn parse_duration_bare_number_as_seconds() {
    assert_eq!(parse_duration("120"), Some(Duration::from_secs(120)));
}

#[test]
fn parse_duration_zero_is_allowed() {
    assert_eq!(parse_duration("0s"), Some(Duration::ZERO));
}

#[test]
fn parse_duration_invalid_returns_none() {
    assert_eq!(parse_duration(""), None);
    assert_eq!(parse_duration("abc"), None);
    assert_eq!(parse_duration("30m15"), None);
    assert_eq!(parse_duration("10x"), None);
}

#[test]
fn format_duration_is_compact() {
    assert_eq!(format_duration(Duration::ZERO), "0s");
    assert_eq!(format_duration(Duration::from_secs(10)), "10s");
    assert_eq!(format_duration(Duration::from_millis(90_250)), "1m30s250ms");
    assert_eq!(parse_duration(&format_duration(Duration::from_millis(3_723_004))), Some(Duration::from_millis(3_723_004)));
}

// -- TimerSpec parsing ---------------------------------------------------

#[test]
fn parse_interval_with_period() {
    let spec: TimerSpec = "int: 10s 10s".parse().unwrap();
    assert_eq!(spec, every_10s());
    assert!(spec.is_periodic());
    assert_eq!(spec.to_string(), "int: 10s 10s");
}

#[test]
fn parse_interval_one_shot() {
    let spec: TimerSpec = "int:5s".parse().unwrap();
    assert_eq!(spec, TimerSpec::one_shot(Duration::from_secs(5)));
    assert!(!spec.is_periodic());
    assert_eq!(spec.to_string(), "int: 5s");
}

#[test]
fn parse_cron_normalizes_five_fields() {
    let spec: TimerSpec = "cron: */5 * * * *".parse().unwrap();
    match &spec {
        TimerSpec::Cron(c) => assert_eq!(c.expression(), "0 */5 * * * *"),
        other => panic!("expected cron timer, got {:?}", other),
    }
}

#[test]
fn parse_rejects_garbage() {
    for raw in ["10s", "int:", "int: 1s 2s 3s", "int: soon", "every: 5s", "cron: not a cron"] {
        let err = raw.parse::<TimerSpec>().unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimer(_)), "{raw}: {err}");
    }
}

#[test]
fn normalize_cron_passes_six_fields_through() {
    assert_eq!(normalize_cron("0 */15 * * * *"), "0 */15 * * * *");
    assert_eq!(normalize_cron("  */5 * * * *  "), "0 */5 * * * *");
}

// -- TimerSpec arithmetic ------------------------------------------------

#[test]
fn interval_fire_arithmetic() {
    let spec = every_10s();
    assert_eq!(spec.first_fire(0), Some(10 * SEC));
    assert_eq!(spec.next_fire(10 * SEC), Some(20 * SEC));
    // Coalescing skips the boundaries at 20s and 30s.
    assert_eq!(spec.next_fire_after(10 * SEC, 35 * SEC), Some(40 * SEC));
    assert_eq!(spec.next_fire_after(10 * SEC, 40 * SEC), Some(50 * SEC));
}

#[test]
fn one_shot_has_no_next_fire() {
    let spec = TimerSpec::one_shot(Duration::from_secs(1));
    assert_eq!(spec.next_fire(1_000), None);
    assert_eq!(spec.next_fire_after(1_000, 5_000), None);
}

#[test]
fn cron_ticks_follow_schedule() {
    // Every minute at second 0; the pseudo clock is epoch milliseconds.
    let spec = TimerSpec::cron("* * * * *").unwrap();
    assert_eq!(spec.first_fire(0), Some(60 * SEC));
    assert_eq!(spec.first_fire(1), Some(60 * SEC));
    assert_eq!(spec.next_fire(60 * SEC), Some(120 * SEC));
    assert_eq!(spec.next_fire_after(60 * SEC, 150 * SEC), Some(180 * SEC));
}

// -- register / collect_due ----------------------------------------------

#[test]
fn register_computes_first_fire() {
    let mut registry = TimerRegistry::default();
    let handle = registry.register("r1", FactId(1), every_10s(), 5 * SEC).unwrap();
    let timer = registry.get(handle).unwrap();
    assert_eq!(timer.next_fire_at, 15 * SEC);
    assert_eq!(registry.next_due(), Some(15 * SEC));
    assert_eq!(registry.len(), 1);
}

#[test]
fn nothing_due_before_first_fire() {
    let mut registry = TimerRegistry::default();
    registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    assert!(registry.collect_due(9_999).is_empty());
    assert_eq!(fire_times(&mut registry, 10 * SEC), vec![(1, 10 * SEC)]);
}

#[test]
fn periodic_timer_is_rescheduled_past_now() {
    let mut registry = TimerRegistry::default();
    let handle = registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    registry.collect_due(10 * SEC);
    let timer = registry.get(handle).unwrap();
    assert_eq!(timer.next_fire_at, 20 * SEC);
    assert_eq!(timer.fire_count, 1);
}

#[test]
fn every_period_policy_catches_up_each_boundary() {
    let mut registry = TimerRegistry::new(CatchUpPolicy::EveryPeriod, false);
    registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    assert_eq!(
        fire_times(&mut registry, 35 * SEC),
        vec![(1, 10 * SEC), (1, 20 * SEC), (1, 30 * SEC)]
    );
    assert_eq!(registry.next_due(), Some(40 * SEC));
}

#[test]
fn every_period_due_list_scales_with_elapsed_periods() {
    let mut registry = TimerRegistry::new(CatchUpPolicy::EveryPeriod, false);
    let every_ms = TimerSpec::interval(Duration::from_millis(1), Duration::from_millis(1));
    registry.register("r1", FactId(1), every_ms.clone(), 0).unwrap();
    assert_eq!(registry.collect_due(SEC).len(), 1_000);

    let mut coalesced = TimerRegistry::new(CatchUpPolicy::Coalesce, false);
    coalesced.register("r1", FactId(1), every_ms, 0).unwrap();
    assert_eq!(coalesced.collect_due(SEC).len(), 1);
}

#[test]
fn coalesce_policy_yields_one_entry_per_timer() {
    let mut registry = TimerRegistry::new(CatchUpPolicy::Coalesce, false);
    registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    registry.register("r1", FactId(2), every_10s(), 0).unwrap();
    assert_eq!(
        fire_times(&mut registry, 35 * SEC),
        vec![(1, 10 * SEC), (2, 10 * SEC)]
    );
    assert_eq!(registry.next_due(), Some(40 * SEC));
}

#[test]
fn collect_due_orders_by_time_then_registration() {
    let mut registry = TimerRegistry::default();
    registry.register("r1", FactId(7), every_10s(), 5 * SEC).unwrap(); // due 15s
    registry.register("r1", FactId(3), every_10s(), 0).unwrap(); // due 10s
    registry.register("r1", FactId(5), every_10s(), 5 * SEC).unwrap(); // due 15s

    assert_eq!(
        fire_times(&mut registry, 25 * SEC),
        vec![
            (3, 10 * SEC),
            (7, 15 * SEC),
            (5, 15 * SEC),
            (3, 20 * SEC),
            (7, 25 * SEC),
            (5, 25 * SEC),
        ]
    );
}

#[test]
fn one_fire_per_fact_never_coalesced_across_facts() {
    let mut registry = TimerRegistry::default();
    for fact in 0..6 {
        registry.register("r1", FactId(fact), every_10s(), 0).unwrap();
    }
    assert_eq!(registry.collect_due(10 * SEC).len(), 6);
    assert_eq!(registry.len(), 6);
}

#[test]
fn one_shot_timer_is_removed_after_firing() {
    let mut registry = TimerRegistry::default();
    let handle = registry
        .register("r1", FactId(1), TimerSpec::one_shot(Duration::from_secs(1)), 0)
        .unwrap();
    assert_eq!(registry.collect_due(5 * SEC).len(), 1);
    assert!(registry.get(handle).is_none());
    assert!(registry.is_empty());
    assert!(registry.handles_for_fact(FactId(1)).is_empty());
    assert!(registry.collect_due(50 * SEC).is_empty());
}

#[test]
fn zero_delay_is_due_immediately() {
    let mut registry = TimerRegistry::default();
    registry
        .register("r1", FactId(1), TimerSpec::one_shot(Duration::ZERO), 3 * SEC)
        .unwrap();
    assert_eq!(fire_times(&mut registry, 3 * SEC), vec![(1, 3 * SEC)]);
}

// -- unregister ------------------------------------------------------------

#[test]
fn unregister_is_idempotent() {
    let mut registry = TimerRegistry::default();
    let handle = registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    assert!(registry.unregister(handle).unwrap());
    assert!(!registry.unregister(handle).unwrap());
    assert!(registry.collect_due(100 * SEC).is_empty());
}

#[test]
fn strict_unregister_rejects_unknown_handle() {
    let mut registry = TimerRegistry::new(CatchUpPolicy::EveryPeriod, true);
    let handle = registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    assert!(registry.unregister(handle).unwrap());
    let err = registry.unregister(handle).unwrap_err();
    assert!(matches!(err, EngineError::UnknownHandle(h) if h == handle));
    assert!(matches!(
        registry.unregister(TimerHandle(999)),
        Err(EngineError::UnknownHandle(_))
    ));
}

#[test]
fn unregister_fact_cancels_all_its_timers() {
    let mut registry = TimerRegistry::default();
    registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    registry.register("r2", FactId(1), every_10s(), 0).unwrap();
    registry.register("r1", FactId(2), every_10s(), 0).unwrap();

    assert_eq!(registry.handles_for_fact(FactId(1)).len(), 2);
    assert_eq!(registry.unregister_fact(FactId(1)), 2);
    assert_eq!(registry.unregister_fact(FactId(1)), 0);
    assert_eq!(fire_times(&mut registry, 10 * SEC), vec![(2, 10 * SEC)]);
}

#[test]
fn clear_drops_everything() {
    let mut registry = TimerRegistry::default();
    registry.register("r1", FactId(1), every_10s(), 0).unwrap();
    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(registry.next_due(), None);
    assert_eq!(registry.iter().count(), 0);
}
