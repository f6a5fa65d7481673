//! Invariants of the rule checks over generated histories.

use chrono::{TimeZone, Utc};
use guardian_core::{daily_samples, IssueKind, Metric, RulesConfig};
use guardian_rules::checks::{check_flatline, check_negative};
use guardian_rules::RuleEngine;

fn metric(values: &[f64]) -> Metric {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let opts: Vec<Option<f64>> = values.iter().map(|v| Some(*v)).collect();
    Metric::new("ops/latency/p95", "Latency p95", daily_samples(start, &opts))
}

/// Small deterministic LCG so the histories vary without a rng dependency.
fn histories(count: usize, len: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut state = seed;
    (0..count)
        .map(|_| {
            (0..len)
                .map(|_| {
                    state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    ((state >> 33) % 200) as f64 - 100.0
                })
                .collect()
        })
        .collect()
}

#[test]
fn flatline_needs_at_least_two_samples() {
    for window in 0..8 {
        assert!(check_flatline(&metric(&[]), window).issue().is_none());
        assert!(check_flatline(&metric(&[7.0]), window).issue().is_none());
    }
}

#[test]
fn flatline_never_fires_on_differing_tail() {
    for values in histories(50, 12, 7) {
        let mut values = values;
        let n = values.len();
        values[n - 1] = values[n - 2] + 1.0;
        for window in 2..=n {
            assert!(check_flatline(&metric(&values), window).issue().is_none());
        }
    }
}

#[test]
fn flatline_fires_on_any_constant_tail() {
    for window in 2..10 {
        let mut values = vec![1.0, 2.0, 3.0];
        values.extend(std::iter::repeat(4.0).take(window));
        let verdict = check_flatline(&metric(&values), window);
        assert_eq!(verdict.issue().map(|i| i.kind()), Some(IssueKind::Flatline));
    }
}

#[test]
fn negative_allowed_metrics_never_flag_negative() {
    for values in histories(50, 6, 11) {
        let mut m = metric(&values);
        m.can_be_negative = true;
        assert!(check_negative(&m).issue().is_none());
    }
}

#[test]
fn negative_fires_exactly_when_latest_below_zero() {
    for values in histories(100, 4, 3) {
        let latest = values[values.len() - 1];
        let fired = check_negative(&metric(&values)).issue().is_some();
        assert_eq!(fired, latest < 0.0);
    }
}

#[test]
fn rule_engine_never_reports_a_kind_twice() {
    let engine = RuleEngine::new(RulesConfig::default());
    for values in histories(40, 15, 19) {
        let issues = engine.check(&metric(&values));
        let mut kinds: Vec<IssueKind> = issues.iter().map(|i| i.kind()).collect();
        let before = kinds.len();
        kinds.sort_by_key(|k| k.to_string());
        kinds.dedup();
        assert_eq!(before, kinds.len());
    }
}
