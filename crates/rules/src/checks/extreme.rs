use guardian_core::{
    Bounds, Evidence, ExtremeValueConfig, InsufficientData, Issue, IssueKind, Metric, Severity,
    Verdict,
};

use super::issue_for;
use crate::math::percentile;

pub const CHECK: &str = "extreme_value";

enum Limit {
    Ceiling(f64),
    Floor(f64),
}

/// Flag a latest value outside its explicit bounds, or, with no bounds
/// configured, outside the configured percentiles of its prior values.
///
/// Bounds resolve as: the metric's own `expected_range`, then the per-metric
/// entry in `config.bounds`, then `config.default_bounds`.
pub fn check_extreme_value(metric: &Metric, config: &ExtremeValueConfig) -> Verdict {
    let Some((index, latest)) = metric.latest() else {
        return Verdict::Abstain(InsufficientData {
            check: CHECK,
            required: 1,
            available: 0,
        });
    };
    let Some(value) = latest.present() else {
        return Verdict::Pass;
    };

    if let Some(bounds) = resolve_bounds(metric, config) {
        let crossed = match (bounds.floor, bounds.ceiling) {
            (_, Some(c)) if value > c => Some(Limit::Ceiling(c)),
            (Some(f), _) if value < f => Some(Limit::Floor(f)),
            _ => None,
        };
        return match crossed {
            Some(limit) => Verdict::Fail(bound_issue(metric, index, value, limit, "configured")),
            None => Verdict::Pass,
        };
    }

    let prior: Vec<f64> = metric
        .numeric_values()
        .into_iter()
        .filter(|(i, _)| *i != index)
        .map(|(_, v)| v)
        .collect();
    if prior.len() < config.min_samples {
        return Verdict::Abstain(InsufficientData {
            check: CHECK,
            required: config.min_samples,
            available: prior.len(),
        });
    }

    let (Some(upper), Some(lower)) = (
        percentile(&prior, config.upper_percentile),
        percentile(&prior, config.lower_percentile),
    ) else {
        return Verdict::Pass;
    };

    let crossed = if value > upper {
        Some((Limit::Ceiling(upper), config.upper_percentile))
    } else if value < lower {
        Some((Limit::Floor(lower), config.lower_percentile))
    } else {
        None
    };
    match crossed {
        Some((limit, p)) => {
            Verdict::Fail(bound_issue(metric, index, value, limit, &format!("p{}", p)))
        }
        None => Verdict::Pass,
    }
}

fn resolve_bounds(metric: &Metric, config: &ExtremeValueConfig) -> Option<Bounds> {
    let is_set = |b: &Bounds| b.floor.is_some() || b.ceiling.is_some();
    metric
        .expected_range
        .filter(is_set)
        .or_else(|| config.bounds.get(&metric.id).copied().filter(is_set))
        .or_else(|| config.default_bounds.filter(is_set))
}

fn bound_issue(metric: &Metric, index: usize, value: f64, limit: Limit, source: &str) -> Issue {
    let (side, bound) = match limit {
        Limit::Ceiling(c) => ("ceiling", c),
        Limit::Floor(f) => ("floor", f),
    };
    let direction = if side == "ceiling" { "above" } else { "below" };
    issue_for(
        metric,
        IssueKind::ExtremeValue,
        Severity::Major,
        format!(
            "{} latest value {} is {} the {} {} of {}",
            metric.label(),
            value,
            direction,
            source,
            side,
            bound
        ),
        Evidence::at(index, Some(value)).with_signal(side, bound),
    )
}
