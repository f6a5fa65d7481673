use guardian_core::{Evidence, InsufficientData, IssueKind, Metric, Severity, Verdict};

use super::issue_for;

pub const CHECK: &str = "negative";

/// Flag a negative latest value unless the metric is declared `can_be_negative`.
pub fn check_negative(metric: &Metric) -> Verdict {
    let Some((index, latest)) = metric.latest() else {
        return Verdict::Abstain(InsufficientData {
            check: CHECK,
            required: 1,
            available: 0,
        });
    };
    if metric.can_be_negative {
        return Verdict::Pass;
    }

    match latest.present() {
        Some(v) if v < 0.0 => Verdict::Fail(issue_for(
            metric,
            IssueKind::Negative,
            Severity::Critical,
            format!(
                "{} latest value {} is negative for a non-negative metric",
                metric.label(),
                v
            ),
            Evidence::at(index, Some(v)),
        )),
        _ => Verdict::Pass,
    }
}
