use guardian_core::{Evidence, InsufficientData, IssueKind, Metric, Severity, Verdict};

use super::issue_for;

pub const CHECK: &str = "null_zero";

/// Flag a missing latest sample, or a latest value of exactly zero when the
/// metric has ever reported a non-zero value. All-zero series are
/// structurally zero and pass.
pub fn check_null_zero(metric: &Metric) -> Verdict {
    let Some((index, latest)) = metric.latest() else {
        return Verdict::Abstain(InsufficientData {
            check: CHECK,
            required: 1,
            available: 0,
        });
    };

    match latest.present() {
        None => Verdict::Fail(issue_for(
            metric,
            IssueKind::NullOrZero,
            Severity::Major,
            format!("{} latest value is missing (sample {})", metric.label(), index),
            Evidence::at(index, None),
        )),
        Some(v) if v == 0.0 => {
            let non_zero = metric
                .samples
                .iter()
                .filter_map(|s| s.present())
                .filter(|x| *x != 0.0)
                .count();
            if non_zero == 0 {
                return Verdict::Pass;
            }
            Verdict::Fail(issue_for(
                metric,
                IssueKind::NullOrZero,
                Severity::Major,
                format!(
                    "{} latest value is 0 while {} earlier samples were non-zero",
                    metric.label(),
                    non_zero
                ),
                Evidence::at(index, Some(v)).with_signal("non_zero_samples", non_zero as f64),
            ))
        }
        Some(_) => Verdict::Pass,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::fixtures::{metric, series};

    #[test]
    fn empty_metric_abstains() {
        assert!(check_null_zero(&series(&[])).is_abstain());
    }

    #[test]
    fn missing_latest_is_flagged() {
        let v = check_null_zero(&metric(&[Some(82.0), Some(80.0), None]));
        let issue = v.issue().unwrap();
        assert_eq!(issue.kind(), IssueKind::NullOrZero);
        assert_eq!(issue.severity(), Severity::Major);
        assert_eq!(issue.evidence().index, Some(2));
        assert_eq!(issue.evidence().value, None);
    }

    #[test]
    fn zero_after_activity_is_flagged() {
        let v = check_null_zero(&series(&[300.0, 310.0, 305.0, 0.0]));
        let issue = v.issue().unwrap();
        assert_eq!(issue.evidence().signal("non_zero_samples"), Some(3.0));
    }

    #[test]
    fn structurally_zero_metric_passes() {
        assert_eq!(check_null_zero(&series(&[0.0, 0.0, 0.0])), Verdict::Pass);
        assert_eq!(check_null_zero(&series(&[0.0])), Verdict::Pass);
    }

    #[test]
    fn earlier_missing_values_do_not_count() {
        assert_eq!(
            check_null_zero(&metric(&[None, Some(5.0), Some(6.0)])),
            Verdict::Pass
        );
    }
}
