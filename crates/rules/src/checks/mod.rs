//! Individual rule checks.
//!
//! Each check is a pure function of one metric (plus its thresholds) and
//! returns a [`Verdict`]. They are listed here in evaluation order.

pub mod extreme;
pub mod flatline;
pub mod negative;
pub mod null_zero;

use guardian_core::{Evidence, Issue, IssueKind, Metric, Severity};

pub use extreme::check_extreme_value;
pub use flatline::check_flatline;
pub use negative::check_negative;
pub use null_zero::check_null_zero;

pub(crate) fn issue_for(
    metric: &Metric,
    kind: IssueKind,
    severity: Severity,
    message: String,
    evidence: Evidence,
) -> Issue {
    Issue::new(metric.id.clone(), metric.label(), kind, severity, message, evidence)
}
