use guardian_core::{Evidence, InsufficientData, IssueKind, Metric, Severity, Verdict};

use super::issue_for;

pub const CHECK: &str = "flatline";

/// Flag when the trailing `window` samples (latest included) are all present
/// and exactly equal. A window shorter than 2 is treated as 2.
pub fn check_flatline(metric: &Metric, window: usize) -> Verdict {
    let window = window.max(2);
    let len = metric.samples.len();
    if len < window {
        return Verdict::Abstain(InsufficientData {
            check: CHECK,
            required: window,
            available: len,
        });
    }

    let start = len - window;
    let tail: Option<Vec<f64>> = metric.samples[start..]
        .iter()
        .map(|s| s.present())
        .collect();
    let Some(tail) = tail else {
        return Verdict::Pass;
    };

    let first = tail[0];
    if tail.iter().any(|v| *v != first) {
        return Verdict::Pass;
    }

    Verdict::Fail(issue_for(
        metric,
        IssueKind::Flatline,
        Severity::Minor,
        format!(
            "{} unchanged at {} for the last {} samples",
            metric.label(),
            first,
            window
        ),
        Evidence::at(len - 1, Some(first))
            .with_signal("window", window as f64)
            .with_signal("window_start", start as f64),
    ))
}
