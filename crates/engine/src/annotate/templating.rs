//! Minijinja templates for fallback issue explanations.
//!
//! One template per issue kind, rendered from the issue's evidence. A fresh
//! [`minijinja::Environment`] is built per render; if rendering fails a plain
//! sentence built from the issue message is returned instead, so the result
//! is never empty.

use std::collections::BTreeMap;

use guardian_core::{Issue, IssueKind};
use serde::Serialize;

const NULL_OR_ZERO: &str = "{% if value is none %}{{ metric }} has no latest value\
{% else %}{{ metric }} dropped to zero after {{ signals.non_zero_samples | round }} non-zero samples{% endif %}. \
Check ETL validity or missing joins.";

const NEGATIVE: &str = "{{ metric }} reported {{ value }}, a negative value on a metric that should not go below zero. \
Likely a logical or transformation error.";

const FLATLINE: &str = "{{ metric }} has stayed at {{ value }} for {{ signals.window | round }} samples. \
Check whether the data refresh is working.";

const EXTREME_VALUE: &str = "{{ metric }} reached {{ value }}, \
{% if signals.ceiling is defined %}above the ceiling of {{ signals.ceiling | round(2) }}\
{% else %}below the floor of {{ signals.floor | round(2) }}{% endif %}. \
Verify units, filters and source totals.";

const SPIKE: &str = "{{ metric }} jumped to {{ value }} against a recent mean of {{ signals.mean | round(2) }}. \
Likely caused by duplicated rows or incorrect aggregation.";

const DROP: &str = "{{ metric }} fell to {{ value }} against a recent mean of {{ signals.mean | round(2) }}. \
May indicate missing data or a broken upstream pipeline.";

const OUTLIER: &str = "{{ metric }} value {{ value }} sits {{ signals.z | round(1) }} standard deviations \
from its historical mean of {{ signals.mean | round(2) }}. Investigate upstream data sources for this period.";

/// Context data available to fallback templates.
#[derive(Debug, Serialize)]
struct FallbackContext<'a> {
    metric: &'a str,
    kind: String,
    severity: String,
    index: Option<usize>,
    value: Option<f64>,
    signals: BTreeMap<&'a str, f64>,
    message: &'a str,
}

fn template_for(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::NullOrZero => NULL_OR_ZERO,
        IssueKind::Negative => NEGATIVE,
        IssueKind::Flatline => FLATLINE,
        IssueKind::ExtremeValue => EXTREME_VALUE,
        IssueKind::Spike => SPIKE,
        IssueKind::Drop => DROP,
        IssueKind::Outlier => OUTLIER,
    }
}

fn build_env() -> minijinja::Environment<'static> {
    let mut env = minijinja::Environment::new();
    env.add_filter("round", round_filter);
    env
}

/// Render an issue through its kind's template.
pub fn render(issue: &Issue) -> Result<String, minijinja::Error> {
    let evidence = issue.evidence();
    let ctx = FallbackContext {
        metric: issue.metric_name(),
        kind: issue.kind().to_string(),
        severity: issue.severity().to_string(),
        index: evidence.index,
        value: evidence.value,
        signals: evidence
            .signals
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect(),
        message: issue.message(),
    };
    build_env().render_str(template_for(issue.kind()), ctx)
}

/// Templated explanation for an issue. Always non-empty.
pub fn fallback_explanation(issue: &Issue) -> String {
    match render(issue) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => plain_explanation(issue),
        Err(e) => {
            tracing::warn!(kind = %issue.kind(), error = %e, "fallback template failed to render");
            plain_explanation(issue)
        }
    }
}

fn plain_explanation(issue: &Issue) -> String {
    format!(
        "{}: {}. Investigate upstream data sources.",
        issue.kind().label(),
        issue.message()
    )
}

/// Custom filter: round a float to N decimal places.
fn round_filter(value: f64, decimals: Option<u32>) -> String {
    let n = decimals.unwrap_or(0);
    format!("{:.prec$}", value, prec = n as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardian_core::{Evidence, Severity};

    fn issue(kind: IssueKind, evidence: Evidence) -> Issue {
        Issue::new("d/w/revenue", "Revenue", kind, Severity::Major, "detail", evidence)
    }

    #[test]
    fn every_kind_renders() {
        let cases = [
            (IssueKind::NullOrZero, Evidence::at(3, None)),
            (
                IssueKind::NullOrZero,
                Evidence::at(3, Some(0.0)).with_signal("non_zero_samples", 3.0),
            ),
            (IssueKind::Negative, Evidence::at(3, Some(-5.0))),
            (
                IssueKind::Flatline,
                Evidence::at(4, Some(25.0)).with_signal("window", 5.0),
            ),
            (
                IssueKind::ExtremeValue,
                Evidence::at(3, Some(5200.0)).with_signal("ceiling", 2000.0),
            ),
            (
                IssueKind::ExtremeValue,
                Evidence::at(3, Some(5.0)).with_signal("floor", 100.0),
            ),
            (
                IssueKind::Spike,
                Evidence::at(4, Some(100.0)).with_signal("mean", 10.0),
            ),
            (
                IssueKind::Drop,
                Evidence::at(4, Some(1.0)).with_signal("mean", 10.0),
            ),
            (
                IssueKind::Outlier,
                Evidence::at(9, Some(1.0))
                    .with_signal("mean", 0.04)
                    .with_signal("z", 4.9),
            ),
        ];
        for (kind, evidence) in cases {
            let text = render(&issue(kind, evidence)).unwrap();
            assert!(text.starts_with("Revenue"), "{kind}: {text}");
            assert!(!text.contains("{{"), "{kind}: {text}");
        }
    }

    #[test]
    fn spike_mentions_mean() {
        let text = fallback_explanation(&issue(
            IssueKind::Spike,
            Evidence::at(4, Some(100.0)).with_signal("mean", 10.0),
        ));
        assert!(text.contains("mean of 10.00"));
        assert!(text.contains("duplicated rows"));
    }

    #[test]
    fn missing_value_wording() {
        let text = fallback_explanation(&issue(IssueKind::NullOrZero, Evidence::at(3, None)));
        assert!(text.contains("has no latest value"));
    }

    #[test]
    fn missing_signal_still_produces_text() {
        // no "mean" signal: round on undefined fails, plain text takes over
        let text = fallback_explanation(&issue(IssueKind::Spike, Evidence::default()));
        assert!(!text.trim().is_empty());
    }

    #[test]
    fn round_filter_decimals() {
        assert_eq!(round_filter(3.14159, Some(2)), "3.14");
        assert_eq!(round_filter(2.6, None), "3");
    }
}
