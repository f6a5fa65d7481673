//! Outcome of a single check against a single metric.

use crate::error::InsufficientData;
use crate::issue::Issue;

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// The check ran and found nothing.
    Pass,
    /// The check ran and produced a finding.
    Fail(Issue),
    /// The check could not run on this history.
    Abstain(InsufficientData),
}

impl Verdict {
    /// Unwrap the finding, logging abstentions at debug level.
    pub fn record(self, metric_id: &str) -> Option<Issue> {
        match self {
            Verdict::Fail(issue) => Some(issue),
            Verdict::Abstain(reason) => {
                tracing::debug!(metric_id, check = reason.check, %reason, "check abstained");
                None
            }
            Verdict::Pass => None,
        }
    }

    pub fn issue(&self) -> Option<&Issue> {
        match self {
            Verdict::Fail(issue) => Some(issue),
            _ => None,
        }
    }

    pub fn is_abstain(&self) -> bool {
        matches!(self, Verdict::Abstain(_))
    }
}
