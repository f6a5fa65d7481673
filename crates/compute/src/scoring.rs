//! Severity-weighted dashboard score.
//!
//! score = clamp(ceiling - Σ weight(severity), floor, ceiling)

use guardian_core::{Issue, ScoringConfig, Severity};
use serde::{Deserialize, Serialize};

/// Raw issue counts per severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBreakdown {
    pub critical: usize,
    pub major: usize,
    pub minor: usize,
}

impl SeverityBreakdown {
    pub fn from_issues<'a>(issues: impl IntoIterator<Item = &'a Issue>) -> Self {
        let mut b = Self::default();
        for issue in issues {
            match issue.severity() {
                Severity::Critical => b.critical += 1,
                Severity::Major => b.major += 1,
                Severity::Minor => b.minor += 1,
            }
        }
        b
    }

    pub fn total(&self) -> usize {
        self.critical + self.major + self.minor
    }
}

/// Quality summary for one dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqScore {
    pub dashboard_id: String,
    pub score: u8,
    pub breakdown: SeverityBreakdown,
}

/// Score a dashboard's full issue set.
pub fn score<'a>(
    dashboard_id: &str,
    issues: impl IntoIterator<Item = &'a Issue>,
    config: &ScoringConfig,
) -> DqScore {
    let breakdown = SeverityBreakdown::from_issues(issues);
    let w = &config.weights;
    let penalty = (breakdown.critical as u64) * u64::from(w.critical)
        + (breakdown.major as u64) * u64::from(w.major)
        + (breakdown.minor as u64) * u64::from(w.minor);

    let ceiling = u64::from(config.ceiling);
    let floor = u64::from(config.floor);
    let raw = ceiling.saturating_sub(penalty).clamp(floor, ceiling);

    DqScore {
        dashboard_id: dashboard_id.to_string(),
        // raw <= ceiling <= u8::MAX
        score: raw as u8,
        breakdown,
    }
}
