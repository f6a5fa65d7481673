use guardian_core::{Issue, Metric, RulesConfig, Verdict};
use tracing::debug;

use crate::checks::{check_extreme_value, check_flatline, check_negative, check_null_zero};

/// Runs every rule check against a metric in a fixed order:
/// null/zero, negative, flatline, extreme value.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    config: RulesConfig,
}

impl RuleEngine {
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Verdicts for every check, in evaluation order.
    pub fn verdicts(&self, metric: &Metric) -> [Verdict; 4] {
        [
            check_null_zero(metric),
            check_negative(metric),
            check_flatline(metric, self.config.flatline_window),
            check_extreme_value(metric, &self.config.extreme),
        ]
    }

    /// Findings for one metric. Abstentions are logged, not returned.
    pub fn check(&self, metric: &Metric) -> Vec<Issue> {
        let issues: Vec<Issue> = self
            .verdicts(metric)
            .into_iter()
            .filter_map(|v| v.record(&metric.id))
            .collect();
        debug!(metric_id = %metric.id, samples = metric.samples.len(), issues = issues.len(), "rules checked");
        issues
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(RulesConfig::default())
    }
}
