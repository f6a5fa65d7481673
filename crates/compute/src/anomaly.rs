//! Anomaly detection across a metric's full history.
//!
//! Two independent checks, both anchored on the latest present value:
//! - spike/drop: break from the trailing window (latest excluded)
//! - outlier: z-score against the whole history (latest included)
//!
//! A value may trigger one, both or neither; findings are never merged.

use guardian_core::{
    AnomalyConfig, Evidence, InsufficientData, Issue, IssueKind, Metric, OutlierConfig, Severity,
    SpikeConfig, Verdict,
};

use tracing::debug;

use crate::stats::population_stats;

pub const SPIKE_CHECK: &str = "spike_drop";
pub const OUTLIER_CHECK: &str = "outlier";

/// Latest sample index and value, if the latest sample is present.
fn latest_present(metric: &Metric) -> Option<(usize, f64)> {
    metric
        .latest()
        .and_then(|(i, s)| s.present().map(|v| (i, v)))
}

/// Compare the latest value with `mean ± k·stddev` of the preceding window.
///
/// With zero stddev any change counts: above the mean is a spike, below is a drop.
pub fn check_spike_drop(metric: &Metric, config: &SpikeConfig) -> Verdict {
    let values = metric.numeric_values();
    let Some((index, latest)) = latest_present(metric) else {
        return Verdict::Pass;
    };

    let prior: Vec<f64> = values
        .iter()
        .filter(|(i, _)| *i < index)
        .map(|(_, v)| *v)
        .collect();
    let prior = &prior[prior.len().saturating_sub(config.window)..];
    if prior.len() < config.min_history {
        return Verdict::Abstain(InsufficientData {
            check: SPIKE_CHECK,
            required: config.min_history,
            available: prior.len(),
        });
    }
    let Some(stats) = population_stats(prior) else {
        return Verdict::Pass;
    };

    let band = config.k * stats.stddev;
    let (kind, threshold) = if latest > stats.mean + band {
        (IssueKind::Spike, stats.mean + band)
    } else if latest < stats.mean - band {
        (IssueKind::Drop, stats.mean - band)
    } else {
        return Verdict::Pass;
    };

    let verb = if kind == IssueKind::Spike { "jumped to" } else { "fell to" };
    let message = if stats.stddev > 0.0 {
        format!(
            "{} {} {} beyond {:.2} (mean {:.2} ± {}·stddev {:.2} of the previous {} samples)",
            metric.label(),
            verb,
            latest,
            threshold,
            stats.mean,
            config.k,
            stats.stddev,
            prior.len()
        )
    } else {
        format!(
            "{} {} {} after {} identical samples at {:.2}",
            metric.label(),
            verb,
            latest,
            prior.len(),
            stats.mean
        )
    };

    Verdict::Fail(Issue::new(
        metric.id.clone(),
        metric.label(),
        kind,
        Severity::Major,
        message,
        Evidence::at(index, Some(latest))
            .with_signal("mean", stats.mean)
            .with_signal("stddev", stats.stddev)
            .with_signal("k", config.k)
            .with_signal("threshold", threshold)
            .with_signal("window", prior.len() as f64),
    ))
}

/// z-score of the latest value against the entire present history.
pub fn check_outlier(metric: &Metric, config: &OutlierConfig) -> Verdict {
    let Some((index, latest)) = latest_present(metric) else {
        return Verdict::Pass;
    };
    let values: Vec<f64> = metric.numeric_values().into_iter().map(|(_, v)| v).collect();
    if values.len() < config.min_history {
        return Verdict::Abstain(InsufficientData {
            check: OUTLIER_CHECK,
            required: config.min_history,
            available: values.len(),
        });
    }
    let Some(stats) = population_stats(&values) else {
        return Verdict::Pass;
    };
    let Some(z) = stats.z_score(latest) else {
        return Verdict::Pass;
    };
    if z.abs() <= config.major_z {
        return Verdict::Pass;
    }

    let severity = if z.abs() > config.critical_z {
        Severity::Critical
    } else {
        Severity::Major
    };
    let threshold = if severity == Severity::Critical {
        config.critical_z
    } else {
        config.major_z
    };

    Verdict::Fail(Issue::new(
        metric.id.clone(),
        metric.label(),
        IssueKind::Outlier,
        severity,
        format!(
            "{} latest value {} is {:.2} standard deviations from its mean {:.2} (stddev {:.2}, |z| > {})",
            metric.label(),
            latest,
            z,
            stats.mean,
            stats.stddev,
            threshold
        ),
        Evidence::at(index, Some(latest))
            .with_signal("mean", stats.mean)
            .with_signal("stddev", stats.stddev)
            .with_signal("z", z)
            .with_signal("threshold", threshold)
            .with_signal("samples", stats.count as f64),
    ))
}

/// Runs spike/drop then outlier against a metric.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnomalyConfig {
        &self.config
    }

    pub fn verdicts(&self, metric: &Metric) -> [Verdict; 2] {
        [
            check_spike_drop(metric, &self.config.spike),
            check_outlier(metric, &self.config.outlier),
        ]
    }

    pub fn detect(&self, metric: &Metric) -> Vec<Issue> {
        let issues: Vec<Issue> = self
            .verdicts(metric)
            .into_iter()
            .filter_map(|v| v.record(&metric.id))
            .collect();
        debug!(metric_id = %metric.id, anomalies = issues.len(), "anomaly checks done");
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use guardian_core::daily_samples;

    fn metric(values: &[Option<f64>]) -> Metric {
        let start = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        Metric::new("sales/kpis/revenue", "Revenue", daily_samples(start, values))
    }

    fn series(values: &[f64]) -> Metric {
        let opts: Vec<Option<f64>> = values.iter().map(|v| Some(*v)).collect();
        metric(&opts)
    }

    #[test]
    fn constant_history_no_spike_no_outlier() {
        let m = series(&[10.0, 10.0, 10.0, 10.0, 10.0]);
        assert!(AnomalyDetector::default().detect(&m).is_empty());
    }

    #[test]
    fn change_after_identical_values_is_spike() {
        let m = series(&[10.0, 10.0, 10.0, 10.0, 100.0]);
        let issues = AnomalyDetector::default().detect(&m);
        assert_eq!(issues.len(), 1);
        let spike = &issues[0];
        assert_eq!(spike.kind(), IssueKind::Spike);
        assert_eq!(spike.severity(), Severity::Major);
        assert_eq!(spike.evidence().signal("mean"), Some(10.0));
        assert_eq!(spike.evidence().signal("stddev"), Some(0.0));
        assert_eq!(spike.evidence().index, Some(4));
    }

    #[test]
    fn small_decrease_after_identical_values_is_drop() {
        let m = series(&[10.0, 10.0, 10.0, 9.5]);
        let v = check_spike_drop(&m, &SpikeConfig::default());
        assert_eq!(v.issue().unwrap().kind(), IssueKind::Drop);
    }

    #[test]
    fn k_sigma_band_for_drop() {
        // prior: mean 100, stddev 10
        let m = series(&[90.0, 110.0, 90.0, 110.0, 70.0]);
        let v = check_spike_drop(&m, &SpikeConfig::default());
        let issue = v.issue().unwrap();
        assert_eq!(issue.kind(), IssueKind::Drop);
        assert_eq!(issue.evidence().signal("threshold"), Some(80.0));

        let m = series(&[90.0, 110.0, 90.0, 110.0, 85.0]);
        assert_eq!(check_spike_drop(&m, &SpikeConfig::default()), Verdict::Pass);
    }

    #[test]
    fn window_excludes_older_values() {
        let config = SpikeConfig {
            window: 3,
            k: 2.0,
            min_history: 3,
        };
        // only [50, 50, 50] is in the window, so 51 is a change
        let m = series(&[1.0, 99.0, 50.0, 50.0, 50.0, 51.0]);
        let issue = check_spike_drop(&m, &config);
        assert_eq!(issue.issue().unwrap().evidence().signal("window"), Some(3.0));
    }

    #[test]
    fn spike_needs_min_history() {
        let m = series(&[10.0, 100.0]);
        let v = check_spike_drop(&m, &SpikeConfig::default());
        assert_eq!(
            v,
            Verdict::Abstain(InsufficientData {
                check: SPIKE_CHECK,
                required: 3,
                available: 1,
            })
        );
    }

    #[test]
    fn single_sample_abstains_everywhere() {
        let m = series(&[42.0]);
        let detector = AnomalyDetector::default();
        assert!(detector.verdicts(&m).iter().all(|v| v.is_abstain()));
    }

    #[test]
    fn missing_values_are_skipped() {
        let m = metric(&[Some(10.0), None, Some(10.0), Some(10.0), None, Some(30.0)]);
        let v = check_spike_drop(&m, &SpikeConfig::default());
        assert_eq!(v.issue().unwrap().evidence().index, Some(5));
    }

    #[test]
    fn missing_latest_passes() {
        let m = metric(&[Some(10.0), Some(10.0), Some(10.0), None]);
        let detector = AnomalyDetector::default();
        assert!(detector.verdicts(&m).iter().all(|v| *v == Verdict::Pass));
    }

    #[test]
    fn outlier_major_and_critical() {
        // 24 zeros then 1: mean 0.04, stddev 0.196, z = 4.9
        let mut values = vec![0.0; 24];
        values.push(1.0);
        let v = check_outlier(&series(&values), &OutlierConfig::default());
        assert_eq!(v.issue().unwrap().severity(), Severity::Major);

        // 99 zeros then 1: z = 9.95
        let mut values = vec![0.0; 99];
        values.push(1.0);
        let v = check_outlier(&series(&values), &OutlierConfig::default());
        let issue = v.issue().unwrap();
        assert_eq!(issue.severity(), Severity::Critical);
        assert!(issue.evidence().signal("z").unwrap() > 5.0);
    }

    #[test]
    fn negative_z_outlier() {
        let mut values = vec![100.0; 99];
        values.push(0.0);
        let v = check_outlier(&series(&values), &OutlierConfig::default());
        assert!(v.issue().unwrap().evidence().signal("z").unwrap() < -5.0);
    }

    #[test]
    fn flat_fractional_history_with_narrow_band_passes() {
        let spike = SpikeConfig {
            window: 10,
            k: 0.5,
            min_history: 3,
        };
        let outlier = OutlierConfig {
            major_z: 0.5,
            critical_z: 1.0,
            min_history: 3,
        };
        let detector = AnomalyDetector::new(AnomalyConfig { spike, outlier });
        for &x in &[0.113, 0.423, 0.7, 2.2, 1234.567] {
            for n in 4..=11 {
                let m = series(&vec![x; n]);
                assert!(detector.detect(&m).is_empty(), "flat {x} x{n} flagged");
            }
        }
    }

    #[test]
    fn zero_variance_history_has_no_outlier() {
        let v = check_outlier(&series(&[3.0, 3.0, 3.0, 3.0]), &OutlierConfig::default());
        assert_eq!(v, Verdict::Pass);
    }
}
