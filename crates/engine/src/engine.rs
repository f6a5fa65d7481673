use std::collections::{BTreeMap, HashSet};

use guardian_compute::AnomalyDetector;
use guardian_core::{ConfigError, Dashboard, EngineConfig, Issue, Metric, MetricError};
use guardian_rules::RuleEngine;
use rayon::prelude::*;
use tracing::{error, info, warn};

use crate::annotate::Annotator;
use crate::report::{Evaluation, Report, ReportBuilder, ReportNote};

/// A dashboard that could not be evaluated at all.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("dashboard '{name}' has no id")]
    InvalidDashboard { name: String },

    #[error("evaluation task failed: {0}")]
    TaskFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardFailure {
    /// Position of the dashboard in the input.
    pub position: usize,
    pub dashboard_name: String,
    pub error: EvaluationError,
}

/// Reports for every dashboard that could be evaluated, plus the ones that couldn't.
#[derive(Debug)]
pub struct RunOutcome {
    pub reports: Vec<Report>,
    pub failures: Vec<DashboardFailure>,
}

/// Evaluation pipeline: rules + anomalies per metric, score per dashboard,
/// optional enrichment, finalized report.
///
/// Holds only read-only configuration, so one engine can serve any number of
/// dashboards concurrently.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    rules: RuleEngine,
    anomalies: AnomalyDetector,
}

impl Engine {
    /// Validate the configuration and build the engine.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            rules: RuleEngine::new(config.rules.clone()),
            anomalies: AnomalyDetector::new(config.anomaly.clone()),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Issues for one metric: rule findings first, then anomalies.
    pub fn evaluate_metric(&self, metric: &Metric) -> Result<Vec<Issue>, MetricError> {
        metric.validate()?;
        let mut issues = self.rules.check(metric);
        issues.extend(self.anomalies.detect(metric));
        Ok(issues)
    }

    /// Evaluate every metric of a dashboard in parallel and score the result.
    ///
    /// Invalid metrics (no id, or an id already used earlier in the
    /// dashboard) are excluded and reported as warning notes.
    pub fn evaluate_dashboard(&self, dashboard: &Dashboard) -> Result<Evaluation, EvaluationError> {
        if dashboard.id.trim().is_empty() {
            return Err(EvaluationError::InvalidDashboard {
                name: dashboard.name.clone(),
            });
        }

        let mut seen = HashSet::new();
        let duplicate: Vec<bool> = dashboard
            .metrics
            .iter()
            .map(|m| !m.id.trim().is_empty() && !seen.insert(m.id.as_str()))
            .collect();

        let results: Vec<Result<Vec<Issue>, MetricError>> = dashboard
            .metrics
            .par_iter()
            .zip(duplicate.par_iter())
            .map(|(metric, &dup)| {
                if dup {
                    Err(MetricError::DuplicateId(metric.id.clone()))
                } else {
                    self.evaluate_metric(metric)
                }
            })
            .collect();

        let mut issues_by_metric = BTreeMap::new();
        let mut notes = Vec::new();
        for (metric, result) in dashboard.metrics.iter().zip(results) {
            match result {
                Ok(issues) => {
                    issues_by_metric.insert(metric.id.clone(), issues);
                }
                Err(e) => {
                    warn!(dashboard_id = %dashboard.id, metric = %metric.label(), error = %e, "metric excluded from report");
                    let metric_id = (!metric.id.trim().is_empty()).then(|| metric.id.clone());
                    notes.push(ReportNote::warning(
                        metric_id,
                        format!("{} excluded: {}", describe(metric), e),
                    ));
                }
            }
        }

        let evaluation = Evaluation::new(
            dashboard.id.clone(),
            dashboard.name.clone(),
            issues_by_metric,
            notes,
            &self.config.scoring,
        );
        info!(
            dashboard_id = %evaluation.dashboard_id,
            metrics = evaluation.issues_by_metric.len(),
            excluded = evaluation.notes.len(),
            issues = evaluation.score.breakdown.total(),
            score = evaluation.score.score,
            "dashboard evaluated"
        );
        Ok(evaluation)
    }

    /// Evaluate, enrich and finalize one dashboard's report.
    ///
    /// Detection runs on the blocking pool; only enrichment runs on the runtime.
    pub async fn report(
        &self,
        dashboard: &Dashboard,
        annotator: &dyn Annotator,
    ) -> Result<Report, EvaluationError> {
        let engine = self.clone();
        let dashboard = dashboard.clone();
        let evaluation = tokio::task::spawn_blocking(move || engine.evaluate_dashboard(&dashboard))
            .await
            .map_err(|e| EvaluationError::TaskFailed(e.to_string()))??;
        Ok(self.builder(annotator).build(evaluation).await)
    }

    /// Evaluate every dashboard independently. One bad dashboard never
    /// prevents the others from being reported.
    pub async fn run(&self, dashboards: &[Dashboard], annotator: &dyn Annotator) -> RunOutcome {
        // Detection is CPU-bound; keep it off the async workers.
        let engine = self.clone();
        let owned = dashboards.to_vec();
        let evaluations: Vec<Result<Evaluation, EvaluationError>> =
            match tokio::task::spawn_blocking(move || {
                owned
                    .par_iter()
                    .map(|d| engine.evaluate_dashboard(d))
                    .collect::<Vec<_>>()
            })
            .await
            {
                Ok(evaluations) => evaluations,
                Err(e) => {
                    error!(error = %e, "evaluation task failed");
                    let reason = e.to_string();
                    dashboards
                        .iter()
                        .map(|_| Err(EvaluationError::TaskFailed(reason.clone())))
                        .collect()
                }
            };

        let builder = self.builder(annotator);
        let mut reports = Vec::with_capacity(evaluations.len());
        let mut failures = Vec::new();
        for (position, (dashboard, result)) in dashboards.iter().zip(evaluations).enumerate() {
            match result {
                Ok(evaluation) => reports.push(builder.build(evaluation).await),
                Err(error) => {
                    warn!(position, error = %error, "dashboard skipped");
                    failures.push(DashboardFailure {
                        position,
                        dashboard_name: dashboard.name.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            reports = reports.len(),
            failures = failures.len(),
            "evaluation run complete"
        );
        RunOutcome { reports, failures }
    }

    fn builder<'a>(&self, annotator: &'a dyn Annotator) -> ReportBuilder<'a> {
        ReportBuilder::new(annotator, &self.config.enrichment)
    }
}

fn describe(metric: &Metric) -> String {
    if metric.label().trim().is_empty() {
        "unnamed metric".to_string()
    } else {
        format!("metric '{}'", metric.label())
    }
}
