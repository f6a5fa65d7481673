//! Report assembly: collect issues, compute score, enrich, finalize.
//!
//! [`Evaluation`] holds the detection output of one dashboard. The
//! [`ReportBuilder`] enriches each issue through an [`Annotator`] and
//! produces the read-only [`Report`] handed to delivery channels.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use guardian_compute::{score, DqScore};
use guardian_core::{EnrichmentConfig, Issue, ScoringConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::annotate::{fallback_explanation, AnnotateError, Annotator};

/// Explanation source recorded when the annotator could not be used.
pub const FALLBACK_SOURCE: &str = "fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteLevel {
    Warning,
}

/// A non-issue remark about the run, e.g. a metric excluded as invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNote {
    pub level: NoteLevel,
    pub metric_id: Option<String>,
    pub message: String,
}

impl ReportNote {
    pub fn warning(metric_id: Option<String>, message: impl Into<String>) -> Self {
        Self {
            level: NoteLevel::Warning,
            metric_id,
            message: message.into(),
        }
    }
}

/// Detection output for one dashboard, scored, before enrichment.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub dashboard_id: String,
    pub dashboard_name: String,
    /// Metric id → issues in detection order (rules, then anomalies).
    pub issues_by_metric: BTreeMap<String, Vec<Issue>>,
    pub notes: Vec<ReportNote>,
    pub score: DqScore,
}

impl Evaluation {
    /// Score the collected issues. The score covers every metric at once.
    pub fn new(
        dashboard_id: impl Into<String>,
        dashboard_name: impl Into<String>,
        issues_by_metric: BTreeMap<String, Vec<Issue>>,
        notes: Vec<ReportNote>,
        scoring: &ScoringConfig,
    ) -> Self {
        let dashboard_id = dashboard_id.into();
        let score = score(&dashboard_id, issues_by_metric.values().flatten(), scoring);
        Self {
            dashboard_id,
            dashboard_name: dashboard_name.into(),
            issues_by_metric,
            notes,
            score,
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues_by_metric.values().flatten()
    }
}

/// An issue with its explanation attached. Detection fields are untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportIssue {
    #[serde(flatten)]
    pub issue: Issue,
    pub explanation: String,
    /// Annotator name, or `"fallback"` when the template was used after a failure.
    pub explanation_source: String,
}

/// Finalized, read-only bundle of issues and score for one dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    dashboard_id: String,
    dashboard_name: String,
    generated_at: DateTime<Utc>,
    issues_by_metric: BTreeMap<String, Vec<ReportIssue>>,
    score: DqScore,
    notes: Vec<ReportNote>,
}

impl Report {
    pub fn dashboard_id(&self) -> &str {
        &self.dashboard_id
    }

    pub fn dashboard_name(&self) -> &str {
        &self.dashboard_name
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn issues_by_metric(&self) -> &BTreeMap<String, Vec<ReportIssue>> {
        &self.issues_by_metric
    }

    pub fn issues(&self) -> impl Iterator<Item = &ReportIssue> {
        self.issues_by_metric.values().flatten()
    }

    pub fn score(&self) -> &DqScore {
        &self.score
    }

    pub fn notes(&self) -> &[ReportNote] {
        &self.notes
    }

    /// Plain-text digest: header, score line, one line per issue.
    pub fn summary_text(&self) -> String {
        let mut out = String::new();
        let title = if self.dashboard_name.is_empty() {
            self.dashboard_id.as_str()
        } else {
            self.dashboard_name.as_str()
        };
        let _ = writeln!(
            out,
            "Data Quality Report: {} ({})",
            title,
            self.generated_at.format("%Y-%m-%d %H:%M UTC")
        );
        let b = &self.score.breakdown;
        let _ = writeln!(
            out,
            "Score: {}/100 (critical {}, major {}, minor {})",
            self.score.score, b.critical, b.major, b.minor
        );

        if b.total() == 0 {
            let _ = writeln!(out, "All metrics healthy. No data quality issues detected.");
        }
        for ri in self.issues() {
            let issue = &ri.issue;
            let _ = writeln!(
                out,
                "  [{}] {} ({}): {}",
                issue.metric_name(),
                issue.kind().label(),
                issue.severity(),
                issue.message()
            );
            let _ = writeln!(out, "      {}", ri.explanation);
        }
        for note in &self.notes {
            let _ = writeln!(out, "  warning: {}", note.message);
        }
        out
    }
}

/// Turns an [`Evaluation`] into a [`Report`], asking the annotator for an
/// explanation of every issue.
pub struct ReportBuilder<'a> {
    annotator: &'a dyn Annotator,
    timeout: Duration,
    concurrency: usize,
}

impl<'a> ReportBuilder<'a> {
    pub fn new(annotator: &'a dyn Annotator, config: &EnrichmentConfig) -> Self {
        Self {
            annotator,
            timeout: config.timeout(),
            concurrency: config.concurrency.max(1),
        }
    }

    /// One annotator call bounded by the configured timeout.
    async fn annotate(&self, issue: &Issue) -> Result<String, AnnotateError> {
        tokio::time::timeout(self.timeout, self.annotator.explain(issue))
            .await
            .unwrap_or(Err(AnnotateError::Timeout(self.timeout)))
    }

    /// Explanation and its source. Failures, timeouts and blank answers
    /// degrade to the fallback template.
    async fn explain(&self, issue: &Issue) -> (String, String) {
        let source = self.annotator.name();
        match self.annotate(issue).await {
            Ok(text) if !text.trim().is_empty() => (text.trim().to_string(), source.to_string()),
            Ok(_) => {
                warn!(metric_id = issue.metric_id(), annotator = source, "annotator returned empty explanation, using fallback");
                (fallback_explanation(issue), FALLBACK_SOURCE.to_string())
            }
            Err(AnnotateError::Timeout(limit)) => {
                warn!(
                    metric_id = issue.metric_id(),
                    annotator = source,
                    timeout_ms = limit.as_millis() as u64,
                    "annotation timed out, using fallback"
                );
                (fallback_explanation(issue), FALLBACK_SOURCE.to_string())
            }
            Err(e) => {
                warn!(metric_id = issue.metric_id(), annotator = source, error = %e, "annotation failed, using fallback");
                (fallback_explanation(issue), FALLBACK_SOURCE.to_string())
            }
        }
    }

    pub async fn build(&self, evaluation: Evaluation) -> Report {
        let Evaluation {
            dashboard_id,
            dashboard_name,
            issues_by_metric,
            notes,
            score,
        } = evaluation;

        // Explanations come back in issue order regardless of completion order.
        let flat: Vec<&Issue> = issues_by_metric.values().flatten().collect();
        let explanations: Vec<(String, String)> = stream::iter(flat.into_iter().map(|i| self.explain(i)))
            .buffered(self.concurrency)
            .collect()
            .await;
        let mut explanations = explanations.into_iter();

        let issues_by_metric: BTreeMap<String, Vec<ReportIssue>> = issues_by_metric
            .into_iter()
            .map(|(metric_id, issues)| {
                let enriched = issues
                    .into_iter()
                    .map(|issue| {
                        let (explanation, explanation_source) = explanations
                            .next()
                            .unwrap_or_else(|| (fallback_explanation(&issue), FALLBACK_SOURCE.to_string()));
                        ReportIssue {
                            issue,
                            explanation,
                            explanation_source,
                        }
                    })
                    .collect();
                (metric_id, enriched)
            })
            .collect();

        info!(
            dashboard_id = %dashboard_id,
            score = score.score,
            issues = score.breakdown.total(),
            "report finalized"
        );

        Report {
            dashboard_id,
            dashboard_name,
            generated_at: Utc::now(),
            issues_by_metric,
            score,
            notes,
        }
    }
}
