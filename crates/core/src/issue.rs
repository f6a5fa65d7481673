use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Minor => write!(f, "minor"),
            Severity::Major => write!(f, "major"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// Every defect the rule engine and anomaly detector can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NullOrZero,
    Negative,
    Flatline,
    ExtremeValue,
    Spike,
    Drop,
    Outlier,
}

impl IssueKind {
    pub fn label(&self) -> &'static str {
        match self {
            IssueKind::NullOrZero => "Null / zero value",
            IssueKind::Negative => "Negative value",
            IssueKind::Flatline => "No variation",
            IssueKind::ExtremeValue => "Extreme value",
            IssueKind::Spike => "Sudden spike",
            IssueKind::Drop => "Sudden drop",
            IssueKind::Outlier => "Outlier",
        }
    }
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            IssueKind::NullOrZero => "null_or_zero",
            IssueKind::Negative => "negative",
            IssueKind::Flatline => "flatline",
            IssueKind::ExtremeValue => "extreme_value",
            IssueKind::Spike => "spike",
            IssueKind::Drop => "drop",
            IssueKind::Outlier => "outlier",
        };
        f.write_str(s)
    }
}

/// What triggered a finding, kept so the finding can be reproduced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Index into the metric's samples of the triggering observation.
    pub index: Option<usize>,
    /// Observed value at `index` (`None` when the sample was missing).
    pub value: Option<f64>,
    /// Supporting numbers (mean, stddev, threshold, ...) in a fixed order.
    pub signals: Vec<(String, f64)>,
}

impl Evidence {
    pub fn at(index: usize, value: Option<f64>) -> Self {
        Self {
            index: Some(index),
            value,
            signals: Vec::new(),
        }
    }

    pub fn with_signal(mut self, name: &str, value: f64) -> Self {
        self.signals.push((name.to_string(), value));
        self
    }

    pub fn signal(&self, name: &str) -> Option<f64> {
        self.signals
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }
}

/// One detected defect on a metric. Built once by a detector; read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    metric_id: String,
    metric_name: String,
    kind: IssueKind,
    severity: Severity,
    message: String,
    evidence: Evidence,
}

impl Issue {
    pub fn new(
        metric_id: impl Into<String>,
        metric_name: impl Into<String>,
        kind: IssueKind,
        severity: Severity,
        message: impl Into<String>,
        evidence: Evidence,
    ) -> Self {
        Self {
            metric_id: metric_id.into(),
            metric_name: metric_name.into(),
            kind,
            severity,
            message: message.into(),
            evidence,
        }
    }

    pub fn metric_id(&self) -> &str {
        &self.metric_id
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }

    pub fn kind(&self) -> IssueKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }
}
