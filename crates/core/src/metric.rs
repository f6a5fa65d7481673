use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// A single timestamped observation. `None` marks a missing value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: Option<f64>) -> Self {
        Self { timestamp, value }
    }

    /// The value if present and finite. NaN/inf are treated as missing.
    pub fn present(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Inclusive absolute range a metric's current value is expected to stay in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Bounds {
    #[serde(default)]
    pub floor: Option<f64>,
    #[serde(default)]
    pub ceiling: Option<f64>,
}

impl Bounds {
    pub fn new(floor: Option<f64>, ceiling: Option<f64>) -> Self {
        Self { floor, ceiling }
    }

    pub fn between(floor: f64, ceiling: f64) -> Self {
        Self::new(Some(floor), Some(ceiling))
    }
}

/// A measurable time-ordered series extracted from a dashboard.
///
/// Samples must be supplied in chronological order; the engine never
/// re-sorts or deduplicates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metric {
    /// Stable identifier, usually `dashboard/worksheet/field`.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub samples: Vec<Sample>,
    /// Display only.
    #[serde(default)]
    pub unit: Option<String>,
    /// Exempts the metric from the negative-number rule.
    #[serde(default)]
    pub can_be_negative: bool,
    /// Explicit bounds supplied with the metric; overrides configured bounds.
    #[serde(default)]
    pub expected_range: Option<Bounds>,
}

impl Metric {
    pub fn new(id: impl Into<String>, name: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            samples,
            unit: None,
            can_be_negative: false,
            expected_range: None,
        }
    }

    /// Build the stable id from its dashboard, worksheet and field parts.
    pub fn compose_id(dashboard: &str, worksheet: &str, field: &str) -> String {
        format!("{}/{}/{}", dashboard, worksheet, field)
    }

    /// Index and sample of the most recent observation.
    pub fn latest(&self) -> Option<(usize, &Sample)> {
        self.samples.len().checked_sub(1).map(|i| (i, &self.samples[i]))
    }

    /// `(sample index, value)` for every present sample, in order.
    pub fn numeric_values(&self) -> Vec<(usize, f64)> {
        self.samples
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.present().map(|v| (i, v)))
            .collect()
    }

    /// Name for messages; falls back to the id when no label was supplied.
    pub fn label(&self) -> &str {
        if self.name.trim().is_empty() { &self.id } else { &self.name }
    }

    pub fn validate(&self) -> Result<(), MetricError> {
        if self.id.trim().is_empty() {
            return Err(MetricError::MissingId {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}

/// One dashboard's worth of metrics, as handed over by the acquisition layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub metrics: Vec<Metric>,
}

impl Dashboard {
    pub fn new(id: impl Into<String>, name: impl Into<String>, metrics: Vec<Metric>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            metrics,
        }
    }
}

/// Build samples one day apart from plain values.
#[cfg(any(test, feature = "test-utils"))]
pub fn daily_samples(start: DateTime<Utc>, values: &[Option<f64>]) -> Vec<Sample> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Sample::new(start + chrono::Duration::days(i as i64), *v))
        .collect()
}
