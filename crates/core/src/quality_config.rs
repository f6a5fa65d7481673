//! QualityConfig document: every threshold, window and weight the engine
//! recognizes, with defaults, loaded from YAML and validated up front.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::metric::Bounds;

pub const CONFIG_KIND: &str = "QualityConfig";

// ── YAML-level types ────────────────────────────────────────────────

/// Top-level QualityConfig document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QualityConfigDocument {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: ConfigMetadata,
    #[serde(default)]
    pub spec: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigMetadata {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Full engine configuration. Every field has a documented default.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub rules: RulesConfig,
    pub anomaly: AnomalyConfig,
    pub scoring: ScoringConfig,
    pub enrichment: EnrichmentConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RulesConfig {
    /// Trailing samples (latest included) that must be identical to flag a flatline.
    pub flatline_window: usize,
    pub extreme: ExtremeValueConfig,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            flatline_window: 5,
            extreme: ExtremeValueConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExtremeValueConfig {
    /// Prior samples required before falling back to percentile bounds.
    pub min_samples: usize,
    pub upper_percentile: f64,
    pub lower_percentile: f64,
    /// Bounds applied to every metric without a more specific range.
    pub default_bounds: Option<Bounds>,
    /// Per-metric bounds keyed by metric id.
    pub bounds: BTreeMap<String, Bounds>,
}

impl Default for ExtremeValueConfig {
    fn default() -> Self {
        Self {
            min_samples: 10,
            upper_percentile: 99.0,
            lower_percentile: 1.0,
            default_bounds: None,
            bounds: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AnomalyConfig {
    pub spike: SpikeConfig,
    pub outlier: OutlierConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SpikeConfig {
    /// Prior values (latest excluded) forming the local baseline.
    pub window: usize,
    /// k in `mean ± k·stddev`.
    pub k: f64,
    /// Prior values required before the check runs.
    pub min_history: usize,
}

impl Default for SpikeConfig {
    fn default() -> Self {
        Self {
            window: 10,
            k: 2.0,
            min_history: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct OutlierConfig {
    /// |z| above this is a major outlier.
    pub major_z: f64,
    /// |z| above this is a critical outlier.
    pub critical_z: f64,
    /// Present values (latest included) required before the check runs.
    pub min_history: usize,
}

impl Default for OutlierConfig {
    fn default() -> Self {
        Self {
            major_z: 3.0,
            critical_z: 5.0,
            min_history: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub weights: SeverityWeights,
    pub floor: u8,
    pub ceiling: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: SeverityWeights::default(),
            floor: 0,
            ceiling: 100,
        }
    }
}

/// Points subtracted from the score per issue of each severity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SeverityWeights {
    pub critical: u32,
    pub major: u32,
    pub minor: u32,
}

impl Default for SeverityWeights {
    fn default() -> Self {
        Self {
            critical: 15,
            major: 7,
            minor: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EnrichmentConfig {
    /// Per-issue budget for the external annotator.
    pub timeout_ms: u64,
    /// Annotator calls in flight per dashboard.
    pub concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            concurrency: 4,
        }
    }
}

impl EnrichmentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ── Loading and validation ──────────────────────────────────────────

impl EngineConfig {
    /// Parse a QualityConfig YAML document and validate its spec.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let doc: QualityConfigDocument = serde_yaml::from_str(yaml)?;
        if doc.kind != CONFIG_KIND {
            return Err(ConfigError::Invalid(format!(
                "expected kind '{}', found '{}'",
                CONFIG_KIND, doc.kind
            )));
        }
        doc.spec.validate()?;
        tracing::debug!(id = %doc.metadata.id, "quality config parsed");
        Ok(doc.spec)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&yaml)
    }

    /// Reject thresholds that indicate a deployment mistake.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let rules = &self.rules;
        if rules.flatline_window < 2 {
            errors.push(format!(
                "rules.flatline_window must be at least 2, got {}",
                rules.flatline_window
            ));
        }

        let ext = &rules.extreme;
        if ext.min_samples == 0 {
            errors.push("rules.extreme.min_samples must be at least 1".to_string());
        }
        check_finite(&mut errors, "rules.extreme.upper_percentile", ext.upper_percentile);
        check_finite(&mut errors, "rules.extreme.lower_percentile", ext.lower_percentile);
        if !(0.0..=100.0).contains(&ext.lower_percentile)
            || !(0.0..=100.0).contains(&ext.upper_percentile)
            || ext.lower_percentile >= ext.upper_percentile
        {
            errors.push(format!(
                "rules.extreme percentiles must satisfy 0 <= lower < upper <= 100, got {} / {}",
                ext.lower_percentile, ext.upper_percentile
            ));
        }
        if let Some(b) = &ext.default_bounds {
            check_bounds(&mut errors, "rules.extreme.default_bounds", b);
        }
        for (id, b) in &ext.bounds {
            check_bounds(&mut errors, &format!("rules.extreme.bounds[{}]", id), b);
        }

        let spike = &self.anomaly.spike;
        if spike.window == 0 {
            errors.push("anomaly.spike.window must be at least 1".to_string());
        }
        if spike.min_history == 0 || spike.min_history > spike.window {
            errors.push(format!(
                "anomaly.spike.min_history must be between 1 and window ({}), got {}",
                spike.window, spike.min_history
            ));
        }
        check_finite(&mut errors, "anomaly.spike.k", spike.k);
        if spike.k <= 0.0 {
            errors.push(format!("anomaly.spike.k must be positive, got {}", spike.k));
        }

        let outlier = &self.anomaly.outlier;
        check_finite(&mut errors, "anomaly.outlier.major_z", outlier.major_z);
        check_finite(&mut errors, "anomaly.outlier.critical_z", outlier.critical_z);
        if outlier.major_z <= 0.0 || outlier.critical_z < outlier.major_z {
            errors.push(format!(
                "anomaly.outlier thresholds must satisfy 0 < major_z <= critical_z, got {} / {}",
                outlier.major_z, outlier.critical_z
            ));
        }
        if outlier.min_history < 2 {
            errors.push(format!(
                "anomaly.outlier.min_history must be at least 2, got {}",
                outlier.min_history
            ));
        }

        let scoring = &self.scoring;
        if scoring.ceiling > 100 || scoring.floor > scoring.ceiling {
            errors.push(format!(
                "scoring bounds must satisfy floor <= ceiling <= 100, got {} / {}",
                scoring.floor, scoring.ceiling
            ));
        }

        let enrichment = &self.enrichment;
        if enrichment.timeout_ms == 0 {
            errors.push("enrichment.timeout_ms must be positive".to_string());
        }
        if enrichment.concurrency == 0 {
            errors.push("enrichment.concurrency must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid(errors.join("; ")))
        }
    }
}

fn check_finite(errors: &mut Vec<String>, field: &str, value: f64) {
    if !value.is_finite() {
        errors.push(format!("{} must be finite, got {}", field, value));
    }
}

fn check_bounds(errors: &mut Vec<String>, field: &str, bounds: &Bounds) {
    for v in [bounds.floor, bounds.ceiling].into_iter().flatten() {
        check_finite(errors, field, v);
    }
    if let (Some(floor), Some(ceiling)) = (bounds.floor, bounds.ceiling) {
        if floor > ceiling {
            errors.push(format!(
                "{} floor {} exceeds ceiling {}",
                field, floor, ceiling
            ));
        }
    }
}
