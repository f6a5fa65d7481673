use thiserror::Error;

/// Malformed thresholds or weights. Fatal at engine construction.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A metric that cannot be evaluated. Excluded from its dashboard's report.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("metric '{name}' has no id")]
    MissingId { name: String },

    #[error("duplicate metric id '{0}'")]
    DuplicateId(String),
}

/// A check abstained because the history is shorter than it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientData {
    pub check: &'static str,
    pub required: usize,
    pub available: usize,
}

impl std::fmt::Display for InsufficientData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} needs {} samples, {} available",
            self.check, self.required, self.available
        )
    }
}
