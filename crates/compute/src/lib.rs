//! Statistical checks across a metric's history, and dashboard scoring.
//!
//! - [`stats`]: population mean / stddev
//! - [`anomaly`]: spike/drop and outlier detection
//! - [`scoring`]: severity-weighted 0–100 dashboard score

pub mod anomaly;
pub mod scoring;
pub mod stats;

pub use anomaly::AnomalyDetector;
pub use scoring::{score, DqScore, SeverityBreakdown};
pub use stats::{population_stats, Stats};
