//! Population-level statistics for anomaly detection.
//!
//! Stddev uses the population formula (divide by n), so results match
//! across re-implementations.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub mean: f64,
    pub stddev: f64,
    pub count: usize,
}

impl Stats {
    /// z-score of `value`, or `None` when the population has no variance.
    pub fn z_score(&self, value: f64) -> Option<f64> {
        if self.stddev > 0.0 {
            Some((value - self.mean) / self.stddev)
        } else {
            None
        }
    }
}

/// Mean and population stddev of `values`. `None` for an empty slice.
///
/// A population of identical values yields that value as the mean and a
/// stddev of exactly 0, free of summation rounding.
pub fn population_stats(values: &[f64]) -> Option<Stats> {
    let first = *values.first()?;
    if values.iter().all(|v| *v == first) {
        return Some(Stats {
            mean: first,
            stddev: 0.0,
            count: values.len(),
        });
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(Stats {
        mean,
        stddev: variance.sqrt(),
        count: values.len(),
    })
}
