//! Order statistics for the extreme-value check.

/// Linear-interpolation percentile (`p` in 0..=100) of unsorted values.
///
/// Returns `None` for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_empty() {
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn percentile_endpoints() {
        let v = [3.0, 1.0, 2.0];
        assert_eq!(percentile(&v, 0.0), Some(1.0));
        assert_eq!(percentile(&v, 100.0), Some(3.0));
        assert_eq!(percentile(&v, 50.0), Some(2.0));
    }

    #[test]
    fn percentile_interpolates() {
        let v: Vec<f64> = (1..=11).map(|x| x as f64).collect();
        // rank = 0.99 * 10 = 9.9 -> 10 + 0.9 * (11 - 10)
        let p99 = percentile(&v, 99.0).unwrap();
        assert!((p99 - 10.9).abs() < 1e-10);
    }
}
