//! Descriptive statistics used by the uncertainty analysis.

use crate::types::CorrelationSample;

/// Arithmetic mean, `None` for an empty slice.
///
/// # Example
///
/// ```
/// use det_eval::metrics::correlation::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`), `None` for an empty slice.
///
/// # Example
///
/// ```
/// use det_eval::metrics::correlation::std_dev;
///
/// let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((sd - 2.0).abs() < 1e-12);
/// ```
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Pearson correlation coefficient of the `(x, y)` pairs.
///
/// Undefined, and reported as `None`, when there are fewer than two samples
/// or either coordinate is constant. Defined results are clamped to
/// `[-1, 1]` to absorb rounding.
///
/// # Example
///
/// ```
/// use det_eval::metrics::correlation::pearson_correlation;
/// use det_eval::types::CorrelationSample;
///
/// let samples: Vec<CorrelationSample> = (0..5)
///     .map(|i| CorrelationSample::new(i as f64, 1.0 - 0.1 * i as f64))
///     .collect();
/// let r = pearson_correlation(&samples).unwrap();
/// assert!((r + 1.0).abs() < 1e-9);
/// ```
pub fn pearson_correlation(samples: &[CorrelationSample]) -> Option<f64> {
    let first = samples.first()?;
    if samples.len() < 2
        || samples.iter().all(|s| s.x == first.x)
        || samples.iter().all(|s| s.y == first.y)
    {
        return None;
    }

    let n = samples.len() as f64;
    let mean_x = samples.iter().map(|s| s.x).sum::<f64>() / n;
    let mean_y = samples.iter().map(|s| s.y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for s in samples {
        let dx = s.x - mean_x;
        let dy = s.y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denominator = (var_x * var_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }

    Some((cov / denominator).clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(pairs: &[(f64, f64)]) -> Vec<CorrelationSample> {
        pairs.iter().map(|&(x, y)| CorrelationSample::new(x, y)).collect()
    }

    #[test]
    fn test_std_dev_single_value() {
        assert_eq!(std_dev(&[0.4]), Some(0.0));
        assert_eq!(std_dev(&[]), None);
    }

    #[test]
    fn test_perfect_positive_correlation() {
        let r = pearson_correlation(&samples(&[(1.0, 2.0), (2.0, 4.0), (3.0, 6.0)])).unwrap();
        assert!((r - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_uncorrelated() {
        let r = pearson_correlation(&samples(&[
            (1.0, 1.0),
            (1.0, -1.0),
            (-1.0, 1.0),
            (-1.0, -1.0),
        ]))
        .unwrap();
        assert!(r.abs() < 1e-12);
    }

    #[test]
    fn test_undefined_cases() {
        assert_eq!(pearson_correlation(&[]), None);
        assert_eq!(pearson_correlation(&samples(&[(0.1, 0.5)])), None);
        // Zero variance in y
        assert_eq!(pearson_correlation(&samples(&[(0.1, 0.5), (0.2, 0.5)])), None);
    }

    #[test]
    fn test_constant_coordinate_is_undefined() {
        // The mean of repeated 0.1 is not exactly 0.1
        let flat_y = samples(&[(1.0, 0.1), (2.0, 0.1), (3.0, 0.1)]);
        assert_eq!(pearson_correlation(&flat_y), None);

        let complement = 1.0 - 0.7;
        let flat_uncertainty: Vec<CorrelationSample> = (0..7)
            .map(|i| CorrelationSample::new(0.01 * (i + 1) as f64, complement))
            .collect();
        assert_eq!(pearson_correlation(&flat_uncertainty), None);

        let flat_x = samples(&[(0.3, 1.0), (0.3, 2.0), (0.3, 5.0)]);
        assert_eq!(pearson_correlation(&flat_x), None);
    }
}
