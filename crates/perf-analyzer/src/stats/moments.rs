//! Moment statistics and correlation.
//!
//! All functions are total: empty input or zero variance yields 0 rather than NaN.

/// Arithmetic mean, 0 for an empty slice
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Population standard deviation
pub fn std_dev(samples: &[f64]) -> f64 {
    if samples.len() < 2 {
        return 0.0;
    }
    let mu = mean(samples);
    let variance = samples.iter().map(|&x| (x - mu).powi(2)).sum::<f64>() / samples.len() as f64;
    variance.sqrt()
}

/// Coefficient of variation (std_dev / mean), 0 when the mean is 0
pub fn coefficient_of_variation(samples: &[f64]) -> f64 {
    let mu = mean(samples);
    if mu == 0.0 {
        0.0
    } else {
        std_dev(samples) / mu.abs()
    }
}

/// Mean of the k-th power of the standardized samples, `None` when sigma is 0
fn standardized_moment(samples: &[f64], k: i32) -> Option<f64> {
    let sigma = std_dev(samples);
    if sigma == 0.0 || !sigma.is_finite() {
        return None;
    }
    let mu = mean(samples);
    let sum: f64 = samples.iter().map(|&x| ((x - mu) / sigma).powi(k)).sum();
    Some(sum / samples.len() as f64)
}

/// Fisher-Pearson coefficient of skewness (g1).
///
/// Positive values mean a long right tail: occasional very slow samples.
pub fn skewness(samples: &[f64]) -> f64 {
    standardized_moment(samples, 3).unwrap_or(0.0)
}

/// Excess kurtosis (0 for a normal distribution)
pub fn excess_kurtosis(samples: &[f64]) -> f64 {
    standardized_moment(samples, 4)
        .map(|m4| m4 - 3.0)
        .unwrap_or(0.0)
}

/// Pearson correlation coefficient of two series.
///
/// Uses the common prefix when lengths differ; 0 when either series has no variance.
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let (xs, ys) = (&xs[..n], &ys[..n]);
    let (mx, my) = (mean(xs), mean(ys));

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        cov += (x - mx) * (y - my);
        var_x += (x - mx).powi(2);
        var_y += (y - my).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        0.0
    } else {
        cov / (var_x.sqrt() * var_y.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_std_dev_constant_is_zero() {
        assert_eq!(std_dev(&[3.0, 3.0, 3.0]), 0.0);
    }

    #[test]
    fn test_cv_zero_mean() {
        assert_eq!(coefficient_of_variation(&[0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_skewness_symmetric_is_zero() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!(skewness(&samples).abs() < 1e-12);
    }

    #[test]
    fn test_skewness_right_tail_is_positive() {
        let samples = vec![1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 20.0];
        assert!(skewness(&samples) > 2.0);
    }

    #[test]
    fn test_skewness_zero_sigma() {
        assert_eq!(skewness(&[7.0, 7.0, 7.0]), 0.0);
        assert_eq!(excess_kurtosis(&[7.0, 7.0, 7.0]), 0.0);
    }

    #[test]
    fn test_kurtosis_uniform_is_negative() {
        let samples: Vec<f64> = (0..100).map(f64::from).collect();
        let k = excess_kurtosis(&samples);
        assert!((k - (-1.2)).abs() < 0.01, "kurtosis {}", k);
    }

    #[test]
    fn test_pearson_perfect_correlation() {
        let xs = vec![1.0, 2.0, 3.0, 4.0];
        let ys = vec![10.0, 20.0, 30.0, 40.0];
        assert!((pearson(&xs, &ys) - 1.0).abs() < 1e-12);

        let inverse = vec![40.0, 30.0, 20.0, 10.0];
        assert!((pearson(&xs, &inverse) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pearson_flat_series() {
        assert_eq!(pearson(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]), 0.0);
    }
}
