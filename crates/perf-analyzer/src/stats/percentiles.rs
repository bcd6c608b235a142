//! Percentile calculations.

use perf_types::PercentileStats;

use super::moments;

/// Calculate percentile value from a slice of f64 samples.
///
/// Uses linear interpolation between nearest ranks.
///
/// # Returns
///
/// * `Some(value)` - The percentile value
/// * `None` - If no sample is finite or p is outside 0..=100
///
/// NaN and infinite samples are ignored.
///
/// # Examples
///
/// ```
/// use perf_analyzer::stats::percentile;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile(&data, 50.0), Some(3.0));
/// ```
pub fn percentile(samples: &[f64], p: f64) -> Option<f64> {
    if !(0.0..=100.0).contains(&p) {
        return None;
    }

    let sorted = sorted_finite(samples);
    if sorted.is_empty() {
        return None;
    }
    Some(interpolate(&sorted, p))
}

fn sorted_finite(samples: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = samples.iter().copied().filter(|x| x.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Median of the samples, 0 when empty
pub fn median(samples: &[f64]) -> f64 {
    percentile(samples, 50.0).unwrap_or(0.0)
}

/// Percentile of an already sorted, non-empty slice
fn interpolate(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }

    let rank = (p / 100.0) * (sorted.len() - 1) as f64;
    let lower_index = rank.floor() as usize;
    let upper_index = rank.ceil() as usize;

    if lower_index == upper_index {
        sorted[lower_index]
    } else {
        let lower_value = sorted[lower_index];
        let upper_value = sorted[upper_index];
        let fraction = rank - lower_index as f64;
        lower_value + fraction * (upper_value - lower_value)
    }
}

/// Compute the full percentile summary in one sort.
///
/// Non-finite samples are skipped. Returns `None` when nothing finite is
/// left ("undefined" statistics).
///
/// # Examples
///
/// ```
/// use perf_analyzer::stats::summarize;
///
/// let data = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0];
/// let summary = summarize(&data).unwrap();
/// assert_eq!(summary.count, 10);
/// assert_eq!(summary.mean, 5.5);
/// assert_eq!(summary.min, 1.0);
/// assert_eq!(summary.max, 10.0);
/// ```
pub fn summarize(samples: &[f64]) -> Option<PercentileStats> {
    let sorted = sorted_finite(samples);
    if sorted.is_empty() {
        return None;
    }

    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    // Summation error can push the mean a hair outside the observed range
    let mean = moments::mean(&sorted).clamp(min, max);

    Some(PercentileStats {
        mean,
        median: interpolate(&sorted, 50.0),
        p70: interpolate(&sorted, 70.0),
        p75: interpolate(&sorted, 75.0),
        p80: interpolate(&sorted, 80.0),
        p90: interpolate(&sorted, 90.0),
        p95: interpolate(&sorted, 95.0),
        p99: interpolate(&sorted, 99.0),
        min,
        max,
        std_dev: moments::std_dev(&sorted),
        skewness: moments::skewness(&sorted),
        count: sorted.len() as u64,
    })
}
