//! Histogram-based multimodality detection

use crate::deadline::Deadline;

const MIN_BINS: usize = 5;
const MAX_BINS: usize = 20;
/// A local maximum only counts when it holds this share of the tallest bin
const PEAK_SHARE: f64 = 0.3;
const DEADLINE_CHECK_INTERVAL: usize = 1024;

pub(crate) fn bin_count(n: usize) -> usize {
    (n / 10).clamp(MIN_BINS, MAX_BINS)
}

/// Bin the samples over `[min, max]`. Returns `None` if the deadline expires.
pub(crate) fn histogram(samples: &[f64], deadline: &Deadline) -> Option<Vec<usize>> {
    let bins = bin_count(samples.len());
    let mut counts = vec![0usize; bins];

    let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
    let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    for (i, &x) in samples.iter().enumerate() {
        if i % DEADLINE_CHECK_INTERVAL == 0 && deadline.expired() {
            return None;
        }
        let index = if range > 0.0 {
            (((x - min) * bins as f64 / range) as usize).min(bins - 1)
        } else {
            0
        };
        counts[index] += 1;
    }

    Some(counts)
}

/// Bins strictly above their left neighbour, at least their right one, and
/// above [`PEAK_SHARE`] of the tallest bin.
pub(crate) fn count_peaks(counts: &[usize]) -> usize {
    let tallest = counts.iter().copied().max().unwrap_or(0);
    let floor = PEAK_SHARE * tallest as f64;

    (0..counts.len())
        .filter(|&i| {
            let left = if i == 0 { 0 } else { counts[i - 1] };
            let right = counts.get(i + 1).copied().unwrap_or(0);
            counts[i] > left && counts[i] >= right && counts[i] as f64 > floor
        })
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_count_bounds() {
        assert_eq!(bin_count(10), 5);
        assert_eq!(bin_count(120), 12);
        assert_eq!(bin_count(10_000), 20);
    }

    #[test]
    fn test_count_peaks() {
        assert_eq!(count_peaks(&[1, 3, 9, 3, 1]), 1);
        assert_eq!(count_peaks(&[9, 1, 0, 1, 9]), 2);
        // A plateau counts once, on its left edge
        assert_eq!(count_peaks(&[1, 9, 9, 9, 1]), 1);
        // Small bumps stay below the 30% floor
        assert_eq!(count_peaks(&[20, 1, 2, 1, 0]), 1);
        assert_eq!(count_peaks(&[]), 0);
    }

    #[test]
    fn test_constant_samples_fill_one_bin() {
        let counts = histogram(&[5.0; 50], &Deadline::unbounded()).unwrap();
        assert_eq!(counts[0], 50);
        assert_eq!(count_peaks(&counts), 1);
    }
}
