//! Steady-state period detection

use perf_types::SteadyPeriod;

use super::Series;
use crate::deadline::Deadline;
use crate::stats::{coefficient_of_variation, mean};

const MAX_RESPONSE_TIME_CV: f64 = 0.2;
const MAX_THROUGHPUT_CV: f64 = 0.2;
const MAX_CONCURRENCY_CV: f64 = 0.15;
const MIN_WINDOW: usize = 3;

/// Steady periods and the fraction of buckets they cover
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SteadyScan {
    pub periods: Vec<SteadyPeriod>,
    pub coverage: f64,
}

/// Window size for a series of `n` buckets
pub(crate) fn window_size(n: usize) -> usize {
    MIN_WINDOW.max(n / 5)
}

fn is_steady(series: &Series, start: usize, end: usize) -> bool {
    coefficient_of_variation(&series.response_times[start..end]) < MAX_RESPONSE_TIME_CV
        && coefficient_of_variation(&series.throughputs[start..end]) < MAX_THROUGHPUT_CV
        && coefficient_of_variation(&series.concurrency[start..end]) < MAX_CONCURRENCY_CV
}

/// Slide a window over the series and merge contiguous steady windows.
///
/// Returns `None` when the deadline expires mid-scan.
pub(crate) fn find_steady_periods(series: &Series, deadline: &Deadline) -> Option<SteadyScan> {
    let n = series.len();
    let w = window_size(n);
    if n < w {
        return Some(SteadyScan {
            periods: Vec::new(),
            coverage: 0.0,
        });
    }

    // Inclusive bucket index ranges
    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for start in 0..=n - w {
        if deadline.expired() {
            return None;
        }
        if !is_steady(series, start, start + w) {
            continue;
        }
        let end = start + w - 1;
        match ranges.last_mut() {
            Some(last) if start <= last.1 + 1 => last.1 = end,
            _ => ranges.push((start, end)),
        }
    }

    let covered: usize = ranges.iter().map(|(s, e)| e - s + 1).sum();
    let periods = ranges
        .into_iter()
        .map(|(s, e)| {
            let range = s..e + 1;
            SteadyPeriod {
                start_time: series.times[s],
                end_time: series.times[e],
                duration: series.times[e] - series.times[s],
                avg_response_time: mean(&series.response_times[range.clone()]),
                avg_throughput: mean(&series.throughputs[range.clone()]),
                avg_concurrency: mean(&series.concurrency[range]),
            }
        })
        .collect();

    Some(SteadyScan {
        periods,
        coverage: covered as f64 / n as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(rt: Vec<f64>) -> Series {
        let n = rt.len();
        Series {
            times: (0..n).map(|i| i as f64 * 10.0).collect(),
            response_times: rt,
            throughputs: vec![50.0; n],
            concurrency: vec![10.0; n],
        }
    }

    #[test]
    fn test_window_size() {
        assert_eq!(window_size(5), 3);
        assert_eq!(window_size(20), 4);
        assert_eq!(window_size(100), 20);
    }

    #[test]
    fn test_flat_series_is_fully_steady() {
        let scan = find_steady_periods(&series(vec![0.5; 20]), &Deadline::unbounded()).unwrap();
        assert_eq!(scan.periods.len(), 1);
        assert_eq!(scan.coverage, 1.0);
        assert_eq!(scan.periods[0].start_time, 0.0);
        assert_eq!(scan.periods[0].end_time, 190.0);
    }

    #[test]
    fn test_spike_splits_steady_periods() {
        let mut rt = vec![0.5; 30];
        rt[15] = 5.0;
        let scan = find_steady_periods(&series(rt), &Deadline::unbounded()).unwrap();

        assert_eq!(scan.periods.len(), 2);
        assert!(scan.coverage < 1.0);
        assert!(scan.periods[0].end_time < 150.0);
        assert!(scan.periods[1].start_time > 150.0);
    }

    #[test]
    fn test_expired_deadline() {
        let expired = Deadline::after(std::time::Duration::ZERO);
        assert!(find_steady_periods(&series(vec![0.5; 20]), &expired).is_none());
    }
}
