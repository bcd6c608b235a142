//! Time-series aggregation
//!
//! Buckets raw records into a fixed number of equal intervals and computes
//! per-interval response time, concurrency, throughput and pass/fail counts.
//! Buckets are emitted in ascending time order; intervals without samples are
//! omitted rather than zero-filled.

use std::collections::BTreeMap;

use perf_types::{LabelAggregate, Record, TimeSeriesBucket};
use tracing::debug;

use crate::config::{TimeSeriesConfig, MAX_CHART_BUCKETS};

const MIN_ANALYSIS_BUCKETS: usize = 20;
const MAX_ANALYSIS_BUCKETS: usize = 100;
/// Target seconds per bucket on the analysis path
const SECONDS_PER_ANALYSIS_BUCKET: f64 = 10.0;

/// How records are bucketed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationMode {
    /// Adaptive bucket count `clamp(duration / 10, 20, 100)`, used for grading
    Analysis { max_records: usize },
    /// Fixed bucket count for charts, never more than 500
    Chart { max_records: usize, buckets: usize },
}

impl AggregationMode {
    pub fn analysis(config: &TimeSeriesConfig) -> Self {
        AggregationMode::Analysis {
            max_records: config.max_records,
        }
    }

    pub fn chart(config: &TimeSeriesConfig) -> Self {
        AggregationMode::Chart {
            max_records: config.chart_max_records,
            buckets: config.chart_buckets,
        }
    }

    fn max_records(&self) -> usize {
        match *self {
            AggregationMode::Analysis { max_records } => max_records,
            AggregationMode::Chart { max_records, .. } => max_records,
        }
        .max(1)
    }

    fn bucket_count(&self, duration_secs: f64) -> usize {
        match *self {
            AggregationMode::Analysis { .. } => ((duration_secs / SECONDS_PER_ANALYSIS_BUCKET)
                as usize)
                .clamp(MIN_ANALYSIS_BUCKETS, MAX_ANALYSIS_BUCKETS),
            AggregationMode::Chart { buckets, .. } => buckets.clamp(1, MAX_CHART_BUCKETS),
        }
    }
}

/// Keep every `n/limit`-th element so at most `limit` remain.
///
/// Deterministic: the same input always yields the same selection.
pub fn downsample<T>(items: &[T], limit: usize) -> Vec<&T> {
    let n = items.len();
    if limit == 0 {
        return Vec::new();
    }
    if n <= limit {
        return items.iter().collect();
    }
    let stride = n as f64 / limit as f64;
    (0..limit)
        .map(|i| &items[((i as f64 * stride) as usize).min(n - 1)])
        .collect()
}

#[derive(Default)]
struct BucketAccumulator {
    response_time_sum: f64,
    concurrency_sum: f64,
    concurrency_samples: u64,
    pass_count: u64,
    fail_count: u64,
    labels: BTreeMap<String, (f64, u64)>,
}

impl BucketAccumulator {
    fn add(&mut self, record: &Record) {
        self.response_time_sum += record.sample_time;
        if let Some(concurrency) = record.concurrency {
            self.concurrency_sum += f64::from(concurrency);
            self.concurrency_samples += 1;
        }
        if record.success {
            self.pass_count += 1;
        } else {
            self.fail_count += 1;
        }
        let label = self.labels.entry(record.label.clone()).or_insert((0.0, 0));
        label.0 += record.sample_time;
        label.1 += 1;
    }

    fn finish(self, time: f64, interval: f64, scale: f64) -> TimeSeriesBucket {
        let count = self.pass_count + self.fail_count;
        let labels = self
            .labels
            .into_iter()
            .map(|(label, (sum, n))| {
                let aggregate = LabelAggregate {
                    avg_response_time: sum / n as f64 / 1000.0,
                    throughput: n as f64 * scale / interval,
                };
                (label, aggregate)
            })
            .collect();

        TimeSeriesBucket {
            time,
            avg_response_time: self.response_time_sum / count as f64 / 1000.0,
            concurrency: if self.concurrency_samples == 0 {
                0.0
            } else {
                self.concurrency_sum / self.concurrency_samples as f64
            },
            throughput: count as f64 * scale / interval,
            pass_count: self.pass_count,
            fail_count: self.fail_count,
            labels,
        }
    }
}

/// Aggregate records into ordered time-series buckets.
///
/// Records may arrive in any order. When more than the mode's record limit are
/// supplied, they are downsampled by a fixed stride over the time-ordered input
/// and throughput is scaled back up to the full record count; pass/fail counts
/// describe the retained records.
///
/// # Examples
///
/// ```
/// use perf_analyzer::timeseries::{aggregate, AggregationMode};
/// use perf_types::Record;
///
/// let records: Vec<Record> = (0..200)
///     .map(|i| Record::new(i * 1000, 250.0, "GET /").with_concurrency(5))
///     .collect();
/// let buckets = aggregate(&records, AggregationMode::Analysis { max_records: 50_000 });
///
/// assert_eq!(buckets.len(), 20);
/// assert_eq!(buckets[0].time, 0.0);
/// assert!(buckets.windows(2).all(|w| w[0].time < w[1].time));
/// ```
pub fn aggregate(records: &[Record], mode: AggregationMode) -> Vec<TimeSeriesBucket> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&Record> = records.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);

    let min_ts = ordered[0].timestamp;
    let max_ts = ordered[ordered.len() - 1].timestamp;
    let duration_secs = (max_ts - min_ts) as f64 / 1000.0;

    let sampled = downsample(&ordered, mode.max_records());
    let scale = ordered.len() as f64 / sampled.len() as f64;

    let (bucket_count, interval) = if duration_secs > 0.0 {
        let count = mode.bucket_count(duration_secs);
        (count, duration_secs / count as f64)
    } else {
        (1, 1.0)
    };

    let mut buckets: BTreeMap<usize, BucketAccumulator> = BTreeMap::new();
    for record in sampled {
        let offset = (record.timestamp - min_ts) as f64 / 1000.0;
        let index = ((offset / interval).floor() as usize).min(bucket_count - 1);
        buckets.entry(index).or_default().add(record);
    }

    debug!(
        records = records.len(),
        bucket_count,
        interval,
        populated = buckets.len(),
        "Aggregated time series"
    );

    buckets
        .into_iter()
        .map(|(index, acc)| acc.finish(index as f64 * interval, interval, scale))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis() -> AggregationMode {
        AggregationMode::Analysis {
            max_records: 50_000,
        }
    }

    #[test]
    fn test_empty_records() {
        assert!(aggregate(&[], analysis()).is_empty());
    }

    #[test]
    fn test_single_timestamp_yields_one_bucket() {
        let records = vec![
            Record::new(5_000, 100.0, "a"),
            Record::new(5_000, 300.0, "a").with_success(false),
        ];
        let buckets = aggregate(&records, analysis());

        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].time, 0.0);
        assert!((buckets[0].avg_response_time - 0.2).abs() < 1e-12);
        assert_eq!(buckets[0].pass_count, 1);
        assert_eq!(buckets[0].fail_count, 1);
    }

    #[test]
    fn test_bucket_count_is_clamped() {
        // 100s run -> 10 buckets requested, clamped up to 20
        let records: Vec<Record> = (0..=100).map(|i| Record::new(i * 1000, 10.0, "a")).collect();
        assert_eq!(aggregate(&records, analysis()).len(), 20);

        // 2000s run -> 200 buckets requested, clamped down to 100
        let records: Vec<Record> = (0..=2000).map(|i| Record::new(i * 1000, 10.0, "a")).collect();
        assert_eq!(aggregate(&records, analysis()).len(), 100);
    }

    #[test]
    fn test_empty_buckets_are_omitted() {
        let mut records: Vec<Record> = (0..10).map(|i| Record::new(i * 1000, 10.0, "a")).collect();
        records.extend((190..=200).map(|i| Record::new(i * 1000, 10.0, "a")));

        let buckets = aggregate(&records, analysis());
        assert!(buckets.len() < 20);
        assert_eq!(buckets[0].time, 0.0);
        assert!(buckets.windows(2).all(|w| w[0].time < w[1].time));
    }

    #[test]
    fn test_unordered_input() {
        let records = vec![
            Record::new(20_000, 10.0, "a"),
            Record::new(0, 10.0, "a"),
            Record::new(10_000, 10.0, "a"),
        ];
        let buckets = aggregate(&records, analysis());
        assert_eq!(buckets[0].time, 0.0);
        assert_eq!(buckets.iter().map(|b| b.sample_count()).sum::<u64>(), 3);
    }

    #[test]
    fn test_throughput_and_concurrency() {
        // 10 req/s for 100s, 20 concurrent users
        let records: Vec<Record> = (0..1000)
            .map(|i| Record::new(i * 100, 500.0, "a").with_concurrency(20))
            .collect();
        let buckets = aggregate(&records, analysis());

        for bucket in &buckets {
            assert!((bucket.throughput - 10.0).abs() < 0.5, "throughput {}", bucket.throughput);
            assert_eq!(bucket.concurrency, 20.0);
            assert!((bucket.avg_response_time - 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_per_label_aggregates() {
        let records = vec![
            Record::new(0, 100.0, "login"),
            Record::new(0, 300.0, "login"),
            Record::new(0, 1000.0, "search"),
        ];
        let buckets = aggregate(&records, analysis());
        let labels = &buckets[0].labels;

        assert!((labels["login"].avg_response_time - 0.2).abs() < 1e-12);
        assert!((labels["search"].avg_response_time - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_chart_mode_downsamples() {
        let records: Vec<Record> = (0..5000).map(|i| Record::new(i * 10, 10.0, "a")).collect();
        let buckets = aggregate(
            &records,
            AggregationMode::Chart {
                max_records: 500,
                buckets: 50,
            },
        );

        assert!(buckets.len() <= 50);
        let kept: u64 = buckets.iter().map(|b| b.sample_count()).sum();
        assert_eq!(kept, 500);
    }

    #[test]
    fn test_downsample_is_deterministic() {
        let items: Vec<u32> = (0..1000).collect();
        let a = downsample(&items, 100);
        let b = downsample(&items, 100);
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
        assert_eq!(*a[0], 0);
        assert_eq!(*a[1], 10);
    }
}
