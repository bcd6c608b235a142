//! Derived statistics: percentile summaries, time-series buckets and per-endpoint stats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Percentile summary of a set of samples.
///
/// Percentiles are computed with linear interpolation between ranks, so for
/// any non-empty input `min <= p70 <= p75 <= p80 <= p90 <= p95 <= p99 <= max`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileStats {
    pub mean: f64,
    /// 50th percentile
    pub median: f64,
    pub p70: f64,
    pub p75: f64,
    pub p80: f64,
    pub p90: f64,
    pub p95: f64,
    pub p99: f64,
    pub min: f64,
    pub max: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Fisher-Pearson g1, 0 when the standard deviation is 0
    pub skewness: f64,
    pub count: u64,
}

impl PercentileStats {
    /// Coefficient of variation (std_dev / mean), 0 when the mean is 0.
    pub fn coefficient_of_variation(&self) -> f64 {
        if self.mean == 0.0 {
            0.0
        } else {
            self.std_dev / self.mean
        }
    }
}

/// Per-label aggregate inside a time-series bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelAggregate {
    /// Mean response time in seconds
    pub avg_response_time: f64,
    /// Requests per second
    pub throughput: f64,
}

/// One interval of a run's time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesBucket {
    /// Offset from the first sample in seconds
    pub time: f64,
    /// Mean response time in seconds
    pub avg_response_time: f64,
    /// Mean concurrency of the samples in the bucket
    pub concurrency: f64,
    /// Requests per second
    pub throughput: f64,
    pub pass_count: u64,
    pub fail_count: u64,
    #[serde(default)]
    pub labels: BTreeMap<String, LabelAggregate>,
}

impl TimeSeriesBucket {
    pub fn sample_count(&self) -> u64 {
        self.pass_count + self.fail_count
    }
}

/// Statistics for a single endpoint (sampler label)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointStats {
    pub label: String,
    pub count: u64,
    pub error_count: u64,
    /// Error rate in percent
    pub error_rate: f64,
    pub stats: Option<PercentileStats>,
}

impl EndpointStats {
    /// Mean response time in milliseconds, 0 when no stats are available
    pub fn mean_response_time(&self) -> f64 {
        self.stats.as_ref().map(|s| s.mean).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean: f64, std_dev: f64) -> PercentileStats {
        PercentileStats {
            mean,
            median: mean,
            p70: mean,
            p75: mean,
            p80: mean,
            p90: mean,
            p95: mean,
            p99: mean,
            min: mean,
            max: mean,
            std_dev,
            skewness: 0.0,
            count: 10,
        }
    }

    #[test]
    fn test_coefficient_of_variation() {
        assert_eq!(stats(100.0, 25.0).coefficient_of_variation(), 0.25);
    }

    #[test]
    fn test_coefficient_of_variation_zero_mean() {
        assert_eq!(stats(0.0, 3.0).coefficient_of_variation(), 0.0);
    }

    #[test]
    fn test_endpoint_mean_without_stats() {
        let endpoint = EndpointStats {
            label: "GET /".to_string(),
            count: 0,
            error_count: 0,
            error_rate: 0.0,
            stats: None,
        };
        assert_eq!(endpoint.mean_response_time(), 0.0);
    }
}
