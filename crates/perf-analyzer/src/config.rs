//! Configuration for the analysis engine
//!
//! Targets, time-series limits and the analysis budget can be tuned through a
//! TOML file. Every field has a default, so an empty document is a valid config.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::AnalysisError;

/// Main configuration structure loaded from TOML files
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Scoring targets and SLA threshold
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    /// Downsampling and bucketing limits
    #[serde(default)]
    pub time_series: TimeSeriesConfig,
    /// Execution budget for the behavior and distribution scans
    #[serde(default)]
    pub budget: BudgetConfig,
}

impl AnalysisConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML is malformed
    /// - A value fails validation
    ///
    /// # Example
    ///
    /// ```no_run
    /// use perf_analyzer::config::AnalysisConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = AnalysisConfig::from_file("analysis.toml")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use perf_analyzer::config::AnalysisConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let toml = r#"
    ///     [thresholds]
    ///     sla_threshold_ms = 1500.0
    /// "#;
    /// let config = AnalysisConfig::from_str(toml)?;
    /// assert_eq!(config.thresholds.sla_threshold_ms, 1500.0);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(s).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject targets and limits the engine cannot divide by.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        let t = &self.thresholds;
        let targets = [
            ("sla_threshold_ms", t.sla_threshold_ms),
            ("response_time_target_ms", t.response_time_target_ms),
            ("p95_target_ms", t.p95_target_ms),
            ("availability_target_pct", t.availability_target_pct),
            ("error_rate_target_pct", t.error_rate_target_pct),
            ("sla_target_pct", t.sla_target_pct),
            ("throughput_target", t.throughput_target),
        ];
        for (name, value) in targets {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisError::InvalidConfig(format!(
                    "thresholds.{} must be a positive number (found {})",
                    name, value
                )));
            }
        }

        let ts = &self.time_series;
        if ts.max_records == 0 || ts.chart_max_records == 0 || ts.chart_buckets == 0 {
            return Err(AnalysisError::InvalidConfig(
                "time_series limits must be greater than zero".to_string(),
            ));
        }
        if ts.chart_buckets > MAX_CHART_BUCKETS {
            return Err(AnalysisError::InvalidConfig(format!(
                "time_series.chart_buckets must not exceed {} (found {})",
                MAX_CHART_BUCKETS, ts.chart_buckets
            )));
        }
        Ok(())
    }
}

/// Upper bound on buckets for the chart path and the behavior analyzer input
pub const MAX_CHART_BUCKETS: usize = 500;

/// Scoring targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Samples faster than this count towards SLA compliance (default: 2000ms)
    #[serde(default = "default_sla_threshold_ms")]
    pub sla_threshold_ms: f64,
    /// Average response time target (default: 1000ms)
    #[serde(default = "default_response_time_target_ms")]
    pub response_time_target_ms: f64,
    /// 95th percentile target (default: 2000ms)
    #[serde(default = "default_p95_target_ms")]
    pub p95_target_ms: f64,
    /// Availability target in percent (default: 99.9)
    #[serde(default = "default_availability_target_pct")]
    pub availability_target_pct: f64,
    /// Error rate target in percent (default: 1.0)
    #[serde(default = "default_error_rate_target_pct")]
    pub error_rate_target_pct: f64,
    /// SLA compliance target in percent (default: 95.0)
    #[serde(default = "default_sla_target_pct")]
    pub sla_target_pct: f64,
    /// Throughput target in requests per second (default: 100)
    #[serde(default = "default_throughput_target")]
    pub throughput_target: f64,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            sla_threshold_ms: default_sla_threshold_ms(),
            response_time_target_ms: default_response_time_target_ms(),
            p95_target_ms: default_p95_target_ms(),
            availability_target_pct: default_availability_target_pct(),
            error_rate_target_pct: default_error_rate_target_pct(),
            sla_target_pct: default_sla_target_pct(),
            throughput_target: default_throughput_target(),
        }
    }
}

fn default_sla_threshold_ms() -> f64 {
    2000.0
}

fn default_response_time_target_ms() -> f64 {
    1000.0
}

fn default_p95_target_ms() -> f64 {
    2000.0
}

fn default_availability_target_pct() -> f64 {
    99.9
}

fn default_error_rate_target_pct() -> f64 {
    1.0
}

fn default_sla_target_pct() -> f64 {
    95.0
}

fn default_throughput_target() -> f64 {
    100.0
}

/// Downsampling and bucketing limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesConfig {
    /// Records kept for the analysis path before stride downsampling (default: 50000)
    #[serde(default = "default_max_records")]
    pub max_records: usize,
    /// Records kept for the chart path (default: 500)
    #[serde(default = "default_chart_max_records")]
    pub chart_max_records: usize,
    /// Fixed bucket count for the chart path (default: 500)
    #[serde(default = "default_chart_buckets")]
    pub chart_buckets: usize,
}

impl Default for TimeSeriesConfig {
    fn default() -> Self {
        Self {
            max_records: default_max_records(),
            chart_max_records: default_chart_max_records(),
            chart_buckets: default_chart_buckets(),
        }
    }
}

fn default_max_records() -> usize {
    50_000
}

fn default_chart_max_records() -> usize {
    500
}

fn default_chart_buckets() -> usize {
    MAX_CHART_BUCKETS
}

/// Execution budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Wall-clock budget for the behavior and distribution scans
    #[serde(default = "default_analysis_timeout", with = "duration_ms")]
    pub analysis_timeout_ms: Duration,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            analysis_timeout_ms: default_analysis_timeout(),
        }
    }
}

fn default_analysis_timeout() -> Duration {
    Duration::from_secs(20)
}

/// Serde module for serializing/deserializing Duration as milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
