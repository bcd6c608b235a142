//! Single-run analysis pipeline

use std::collections::BTreeMap;

use chrono::{SecondsFormat, TimeZone, Utc};
use perf_types::{AnalysisResult, EndpointStats, Grade, PercentileStats, Record};
use tracing::{debug, info, instrument};

use crate::behavior::BehaviorAnalyzer;
use crate::config::AnalysisConfig;
use crate::consolidate::consolidate_with_budget;
use crate::deadline::Deadline;
use crate::distribution::analyze_distribution;
use crate::error::{AnalysisError, Result};
use crate::grading::{self, build_roadmap, recommend, BackendMetrics};
use crate::rules::{check_backend_issues, BackendSignals, Signals};
use crate::stats::summarize;
use crate::timeseries::{aggregate, AggregationMode};

/// Grades load-test runs against a configuration.
///
/// # Example
///
/// ```
/// use perf_analyzer::Analyzer;
/// use perf_types::Record;
///
/// let records: Vec<Record> = (0..100)
///     .map(|i| Record::new(i * 100, 250.0, "GET /").with_concurrency(5))
///     .collect();
///
/// let result = Analyzer::new().analyze(&records).unwrap();
/// assert_eq!(result.total_samples, 100);
/// assert_eq!(result.error_rate, 0.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one run.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::EmptyRecordSet`] if `records` is empty.
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn analyze(&self, records: &[Record]) -> Result<AnalysisResult> {
        if records.is_empty() {
            return Err(AnalysisError::EmptyRecordSet);
        }
        let thresholds = &self.config.thresholds;
        let deadline = Deadline::after(self.config.budget.analysis_timeout_ms);

        let total_samples = records.len() as u64;
        let total_errors = records.iter().filter(|r| !r.success).count() as u64;
        let error_rate = percent(total_errors, total_samples);

        let min_ts = records.iter().map(|r| r.timestamp).min().unwrap_or(0);
        let max_ts = records.iter().map(|r| r.timestamp).max().unwrap_or(0);
        let duration_secs = (max_ts - min_ts) as f64 / 1000.0;
        let throughput = if duration_secs > 0.0 {
            total_samples as f64 / duration_secs
        } else {
            0.0
        };

        let sample_times: Vec<f64> = records
            .iter()
            .map(|r| r.sample_time)
            .filter(|t| t.is_finite())
            .collect();
        let within_sla = records
            .iter()
            .filter(|r| r.sample_time < thresholds.sla_threshold_ms)
            .count() as u64;
        let sla_compliance = percent(within_sla, total_samples);

        let response_time = summarize(&sample_times);
        let latency = summarize_optional(records.iter().map(|r| r.latency));
        let connect_time = summarize_optional(records.iter().map(|r| r.connect_time));

        let endpoints = endpoint_stats(records);
        let response_codes = response_code_counts(records);

        let metrics = BackendMetrics {
            avg_response_time: response_time.as_ref().map(|s| s.mean).unwrap_or(0.0),
            p95_response_time: response_time.as_ref().map(|s| s.p95).unwrap_or(0.0),
            error_rate,
            sla_compliance,
            throughput,
        };
        let categories = grading::score_categories(&metrics, thresholds);
        let overall = grading::overall_score(&categories);
        let issues = check_backend_issues(&BackendSignals {
            error_rate,
            avg_response_time: metrics.avg_response_time,
            sla_compliance,
            endpoints: &endpoints,
        });

        let signals = root_cause_signals(response_time.as_ref(), error_rate, throughput, sla_compliance);
        let distribution = analyze_distribution(&sample_times, &signals, &deadline);

        let time_series = aggregate(records, AggregationMode::analysis(&self.config.time_series));
        let behavior = BehaviorAnalyzer::new(self.config.budget.analysis_timeout_ms)
            .analyze_with_deadline(&time_series, &deadline);

        let grade = Grade::from_score(overall);
        info!(
            score = grade.score,
            grade = %grade.letter,
            error_rate,
            throughput,
            "Run analyzed"
        );
        debug!(
            issues = issues.len(),
            endpoints = endpoints.len(),
            buckets = time_series.len(),
            "Analysis details"
        );

        Ok(AnalysisResult {
            total_samples,
            total_errors,
            error_rate,
            throughput,
            duration_secs,
            start_time: format_timestamp(min_ts),
            end_time: format_timestamp(max_ts),
            sla_compliance,
            response_time,
            latency,
            connect_time,
            response_codes,
            endpoints,
            recommendations: recommend(&categories),
            roadmap: build_roadmap(overall, &categories),
            categories,
            grade,
            issues,
            distribution,
            behavior,
            time_series,
            run_count: 1,
        })
    }

    /// Fold several analyzed runs into one, re-running behavior analysis
    /// under this analyzer's budget.
    pub fn consolidate(&self, results: &[AnalysisResult]) -> Result<AnalysisResult> {
        consolidate_with_budget(results, &self.config.budget)
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0
pub(crate) fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// RFC 3339 rendering of a millisecond epoch timestamp
pub(crate) fn format_timestamp(millis: i64) -> Option<String> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
}

fn summarize_optional(values: impl Iterator<Item = Option<f64>>) -> Option<PercentileStats> {
    let present: Vec<f64> = values.flatten().collect();
    summarize(&present)
}

fn endpoint_stats(records: &[Record]) -> BTreeMap<String, EndpointStats> {
    let mut grouped: BTreeMap<&str, Vec<&Record>> = BTreeMap::new();
    for record in records {
        grouped.entry(record.label.as_str()).or_default().push(record);
    }

    grouped
        .into_iter()
        .map(|(label, group)| {
            let count = group.len() as u64;
            let error_count = group.iter().filter(|r| !r.success).count() as u64;
            let times: Vec<f64> = group.iter().map(|r| r.sample_time).collect();
            (
                label.to_string(),
                EndpointStats {
                    label: label.to_string(),
                    count,
                    error_count,
                    error_rate: percent(error_count, count),
                    stats: summarize(&times),
                },
            )
        })
        .collect()
}

fn response_code_counts(records: &[Record]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for code in records.iter().filter_map(|r| r.response_code.as_deref()) {
        *counts.entry(code.to_string()).or_insert(0) += 1;
    }
    counts
}

pub(crate) fn root_cause_signals(
    response_time: Option<&PercentileStats>,
    error_rate: f64,
    throughput: f64,
    sla_compliance: f64,
) -> Signals {
    let stats = response_time.cloned().unwrap_or_default();
    Signals {
        avg: stats.mean,
        p95: stats.p95,
        p99: stats.p99,
        max: stats.max,
        error_rate,
        throughput,
        sla_compliance,
        skewness: stats.skewness,
    }
}
