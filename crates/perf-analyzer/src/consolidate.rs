//! Folding several analyzed runs into one result
//!
//! Counts are summed exactly. Percentiles are combined as a sample-weighted
//! average of each run's percentiles, which approximates (but does not equal)
//! the percentiles of the pooled samples.

use std::collections::BTreeMap;

use perf_types::{
    AnalysisResult, CategoryScore, EndpointStats, Grade, LabelAggregate, MetricValue,
    PercentileStats, TimeSeriesBucket,
};
use tracing::{info, instrument};

use crate::analyzer::percent;
use crate::behavior::BehaviorAnalyzer;
use crate::config::BudgetConfig;
use crate::error::{AnalysisError, Result};
use crate::grading::{build_roadmap, recommend};
use crate::rules::{check_backend_issues, BackendSignals};

/// Consolidate runs with the default analysis budget.
///
/// A single run is returned unchanged.
///
/// # Errors
///
/// Returns [`AnalysisError::NothingToConsolidate`] if `results` is empty.
pub fn consolidate(results: &[AnalysisResult]) -> Result<AnalysisResult> {
    consolidate_with_budget(results, &BudgetConfig::default())
}

#[instrument(skip(results, budget), fields(runs = results.len()))]
pub fn consolidate_with_budget(
    results: &[AnalysisResult],
    budget: &BudgetConfig,
) -> Result<AnalysisResult> {
    let (first, rest) = results
        .split_first()
        .ok_or(AnalysisError::NothingToConsolidate)?;
    if rest.is_empty() {
        return Ok(first.clone());
    }

    let weights: Vec<f64> = results.iter().map(|r| r.total_samples as f64).collect();

    let total_samples: u64 = results.iter().map(|r| r.total_samples).sum();
    let total_errors: u64 = results.iter().map(|r| r.total_errors).sum();
    let error_rate = percent(total_errors, total_samples);
    let duration_secs: f64 = results.iter().map(|r| r.duration_secs).sum();

    let throughput = if results.iter().all(|r| r.duration_secs > 0.0) {
        total_samples as f64 / duration_secs
    } else {
        results.iter().map(|r| r.throughput).sum::<f64>() / results.len() as f64
    };

    let sla_compliance = weighted_mean(results.iter().map(|r| r.sla_compliance), &weights);
    let response_time = merge_stats(results.iter().map(|r| r.response_time.as_ref()));
    let latency = merge_stats(results.iter().map(|r| r.latency.as_ref()));
    let connect_time = merge_stats(results.iter().map(|r| r.connect_time.as_ref()));

    let mut response_codes: BTreeMap<String, u64> = BTreeMap::new();
    for (code, count) in results.iter().flat_map(|r| &r.response_codes) {
        *response_codes.entry(code.clone()).or_insert(0) += count;
    }

    let endpoints = merge_endpoints(results);
    let categories = merge_categories(results, &weights);
    let overall = weighted_mean(results.iter().map(|r| r.grade.score), &weights);
    let grade = Grade::from_score(overall);

    let avg_response_time = response_time.as_ref().map(|s| s.mean).unwrap_or(0.0);
    let issues = check_backend_issues(&BackendSignals {
        error_rate,
        avg_response_time,
        sla_compliance,
        endpoints: &endpoints,
    });

    let time_series = merge_time_series(results);
    let behavior = BehaviorAnalyzer::new(budget.analysis_timeout_ms).analyze(&time_series);

    // Pooled samples are gone, so keep the shape of the largest run
    let distribution = results
        .iter()
        .fold(first, |best, r| {
            if r.total_samples > best.total_samples {
                r
            } else {
                best
            }
        })
        .distribution
        .clone();

    let start_time = results.iter().filter_map(|r| r.start_time.clone()).min();
    let end_time = results.iter().filter_map(|r| r.end_time.clone()).max();
    let run_count = results.iter().map(|r| r.run_count.max(1)).sum();

    info!(
        runs = results.len(),
        total_samples,
        score = grade.score,
        "Consolidated runs"
    );

    Ok(AnalysisResult {
        total_samples,
        total_errors,
        error_rate,
        throughput,
        duration_secs,
        start_time,
        end_time,
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
        run_count,
    })
}

/// Weighted mean, falling back to the plain mean when all weights are zero
fn weighted_mean(values: impl Iterator<Item = f64>, weights: &[f64]) -> f64 {
    let values: Vec<f64> = values.collect();
    if values.is_empty() {
        return 0.0;
    }
    let total: f64 = weights.iter().take(values.len()).sum();
    if total <= 0.0 {
        return values.iter().sum::<f64>() / values.len() as f64;
    }
    values.iter().zip(weights).map(|(v, w)| v * w).sum::<f64>() / total
}

/// Sample-weighted average of each percentile; min and max are exact.
fn merge_stats<'a>(
    stats: impl Iterator<Item = Option<&'a PercentileStats>>,
) -> Option<PercentileStats> {
    let present: Vec<&PercentileStats> = stats.flatten().collect();
    if present.is_empty() {
        return None;
    }

    let weights: Vec<f64> = present.iter().map(|s| s.count as f64).collect();
    let avg = |field: fn(&PercentileStats) -> f64| {
        weighted_mean(present.iter().map(|s| field(s)), &weights)
    };

    Some(PercentileStats {
        mean: avg(|s| s.mean),
        median: avg(|s| s.median),
        p70: avg(|s| s.p70),
        p75: avg(|s| s.p75),
        p80: avg(|s| s.p80),
        p90: avg(|s| s.p90),
        p95: avg(|s| s.p95),
        p99: avg(|s| s.p99),
        min: present.iter().map(|s| s.min).fold(f64::INFINITY, f64::min),
        max: present.iter().map(|s| s.max).fold(f64::NEG_INFINITY, f64::max),
        std_dev: avg(|s| s.std_dev),
        skewness: avg(|s| s.skewness),
        count: present.iter().map(|s| s.count).sum(),
    })
}

fn merge_endpoints(results: &[AnalysisResult]) -> BTreeMap<String, EndpointStats> {
    let mut grouped: BTreeMap<&str, Vec<&EndpointStats>> = BTreeMap::new();
    for endpoint in results.iter().flat_map(|r| r.endpoints.values()) {
        grouped.entry(endpoint.label.as_str()).or_default().push(endpoint);
    }

    grouped
        .into_iter()
        .map(|(label, group)| {
            let count = group.iter().map(|e| e.count).sum();
            let error_count = group.iter().map(|e| e.error_count).sum();
            (
                label.to_string(),
                EndpointStats {
                    label: label.to_string(),
                    count,
                    error_count,
                    error_rate: percent(error_count, count),
                    stats: merge_stats(group.iter().map(|e| e.stats.as_ref())),
                },
            )
        })
        .collect()
}

fn merge_categories(results: &[AnalysisResult], weights: &[f64]) -> Vec<CategoryScore> {
    let runs = results.len();
    results[0]
        .categories
        .iter()
        .map(|template| {
            let matching: Vec<(&CategoryScore, f64)> = results
                .iter()
                .zip(weights)
                .filter_map(|(r, &w)| r.category(&template.name).map(|c| (c, w)))
                .collect();
            let ws: Vec<f64> = matching.iter().map(|(_, w)| *w).collect();

            let metrics = template
                .metrics
                .iter()
                .map(|m| {
                    let values: Vec<(f64, f64, f64)> = matching
                        .iter()
                        .filter_map(|(c, w)| {
                            c.metrics
                                .iter()
                                .find(|x| x.name == m.name)
                                .map(|x| (x.value, x.score, *w))
                        })
                        .collect();
                    let mw: Vec<f64> = values.iter().map(|v| v.2).collect();
                    MetricValue {
                        name: m.name.clone(),
                        value: weighted_mean(values.iter().map(|v| v.0), &mw),
                        score: weighted_mean(values.iter().map(|v| v.1), &mw),
                    }
                })
                .collect();

            CategoryScore {
                name: template.name.clone(),
                weight: template.weight,
                score: weighted_mean(matching.iter().map(|(c, _)| c.score), &ws),
                metrics,
                reason: format!("Sample-weighted across {} runs", runs),
            }
        })
        .collect()
}

#[derive(Default)]
struct MergedBucket {
    response_time_sum: f64,
    concurrency_sum: f64,
    throughput_sum: f64,
    merged: usize,
    pass_count: u64,
    fail_count: u64,
    labels: BTreeMap<String, (f64, f64, usize)>,
}

/// Buckets are keyed by time rounded to the nearest second; collisions average
/// their rates and sum their counts.
fn merge_time_series(results: &[AnalysisResult]) -> Vec<TimeSeriesBucket> {
    let mut merged: BTreeMap<i64, MergedBucket> = BTreeMap::new();
    for bucket in results.iter().flat_map(|r| &r.time_series) {
        let entry = merged.entry(bucket.time.round() as i64).or_default();
        entry.response_time_sum += bucket.avg_response_time;
        entry.concurrency_sum += bucket.concurrency;
        entry.throughput_sum += bucket.throughput;
        entry.merged += 1;
        entry.pass_count += bucket.pass_count;
        entry.fail_count += bucket.fail_count;
        for (label, agg) in &bucket.labels {
            let slot = entry.labels.entry(label.clone()).or_default();
            slot.0 += agg.avg_response_time;
            slot.1 += agg.throughput;
            slot.2 += 1;
        }
    }

    merged
        .into_iter()
        .map(|(time, b)| {
            let n = b.merged as f64;
            TimeSeriesBucket {
                time: time as f64,
                avg_response_time: b.response_time_sum / n,
                concurrency: b.concurrency_sum / n,
                throughput: b.throughput_sum / n,
                pass_count: b.pass_count,
                fail_count: b.fail_count,
                labels: b
                    .labels
                    .into_iter()
                    .map(|(label, (rt, tp, k))| {
                        (
                            label,
                            LabelAggregate {
                                avg_response_time: rt / k as f64,
                                throughput: tp / k as f64,
                            },
                        )
                    })
                    .collect(),
            }
        })
        .collect()
}
