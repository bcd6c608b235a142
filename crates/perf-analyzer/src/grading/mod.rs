//! Weighted category scoring and the overall grade

pub mod advice;

use perf_types::{CategoryScore, Direction, MetricValue};

use crate::config::ThresholdsConfig;
use crate::stats::score_metric;

pub use advice::{build_roadmap, recommend, ROADMAP_TARGET_SCORE};

pub const PERFORMANCE: &str = "performance";
pub const RELIABILITY: &str = "reliability";
pub const USER_EXPERIENCE: &str = "user_experience";
pub const SCALABILITY: &str = "scalability";

const PERFORMANCE_WEIGHT: f64 = 30.0;
const RELIABILITY_WEIGHT: f64 = 25.0;
const USER_EXPERIENCE_WEIGHT: f64 = 25.0;
const SCALABILITY_WEIGHT: f64 = 20.0;

/// Run-level values the backend categories are scored from
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BackendMetrics {
    /// Milliseconds
    pub avg_response_time: f64,
    /// Milliseconds
    pub p95_response_time: f64,
    /// Percent
    pub error_rate: f64,
    /// Percent of samples under the SLA threshold
    pub sla_compliance: f64,
    /// Requests per second
    pub throughput: f64,
}

pub(crate) fn metric(name: &str, value: f64, target: f64, direction: Direction) -> MetricValue {
    MetricValue {
        name: name.to_string(),
        value,
        score: score_metric(value, target, direction),
    }
}

/// Category whose score is the mean of its metric scores
pub(crate) fn category(
    name: &str,
    weight: f64,
    metrics: Vec<MetricValue>,
    reason: String,
) -> CategoryScore {
    let score = if metrics.is_empty() {
        0.0
    } else {
        metrics.iter().map(|m| m.score).sum::<f64>() / metrics.len() as f64
    };
    CategoryScore {
        name: name.to_string(),
        weight,
        score,
        metrics,
        reason,
    }
}

/// Score the four backend categories against the configured targets.
pub fn score_categories(metrics: &BackendMetrics, targets: &ThresholdsConfig) -> Vec<CategoryScore> {
    let availability = (100.0 - metrics.error_rate).max(0.0);

    vec![
        category(
            PERFORMANCE,
            PERFORMANCE_WEIGHT,
            vec![
                metric(
                    "avg_response_time",
                    metrics.avg_response_time,
                    targets.response_time_target_ms,
                    Direction::LowerIsBetter,
                ),
                metric(
                    "p95_response_time",
                    metrics.p95_response_time,
                    targets.p95_target_ms,
                    Direction::LowerIsBetter,
                ),
            ],
            format!(
                "Average {:.0} ms (target {:.0} ms), p95 {:.0} ms (target {:.0} ms)",
                metrics.avg_response_time,
                targets.response_time_target_ms,
                metrics.p95_response_time,
                targets.p95_target_ms
            ),
        ),
        category(
            RELIABILITY,
            RELIABILITY_WEIGHT,
            vec![
                metric(
                    "availability",
                    availability,
                    targets.availability_target_pct,
                    Direction::HigherIsBetter,
                ),
                metric(
                    "error_rate",
                    metrics.error_rate,
                    targets.error_rate_target_pct,
                    Direction::LowerIsBetter,
                ),
            ],
            format!(
                "Availability {:.2}% (target {}%), error rate {:.2}% (target {}%)",
                availability, targets.availability_target_pct, metrics.error_rate,
                targets.error_rate_target_pct
            ),
        ),
        category(
            USER_EXPERIENCE,
            USER_EXPERIENCE_WEIGHT,
            vec![metric(
                "sla_compliance",
                metrics.sla_compliance,
                targets.sla_target_pct,
                Direction::HigherIsBetter,
            )],
            format!(
                "{:.1}% of requests under {:.0} ms (target {}%)",
                metrics.sla_compliance, targets.sla_threshold_ms, targets.sla_target_pct
            ),
        ),
        category(
            SCALABILITY,
            SCALABILITY_WEIGHT,
            vec![metric(
                "throughput",
                metrics.throughput,
                targets.throughput_target,
                Direction::HigherIsBetter,
            )],
            format!(
                "{:.1} req/s (target {:.0} req/s)",
                metrics.throughput, targets.throughput_target
            ),
        ),
    ]
}

/// Weighted sum of category scores; weights are percentages summing to 100
pub fn overall_score(categories: &[CategoryScore]) -> f64 {
    let total_weight: f64 = categories.iter().map(|c| c.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    categories.iter().map(|c| c.weight * c.score).sum::<f64>() / total_weight
}
