//! Baseline-vs-current comparison
//!
//! Computes per-metric deltas with severities, detects endpoints that started
//! failing (backend) and pages that crossed Web Vitals thresholds (frontend),
//! and folds everything into a 0-100 health score per side.

use perf_types::{
    AnalysisResult, ComparisonResult, DeltaSeverity, Direction, FrontendAnalysis, MetricDelta,
    NewFailure, PageGrade, PercentileStats, Side,
};
use tracing::{debug, instrument};

const MINOR_CHANGE_PCT: f64 = 5.0;
const MAJOR_CHANGE_PCT: f64 = 15.0;
const CRITICAL_CHANGE_PCT: f64 = 30.0;

const CRITICAL_ERROR_RATE_RISE_PP: f64 = 5.0;
const CRITICAL_THROUGHPUT_DROP_PCT: f64 = 20.0;
const CRITICAL_LCP_RISE_PCT: f64 = 20.0;
const CRITICAL_CLS: f64 = 0.25;
const CRITICAL_TBT_RISE_PCT: f64 = 30.0;
const CRITICAL_SCORE_DROP: f64 = 10.0;

/// Relative error-rate rise that counts as a new failure
const FAILURE_RATE_RISE: f64 = 1.5;

const POOR_LCP_MS: f64 = 4000.0;
const POOR_CLS: f64 = 0.25;
const POOR_TBT_MS: f64 = 600.0;

const CRITICAL_PENALTY: f64 = 20.0;
const MAJOR_PENALTY: f64 = 10.0;
const MINOR_PENALTY: f64 = 5.0;
const NEW_FAILURE_PENALTY: f64 = 25.0;
const UX_ISSUE_PENALTY: f64 = 15.0;
const IMPROVEMENT_BONUS: f64 = 3.0;

/// `(current - baseline) / baseline * 100`; a zero baseline yields 100% for
/// any positive current value and 0% otherwise.
pub fn percent_change(baseline: f64, current: f64) -> f64 {
    if baseline == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - baseline) / baseline * 100.0
    }
}

fn generic_severity(change_pct: f64) -> DeltaSeverity {
    let magnitude = change_pct.abs();
    if magnitude < MINOR_CHANGE_PCT {
        DeltaSeverity::Stable
    } else if magnitude < MAJOR_CHANGE_PCT {
        DeltaSeverity::Minor
    } else if magnitude < CRITICAL_CHANGE_PCT {
        DeltaSeverity::Major
    } else {
        DeltaSeverity::Critical
    }
}

/// Metric-specific escalations that apply to regressions only
fn is_critical_override(name: &str, baseline: f64, current: f64, change_pct: f64) -> bool {
    match name {
        "error_rate" => current - baseline > CRITICAL_ERROR_RATE_RISE_PP,
        "throughput" => change_pct < -CRITICAL_THROUGHPUT_DROP_PCT,
        "lcp" => change_pct > CRITICAL_LCP_RISE_PCT,
        "cls" => current > CRITICAL_CLS,
        "tbt" => change_pct > CRITICAL_TBT_RISE_PCT,
        "overall_score" | "performance_score" => baseline - current > CRITICAL_SCORE_DROP,
        _ => false,
    }
}

/// Delta of one metric between two runs.
pub fn compare_metric(
    name: &str,
    baseline: f64,
    current: f64,
    direction: Direction,
) -> MetricDelta {
    let change_pct = percent_change(baseline, current);
    let is_regression = match direction {
        Direction::LowerIsBetter => change_pct > 0.0,
        Direction::HigherIsBetter => change_pct < 0.0,
    };
    let severity = if is_regression && is_critical_override(name, baseline, current, change_pct) {
        DeltaSeverity::Critical
    } else {
        generic_severity(change_pct)
    };

    MetricDelta {
        name: name.to_string(),
        baseline,
        current,
        change_pct,
        severity,
        is_regression,
        direction,
    }
}

fn health_score(
    metrics: &[MetricDelta],
    new_failures: usize,
    ux_issues: usize,
) -> (u32, u32, u32, u32, f64) {
    let count = |severity: DeltaSeverity| {
        metrics
            .iter()
            .filter(|m| m.is_regression && m.severity == severity)
            .count() as u32
    };
    let critical = count(DeltaSeverity::Critical);
    let major = count(DeltaSeverity::Major);
    let minor = count(DeltaSeverity::Minor);
    let improvements = metrics.iter().filter(|m| m.is_improvement()).count() as u32;

    let score = 100.0
        - CRITICAL_PENALTY * f64::from(critical)
        - MAJOR_PENALTY * f64::from(major)
        - MINOR_PENALTY * f64::from(minor)
        - NEW_FAILURE_PENALTY * new_failures as f64
        - UX_ISSUE_PENALTY * ux_issues as f64
        + IMPROVEMENT_BONUS * f64::from(improvements);

    (critical, major, minor, improvements, score.clamp(0.0, 100.0))
}

fn build_result(
    side: Side,
    metrics: Vec<MetricDelta>,
    new_failures: Vec<NewFailure>,
    ux_issues: Vec<String>,
) -> ComparisonResult {
    let (critical_count, major_count, minor_count, improvement_count, health_score) =
        health_score(&metrics, new_failures.len(), ux_issues.len());

    debug!(
        %side,
        critical_count,
        major_count,
        minor_count,
        improvement_count,
        new_failures = new_failures.len(),
        health_score,
        "Comparison complete"
    );

    ComparisonResult {
        side,
        metrics,
        new_failures,
        ux_issues,
        critical_count,
        major_count,
        minor_count,
        improvement_count,
        health_score,
    }
}

/// Compare two backend runs.
#[instrument(skip(baseline, current))]
pub fn compare_backend(baseline: &AnalysisResult, current: &AnalysisResult) -> ComparisonResult {
    let lower = Direction::LowerIsBetter;
    let higher = Direction::HigherIsBetter;
    let response_time = |name: &str, field: fn(&PercentileStats) -> f64| {
        let value = |r: &AnalysisResult| r.response_time.as_ref().map(field).unwrap_or(0.0);
        compare_metric(name, value(baseline), value(current), lower)
    };

    let metrics = vec![
        response_time("avg_response_time", |s| s.mean),
        response_time("median_response_time", |s| s.median),
        response_time("p90_response_time", |s| s.p90),
        response_time("p95_response_time", |s| s.p95),
        response_time("p99_response_time", |s| s.p99),
        compare_metric("error_rate", baseline.error_rate, current.error_rate, lower),
        compare_metric("throughput", baseline.throughput, current.throughput, higher),
        compare_metric(
            "overall_score",
            baseline.grade.score,
            current.grade.score,
            higher,
        ),
    ];

    build_result(Side::Backend, metrics, find_new_failures(baseline, current), Vec::new())
}

/// Endpoints present in both runs that started failing or fail markedly more
pub fn find_new_failures(baseline: &AnalysisResult, current: &AnalysisResult) -> Vec<NewFailure> {
    current
        .endpoints
        .iter()
        .filter_map(|(label, now)| {
            let before = baseline.endpoints.get(label)?;
            let reason = if before.error_rate == 0.0 && now.error_rate > 0.0 {
                format!("Started failing: error rate 0% -> {:.2}%", now.error_rate)
            } else if before.error_rate > 0.0
                && now.error_rate > FAILURE_RATE_RISE * before.error_rate
            {
                format!(
                    "Error rate rose {:.0}% ({:.2}% -> {:.2}%)",
                    percent_change(before.error_rate, now.error_rate),
                    before.error_rate,
                    now.error_rate
                )
            } else {
                return None;
            };
            Some(NewFailure {
                label: label.clone(),
                baseline_error_rate: before.error_rate,
                current_error_rate: now.error_rate,
                reason,
            })
        })
        .collect()
}

/// Compare two page-speed audits.
#[instrument(skip(baseline, current))]
pub fn compare_frontend(
    baseline: &FrontendAnalysis,
    current: &FrontendAnalysis,
) -> ComparisonResult {
    let lower = Direction::LowerIsBetter;
    let b = &baseline.averages;
    let c = &current.averages;

    let mut metrics = vec![
        compare_metric("fcp", b.fcp, c.fcp, lower),
        compare_metric("lcp", b.lcp, c.lcp, lower),
        compare_metric("speed_index", b.speed_index, c.speed_index, lower),
        compare_metric("tbt", b.tbt, c.tbt, lower),
        compare_metric("cls", b.cls, c.cls, lower),
        compare_metric("tti", b.tti, c.tti, lower),
    ];
    if let (Some(before), Some(now)) = (b.ttfb, c.ttfb) {
        metrics.push(compare_metric("ttfb", before, now, lower));
    }
    metrics.push(compare_metric(
        "performance_score",
        b.performance_score,
        c.performance_score,
        Direction::HigherIsBetter,
    ));
    metrics.push(compare_metric(
        "overall_score",
        baseline.grade.score,
        current.grade.score,
        Direction::HigherIsBetter,
    ));

    let ux_issues = find_ux_issues(baseline, current);
    build_result(Side::Frontend, metrics, Vec::new(), ux_issues)
}

fn page_metric(grade: &PageGrade, name: &str) -> Option<f64> {
    grade
        .categories
        .iter()
        .flat_map(|c| &c.metrics)
        .find(|m| m.name == name)
        .map(|m| m.value)
}

/// Pages present in both audits that newly cross a "poor" Web Vitals threshold
pub fn find_ux_issues(baseline: &FrontendAnalysis, current: &FrontendAnalysis) -> Vec<String> {
    let checks: [(&str, &str, f64, &str); 3] = [
        ("lcp", "LCP", POOR_LCP_MS, " ms"),
        ("cls", "CLS", POOR_CLS, ""),
        ("tbt", "TBT", POOR_TBT_MS, " ms"),
    ];

    let mut issues = Vec::new();
    for now in &current.pages {
        let Some(before) = baseline.pages.iter().find(|p| p.url == now.url) else {
            continue;
        };
        for (metric, label, limit, unit) in checks {
            let (Some(b), Some(c)) = (page_metric(before, metric), page_metric(now, metric)) else {
                continue;
            };
            if c > limit && b <= limit {
                issues.push(format!(
                    "{}: {} now exceeds {}{} ({} -> {})",
                    now.url, label, limit, unit, b, c
                ));
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::analyze_pages;
    use crate::Analyzer;
    use perf_types::{PageMetrics, Record};

    fn backend_run(sample_time: f64, failing: &[&str]) -> AnalysisResult {
        let records: Vec<Record> = (0..200)
            .map(|i| {
                let label = if i % 2 == 0 { "GET /a" } else { "GET /b" };
                let fails = failing.contains(&label) && i % 50 < 2;
                Record::new(i * 100, sample_time, label)
                    .with_concurrency(10)
                    .with_success(!fails)
            })
            .collect();
        Analyzer::new().analyze(&records).unwrap()
    }

    fn page(url: &str, lcp: f64, cls: f64, tbt: f64) -> PageMetrics {
        PageMetrics {
            url: url.to_string(),
            title: String::new(),
            fcp: 1500.0,
            lcp,
            speed_index: 3000.0,
            tbt,
            cls,
            tti: 3500.0,
            performance_score: 85.0,
            ttfb: Some(400.0),
        }
    }

    #[test]
    fn test_percent_change_zero_baseline() {
        assert_eq!(percent_change(0.0, 5.0), 100.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert_eq!(percent_change(200.0, 100.0), -50.0);
    }

    #[test]
    fn test_thirty_percent_slower_is_critical() {
        let delta = compare_metric(
            "avg_response_time",
            1000.0,
            1300.0,
            Direction::LowerIsBetter,
        );
        assert!(delta.is_regression);
        assert_eq!(delta.severity, DeltaSeverity::Critical);
    }

    #[test]
    fn test_generic_bands() {
        let sev = |current| {
            compare_metric("p95", 100.0, current, Direction::LowerIsBetter).severity
        };
        assert_eq!(sev(104.0), DeltaSeverity::Stable);
        assert_eq!(sev(110.0), DeltaSeverity::Minor);
        assert_eq!(sev(120.0), DeltaSeverity::Major);
        assert_eq!(sev(140.0), DeltaSeverity::Critical);
    }

    #[test]
    fn test_overrides_only_escalate_regressions() {
        let drop = compare_metric("throughput", 100.0, 75.0, Direction::HigherIsBetter);
        assert_eq!(drop.severity, DeltaSeverity::Critical);

        let errors = compare_metric("error_rate", 1.0, 7.0, Direction::LowerIsBetter);
        assert_eq!(errors.severity, DeltaSeverity::Critical);

        let score_drop = compare_metric("overall_score", 90.0, 79.0, Direction::HigherIsBetter);
        assert_eq!(score_drop.severity, DeltaSeverity::Critical);

        let cls = compare_metric("cls", 0.24, 0.26, Direction::LowerIsBetter);
        assert_eq!(cls.severity, DeltaSeverity::Critical);

        // Improvement in throughput is never escalated
        let gain = compare_metric("throughput", 100.0, 125.0, Direction::HigherIsBetter);
        assert!(!gain.is_regression);
        assert_eq!(gain.severity, DeltaSeverity::Major);
        assert!(gain.is_improvement());
    }

    #[test]
    fn test_identical_runs_are_healthy() {
        let run = backend_run(200.0, &[]);
        let result = compare_backend(&run, &run);

        assert_eq!(result.side, Side::Backend);
        assert_eq!(result.metrics.len(), 8);
        assert_eq!(result.critical_count + result.major_count + result.minor_count, 0);
        assert!(result.new_failures.is_empty());
        assert_eq!(result.health_score, 100.0);
    }

    #[test]
    fn test_endpoint_that_starts_failing() {
        let baseline = backend_run(200.0, &[]);
        let current = backend_run(200.0, &["GET /b"]);
        let result = compare_backend(&baseline, &current);

        assert_eq!(result.new_failures.len(), 1);
        let failure = &result.new_failures[0];
        assert_eq!(failure.label, "GET /b");
        assert_eq!(failure.baseline_error_rate, 0.0);
        assert!((failure.current_error_rate - 4.0).abs() < 1e-9);
        assert!(result.health_score <= 75.0);
    }

    #[test]
    fn test_health_score_penalties() {
        let metrics = vec![
            compare_metric("a", 100.0, 200.0, Direction::LowerIsBetter),
            compare_metric("b", 100.0, 120.0, Direction::LowerIsBetter),
            compare_metric("c", 100.0, 110.0, Direction::LowerIsBetter),
            compare_metric("d", 100.0, 50.0, Direction::LowerIsBetter),
        ];
        let (critical, major, minor, improvements, score) = health_score(&metrics, 1, 1);
        assert_eq!((critical, major, minor, improvements), (1, 1, 1, 1));
        // 100 - 20 - 10 - 5 - 25 - 15 + 3
        assert_eq!(score, 28.0);
    }

    #[test]
    fn test_frontend_ux_issue_detected() {
        let baseline = analyze_pages(&[
            page("/", 2400.0, 0.05, 150.0),
            page("/x", 2400.0, 0.05, 150.0),
        ])
        .unwrap();
        let current = analyze_pages(&[
            page("/", 4500.0, 0.05, 150.0),
            page("/y", 9000.0, 0.5, 900.0),
        ])
        .unwrap();

        let result = compare_frontend(&baseline, &current);
        assert_eq!(result.side, Side::Frontend);
        assert_eq!(result.ux_issues.len(), 1);
        assert!(result.ux_issues[0].starts_with("/: LCP now exceeds 4000 ms"));
        assert!(result.regressed("lcp", DeltaSeverity::Critical));
        assert!(result.metric("ttfb").is_some());
    }
}
