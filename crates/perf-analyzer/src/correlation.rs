//! Cross-side correlation rules
//!
//! Five independent rules look at a backend and a frontend comparison
//! together. Each rule that fires contributes a [`RootCause`] with a fixed
//! confidence; the aggregate score sums the confidence weights.

use perf_types::{ComparisonResult, Confidence, CorrelationResult, DeltaSeverity, RootCause};
use tracing::debug;

const BACKEND_RESPONSE_METRICS: [&str; 5] = [
    "avg_response_time",
    "median_response_time",
    "p90_response_time",
    "p95_response_time",
    "p99_response_time",
];
const FRONTEND_DELIVERY_METRICS: [&str; 2] = ["ttfb", "fcp"];
const FRONTEND_RENDERING_METRICS: [&str; 4] = ["lcp", "tbt", "cls", "tti"];

const SCALABILITY_DROP_PCT: f64 = 15.0;
const CONTENTION_REGRESSIONS: u32 = 3;
const MAX_CORRELATION_SCORE: f64 = 100.0;

fn any_regressed(comparison: &ComparisonResult, names: &[&str]) -> bool {
    names
        .iter()
        .any(|name| comparison.regressed(name, DeltaSeverity::Minor))
}

fn cause(
    kind: &str,
    confidence: Confidence,
    description: String,
    recommendation: &str,
) -> RootCause {
    RootCause {
        kind: kind.to_string(),
        confidence,
        description,
        recommendation: recommendation.to_string(),
    }
}

/// Run the correlation rules over a backend and a frontend comparison.
pub fn correlate(backend: &ComparisonResult, frontend: &ComparisonResult) -> CorrelationResult {
    let mut root_causes = Vec::new();

    let backend_slower = any_regressed(backend, &BACKEND_RESPONSE_METRICS);
    let rendering_slower = any_regressed(frontend, &FRONTEND_RENDERING_METRICS);

    if backend_slower && any_regressed(frontend, &FRONTEND_DELIVERY_METRICS) {
        root_causes.push(cause(
            "backend_caused_frontend_impact",
            Confidence::High,
            "Backend response times and frontend first-byte/first-paint timings regressed together".to_string(),
            "Fix the backend regression first; frontend delivery metrics should recover with it",
        ));
    }

    if backend.critical_count == 0 && rendering_slower {
        root_causes.push(cause(
            "frontend_only_rendering_issue",
            Confidence::Medium,
            "Rendering metrics regressed while the backend shows no critical regressions".to_string(),
            "Review recent frontend changes: bundle size, render-blocking resources and layout shifts",
        ));
    }

    if let Some(throughput) = backend.metric("throughput") {
        if throughput.change_pct < -SCALABILITY_DROP_PCT {
            root_causes.push(cause(
                "scalability",
                Confidence::High,
                format!("Throughput dropped {:.1}%", -throughput.change_pct),
                "Run a capacity test and check for new contention on shared resources",
            ));
        }
    }

    if backend.regressed("error_rate", DeltaSeverity::Minor) && backend_slower {
        root_causes.push(cause(
            "error_handling",
            Confidence::Medium,
            "Error rate and response times regressed together, suggesting slow failure paths".to_string(),
            "Check timeouts and retry behavior on failing calls",
        ));
    }

    let severe = |c: &ComparisonResult| c.major_count + c.critical_count;
    if severe(backend) >= CONTENTION_REGRESSIONS && severe(frontend) >= CONTENTION_REGRESSIONS {
        root_causes.push(cause(
            "resource_contention",
            Confidence::Low,
            format!(
                "{} backend and {} frontend metrics regressed significantly",
                severe(backend),
                severe(frontend)
            ),
            "Look for shared infrastructure under pressure: CDN, database or shared hosts",
        ));
    }

    let score = root_causes
        .iter()
        .map(|c| c.confidence.weight())
        .sum::<f64>()
        .min(MAX_CORRELATION_SCORE);

    debug!(root_causes = root_causes.len(), score, "Correlation complete");

    CorrelationResult { root_causes, score }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::compare_metric;
    use perf_types::{Direction, MetricDelta, Side};

    fn comparison(side: Side, metrics: Vec<MetricDelta>) -> ComparisonResult {
        let count = |s: DeltaSeverity| {
            metrics
                .iter()
                .filter(|m| m.is_regression && m.severity == s)
                .count() as u32
        };
        ComparisonResult {
            side,
            critical_count: count(DeltaSeverity::Critical),
            major_count: count(DeltaSeverity::Major),
            minor_count: count(DeltaSeverity::Minor),
            improvement_count: 0,
            health_score: 100.0,
            new_failures: Vec::new(),
            ux_issues: Vec::new(),
            metrics,
        }
    }

    fn slower(name: &str, pct: f64) -> MetricDelta {
        compare_metric(name, 100.0, 100.0 + pct, Direction::LowerIsBetter)
    }

    #[test]
    fn test_no_regressions_no_causes() {
        let backend = comparison(Side::Backend, vec![slower("p95_response_time", 0.0)]);
        let frontend = comparison(Side::Frontend, vec![slower("lcp", 0.0)]);

        let result = correlate(&backend, &frontend);
        assert!(result.root_causes.is_empty());
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_backend_drags_frontend() {
        let backend = comparison(Side::Backend, vec![slower("p95_response_time", 10.0)]);
        let frontend = comparison(Side::Frontend, vec![slower("ttfb", 10.0)]);

        let result = correlate(&backend, &frontend);
        let kinds: Vec<_> = result.root_causes.iter().map(|c| c.kind.as_str()).collect();
        assert_eq!(kinds, vec!["backend_caused_frontend_impact"]);
        assert_eq!(result.score, 30.0);
    }

    #[test]
    fn test_rendering_only() {
        let backend = comparison(Side::Backend, vec![slower("p95_response_time", 0.0)]);
        let frontend = comparison(Side::Frontend, vec![slower("cls", 10.0)]);

        let result = correlate(&backend, &frontend);
        assert_eq!(result.root_causes.len(), 1);
        assert_eq!(result.root_causes[0].kind, "frontend_only_rendering_issue");
        assert_eq!(result.root_causes[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_rules_fire_independently() {
        let backend = comparison(
            Side::Backend,
            vec![
                slower("avg_response_time", 50.0),
                slower("p95_response_time", 50.0),
                slower("error_rate", 50.0),
                compare_metric("throughput", 100.0, 50.0, Direction::HigherIsBetter),
            ],
        );
        let frontend = comparison(
            Side::Frontend,
            vec![slower("ttfb", 50.0), slower("fcp", 50.0), slower("lcp", 50.0)],
        );

        let result = correlate(&backend, &frontend);
        // backend impact 30 + scalability 30 + error handling 20 + contention 10
        assert_eq!(result.root_causes.len(), 4);
        assert_eq!(result.score, 90.0);
    }

    #[test]
    fn test_score_caps_at_100() {
        let backend = comparison(
            Side::Backend,
            vec![
                slower("avg_response_time", 20.0),
                slower("p95_response_time", 20.0),
                compare_metric("error_rate", 1.0, 1.2, Direction::LowerIsBetter),
                compare_metric("throughput", 100.0, 84.0, Direction::HigherIsBetter),
            ],
        );
        let frontend = comparison(
            Side::Frontend,
            vec![slower("ttfb", 20.0), slower("fcp", 20.0), slower("lcp", 20.0)],
        );
        assert_eq!(backend.critical_count, 0);

        let result = correlate(&backend, &frontend);
        assert_eq!(result.root_causes.len(), 5);
        assert_eq!(result.score, 100.0);
    }
}
