//! Release readiness scoring

use perf_types::{
    ComparisonResult, Confidence, CorrelationResult, DeltaSeverity, ReleaseVerdict, Verdict,
};
use tracing::{info, instrument};

const BACKEND_WEIGHT: f64 = 0.40;
const FRONTEND_WEIGHT: f64 = 0.40;
const RELIABILITY_WEIGHT: f64 = 0.20;

const APPROVED_AT: f64 = 90.0;
const MONITOR_AT: f64 = 75.0;
const APPROVAL_NEEDED_AT: f64 = 60.0;

const BLOCKING_CRITICAL_COUNT: u32 = 3;
const BLOCKING_RELIABILITY: f64 = 40.0;
const NEW_FAILURE_PENALTY: f64 = 20.0;

/// Reliability starts at 100 and loses points for error-rate regressions and new failures
pub fn reliability_score(backend: &ComparisonResult) -> f64 {
    let error_penalty = backend
        .metric("error_rate")
        .filter(|m| m.is_regression)
        .map(|m| match m.severity {
            DeltaSeverity::Critical => 25.0,
            DeltaSeverity::Major => 15.0,
            DeltaSeverity::Minor => 5.0,
            DeltaSeverity::Stable => 0.0,
        })
        .unwrap_or(0.0);

    (100.0 - error_penalty - NEW_FAILURE_PENALTY * backend.new_failures.len() as f64)
        .clamp(0.0, 100.0)
}

fn severity_label(severity: DeltaSeverity) -> &'static str {
    match severity {
        DeltaSeverity::Critical => "critical",
        DeltaSeverity::Major => "major",
        DeltaSeverity::Minor => "minor",
        DeltaSeverity::Stable => "stable",
    }
}

/// Combine both comparisons and their correlation into a release verdict.
#[instrument(skip_all)]
pub fn score_release(
    backend: &ComparisonResult,
    frontend: &ComparisonResult,
    correlation: &CorrelationResult,
) -> ReleaseVerdict {
    let reliability = reliability_score(backend);
    let overall = BACKEND_WEIGHT * backend.health_score
        + FRONTEND_WEIGHT * frontend.health_score
        + RELIABILITY_WEIGHT * reliability;

    let mut blocking_reasons = Vec::new();
    if !backend.new_failures.is_empty() {
        blocking_reasons.push(format!(
            "{} endpoint(s) started failing: {}",
            backend.new_failures.len(),
            backend
                .new_failures
                .iter()
                .map(|f| f.label.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ));
    }
    for side in [backend, frontend] {
        if side.critical_count >= BLOCKING_CRITICAL_COUNT {
            blocking_reasons.push(format!(
                "{} critical {} regressions",
                side.critical_count, side.side
            ));
        }
    }
    if reliability < BLOCKING_RELIABILITY {
        blocking_reasons.push(format!(
            "Reliability score {:.0} is below {:.0}",
            reliability, BLOCKING_RELIABILITY
        ));
    }

    let verdict = if !blocking_reasons.is_empty() {
        Verdict::Blocked
    } else if overall >= APPROVED_AT {
        Verdict::Approved
    } else if overall >= MONITOR_AT {
        Verdict::Monitor
    } else if overall >= APPROVAL_NEEDED_AT {
        Verdict::ApprovalNeeded
    } else {
        Verdict::Blocked
    };

    let mut risk_factors: Vec<String> = [backend, frontend]
        .into_iter()
        .flat_map(|side| {
            side.regressions()
                .filter(|m| m.severity >= DeltaSeverity::Major)
                .map(move |m| {
                    format!(
                        "{} {} regressed {:+.1}% ({})",
                        side.side,
                        m.name,
                        m.change_pct,
                        severity_label(m.severity)
                    )
                })
        })
        .collect();
    risk_factors.extend(
        correlation
            .root_causes
            .iter()
            .filter(|c| c.confidence == Confidence::High)
            .map(|c| c.description.clone()),
    );

    info!(%verdict, score = overall, reliability, "Release scored");

    ReleaseVerdict {
        overall_score: overall,
        backend_score: backend.health_score,
        frontend_score: frontend.health_score,
        reliability_score: reliability,
        verdict,
        risk_factors,
        blocking_reasons,
    }
}
