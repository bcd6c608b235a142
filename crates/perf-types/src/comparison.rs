//! Baseline-vs-current comparison, correlation and release verdict value objects.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which side of the system a comparison covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Backend,
    Frontend,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Backend => write!(f, "backend"),
            Side::Frontend => write!(f, "frontend"),
        }
    }
}

/// Which way a metric improves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// Magnitude class of a metric change
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaSeverity {
    Stable,
    Minor,
    Major,
    Critical,
}

/// Change of one metric between two runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub name: String,
    pub baseline: f64,
    pub current: f64,
    pub change_pct: f64,
    pub severity: DeltaSeverity,
    pub is_regression: bool,
    pub direction: Direction,
}

impl MetricDelta {
    /// A change in the good direction large enough to leave the stable band
    pub fn is_improvement(&self) -> bool {
        !self.is_regression && self.severity != DeltaSeverity::Stable
    }
}

/// An endpoint that started failing, or fails markedly more often
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFailure {
    pub label: String,
    /// Percent
    pub baseline_error_rate: f64,
    pub current_error_rate: f64,
    pub reason: String,
}

/// Result of comparing a baseline run with a current run on one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub side: Side,
    pub metrics: Vec<MetricDelta>,
    pub new_failures: Vec<NewFailure>,
    /// User-facing threshold crossings (frontend only)
    pub ux_issues: Vec<String>,
    pub critical_count: u32,
    pub major_count: u32,
    pub minor_count: u32,
    pub improvement_count: u32,
    /// 0 - 100
    pub health_score: f64,
}

impl ComparisonResult {
    pub fn metric(&self, name: &str) -> Option<&MetricDelta> {
        self.metrics.iter().find(|m| m.name == name)
    }

    /// Whether the named metric regressed at least at `severity`
    pub fn regressed(&self, name: &str, severity: DeltaSeverity) -> bool {
        self.metric(name)
            .map(|m| m.is_regression && m.severity >= severity)
            .unwrap_or(false)
    }

    pub fn regressions(&self) -> impl Iterator<Item = &MetricDelta> {
        self.metrics.iter().filter(|m| m.is_regression)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// Contribution to the aggregate correlation score
    pub fn weight(&self) -> f64 {
        match self {
            Confidence::High => 30.0,
            Confidence::Medium => 20.0,
            Confidence::Low => 10.0,
        }
    }
}

/// Cross-side hypothesis produced by the correlation rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCause {
    /// Rule identifier, e.g. "backend_caused_frontend_impact"
    pub kind: String,
    pub confidence: Confidence,
    pub description: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    pub root_causes: Vec<RootCause>,
    /// Sum of confidence weights, capped at 100
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Approved,
    Monitor,
    ApprovalNeeded,
    Blocked,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Verdict::Approved => "approved",
            Verdict::Monitor => "monitor",
            Verdict::ApprovalNeeded => "approval_needed",
            Verdict::Blocked => "blocked",
        };
        f.write_str(s)
    }
}

/// Go/no-go classification of a release candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseVerdict {
    pub overall_score: f64,
    pub backend_score: f64,
    pub frontend_score: f64,
    pub reliability_score: f64,
    pub verdict: Verdict,
    pub risk_factors: Vec<String>,
    pub blocking_reasons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(name: &str, severity: DeltaSeverity, is_regression: bool) -> MetricDelta {
        MetricDelta {
            name: name.to_string(),
            baseline: 1.0,
            current: 2.0,
            change_pct: 100.0,
            severity,
            is_regression,
            direction: Direction::LowerIsBetter,
        }
    }

    #[test]
    fn test_improvement_excludes_stable() {
        assert!(delta("p95", DeltaSeverity::Minor, false).is_improvement());
        assert!(!delta("p95", DeltaSeverity::Stable, false).is_improvement());
        assert!(!delta("p95", DeltaSeverity::Major, true).is_improvement());
    }

    #[test]
    fn test_regressed_respects_minimum_severity() {
        let result = ComparisonResult {
            side: Side::Backend,
            metrics: vec![delta("avg_response_time", DeltaSeverity::Major, true)],
            new_failures: vec![],
            ux_issues: vec![],
            critical_count: 0,
            major_count: 1,
            minor_count: 0,
            improvement_count: 0,
            health_score: 90.0,
        };

        assert!(result.regressed("avg_response_time", DeltaSeverity::Minor));
        assert!(result.regressed("avg_response_time", DeltaSeverity::Major));
        assert!(!result.regressed("avg_response_time", DeltaSeverity::Critical));
        assert!(!result.regressed("throughput", DeltaSeverity::Minor));
    }

    #[test]
    fn test_verdict_serialization() {
        assert_eq!(
            serde_json::to_string(&Verdict::ApprovalNeeded).unwrap(),
            "\"approval_needed\""
        );
        assert_eq!(Verdict::Blocked.to_string(), "blocked");
    }

    #[test]
    fn test_confidence_weights() {
        assert_eq!(Confidence::High.weight(), 30.0);
        assert_eq!(Confidence::Medium.weight(), 20.0);
        assert_eq!(Confidence::Low.weight(), 10.0);
    }
}
