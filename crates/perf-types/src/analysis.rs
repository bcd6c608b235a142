//! Analysis results for a single run: behavior, distribution, grading.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::grade::{CategoryScore, Grade, Issue, Recommendation, Roadmap};
use crate::stats::{EndpointStats, PercentileStats, TimeSeriesBucket};

/// Whether a sub-analysis ran to completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Complete,
    /// Not enough data for a meaningful result
    InsufficientData,
    /// The analysis budget expired before the scan finished
    TimedOut,
}

impl AnalysisStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, AnalysisStatus::Complete)
    }
}

/// Load pattern detected from the concurrency curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestType {
    ConstantLoad,
    RampUp,
    SpikeTest,
    VariableLoad,
    Unknown,
}

/// A contiguous stretch of buckets with stable response time, throughput and load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SteadyPeriod {
    /// Seconds from the start of the run
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    /// Seconds
    pub avg_response_time: f64,
    pub avg_throughput: f64,
    pub avg_concurrency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisturbanceSeverity {
    Medium,
    High,
}

/// Response-time spike with a throughput drop while load stayed flat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disturbance {
    pub start_time: f64,
    pub end_time: f64,
    pub peak_time: f64,
    pub duration: f64,
    /// Seconds from peak back to baseline
    pub recovery_time: f64,
    /// Seconds
    pub peak_response_time: f64,
    pub baseline_response_time: f64,
    pub response_time_increase_pct: f64,
    pub throughput_drop_pct: f64,
    /// Largest deviation of concurrency from baseline during the disturbance
    pub concurrency_change_pct: f64,
    pub severity: DisturbanceSeverity,
    /// Bottleneck evidence score (0-4)
    pub bottleneck_score: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottleneckSignature {
    BackendBottleneck,
    PossibleBackendBottleneck,
    Unknown,
    /// No disturbances were found
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BottleneckAnalysis {
    pub signature: BottleneckSignature,
    /// 0.0 - 1.0
    pub confidence: f64,
    pub evidence: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StabilityVerdict {
    HighlyStable,
    Stable,
    ModeratelyStable,
    Unstable,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapacityVerdict {
    AtCapacity,
    NearCapacity,
    VariablePerformance,
    WithinCapacity,
    Unknown,
}

/// Temporal diagnosis of a run's time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorAnalysis {
    pub status: AnalysisStatus,
    pub test_type: TestType,
    pub steady_periods: Vec<SteadyPeriod>,
    /// Fraction of buckets inside a steady period (0.0 - 1.0)
    pub steady_coverage: f64,
    pub disturbances: Vec<Disturbance>,
    pub bottleneck: BottleneckAnalysis,
    pub stability: StabilityVerdict,
    pub capacity: CapacityVerdict,
    pub narrative: String,
    pub bucket_count: usize,
}

impl BehaviorAnalysis {
    /// Structurally valid result for runs that could not be analyzed.
    pub fn degraded(status: AnalysisStatus, bucket_count: usize) -> Self {
        let narrative = match status {
            AnalysisStatus::TimedOut => {
                "Behavior analysis timed out before the time series could be fully scanned."
            }
            _ => "Not enough time-series data to analyze test behavior.",
        };
        BehaviorAnalysis {
            status,
            test_type: TestType::Unknown,
            steady_periods: Vec::new(),
            steady_coverage: 0.0,
            disturbances: Vec::new(),
            bottleneck: BottleneckAnalysis {
                signature: BottleneckSignature::Unknown,
                confidence: 0.0,
                evidence: Vec::new(),
            },
            stability: StabilityVerdict::Unknown,
            capacity: CapacityVerdict::Unknown,
            narrative: narrative.to_string(),
            bucket_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionType {
    Normal,
    RightSkewed,
    LeftSkewed,
    Multimodal,
    HighVariance,
    InsufficientData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Answer {
    Yes,
    No,
    Mostly,
    Partially,
}

/// Plain-language answer to a common stakeholder question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessAnswer {
    pub question: String,
    pub answer: Answer,
    pub explanation: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RootCauseKind {
    DatabaseBottleneck,
    ExternalDependency,
    ConnectionPoolExhaustion,
    InfrastructureSaturation,
    CachingGap,
    MemoryLeak,
    LoadBalancerImbalance,
    CapacityLimit,
}

/// A symptom-matched explanation for a long-tailed distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCauseHypothesis {
    pub kind: RootCauseKind,
    /// Lower is checked first
    pub priority: u8,
    pub diagnosis: String,
    pub symptom: String,
    pub remediation: String,
}

/// Shape of the response-time distribution and what it implies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionAnalysis {
    pub status: AnalysisStatus,
    pub distribution_type: DistributionType,
    pub skewness: f64,
    /// Excess kurtosis (0 for a normal distribution)
    pub kurtosis: f64,
    pub coefficient_of_variation: f64,
    pub peak_count: usize,
    pub mean: f64,
    pub median: f64,
    pub narrative: String,
    pub business_answers: Vec<BusinessAnswer>,
    pub root_causes: Vec<RootCauseHypothesis>,
}

impl DistributionAnalysis {
    pub fn degraded(status: AnalysisStatus) -> Self {
        DistributionAnalysis {
            status,
            distribution_type: DistributionType::InsufficientData,
            skewness: 0.0,
            kurtosis: 0.0,
            coefficient_of_variation: 0.0,
            peak_count: 0,
            mean: 0.0,
            median: 0.0,
            narrative: "Not enough samples to characterize the response-time distribution."
                .to_string(),
            business_answers: Vec::new(),
            root_causes: Vec::new(),
        }
    }
}

/// Complete graded analysis of one load-test run (or a consolidation of several).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub total_samples: u64,
    pub total_errors: u64,
    /// Percent
    pub error_rate: f64,
    /// Requests per second
    pub throughput: f64,
    pub duration_secs: f64,
    /// RFC 3339, derived from the earliest record
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    /// Percent of samples under the SLA threshold
    pub sla_compliance: f64,
    pub response_time: Option<PercentileStats>,
    pub latency: Option<PercentileStats>,
    pub connect_time: Option<PercentileStats>,
    pub response_codes: BTreeMap<String, u64>,
    pub endpoints: BTreeMap<String, EndpointStats>,
    pub categories: Vec<CategoryScore>,
    pub grade: Grade,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<Recommendation>,
    pub roadmap: Roadmap,
    pub distribution: DistributionAnalysis,
    pub behavior: BehaviorAnalysis,
    pub time_series: Vec<TimeSeriesBucket>,
    /// Number of runs folded into this result
    pub run_count: u32,
}

impl AnalysisResult {
    pub fn category(&self, name: &str) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Mean response time in milliseconds, 0 when undefined
    pub fn avg_response_time(&self) -> f64 {
        self.response_time.as_ref().map(|s| s.mean).unwrap_or(0.0)
    }
}

/// Mean page metrics across all audited pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendAverages {
    pub fcp: f64,
    pub lcp: f64,
    pub speed_index: f64,
    pub tbt: f64,
    pub cls: f64,
    pub tti: f64,
    pub performance_score: f64,
    /// Mean over the pages that reported it
    pub ttfb: Option<f64>,
}

/// Grade of a single audited page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGrade {
    pub url: String,
    pub title: String,
    pub categories: Vec<CategoryScore>,
    pub grade: Grade,
}

/// Graded page-speed audit of a set of pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrontendAnalysis {
    pub pages: Vec<PageGrade>,
    pub averages: FrontendAverages,
    pub categories: Vec<CategoryScore>,
    pub grade: Grade,
    pub issues: Vec<Issue>,
}

impl FrontendAnalysis {
    pub fn category(&self, name: &str) -> Option<&CategoryScore> {
        self.categories.iter().find(|c| c.name == name)
    }
}
