//! Value objects shared by the performance analysis engine and its collaborators.
//!
//! Everything in this crate is plain data: records produced by a test-tool
//! parser go in, graded analysis results, comparisons and release verdicts come
//! out. All types serialize to flat JSON documents via serde.

pub mod analysis;
pub mod comparison;
pub mod grade;
pub mod record;
pub mod stats;

pub use analysis::{
    AnalysisResult, AnalysisStatus, Answer, BehaviorAnalysis, BottleneckAnalysis,
    BottleneckSignature, BusinessAnswer, CapacityVerdict, DistributionAnalysis, DistributionType,
    Disturbance, DisturbanceSeverity, FrontendAnalysis, FrontendAverages, PageGrade,
    RootCauseHypothesis, RootCauseKind, StabilityVerdict, SteadyPeriod, TestType,
};
pub use comparison::{
    ComparisonResult, Confidence, CorrelationResult, DeltaSeverity, Direction, MetricDelta,
    NewFailure, ReleaseVerdict, RootCause, Side, Verdict,
};
pub use grade::{
    CategoryScore, Grade, GradeClass, GradeLetter, Issue, IssueSeverity, MetricValue,
    Recommendation, RecommendationPriority, Roadmap, RoadmapPhase,
};
pub use record::{PageMetrics, Record};
pub use stats::{EndpointStats, LabelAggregate, PercentileStats, TimeSeriesBucket};
