//! Behavior analysis over the aggregated time series
//!
//! Classifies the load pattern, finds steady-state stretches and transient
//! disturbances, and derives bottleneck, stability and capacity verdicts.
//! Scans honor a cooperative [`Deadline`]; an expired deadline produces a
//! degraded `timed_out` result instead of an error.

mod disturbance;
mod narrative;
mod steady;

use std::time::Duration;

use perf_types::{
    AnalysisStatus, BehaviorAnalysis, CapacityVerdict, Disturbance, StabilityVerdict, TestType,
    TimeSeriesBucket,
};
use tracing::{debug, warn};

use crate::deadline::Deadline;
use crate::stats::{coefficient_of_variation, mean, median, pearson};
use crate::timeseries::downsample;

use disturbance::{classify_bottleneck, detect_disturbances, Baseline};
use steady::find_steady_periods;

/// Longer series are stride-downsampled to this many buckets
pub const MAX_BEHAVIOR_BUCKETS: usize = 500;
/// Below this many buckets the series is too short to analyze
pub const MIN_BEHAVIOR_BUCKETS: usize = 5;

const CONSTANT_LOAD_CV: f64 = 0.15;
const RAMP_UP_RATIO: f64 = 1.5;
const SPIKE_RATIO: f64 = 2.0;
const AT_CAPACITY_CORRELATION: f64 = 0.7;
const FLAT_CONCURRENCY_PCT: f64 = 20.0;
const VARIABLE_PERFORMANCE_CV: f64 = 0.3;

/// Column-oriented view of the buckets the scans run over
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Series {
    pub times: Vec<f64>,
    pub response_times: Vec<f64>,
    pub throughputs: Vec<f64>,
    pub concurrency: Vec<f64>,
}

impl Series {
    pub fn from_buckets(buckets: &[&TimeSeriesBucket]) -> Self {
        let mut series = Series::default();
        for bucket in buckets {
            series.times.push(bucket.time);
            series.response_times.push(bucket.avg_response_time);
            series.throughputs.push(bucket.throughput);
            series.concurrency.push(bucket.concurrency);
        }
        series
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }
}

/// Runs behavior analysis under a time budget.
#[derive(Debug, Clone, Copy)]
pub struct BehaviorAnalyzer {
    budget: Duration,
}

impl BehaviorAnalyzer {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Analyze with a fresh deadline of this analyzer's budget.
    pub fn analyze(&self, buckets: &[TimeSeriesBucket]) -> BehaviorAnalysis {
        self.analyze_with_deadline(buckets, &Deadline::after(self.budget))
    }

    pub fn analyze_with_deadline(
        &self,
        buckets: &[TimeSeriesBucket],
        deadline: &Deadline,
    ) -> BehaviorAnalysis {
        let kept = downsample(buckets, MAX_BEHAVIOR_BUCKETS);
        let n = kept.len();
        if n < MIN_BEHAVIOR_BUCKETS {
            debug!(buckets = n, "Too few buckets for behavior analysis");
            return BehaviorAnalysis::degraded(AnalysisStatus::InsufficientData, n);
        }

        let series = Series::from_buckets(&kept);
        let test_type = detect_test_type(&series.concurrency);

        let Some(steady) = find_steady_periods(&series, deadline) else {
            warn!(buckets = n, "Behavior analysis timed out during steady-state scan");
            return BehaviorAnalysis::degraded(AnalysisStatus::TimedOut, n);
        };

        let baseline = Baseline::from_series(&series);
        let Some(disturbances) = detect_disturbances(&series, &baseline, deadline) else {
            warn!(buckets = n, "Behavior analysis timed out during disturbance scan");
            return BehaviorAnalysis::degraded(AnalysisStatus::TimedOut, n);
        };

        let bottleneck = classify_bottleneck(&disturbances);
        let stability = stability_verdict(steady.coverage, disturbances.len());
        let capacity = capacity_verdict(&series, &disturbances);
        let narrative = narrative::compose(
            test_type,
            steady.coverage,
            &disturbances,
            &bottleneck,
            stability,
            capacity,
        );

        debug!(
            buckets = n,
            ?test_type,
            steady_periods = steady.periods.len(),
            disturbances = disturbances.len(),
            ?stability,
            ?capacity,
            "Behavior analysis complete"
        );

        BehaviorAnalysis {
            status: AnalysisStatus::Complete,
            test_type,
            steady_periods: steady.periods,
            steady_coverage: steady.coverage,
            disturbances,
            bottleneck,
            stability,
            capacity,
            narrative,
            bucket_count: n,
        }
    }
}

impl Default for BehaviorAnalyzer {
    fn default() -> Self {
        Self::new(crate::config::BudgetConfig::default().analysis_timeout_ms)
    }
}

/// Classify the load pattern from the concurrency curve.
pub fn detect_test_type(concurrency: &[f64]) -> TestType {
    if concurrency.is_empty() {
        return TestType::Unknown;
    }
    if coefficient_of_variation(concurrency) < CONSTANT_LOAD_CV {
        return TestType::ConstantLoad;
    }

    let edge = (concurrency.len() / 10).max(1);
    let initial = mean(&concurrency[..edge]);
    let last = mean(&concurrency[concurrency.len() - edge..]);
    if last > RAMP_UP_RATIO * initial {
        return TestType::RampUp;
    }

    let peak = concurrency.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if peak > SPIKE_RATIO * median(concurrency) {
        return TestType::SpikeTest;
    }

    TestType::VariableLoad
}

fn stability_verdict(coverage: f64, disturbances: usize) -> StabilityVerdict {
    if coverage > 0.8 && disturbances == 0 {
        StabilityVerdict::HighlyStable
    } else if coverage > 0.6 && disturbances <= 2 {
        StabilityVerdict::Stable
    } else if coverage > 0.4 && disturbances <= 4 {
        StabilityVerdict::ModeratelyStable
    } else {
        StabilityVerdict::Unstable
    }
}

fn capacity_verdict(series: &Series, disturbances: &[Disturbance]) -> CapacityVerdict {
    if pearson(&series.concurrency, &series.response_times) > AT_CAPACITY_CORRELATION {
        CapacityVerdict::AtCapacity
    } else if disturbances
        .iter()
        .any(|d| d.concurrency_change_pct < FLAT_CONCURRENCY_PCT)
    {
        CapacityVerdict::NearCapacity
    } else if coefficient_of_variation(&series.response_times) > VARIABLE_PERFORMANCE_CV {
        CapacityVerdict::VariablePerformance
    } else {
        CapacityVerdict::WithinCapacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_types::BottleneckSignature;
    use std::collections::BTreeMap;

    fn bucket(time: f64, rt: f64, tp: f64, conc: f64) -> TimeSeriesBucket {
        TimeSeriesBucket {
            time,
            avg_response_time: rt,
            concurrency: conc,
            throughput: tp,
            pass_count: tp as u64,
            fail_count: 0,
            labels: BTreeMap::new(),
        }
    }

    fn flat(n: usize) -> Vec<TimeSeriesBucket> {
        (0..n)
            .map(|i| bucket(i as f64 * 30.0, 0.5, 100.0, 50.0))
            .collect()
    }

    #[test]
    fn test_too_few_buckets() {
        let analysis = BehaviorAnalyzer::default().analyze(&flat(4));
        assert_eq!(analysis.status, AnalysisStatus::InsufficientData);
        assert_eq!(analysis.test_type, TestType::Unknown);
        assert_eq!(analysis.bucket_count, 4);
    }

    #[test]
    fn test_flat_run_is_highly_stable() {
        let analysis = BehaviorAnalyzer::default().analyze(&flat(40));

        assert!(analysis.status.is_complete());
        assert_eq!(analysis.test_type, TestType::ConstantLoad);
        assert_eq!(analysis.stability, StabilityVerdict::HighlyStable);
        assert_eq!(analysis.capacity, CapacityVerdict::WithinCapacity);
        assert_eq!(analysis.bottleneck.signature, BottleneckSignature::None);
        assert_eq!(analysis.steady_coverage, 1.0);
        assert!(!analysis.narrative.is_empty());
    }

    #[test]
    fn test_disturbance_means_near_capacity() {
        let mut buckets = flat(40);
        for b in &mut buckets[20..23] {
            b.avg_response_time = 1.0;
            b.throughput = 60.0;
        }

        let analysis = BehaviorAnalyzer::default().analyze(&buckets);
        assert_eq!(analysis.disturbances.len(), 1);
        assert_eq!(analysis.capacity, CapacityVerdict::NearCapacity);
        assert_eq!(
            analysis.bottleneck.signature,
            BottleneckSignature::BackendBottleneck
        );
    }

    #[test]
    fn test_latency_tracking_load_is_at_capacity() {
        let buckets: Vec<_> = (0..30)
            .map(|i| {
                let users = 10.0 + i as f64 * 5.0;
                bucket(i as f64 * 10.0, users / 100.0, 100.0, users)
            })
            .collect();

        let analysis = BehaviorAnalyzer::default().analyze(&buckets);
        assert_eq!(analysis.test_type, TestType::RampUp);
        assert_eq!(analysis.capacity, CapacityVerdict::AtCapacity);
    }

    #[test]
    fn test_expired_deadline_degrades() {
        let expired = Deadline::after(Duration::ZERO);
        let analysis = BehaviorAnalyzer::default().analyze_with_deadline(&flat(40), &expired);
        assert_eq!(analysis.status, AnalysisStatus::TimedOut);
        assert_eq!(analysis.stability, StabilityVerdict::Unknown);
    }

    #[test]
    fn test_long_series_is_downsampled() {
        let analysis = BehaviorAnalyzer::default().analyze(&flat(1200));
        assert!(analysis.bucket_count <= MAX_BEHAVIOR_BUCKETS);
    }

    #[test]
    fn test_detect_test_type() {
        assert_eq!(detect_test_type(&[]), TestType::Unknown);
        assert_eq!(detect_test_type(&[10.0; 20]), TestType::ConstantLoad);

        let ramp: Vec<f64> = (1..=20).map(|i| i as f64 * 5.0).collect();
        assert_eq!(detect_test_type(&ramp), TestType::RampUp);

        let mut spike = vec![10.0; 20];
        spike[10] = 100.0;
        assert_eq!(detect_test_type(&spike), TestType::SpikeTest);

        let wave: Vec<f64> = (0..20)
            .map(|i| if i % 2 == 0 { 10.0 } else { 15.0 })
            .collect();
        assert_eq!(detect_test_type(&wave), TestType::VariableLoad);
    }

    #[test]
    fn test_stability_bands() {
        assert_eq!(stability_verdict(0.9, 0), StabilityVerdict::HighlyStable);
        assert_eq!(stability_verdict(0.9, 1), StabilityVerdict::Stable);
        assert_eq!(stability_verdict(0.5, 3), StabilityVerdict::ModeratelyStable);
        assert_eq!(stability_verdict(0.3, 0), StabilityVerdict::Unstable);
    }
}
