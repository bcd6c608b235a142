//! Response-time distribution classification
//!
//! Characterizes the shape of the sample distribution (skewness, kurtosis,
//! multimodality), maps it to a narrative with stakeholder answers, and for
//! right-skewed runs matches the root-cause library.

mod answers;
mod histogram;

use perf_types::{AnalysisStatus, DistributionAnalysis, DistributionType};
use tracing::{debug, warn};

use crate::deadline::Deadline;
use crate::rules::{match_root_causes, Signals};
use crate::stats::{coefficient_of_variation, excess_kurtosis, mean, median, skewness};

/// Fewer samples than this cannot be classified
pub const MIN_DISTRIBUTION_SAMPLES: usize = 10;

const NORMAL_SKEW: f64 = 0.5;
const NORMAL_KURTOSIS: f64 = 1.0;
const NORMAL_MEAN_MEDIAN_GAP: f64 = 0.1;
const SKEW_THRESHOLD: f64 = 0.5;
const RIGHT_SKEW_MEAN_RATIO: f64 = 1.1;
const LEFT_SKEW_MEAN_RATIO: f64 = 0.9;
const HIGH_VARIANCE_CV: f64 = 0.5;

/// Classify the distribution of `samples` (milliseconds).
///
/// `signals` gate the business answers and feed the root-cause library when
/// the distribution is right-skewed.
pub fn analyze_distribution(
    samples: &[f64],
    signals: &Signals,
    deadline: &Deadline,
) -> DistributionAnalysis {
    if samples.len() < MIN_DISTRIBUTION_SAMPLES {
        debug!(samples = samples.len(), "Too few samples for distribution analysis");
        return DistributionAnalysis::degraded(AnalysisStatus::InsufficientData);
    }

    let Some(counts) = histogram::histogram(samples, deadline) else {
        warn!(samples = samples.len(), "Distribution analysis timed out");
        let mut degraded = DistributionAnalysis::degraded(AnalysisStatus::TimedOut);
        degraded.narrative =
            "Distribution analysis timed out before the histogram was complete.".to_string();
        return degraded;
    };
    let peak_count = histogram::count_peaks(&counts);

    let skew = skewness(samples);
    let kurtosis = excess_kurtosis(samples);
    let cv = coefficient_of_variation(samples);
    let mean = mean(samples);
    let median = median(samples);

    let distribution_type = classify(peak_count, skew, kurtosis, cv, mean, median);
    let root_causes = if distribution_type == DistributionType::RightSkewed {
        match_root_causes(signals)
    } else {
        Vec::new()
    };

    debug!(?distribution_type, peak_count, skew, kurtosis, cv, "Distribution classified");

    DistributionAnalysis {
        status: AnalysisStatus::Complete,
        distribution_type,
        skewness: skew,
        kurtosis,
        coefficient_of_variation: cv,
        peak_count,
        mean,
        median,
        narrative: answers::narrative(distribution_type).to_string(),
        business_answers: answers::business_answers(distribution_type, cv, signals),
        root_causes,
    }
}

fn classify(
    peak_count: usize,
    skew: f64,
    kurtosis: f64,
    cv: f64,
    mean: f64,
    median: f64,
) -> DistributionType {
    if peak_count > 1 {
        DistributionType::Multimodal
    } else if skew.abs() < NORMAL_SKEW
        && kurtosis.abs() < NORMAL_KURTOSIS
        && (mean - median).abs() <= NORMAL_MEAN_MEDIAN_GAP * median.abs()
    {
        DistributionType::Normal
    } else if skew > SKEW_THRESHOLD && mean > RIGHT_SKEW_MEAN_RATIO * median {
        DistributionType::RightSkewed
    } else if skew < -SKEW_THRESHOLD && mean < LEFT_SKEW_MEAN_RATIO * median {
        DistributionType::LeftSkewed
    } else if cv > HIGH_VARIANCE_CV {
        DistributionType::HighVariance
    } else {
        DistributionType::Normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_types::{Answer, RootCauseKind};

    fn repeat(value: f64, times: usize) -> impl Iterator<Item = f64> {
        std::iter::repeat(value).take(times)
    }

    fn analyze(samples: &[f64]) -> DistributionAnalysis {
        analyze_distribution(samples, &Signals::default(), &Deadline::unbounded())
    }

    #[test]
    fn test_too_few_samples() {
        let result = analyze(&[100.0; 9]);
        assert_eq!(result.status, AnalysisStatus::InsufficientData);
        assert_eq!(result.distribution_type, DistributionType::InsufficientData);
    }

    #[test]
    fn test_bell_shape_is_normal() {
        let weights = [2, 4, 8, 12, 16, 18, 16, 12, 8, 4, 2];
        let samples: Vec<f64> = weights
            .iter()
            .enumerate()
            .flat_map(|(i, &w)| repeat(100.0 + i as f64, w))
            .collect();

        let result = analyze(&samples);
        assert_eq!(result.distribution_type, DistributionType::Normal);
        assert_eq!(result.peak_count, 1);
        assert_eq!(result.business_answers.len(), 4);
        assert_eq!(result.business_answers[0].answer, Answer::Yes);
        assert!(result.root_causes.is_empty());
    }

    #[test]
    fn test_slow_bell_shape_is_not_sufficient() {
        let weights = [2, 4, 8, 12, 16, 18, 16, 12, 8, 4, 2];
        let samples: Vec<f64> = weights
            .iter()
            .enumerate()
            .flat_map(|(i, &w)| repeat(4950.0 + 10.0 * i as f64, w))
            .collect();
        let signals = Signals {
            avg: mean(&samples),
            p95: 5040.0,
            p99: 5050.0,
            max: 5050.0,
            sla_compliance: 0.0,
            ..Signals::default()
        };

        let result = analyze_distribution(&samples, &signals, &Deadline::unbounded());
        assert_eq!(result.distribution_type, DistributionType::Normal);
        assert_eq!(result.business_answers[1].answer, Answer::No);
        assert_eq!(result.business_answers[3].answer, Answer::Yes);
    }

    #[test]
    fn test_long_tail_is_right_skewed() {
        let samples: Vec<f64> = repeat(100.0, 90)
            .chain((1..=10).map(|k| k as f64 * 1000.0))
            .collect();

        let result = analyze(&samples);
        assert_eq!(result.distribution_type, DistributionType::RightSkewed);
        assert!(result.skewness > 0.5);
        assert_eq!(
            result.root_causes.last().map(|h| h.kind),
            Some(RootCauseKind::CapacityLimit)
        );
    }

    #[test]
    fn test_two_clusters_are_multimodal() {
        let samples: Vec<f64> = repeat(100.0, 50).chain(repeat(1000.0, 50)).collect();

        let result = analyze(&samples);
        assert_eq!(result.distribution_type, DistributionType::Multimodal);
        assert_eq!(result.peak_count, 2);
    }

    #[test]
    fn test_fast_outliers_are_left_skewed() {
        let samples: Vec<f64> = repeat(1000.0, 75)
            .chain((0..25).map(|k| 100.0 + 36.0 * k as f64))
            .collect();

        let result = analyze(&samples);
        assert_eq!(result.distribution_type, DistributionType::LeftSkewed);
    }

    #[test]
    fn test_flat_spread_is_high_variance() {
        let samples: Vec<f64> = (1..=100).map(f64::from).collect();

        let result = analyze(&samples);
        assert_eq!(result.distribution_type, DistributionType::HighVariance);
        assert_eq!(result.business_answers[0].answer, Answer::No);
    }

    #[test]
    fn test_expired_deadline() {
        let expired = Deadline::after(std::time::Duration::ZERO);
        let result = analyze_distribution(&[100.0; 50], &Signals::default(), &expired);
        assert_eq!(result.status, AnalysisStatus::TimedOut);
    }
}
