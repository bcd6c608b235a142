//! Disturbance detection and bottleneck scoring
//!
//! A disturbance is a stretch where response time rises and throughput falls
//! while concurrency stays near its baseline. Extra load cannot explain the
//! slowdown, which points at a transient backend bottleneck.

use perf_types::{BottleneckAnalysis, BottleneckSignature, Disturbance, DisturbanceSeverity};

use super::Series;
use crate::deadline::Deadline;
use crate::stats::{mean, median};

const DETECTION_WINDOW: usize = 3;
const RESPONSE_TIME_RISE: f64 = 1.3;
const THROUGHPUT_DROP: f64 = 0.85;
const CONCURRENCY_TOLERANCE: f64 = 0.2;
/// Candidates whose peaks are closer than this belong to the same disturbance
pub(crate) const MERGE_GAP_SECS: f64 = 300.0;
const RECOVERED_RESPONSE_TIME: f64 = 1.1;
const RECOVERED_THROUGHPUT: f64 = 0.9;
const HIGH_SEVERITY_RISE: f64 = 1.5;
const QUICK_RECOVERY_SECS: f64 = 300.0;

/// Typical behavior of the run, taken from the middle 60% of the series
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Baseline {
    pub response_time: f64,
    pub throughput: f64,
    pub concurrency: f64,
}

impl Baseline {
    pub fn from_series(series: &Series) -> Self {
        let n = series.len();
        let lo = n * 2 / 10;
        let hi = (n * 8).div_ceil(10).min(n);
        let (lo, hi) = if hi > lo { (lo, hi) } else { (0, n) };

        Baseline {
            response_time: median(&series.response_times[lo..hi]),
            throughput: median(&series.throughputs[lo..hi]),
            concurrency: median(&series.concurrency[lo..hi]),
        }
    }
}

/// Index bookkeeping for a disturbance being assembled
#[derive(Debug, Clone, Copy)]
struct Draft {
    start: usize,
    peak: usize,
    end: usize,
}

fn is_candidate(series: &Series, baseline: &Baseline, start: usize, end: usize) -> bool {
    let rt = mean(&series.response_times[start..end]);
    let tp = mean(&series.throughputs[start..end]);
    let conc = mean(&series.concurrency[start..end]);

    rt > RESPONSE_TIME_RISE * baseline.response_time
        && tp < THROUGHPUT_DROP * baseline.throughput
        && (conc - baseline.concurrency).abs() <= CONCURRENCY_TOLERANCE * baseline.concurrency
}

fn peak_index(series: &Series, start: usize, end: usize) -> usize {
    (start..end).fold(start, |best, i| {
        if series.response_times[i] > series.response_times[best] {
            i
        } else {
            best
        }
    })
}

/// First disturbed bucket: scan left from the peak while response time is elevated
fn find_start(series: &Series, baseline: &Baseline, peak: usize) -> usize {
    let limit = RECOVERED_RESPONSE_TIME * baseline.response_time;
    let mut i = peak;
    while i > 0 && series.response_times[i - 1] > limit {
        i -= 1;
    }
    i
}

/// Recovery bucket: scan right from the peak until both metrics are back near baseline
fn find_end(series: &Series, baseline: &Baseline, peak: usize) -> usize {
    let rt_limit = RECOVERED_RESPONSE_TIME * baseline.response_time;
    let tp_floor = RECOVERED_THROUGHPUT * baseline.throughput;
    (peak + 1..series.len())
        .find(|&i| series.response_times[i] <= rt_limit && series.throughputs[i] >= tp_floor)
        .unwrap_or(series.len() - 1)
}

/// Scan for disturbances. Returns `None` when the deadline expires mid-scan.
pub(crate) fn detect_disturbances(
    series: &Series,
    baseline: &Baseline,
    deadline: &Deadline,
) -> Option<Vec<Disturbance>> {
    let n = series.len();
    if n < DETECTION_WINDOW || baseline.response_time <= 0.0 || baseline.throughput <= 0.0 {
        return Some(Vec::new());
    }

    let mut drafts: Vec<Draft> = Vec::new();
    for start in 0..=n - DETECTION_WINDOW {
        if deadline.expired() {
            return None;
        }
        let end = start + DETECTION_WINDOW;
        if !is_candidate(series, baseline, start, end) {
            continue;
        }

        let peak = peak_index(series, start, end);
        let merges = drafts.last().is_some_and(|last| {
            (series.times[peak] - series.times[last.peak]).abs() < MERGE_GAP_SECS
                || (last.start..=last.end).contains(&peak)
        });

        if merges {
            if let Some(last) = drafts.last_mut() {
                if series.response_times[peak] > series.response_times[last.peak] {
                    last.peak = peak;
                }
                last.start = last.start.min(find_start(series, baseline, peak));
                last.end = last.end.max(find_end(series, baseline, peak));
            }
        } else {
            drafts.push(Draft {
                start: find_start(series, baseline, peak),
                peak,
                end: find_end(series, baseline, peak),
            });
        }
    }

    Some(
        drafts
            .into_iter()
            .map(|draft| finalize(series, baseline, draft))
            .collect(),
    )
}

fn finalize(series: &Series, baseline: &Baseline, draft: Draft) -> Disturbance {
    let range = draft.start..draft.end + 1;
    let peak_rt = series.response_times[draft.peak];
    let min_tp = series.throughputs[range.clone()]
        .iter()
        .copied()
        .fold(f64::INFINITY, f64::min);

    let rt_rise = (peak_rt - baseline.response_time) / baseline.response_time;
    let tp_drop = ((baseline.throughput - min_tp) / baseline.throughput).max(0.0);
    let conc_change = if baseline.concurrency > 0.0 {
        series.concurrency[range]
            .iter()
            .map(|c| (c - baseline.concurrency).abs() / baseline.concurrency)
            .fold(0.0, f64::max)
    } else {
        0.0
    };

    let start_time = series.times[draft.start];
    let end_time = series.times[draft.end];
    let peak_time = series.times[draft.peak];
    let recovery_time = end_time - peak_time;

    let mut score = 0u8;
    if conc_change < CONCURRENCY_TOLERANCE {
        score += 2;
    }
    if recovery_time < QUICK_RECOVERY_SECS {
        score += 1;
    }
    if tp_drop >= rt_rise {
        score += 1;
    }

    Disturbance {
        start_time,
        end_time,
        peak_time,
        duration: end_time - start_time,
        recovery_time,
        peak_response_time: peak_rt,
        baseline_response_time: baseline.response_time,
        response_time_increase_pct: rt_rise * 100.0,
        throughput_drop_pct: tp_drop * 100.0,
        concurrency_change_pct: conc_change * 100.0,
        severity: if peak_rt > HIGH_SEVERITY_RISE * baseline.response_time {
            DisturbanceSeverity::High
        } else {
            DisturbanceSeverity::Medium
        },
        bottleneck_score: score,
    }
}

/// Summarize the disturbances into a bottleneck signature.
pub(crate) fn classify_bottleneck(disturbances: &[Disturbance]) -> BottleneckAnalysis {
    let Some(best) = disturbances.iter().map(|d| d.bottleneck_score).max() else {
        return BottleneckAnalysis {
            signature: BottleneckSignature::None,
            confidence: 0.0,
            evidence: vec!["No disturbances detected under constant load".to_string()],
        };
    };

    let evidence = disturbances
        .iter()
        .map(|d| {
            format!(
                "At {:.0}s response time rose {:.0}% while throughput fell {:.0}% (concurrency changed {:.0}%, recovered in {:.0}s)",
                d.peak_time,
                d.response_time_increase_pct,
                d.throughput_drop_pct,
                d.concurrency_change_pct,
                d.recovery_time
            )
        })
        .collect();

    let strong = disturbances.iter().filter(|d| d.bottleneck_score >= 3).count();
    let (signature, confidence) = if best >= 3 {
        let confidence =
            0.6 + 0.1 * f64::from(best - 3) + 0.05 * strong.saturating_sub(1) as f64;
        (BottleneckSignature::BackendBottleneck, confidence.min(0.95))
    } else if best >= 1 {
        (
            BottleneckSignature::PossibleBackendBottleneck,
            0.3 + 0.1 * f64::from(best - 1),
        )
    } else {
        (BottleneckSignature::Unknown, 0.1)
    };

    BottleneckAnalysis {
        signature,
        confidence,
        evidence,
    }
}
