//! Metric scoring curve

use perf_types::Direction;

/// Score a metric value against its target on a 0-100 scale.
///
/// Lower-is-better metrics keep 100 up to the target, lose linearly down to 50
/// at twice the target, and keep losing 25 points per further multiple of the
/// target until they reach 0. The curve is continuous at both knees:
///
/// ```text
/// value <= target            -> 100
/// target < value <= 2*target -> 100 - (value - target) / target * 50
/// value > 2*target           -> 50 - (value - 2*target) / target * 25
/// ```
///
/// Higher-is-better metrics score `value / target * 100`, capped at 100.
/// Scores never go below 0. A non-positive target cannot be scaled against,
/// so the value then scores 100 when it sits on the good side of zero and 0 otherwise.
///
/// # Examples
///
/// ```
/// use perf_analyzer::stats::score_metric;
/// use perf_types::Direction;
///
/// assert_eq!(score_metric(800.0, 1000.0, Direction::LowerIsBetter), 100.0);
/// assert_eq!(score_metric(2000.0, 1000.0, Direction::LowerIsBetter), 50.0);
/// assert_eq!(score_metric(3000.0, 1000.0, Direction::LowerIsBetter), 25.0);
/// assert_eq!(score_metric(50.0, 100.0, Direction::HigherIsBetter), 50.0);
/// ```
pub fn score_metric(value: f64, target: f64, direction: Direction) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if target <= 0.0 {
        let good = match direction {
            Direction::LowerIsBetter => value <= 0.0,
            Direction::HigherIsBetter => value >= 0.0,
        };
        return if good { 100.0 } else { 0.0 };
    }

    let score = match direction {
        Direction::LowerIsBetter => {
            if value <= target {
                100.0
            } else if value <= 2.0 * target {
                100.0 - (value - target) / target * 50.0
            } else {
                50.0 - (value - 2.0 * target) / target * 25.0
            }
        }
        Direction::HigherIsBetter => {
            if value >= target {
                100.0
            } else {
                value / target * 100.0
            }
        }
    };

    score.clamp(0.0, 100.0)
}
