//! Statistics kernel
//!
//! Percentile summaries, moment statistics and the metric scoring curve that
//! every grading step builds on.
//!
//! # Examples
//!
//! ```
//! use perf_analyzer::stats::{score_metric, summarize};
//! use perf_types::Direction;
//!
//! let samples = vec![120.0, 180.0, 150.0, 900.0, 160.0];
//! let summary = summarize(&samples).unwrap();
//! assert_eq!(summary.median, 160.0);
//!
//! // Halfway to twice the target
//! assert_eq!(score_metric(1500.0, 1000.0, Direction::LowerIsBetter), 75.0);
//! ```

pub mod moments;
pub mod percentiles;
pub mod scoring;

pub use moments::{coefficient_of_variation, excess_kurtosis, mean, pearson, skewness, std_dev};
pub use percentiles::{median, percentile, summarize};
pub use scoring::score_metric;
