//! Performance-test analysis engine
//!
//! Turns normalized load-test records and page-speed audits into graded,
//! explainable analysis: percentile statistics, temporal behavior diagnosis,
//! distribution shape with root-cause hypotheses, an A+ to F grade, and for
//! two runs a comparison, cross-side correlation and a release verdict.
//!
//! # Features
//!
//! - **Grading**: weighted performance, reliability, user experience and scalability scores
//! - **Behavior**: steady-state detection, disturbances and bottleneck signatures
//! - **Distribution**: skew/multimodality classification and a root-cause library
//! - **Comparison**: regression severities, new failures and health scores
//! - **Release scoring**: weighted verdict with blocking conditions
//! - **Reporting**: JSON and console output
//!
//! # Example
//!
//! ```
//! use perf_analyzer::{analyze, compare_backend};
//! use perf_types::Record;
//!
//! let run = |ms: f64| -> Vec<Record> {
//!     (0..500)
//!         .map(|i| Record::new(i * 100, ms, "GET /").with_concurrency(10))
//!         .collect()
//! };
//!
//! let baseline = analyze(&run(1000.0)).unwrap();
//! let current = analyze(&run(1300.0)).unwrap();
//!
//! let comparison = compare_backend(&baseline, &current);
//! assert!(comparison.critical_count >= 1);
//! ```
//!
//! # Configuration
//!
//! Targets and limits are read from TOML:
//!
//! ```toml
//! [thresholds]
//! sla_threshold_ms = 2000.0
//! response_time_target_ms = 1000.0
//! throughput_target = 100.0
//!
//! [time_series]
//! max_records = 50000
//!
//! [budget]
//! analysis_timeout_ms = 20000
//! ```

pub mod behavior;
pub mod comparison;
pub mod config;
pub mod consolidate;
pub mod correlation;
pub mod deadline;
pub mod distribution;
pub mod error;
pub mod frontend;
pub mod grading;
pub mod release;
pub mod reporter;
pub mod rules;
pub mod stats;
pub mod timeseries;

mod analyzer;

use perf_types::{AnalysisResult, Record};

// Re-export main types for convenience
pub use analyzer::Analyzer;
pub use comparison::{compare_backend, compare_frontend};
pub use config::AnalysisConfig;
pub use consolidate::consolidate;
pub use correlation::correlate;
pub use error::{AnalysisError, Result};
pub use frontend::analyze_pages;
pub use release::score_release;
pub use reporter::{OutputFormat, Reporter};
pub use timeseries::{aggregate, AggregationMode};

/// Analyze one run with the default configuration.
pub fn analyze(records: &[Record]) -> Result<AnalysisResult> {
    Analyzer::new().analyze(records)
}
