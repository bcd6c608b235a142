use thiserror::Error;

/// Failures of the analysis engine.
///
/// Insufficient data for a sub-analysis is not an error: those steps return a
/// structurally valid result whose status is `insufficient_data` or `timed_out`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Cannot analyze an empty record set")]
    EmptyRecordSet,

    #[error("Cannot grade an empty set of page audits")]
    EmptyPageSet,

    #[error("Consolidation requires at least one analysis result")]
    NothingToConsolidate,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
