//! Threshold rules: issue detection and the root-cause library

pub mod issues;
pub mod root_causes;

pub use issues::{check_backend_issues, check_frontend_issues, BackendSignals};
pub use root_causes::{match_root_causes, Signals, MAX_ROOT_CAUSES};
