//! Result reporting
//!
//! Formats analysis results, page audits and release verdicts as JSON or as
//! a plain-text console summary.
//!
//! # Example
//!
//! ```no_run
//! use perf_analyzer::reporter::{OutputFormat, Reporter};
//! use perf_analyzer::analyze;
//! use perf_types::Record;
//!
//! # fn example(records: Vec<Record>) -> anyhow::Result<()> {
//! let result = analyze(&records)?;
//! Reporter::new(OutputFormat::Console).report(&result)?;
//!
//! // Or write to a file
//! Reporter::new(OutputFormat::JsonPretty).write_to_file(&result, "analysis.json")?;
//! # Ok(())
//! # }
//! ```

mod console;
mod json;

use anyhow::Result;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use perf_types::{AnalysisResult, FrontendAnalysis, ReleaseVerdict};

pub use console::ConsoleReporter;
pub use json::JsonReporter;

/// Output format for reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Compact JSON for machine parsing
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Plain-text summary
    #[default]
    Console,
}

/// Anything the reporter knows how to render
#[derive(Debug, Clone, Copy)]
pub enum Report<'a> {
    Analysis(&'a AnalysisResult),
    Frontend(&'a FrontendAnalysis),
    Release(&'a ReleaseVerdict),
}

impl<'a> From<&'a AnalysisResult> for Report<'a> {
    fn from(result: &'a AnalysisResult) -> Self {
        Report::Analysis(result)
    }
}

impl<'a> From<&'a FrontendAnalysis> for Report<'a> {
    fn from(result: &'a FrontendAnalysis) -> Self {
        Report::Frontend(result)
    }
}

impl<'a> From<&'a ReleaseVerdict> for Report<'a> {
    fn from(verdict: &'a ReleaseVerdict) -> Self {
        Report::Release(verdict)
    }
}

#[derive(Debug, Default)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the report to stdout
    pub fn report<'a>(&self, report: impl Into<Report<'a>>) -> Result<()> {
        let output = self.format(report)?;
        print!("{}", output);
        io::stdout().flush()?;
        Ok(())
    }

    pub fn write_to_file<'a, P: AsRef<Path>>(
        &self,
        report: impl Into<Report<'a>>,
        path: P,
    ) -> Result<()> {
        let output = self.format(report)?;
        fs::write(path, output)?;
        Ok(())
    }

    /// Render the report as a string
    pub fn format<'a>(&self, report: impl Into<Report<'a>>) -> Result<String> {
        let report = report.into();
        match self.format {
            OutputFormat::Json => JsonReporter::format(report, false),
            OutputFormat::JsonPretty => JsonReporter::format(report, true),
            OutputFormat::Console => ConsoleReporter::format(report),
        }
    }
}
