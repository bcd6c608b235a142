//! JSON reporter

use anyhow::Result;
use serde::Serialize;

use super::Report;

pub struct JsonReporter;

impl JsonReporter {
    /// Serialize the report, optionally pretty-printed
    pub fn format(report: Report<'_>, pretty: bool) -> Result<String> {
        match report {
            Report::Analysis(result) => Self::to_json(result, pretty),
            Report::Frontend(result) => Self::to_json(result, pretty),
            Report::Release(verdict) => Self::to_json(verdict, pretty),
        }
    }

    fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
        let output = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(output)
    }
}
