//! Normalized input records produced by the parser collaborator.

use serde::{Deserialize, Serialize};

/// A single load-test sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Start of the sample, milliseconds since the Unix epoch
    pub timestamp: i64,
    /// Total elapsed time of the sample in milliseconds
    pub sample_time: f64,
    /// Time to first byte in milliseconds
    #[serde(default)]
    pub latency: Option<f64>,
    /// Connection establishment time in milliseconds
    #[serde(default)]
    pub connect_time: Option<f64>,
    /// Protocol response code (e.g. "200", "503", "Non HTTP response code")
    #[serde(default)]
    pub response_code: Option<String>,
    pub success: bool,
    /// Sampler / endpoint label
    pub label: String,
    /// Active threads or virtual users when the sample was taken
    #[serde(default)]
    pub concurrency: Option<u32>,
}

impl Record {
    /// Convenience constructor for a successful sample without optional fields.
    pub fn new(timestamp: i64, sample_time: f64, label: impl Into<String>) -> Self {
        Self {
            timestamp,
            sample_time,
            latency: None,
            connect_time: None,
            response_code: None,
            success: true,
            label: label.into(),
            concurrency: None,
        }
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    pub fn with_concurrency(mut self, concurrency: u32) -> Self {
        self.concurrency = Some(concurrency);
        self
    }

    pub fn with_response_code(mut self, code: impl Into<String>) -> Self {
        self.response_code = Some(code.into());
        self
    }

    pub fn with_latency(mut self, latency: f64) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn with_connect_time(mut self, connect_time: f64) -> Self {
        self.connect_time = Some(connect_time);
        self
    }
}

/// Synthetic page-speed audit of a single URL.
///
/// Timings are in milliseconds, `cls` is unitless and `performance_score`
/// is on a 0-100 scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMetrics {
    pub url: String,
    #[serde(default)]
    pub title: String,
    /// First Contentful Paint
    pub fcp: f64,
    /// Largest Contentful Paint
    pub lcp: f64,
    pub speed_index: f64,
    /// Total Blocking Time
    pub tbt: f64,
    /// Cumulative Layout Shift
    pub cls: f64,
    /// Time to Interactive
    pub tti: f64,
    pub performance_score: f64,
    /// Time to First Byte, when the audit tool reports it
    #[serde(default)]
    pub ttfb: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_builder() {
        let record = Record::new(1_000, 250.0, "GET /login")
            .with_success(false)
            .with_concurrency(10)
            .with_response_code("500");

        assert_eq!(record.label, "GET /login");
        assert!(!record.success);
        assert_eq!(record.concurrency, Some(10));
        assert_eq!(record.response_code.as_deref(), Some("500"));
        assert_eq!(record.latency, None);
    }

    #[test]
    fn test_record_deserialize_defaults_optional_fields() {
        let json = r#"{"timestamp": 5, "sample_time": 12.5, "success": true, "label": "home"}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.timestamp, 5);
        assert_eq!(record.connect_time, None);
        assert_eq!(record.concurrency, None);
    }

    #[test]
    fn test_page_metrics_ttfb_optional() {
        let json = r#"{
            "url": "https://example.com/",
            "fcp": 900.0, "lcp": 1800.0, "speed_index": 1500.0,
            "tbt": 120.0, "cls": 0.02, "tti": 2500.0, "performance_score": 93.0
        }"#;
        let page: PageMetrics = serde_json::from_str(json).unwrap();

        assert_eq!(page.ttfb, None);
        assert_eq!(page.title, "");
    }
}
