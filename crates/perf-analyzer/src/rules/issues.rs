//! Threshold-triggered issue detection for backend runs and page audits

use std::collections::BTreeMap;

use perf_types::{EndpointStats, FrontendAverages, Issue, IssueSeverity, PageGrade, PageMetrics};

const HIGH_ERROR_RATE_PCT: f64 = 5.0;
const SLOW_AVG_MS: f64 = 3000.0;
const CRITICAL_AVG_MS: f64 = 5000.0;
const SLOW_ENDPOINT_MS: f64 = 10_000.0;
const SLOWEST_ENDPOINTS_CHECKED: usize = 3;
const LOW_SLA_COMPLIANCE_PCT: f64 = 80.0;

const POOR_LCP_MS: f64 = 4000.0;
const POOR_CLS: f64 = 0.25;
const POOR_TBT_MS: f64 = 600.0;
const POOR_PAGE_SCORE: f64 = 50.0;

/// Run-level values the backend checks look at
#[derive(Debug, Clone, Copy)]
pub struct BackendSignals<'a> {
    /// Percent
    pub error_rate: f64,
    /// Milliseconds
    pub avg_response_time: f64,
    /// Percent
    pub sla_compliance: f64,
    pub endpoints: &'a BTreeMap<String, EndpointStats>,
}

fn issue(
    severity: IssueSeverity,
    category: &str,
    title: String,
    description: String,
    recommendation: &str,
) -> Issue {
    Issue {
        severity,
        category: category.to_string(),
        title,
        description,
        recommendation: recommendation.to_string(),
    }
}

/// Run every backend check, most severe findings first
pub fn check_backend_issues(signals: &BackendSignals<'_>) -> Vec<Issue> {
    let mut issues = Vec::new();

    issues.extend(check_error_rate(signals.error_rate));
    issues.extend(check_response_time(signals.avg_response_time));
    issues.extend(check_slow_endpoints(signals.endpoints));
    issues.extend(check_sla_compliance(signals.sla_compliance));

    issues.sort_by_key(|i| i.severity);
    issues
}

pub fn check_error_rate(error_rate: f64) -> Vec<Issue> {
    let mut issues = Vec::new();

    if error_rate > HIGH_ERROR_RATE_PCT {
        issues.push(issue(
            IssueSeverity::Critical,
            "reliability",
            format!("High Error Rate ({:.2}%)", error_rate),
            format!(
                "{:.2}% of requests failed, above the {:.0}% tolerance",
                error_rate, HIGH_ERROR_RATE_PCT
            ),
            "Inspect failing response codes and server logs for the affected endpoints",
        ));
    }

    issues
}

pub fn check_response_time(avg_ms: f64) -> Vec<Issue> {
    let mut issues = Vec::new();

    if avg_ms > SLOW_AVG_MS {
        let severity = if avg_ms > CRITICAL_AVG_MS {
            IssueSeverity::Critical
        } else {
            IssueSeverity::High
        };
        issues.push(issue(
            severity,
            "performance",
            "Slow Average Response Time".to_string(),
            format!(
                "Average response time is {:.0} ms (above {:.0} ms)",
                avg_ms, SLOW_AVG_MS
            ),
            "Profile the slowest endpoints and optimize their hot paths",
        ));
    }

    issues
}

/// Flag the slowest endpoints whose mean exceeds 10 s
pub fn check_slow_endpoints(endpoints: &BTreeMap<String, EndpointStats>) -> Vec<Issue> {
    let mut slowest: Vec<&EndpointStats> = endpoints.values().collect();
    slowest.sort_by(|a, b| {
        b.mean_response_time()
            .total_cmp(&a.mean_response_time())
            .then_with(|| a.label.cmp(&b.label))
    });

    slowest
        .into_iter()
        .take(SLOWEST_ENDPOINTS_CHECKED)
        .filter(|e| e.mean_response_time() > SLOW_ENDPOINT_MS)
        .map(|e| {
            issue(
                IssueSeverity::Critical,
                "performance",
                format!("Extremely Slow Endpoint: {}", e.label),
                format!(
                    "{} averages {:.1} s per request",
                    e.label,
                    e.mean_response_time() / 1000.0
                ),
                "Move long-running work off the request path or paginate the response",
            )
        })
        .collect()
}

pub fn check_sla_compliance(sla_compliance: f64) -> Vec<Issue> {
    let mut issues = Vec::new();

    if sla_compliance < LOW_SLA_COMPLIANCE_PCT {
        issues.push(issue(
            IssueSeverity::High,
            "user_experience",
            "Low SLA Compliance".to_string(),
            format!(
                "Only {:.1}% of requests met the response-time SLA",
                sla_compliance
            ),
            "Reduce tail latency on the endpoints that miss the SLA most often",
        ));
    }

    issues
}

/// Checks over averaged page metrics plus the per-page performance scores
pub fn check_frontend_issues(
    averages: &FrontendAverages,
    pages: &[PageMetrics],
    grades: &[PageGrade],
) -> Vec<Issue> {
    let mut issues = Vec::new();

    if averages.lcp > POOR_LCP_MS {
        issues.push(issue(
            IssueSeverity::High,
            "loading",
            "Slow Largest Contentful Paint".to_string(),
            format!("Mean LCP is {:.0} ms (above {:.0} ms)", averages.lcp, POOR_LCP_MS),
            "Optimize hero images, preload critical resources and reduce server response time",
        ));
    }

    if averages.cls > POOR_CLS {
        issues.push(issue(
            IssueSeverity::High,
            "visual_stability",
            "High Cumulative Layout Shift".to_string(),
            format!("Mean CLS is {:.3} (above {})", averages.cls, POOR_CLS),
            "Reserve space for images, ads and embeds; avoid inserting content above existing content",
        ));
    }

    if averages.tbt > POOR_TBT_MS {
        issues.push(issue(
            IssueSeverity::High,
            "interactivity",
            "High Total Blocking Time".to_string(),
            format!("Mean TBT is {:.0} ms (above {:.0} ms)", averages.tbt, POOR_TBT_MS),
            "Split long tasks, defer non-critical JavaScript and trim third-party scripts",
        ));
    }

    for (page, grade) in pages.iter().zip(grades) {
        if page.performance_score < POOR_PAGE_SCORE {
            issues.push(issue(
                IssueSeverity::Medium,
                "loading",
                format!("Poor Performance Score: {}", grade.url),
                format!(
                    "{} scored {:.0}/100 (grade {})",
                    page.url, page.performance_score, grade.grade.letter
                ),
                "Audit this page individually and address its largest opportunities",
            ));
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoint(label: &str, mean_ms: f64) -> EndpointStats {
        let stats = crate::stats::summarize(&[mean_ms]);
        EndpointStats {
            label: label.to_string(),
            count: 1,
            error_count: 0,
            error_rate: 0.0,
            stats,
        }
    }

    #[test]
    fn test_flags_high_error_rate() {
        let issues = check_error_rate(6.0);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Critical);
        assert_eq!(issues[0].title, "High Error Rate (6.00%)");

        assert!(check_error_rate(5.0).is_empty());
    }

    #[test]
    fn test_response_time_escalates() {
        assert!(check_response_time(3000.0).is_empty());
        assert_eq!(check_response_time(3500.0)[0].severity, IssueSeverity::High);
        assert_eq!(check_response_time(5500.0)[0].severity, IssueSeverity::Critical);
    }

    #[test]
    fn test_only_top_three_slow_endpoints() {
        let endpoints: BTreeMap<String, EndpointStats> = [
            ("a", 11_000.0),
            ("b", 12_000.0),
            ("c", 13_000.0),
            ("d", 14_000.0),
            ("e", 200.0),
        ]
        .into_iter()
        .map(|(label, ms)| (label.to_string(), endpoint(label, ms)))
        .collect();

        let issues = check_slow_endpoints(&endpoints);
        let titles: Vec<_> = issues.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Extremely Slow Endpoint: d",
                "Extremely Slow Endpoint: c",
                "Extremely Slow Endpoint: b",
            ]
        );
    }

    #[test]
    fn test_backend_issues_sorted_by_severity() {
        let endpoints = BTreeMap::new();
        let issues = check_backend_issues(&BackendSignals {
            error_rate: 8.0,
            avg_response_time: 3500.0,
            sla_compliance: 60.0,
            endpoints: &endpoints,
        });

        let severities: Vec<_> = issues.iter().map(|i| i.severity).collect();
        assert_eq!(
            severities,
            vec![IssueSeverity::Critical, IssueSeverity::High, IssueSeverity::High]
        );
    }

    #[test]
    fn test_healthy_run_has_no_issues() {
        let endpoints = BTreeMap::new();
        let issues = check_backend_issues(&BackendSignals {
            error_rate: 0.5,
            avg_response_time: 200.0,
            sla_compliance: 99.0,
            endpoints: &endpoints,
        });
        assert!(issues.is_empty());
    }
}
