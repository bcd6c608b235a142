//! Console reporter
//!
//! Plain-text summary with ASCII tables for percentiles and category scores.

use anyhow::Result;
use std::fmt::Write;

use perf_types::{
    AnalysisResult, CategoryScore, FrontendAnalysis, Grade, Issue, PercentileStats,
    ReleaseVerdict,
};

use super::Report;

const RULE: &str = "────────────────────────────────────────────────────────────────";

pub struct ConsoleReporter;

impl ConsoleReporter {
    pub fn format(report: Report<'_>) -> Result<String> {
        let mut output = String::new();
        match report {
            Report::Analysis(result) => Self::format_analysis(&mut output, result)?,
            Report::Frontend(result) => Self::format_frontend(&mut output, result)?,
            Report::Release(verdict) => Self::format_release(&mut output, verdict)?,
        }
        Ok(output)
    }

    fn header(output: &mut String, title: &str) -> Result<()> {
        writeln!(output)?;
        writeln!(output, "╔══════════════════════════════════════════════════════════════╗")?;
        writeln!(output, "║{:^62}║", title)?;
        writeln!(output, "╚══════════════════════════════════════════════════════════════╝")?;
        writeln!(output)?;
        Ok(())
    }

    fn format_analysis(output: &mut String, result: &AnalysisResult) -> Result<()> {
        Self::header(output, "PERFORMANCE ANALYSIS")?;

        if let (Some(start), Some(end)) = (&result.start_time, &result.end_time) {
            writeln!(output, "Window:      {} .. {}", start, end)?;
        }
        if result.run_count > 1 {
            writeln!(output, "Runs:        {}", result.run_count)?;
        }
        writeln!(
            output,
            "Samples:     {} ({} errors, {:.2}%)",
            result.total_samples, result.total_errors, result.error_rate
        )?;
        writeln!(output, "Duration:    {:.1}s", result.duration_secs)?;
        writeln!(output, "Throughput:  {:.2} req/s", result.throughput)?;
        writeln!(output, "SLA:         {:.1}% compliant", result.sla_compliance)?;
        writeln!(output)?;

        Self::format_grade(output, &result.grade)?;
        Self::format_categories(output, &result.categories)?;

        writeln!(output, "  ┌──────────────┬─────────┬─────────┬─────────┬─────────┬─────────┐")?;
        writeln!(output, "  │ Metric (ms)  │  Mean   │   P50   │   P95   │   P99   │   Max   │")?;
        writeln!(output, "  ├──────────────┼─────────┼─────────┼─────────┼─────────┼─────────┤")?;
        if let Some(stats) = &result.response_time {
            Self::format_stats_row(output, "Response", stats)?;
        }
        if let Some(stats) = &result.latency {
            Self::format_stats_row(output, "Latency", stats)?;
        }
        if let Some(stats) = &result.connect_time {
            Self::format_stats_row(output, "Connect", stats)?;
        }
        for endpoint in result.endpoints.values() {
            if let Some(stats) = &endpoint.stats {
                Self::format_stats_row(output, &endpoint.label, stats)?;
            }
        }
        writeln!(output, "  └──────────────┴─────────┴─────────┴─────────┴─────────┴─────────┘")?;
        writeln!(output)?;

        writeln!(output, "Behavior:     {}", result.behavior.narrative)?;
        writeln!(output, "Distribution: {}", result.distribution.narrative)?;
        for cause in &result.distribution.root_causes {
            writeln!(output, "  • {} ({})", cause.diagnosis, cause.symptom)?;
        }
        writeln!(output)?;

        Self::format_issues(output, &result.issues)?;

        if !result.recommendations.is_empty() {
            writeln!(output, "Recommendations:")?;
            for rec in &result.recommendations {
                writeln!(output, "  [{:?}] {} ({})", rec.priority, rec.title, rec.category)?;
                for action in &rec.actions {
                    writeln!(output, "      - {}", action)?;
                }
            }
            writeln!(output)?;
        }

        if !result.roadmap.phases.is_empty() {
            writeln!(output, "Roadmap to {:.0}:", result.roadmap.target_score)?;
            for phase in &result.roadmap.phases {
                writeln!(
                    output,
                    "  {} ({}): +{:.1} -> {:.1}",
                    phase.name, phase.timeframe, phase.expected_gain, phase.projected_score
                )?;
            }
            writeln!(output)?;
        }

        Ok(())
    }

    fn format_frontend(output: &mut String, result: &FrontendAnalysis) -> Result<()> {
        Self::header(output, "PAGE SPEED ANALYSIS")?;

        let avg = &result.averages;
        writeln!(output, "Pages:  {}", result.pages.len())?;
        writeln!(
            output,
            "Means:  FCP {:.0}ms, LCP {:.0}ms, SI {:.0}ms, TBT {:.0}ms, TTI {:.0}ms, CLS {:.3}",
            avg.fcp, avg.lcp, avg.speed_index, avg.tbt, avg.tti, avg.cls
        )?;
        writeln!(output)?;

        Self::format_grade(output, &result.grade)?;
        Self::format_categories(output, &result.categories)?;

        for page in &result.pages {
            writeln!(
                output,
                "  {:<48} {:>3} ({:.1})",
                page.url, page.grade.letter, page.grade.score
            )?;
        }
        writeln!(output)?;

        Self::format_issues(output, &result.issues)
    }

    fn format_release(output: &mut String, verdict: &ReleaseVerdict) -> Result<()> {
        Self::header(output, "RELEASE READINESS")?;

        writeln!(output, "Verdict:      {}", verdict.verdict)?;
        writeln!(output, "Score:        {:.1}", verdict.overall_score)?;
        writeln!(output, "  Backend:    {:.1}", verdict.backend_score)?;
        writeln!(output, "  Frontend:   {:.1}", verdict.frontend_score)?;
        writeln!(output, "  Reliability:{:>6.1}", verdict.reliability_score)?;

        if !verdict.blocking_reasons.is_empty() {
            writeln!(output)?;
            writeln!(output, "Blocking:")?;
            for reason in &verdict.blocking_reasons {
                writeln!(output, "  ✗ {}", reason)?;
            }
        }
        if !verdict.risk_factors.is_empty() {
            writeln!(output)?;
            writeln!(output, "Risks:")?;
            for risk in &verdict.risk_factors {
                writeln!(output, "  • {}", risk)?;
            }
        }
        writeln!(output)?;
        Ok(())
    }

    fn format_grade(output: &mut String, grade: &Grade) -> Result<()> {
        writeln!(output, "{}", RULE)?;
        writeln!(
            output,
            "Grade: {} ({:.1}/100) - {}",
            grade.letter,
            grade.score,
            grade.description()
        )?;
        writeln!(output, "{}", RULE)?;
        writeln!(output)?;
        Ok(())
    }

    fn format_categories(output: &mut String, categories: &[CategoryScore]) -> Result<()> {
        for category in categories {
            writeln!(
                output,
                "  {:<18} {:>5.1}  (weight {:>2.0}%)  {}",
                category.name, category.score, category.weight, category.reason
            )?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn format_issues(output: &mut String, issues: &[Issue]) -> Result<()> {
        if issues.is_empty() {
            return Ok(());
        }
        writeln!(output, "Issues:")?;
        for issue in issues {
            writeln!(
                output,
                "  ✗ [{:?}] {}: {}",
                issue.severity, issue.title, issue.description
            )?;
        }
        writeln!(output)?;
        Ok(())
    }

    fn format_stats_row(output: &mut String, name: &str, stats: &PercentileStats) -> Result<()> {
        let label: String = name.chars().take(12).collect();
        writeln!(
            output,
            "  │ {:<12} │ {:>7.0} │ {:>7.0} │ {:>7.0} │ {:>7.0} │ {:>7.0} │",
            label, stats.mean, stats.median, stats.p95, stats.p99, stats.max
        )?;
        Ok(())
    }
}
