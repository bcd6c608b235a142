//! Page-speed audit grading
//!
//! Scores Web Vitals against the "good" thresholds: loading (FCP, LCP,
//! Speed Index), interactivity (TBT, TTI) and visual stability (CLS).

use perf_types::{
    CategoryScore, Direction, FrontendAnalysis, FrontendAverages, Grade, PageGrade, PageMetrics,
};
use tracing::{info, instrument};

use crate::error::{AnalysisError, Result};
use crate::grading::{category, metric, overall_score};
use crate::rules::check_frontend_issues;
use crate::stats::mean;

pub const LOADING: &str = "loading";
pub const INTERACTIVITY: &str = "interactivity";
pub const VISUAL_STABILITY: &str = "visual_stability";

const FCP_TARGET_MS: f64 = 1800.0;
const LCP_TARGET_MS: f64 = 2500.0;
const SPEED_INDEX_TARGET_MS: f64 = 3400.0;
const TBT_TARGET_MS: f64 = 200.0;
const TTI_TARGET_MS: f64 = 3800.0;
const CLS_TARGET: f64 = 0.1;

const LOADING_WEIGHT: f64 = 40.0;
const INTERACTIVITY_WEIGHT: f64 = 40.0;
const VISUAL_STABILITY_WEIGHT: f64 = 20.0;

/// Grade a set of audited pages.
///
/// # Errors
///
/// Returns [`AnalysisError::EmptyPageSet`] if `pages` is empty.
#[instrument(skip(pages), fields(pages = pages.len()))]
pub fn analyze_pages(pages: &[PageMetrics]) -> Result<FrontendAnalysis> {
    if pages.is_empty() {
        return Err(AnalysisError::EmptyPageSet);
    }

    let averages = average_metrics(pages);
    let categories = score_vitals(
        averages.fcp,
        averages.lcp,
        averages.speed_index,
        averages.tbt,
        averages.tti,
        averages.cls,
    );
    let grade = Grade::from_score(overall_score(&categories));

    let page_grades: Vec<PageGrade> = pages
        .iter()
        .map(|page| {
            let categories =
                score_vitals(page.fcp, page.lcp, page.speed_index, page.tbt, page.tti, page.cls);
            PageGrade {
                url: page.url.clone(),
                title: page.title.clone(),
                grade: Grade::from_score(overall_score(&categories)),
                categories,
            }
        })
        .collect();

    let issues = check_frontend_issues(&averages, pages, &page_grades);

    info!(
        pages = pages.len(),
        score = grade.score,
        grade = %grade.letter,
        "Pages analyzed"
    );

    Ok(FrontendAnalysis {
        pages: page_grades,
        averages,
        categories,
        grade,
        issues,
    })
}

fn average_metrics(pages: &[PageMetrics]) -> FrontendAverages {
    let avg = |field: fn(&PageMetrics) -> f64| mean(&pages.iter().map(field).collect::<Vec<_>>());
    let ttfb: Vec<f64> = pages.iter().filter_map(|p| p.ttfb).collect();

    FrontendAverages {
        fcp: avg(|p| p.fcp),
        lcp: avg(|p| p.lcp),
        speed_index: avg(|p| p.speed_index),
        tbt: avg(|p| p.tbt),
        cls: avg(|p| p.cls),
        tti: avg(|p| p.tti),
        performance_score: avg(|p| p.performance_score),
        ttfb: if ttfb.is_empty() { None } else { Some(mean(&ttfb)) },
    }
}

fn score_vitals(
    fcp: f64,
    lcp: f64,
    speed_index: f64,
    tbt: f64,
    tti: f64,
    cls: f64,
) -> Vec<CategoryScore> {
    let lower = Direction::LowerIsBetter;
    vec![
        category(
            LOADING,
            LOADING_WEIGHT,
            vec![
                metric("fcp", fcp, FCP_TARGET_MS, lower),
                metric("lcp", lcp, LCP_TARGET_MS, lower),
                metric("speed_index", speed_index, SPEED_INDEX_TARGET_MS, lower),
            ],
            format!("FCP {:.0} ms, LCP {:.0} ms, Speed Index {:.0} ms", fcp, lcp, speed_index),
        ),
        category(
            INTERACTIVITY,
            INTERACTIVITY_WEIGHT,
            vec![
                metric("tbt", tbt, TBT_TARGET_MS, lower),
                metric("tti", tti, TTI_TARGET_MS, lower),
            ],
            format!("TBT {:.0} ms, TTI {:.0} ms", tbt, tti),
        ),
        category(
            VISUAL_STABILITY,
            VISUAL_STABILITY_WEIGHT,
            vec![metric("cls", cls, CLS_TARGET, lower)],
            format!("CLS {:.3}", cls),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use perf_types::{GradeLetter, IssueSeverity};

    fn page(url: &str, lcp: f64, cls: f64, tbt: f64, score: f64) -> PageMetrics {
        PageMetrics {
            url: url.to_string(),
            title: String::new(),
            fcp: 1200.0,
            lcp,
            speed_index: 2000.0,
            tbt,
            cls,
            tti: 3000.0,
            performance_score: score,
            ttfb: None,
        }
    }

    #[test]
    fn test_empty_pages_rejected() {
        assert_eq!(analyze_pages(&[]), Err(AnalysisError::EmptyPageSet));
    }

    #[test]
    fn test_fast_page_scores_a_plus() {
        let result = analyze_pages(&[page("/", 2000.0, 0.05, 100.0, 95.0)]).unwrap();
        assert_eq!(result.grade.letter, GradeLetter::APlus);
        assert!(result.issues.is_empty());
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.averages.ttfb, None);
    }

    #[test]
    fn test_averages_across_pages() {
        let result = analyze_pages(&[
            page("/a", 2000.0, 0.0, 100.0, 90.0),
            page("/b", 4000.0, 0.2, 300.0, 70.0),
        ])
        .unwrap();

        assert_eq!(result.averages.lcp, 3000.0);
        assert_eq!(result.averages.tbt, 200.0);
        assert_eq!(result.averages.performance_score, 80.0);
        assert!(result.pages[0].grade.score > result.pages[1].grade.score);
    }

    #[test]
    fn test_poor_vitals_raise_issues() {
        let mut bad = page("/slow", 6000.0, 0.4, 900.0, 30.0);
        bad.ttfb = Some(1200.0);
        let result = analyze_pages(&[bad]).unwrap();

        let titles: Vec<_> = result.issues.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Slow Largest Contentful Paint",
                "High Cumulative Layout Shift",
                "High Total Blocking Time",
                "Poor Performance Score: /slow",
            ]
        );
        assert_eq!(result.issues[3].severity, IssueSeverity::Medium);
        assert_eq!(result.averages.ttfb, Some(1200.0));
    }

    #[test]
    fn test_weights() {
        let result = analyze_pages(&[page("/", 2000.0, 0.05, 100.0, 95.0)]).unwrap();
        let weights: Vec<f64> = result.categories.iter().map(|c| c.weight).collect();
        assert_eq!(weights, vec![40.0, 40.0, 20.0]);
    }
}
