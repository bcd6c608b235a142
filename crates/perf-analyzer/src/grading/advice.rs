//! Recommendations and the improvement roadmap
//!
//! Both are derived purely from category scores: a recommendation per
//! under-performing category, and a three-phase plan that closes the gap to
//! [`ROADMAP_TARGET_SCORE`].

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use perf_types::{CategoryScore, Recommendation, RecommendationPriority, Roadmap, RoadmapPhase};

use super::{PERFORMANCE, RELIABILITY, SCALABILITY, USER_EXPERIENCE};

pub const ROADMAP_TARGET_SCORE: f64 = 90.0;

/// Categories scoring below this get a recommendation
const RECOMMEND_BELOW: f64 = 80.0;
const HIGH_PRIORITY_BELOW: f64 = 50.0;
const MEDIUM_PRIORITY_BELOW: f64 = 70.0;

struct Template {
    title: &'static str,
    actions: &'static [&'static str],
    expected_improvement: &'static str,
}

struct Phase {
    name: &'static str,
    timeframe: &'static str,
    gap_share: f64,
    max_gain: f64,
}

const PHASES: [Phase; 3] = [
    Phase {
        name: "Quick Wins",
        timeframe: "1-2 weeks",
        gap_share: 0.3,
        max_gain: 10.0,
    },
    Phase {
        name: "Optimization",
        timeframe: "2-6 weeks",
        gap_share: 0.4,
        max_gain: 15.0,
    },
    Phase {
        name: "Scaling",
        timeframe: "1-3 months",
        gap_share: 0.3,
        max_gain: 10.0,
    },
];

lazy_static! {
    static ref TEMPLATES: BTreeMap<&'static str, Template> = {
        let mut m = BTreeMap::new();
        m.insert(
            PERFORMANCE,
            Template {
                title: "Reduce response times",
                actions: &[
                    "Profile the slowest endpoints and optimize hot code paths",
                    "Add indexes for slow database queries",
                    "Cache frequently read data",
                    "Compress and paginate large responses",
                ],
                expected_improvement: "20-40% lower average and p95 response time",
            },
        );
        m.insert(
            RELIABILITY,
            Template {
                title: "Improve reliability",
                actions: &[
                    "Investigate the most frequent error codes",
                    "Add retries with backoff for transient downstream failures",
                    "Introduce circuit breakers around external dependencies",
                    "Review timeouts and connection pool limits",
                ],
                expected_improvement: "Error rate back under the target",
            },
        );
        m.insert(
            USER_EXPERIENCE,
            Template {
                title: "Raise SLA compliance",
                actions: &[
                    "Focus on the endpoints that most often exceed the SLA threshold",
                    "Reduce tail latency by moving slow work off the request path",
                    "Set per-endpoint response-time budgets and alert on them",
                ],
                expected_improvement: "More requests served within the SLA threshold",
            },
        );
        m.insert(
            SCALABILITY,
            Template {
                title: "Increase throughput",
                actions: &[
                    "Scale out stateless services horizontally",
                    "Remove contention on shared locks and connection pools",
                    "Run a capacity test to locate the saturation point",
                ],
                expected_improvement: "Higher sustained requests per second at the same latency",
            },
        );
        m
    };
}

fn priority_for(score: f64) -> RecommendationPriority {
    if score < HIGH_PRIORITY_BELOW {
        RecommendationPriority::High
    } else if score < MEDIUM_PRIORITY_BELOW {
        RecommendationPriority::Medium
    } else {
        RecommendationPriority::Low
    }
}

/// One recommendation per category scoring below 80, highest priority first
pub fn recommend(categories: &[CategoryScore]) -> Vec<Recommendation> {
    let mut recommendations: Vec<Recommendation> = categories
        .iter()
        .filter(|c| c.score < RECOMMEND_BELOW)
        .filter_map(|c| {
            let template = TEMPLATES.get(c.name.as_str())?;
            Some(Recommendation {
                category: c.name.clone(),
                priority: priority_for(c.score),
                title: template.title.to_string(),
                actions: template.actions.iter().map(|a| a.to_string()).collect(),
                expected_improvement: template.expected_improvement.to_string(),
            })
        })
        .collect();

    recommendations.sort_by_key(|r| r.priority);
    recommendations
}

/// Three phases splitting the gap to 90 as 30/40/30%, capped at 10/15/10 points.
///
/// Focus areas go weakest category first: the first phase takes the weakest,
/// the second the next two, the last whatever remains.
pub fn build_roadmap(overall: f64, categories: &[CategoryScore]) -> Roadmap {
    let gap = ROADMAP_TARGET_SCORE - overall;
    if gap <= 0.0 {
        return Roadmap {
            current_score: overall,
            target_score: ROADMAP_TARGET_SCORE,
            phases: Vec::new(),
        };
    }

    let mut weakest: Vec<&CategoryScore> = categories.iter().collect();
    weakest.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.name.cmp(&b.name)));
    let names: Vec<String> = weakest.iter().map(|c| c.name.clone()).collect();
    let focus_slices: [&[String]; 3] = [
        names.get(..1).unwrap_or(&[]),
        names.get(1..3.min(names.len())).unwrap_or(&[]),
        names.get(3.min(names.len())..).unwrap_or(&[]),
    ];

    let mut projected = overall;
    let phases = PHASES
        .iter()
        .zip(focus_slices)
        .map(|(phase, focus)| {
            let gain = (gap * phase.gap_share).min(phase.max_gain);
            projected += gain;
            RoadmapPhase {
                name: phase.name.to_string(),
                timeframe: phase.timeframe.to_string(),
                focus: focus.to_vec(),
                expected_gain: gain,
                projected_score: projected,
            }
        })
        .collect();

    Roadmap {
        current_score: overall,
        target_score: ROADMAP_TARGET_SCORE,
        phases,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn category(name: &str, score: f64) -> CategoryScore {
        CategoryScore {
            name: name.to_string(),
            weight: 25.0,
            score,
            metrics: Vec::new(),
            reason: String::new(),
        }
    }

    #[test]
    fn test_recommend_only_weak_categories() {
        let categories = vec![
            category(PERFORMANCE, 95.0),
            category(RELIABILITY, 40.0),
            category(USER_EXPERIENCE, 79.9),
            category(SCALABILITY, 60.0),
        ];

        let recs = recommend(&categories);
        let summary: Vec<_> = recs
            .iter()
            .map(|r| (r.category.as_str(), r.priority))
            .collect();
        assert_eq!(
            summary,
            vec![
                (RELIABILITY, RecommendationPriority::High),
                (SCALABILITY, RecommendationPriority::Medium),
                (USER_EXPERIENCE, RecommendationPriority::Low),
            ]
        );
        assert!(recs.iter().all(|r| !r.actions.is_empty()));
    }

    #[test]
    fn test_no_roadmap_above_target() {
        let roadmap = build_roadmap(92.0, &[]);
        assert!(roadmap.phases.is_empty());
        assert_eq!(roadmap.target_score, 90.0);
    }

    #[test]
    fn test_roadmap_splits_gap() {
        let categories = vec![
            category(PERFORMANCE, 90.0),
            category(RELIABILITY, 50.0),
            category(USER_EXPERIENCE, 70.0),
            category(SCALABILITY, 60.0),
        ];
        let roadmap = build_roadmap(70.0, &categories);

        let gains: Vec<f64> = roadmap.phases.iter().map(|p| p.expected_gain).collect();
        assert_eq!(gains, vec![6.0, 8.0, 6.0]);
        assert_eq!(roadmap.phases[2].projected_score, 90.0);
        assert_eq!(roadmap.phases[0].focus, vec![RELIABILITY.to_string()]);
        assert_eq!(
            roadmap.phases[1].focus,
            vec![SCALABILITY.to_string(), USER_EXPERIENCE.to_string()]
        );
        assert_eq!(roadmap.phases[2].focus, vec![PERFORMANCE.to_string()]);
    }

    #[test]
    fn test_roadmap_caps_each_phase() {
        let roadmap = build_roadmap(20.0, &[]);
        let gains: Vec<f64> = roadmap.phases.iter().map(|p| p.expected_gain).collect();
        assert_eq!(gains, vec![10.0, 15.0, 10.0]);
        assert_eq!(roadmap.phases[2].projected_score, 55.0);
    }
}
