//! Root-cause library for right-skewed response-time distributions
//!
//! An ordered table of symptom predicates. Every matching rule contributes a
//! hypothesis; matches are returned lowest priority number first, at most
//! [`MAX_ROOT_CAUSES`] of them.

use lazy_static::lazy_static;
use perf_types::{RootCauseHypothesis, RootCauseKind};

pub const MAX_ROOT_CAUSES: usize = 6;

/// Run-level metrics the predicates look at. Times in milliseconds, rates in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Signals {
    pub avg: f64,
    pub p95: f64,
    pub p99: f64,
    pub max: f64,
    pub error_rate: f64,
    pub throughput: f64,
    pub sla_compliance: f64,
    pub skewness: f64,
}

struct RootCauseRule {
    kind: RootCauseKind,
    priority: u8,
    matches: fn(&Signals) -> bool,
    diagnosis: &'static str,
    symptom: &'static str,
    remediation: &'static str,
}

lazy_static! {
    static ref ROOT_CAUSE_RULES: Vec<RootCauseRule> = {
        let mut rules = vec![
            RootCauseRule {
                kind: RootCauseKind::DatabaseBottleneck,
                priority: 1,
                matches: |s| s.avg > 500.0 && s.p95 > 3.0 * s.avg,
                diagnosis: "Slow queries or lock contention in the database",
                symptom: "p95 response time is more than three times the average",
                remediation: "Profile slow queries, add missing indexes and review transaction scope",
            },
            RootCauseRule {
                kind: RootCauseKind::ExternalDependency,
                priority: 2,
                matches: |s| s.p99 > 2.0 * s.p95 && s.error_rate > 1.0,
                diagnosis: "A slow or failing downstream service",
                symptom: "p99 is more than double p95 and requests are failing",
                remediation: "Add timeouts, retries with backoff and circuit breakers around external calls",
            },
            RootCauseRule {
                kind: RootCauseKind::ConnectionPoolExhaustion,
                priority: 3,
                matches: |s| s.max > 10.0 * s.avg && s.error_rate > 0.5,
                diagnosis: "Requests waiting for a free connection",
                symptom: "Occasional requests take over ten times the average alongside errors",
                remediation: "Increase pool sizes and release connections promptly",
            },
            RootCauseRule {
                kind: RootCauseKind::InfrastructureSaturation,
                priority: 4,
                matches: |s| s.avg > 1000.0 && s.sla_compliance < 90.0,
                diagnosis: "CPU, memory or network saturation on the serving hosts",
                symptom: "Average response time above 1s with SLA compliance under 90%",
                remediation: "Check host utilization and scale out or up",
            },
            RootCauseRule {
                kind: RootCauseKind::CachingGap,
                priority: 5,
                matches: |s| s.skewness > 2.0 && s.p95 > 2.0 * s.avg,
                diagnosis: "Cache misses falling through to slow paths",
                symptom: "Strongly skewed distribution with a heavy tail",
                remediation: "Cache hot reads and warm caches before peak traffic",
            },
            RootCauseRule {
                kind: RootCauseKind::MemoryLeak,
                priority: 6,
                matches: |s| s.max > 20.0 * s.avg,
                diagnosis: "Garbage-collection pauses or a growing heap",
                symptom: "Worst-case response time is over twenty times the average",
                remediation: "Capture heap profiles over a long run and tune the collector",
            },
            RootCauseRule {
                kind: RootCauseKind::LoadBalancerImbalance,
                priority: 7,
                matches: |s| s.p99 > 3.0 * s.p95 && s.error_rate < 1.0,
                diagnosis: "Uneven traffic distribution across instances",
                symptom: "A small share of requests is much slower without errors",
                remediation: "Review balancing strategy, health checks and sticky sessions",
            },
            RootCauseRule {
                kind: RootCauseKind::CapacityLimit,
                priority: 8,
                matches: |_| true,
                diagnosis: "The system is approaching its capacity limit",
                symptom: "Response times stretch into a long tail under load",
                remediation: "Run a capacity test to find the saturation point and plan headroom",
            },
        ];
        rules.sort_by_key(|r| r.priority);
        rules
    };
}

/// Hypotheses whose symptoms match, ordered by priority.
pub fn match_root_causes(signals: &Signals) -> Vec<RootCauseHypothesis> {
    ROOT_CAUSE_RULES
        .iter()
        .filter(|rule| (rule.matches)(signals))
        .take(MAX_ROOT_CAUSES)
        .map(|rule| RootCauseHypothesis {
            kind: rule.kind,
            priority: rule.priority,
            diagnosis: rule.diagnosis.to_string(),
            symptom: rule.symptom.to_string(),
            remediation: rule.remediation.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_limit_always_matches() {
        let found = match_root_causes(&Signals::default());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, RootCauseKind::CapacityLimit);
    }

    #[test]
    fn test_database_bottleneck() {
        let signals = Signals {
            avg: 800.0,
            p95: 3000.0,
            p99: 3500.0,
            max: 4000.0,
            sla_compliance: 95.0,
            throughput: 50.0,
            ..Signals::default()
        };
        let found = match_root_causes(&signals);
        assert_eq!(found[0].kind, RootCauseKind::DatabaseBottleneck);
        assert_eq!(found.last().map(|h| h.kind), Some(RootCauseKind::CapacityLimit));
    }

    #[test]
    fn test_results_are_ordered_and_capped() {
        let signals = Signals {
            avg: 1200.0,
            p95: 4000.0,
            p99: 15000.0,
            max: 30000.0,
            error_rate: 2.0,
            throughput: 10.0,
            sla_compliance: 50.0,
            skewness: 4.0,
        };
        let found = match_root_causes(&signals);

        assert_eq!(found.len(), MAX_ROOT_CAUSES);
        assert!(found.windows(2).all(|w| w[0].priority < w[1].priority));
        assert_eq!(found[0].kind, RootCauseKind::DatabaseBottleneck);
    }
}
