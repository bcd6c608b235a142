use perf_types::{Answer, BusinessAnswer, DistributionType};

use crate::rules::Signals;

const STABLE_QUESTION: &str = "Is the system performing consistently?";
const RESOURCES_QUESTION: &str = "Are resources sufficient for this load?";
const CONTENTION_QUESTION: &str = "Is there resource contention?";
const BOTTLENECK_QUESTION: &str = "Is there a performance bottleneck?";

/// Below this coefficient of variation a well-shaped run counts as fully consistent
const CONSISTENT_CV: f64 = 0.3;

/// SLA compliance (percent) at or above which resources count as sufficient
const SUFFICIENT_SLA_PCT: f64 = 95.0;
/// Below this SLA compliance resources are insufficient
const PARTIAL_SLA_PCT: f64 = 80.0;
const SUFFICIENT_ERROR_RATE_PCT: f64 = 1.0;
const PARTIAL_ERROR_RATE_PCT: f64 = 5.0;
/// Average response time (ms) above which the run has a bottleneck
const AVG_TARGET_MS: f64 = 1000.0;
/// p99/p95 ratio above which the slowest requests form a separate tail
const TAIL_RATIO: f64 = 2.0;

pub(crate) fn narrative(distribution_type: DistributionType) -> &'static str {
    match distribution_type {
        DistributionType::Normal => {
            "Response times cluster symmetrically around the mean. Most users get a predictable experience."
        }
        DistributionType::RightSkewed => {
            "Most requests are fast but a long tail of slow requests pulls the mean above the median. A subset of users experiences significant delays."
        }
        DistributionType::LeftSkewed => {
            "Most requests sit near the upper end of the range with a few unusually fast responses, often cached or short-circuited requests."
        }
        DistributionType::Multimodal => {
            "Response times form several distinct clusters, which points to different code paths, cache hits versus misses, or mixed endpoint behavior."
        }
        DistributionType::HighVariance => {
            "Response times vary widely without a clear shape. Performance is unpredictable for users."
        }
        DistributionType::InsufficientData => {
            "Not enough samples to characterize the response-time distribution."
        }
    }
}

fn answer(question: &str, answer: Answer, explanation: &str) -> BusinessAnswer {
    BusinessAnswer {
        question: question.to_string(),
        answer,
        explanation: explanation.to_string(),
    }
}

/// Four stakeholder answers for a distribution shape.
///
/// The shape sets the starting answer; run signals then gate resource
/// sufficiency (SLA compliance, error rate) and bottleneck presence
/// (average response time, p99/p95 tail ratio).
pub(crate) fn business_answers(
    distribution_type: DistributionType,
    coefficient_of_variation: f64,
    signals: &Signals,
) -> Vec<BusinessAnswer> {
    if distribution_type == DistributionType::InsufficientData {
        return Vec::new();
    }

    vec![
        stability(distribution_type, coefficient_of_variation),
        resources(distribution_type, signals),
        contention(distribution_type),
        bottleneck(distribution_type, signals),
    ]
}

fn stability(distribution_type: DistributionType, cv: f64) -> BusinessAnswer {
    let consistent = cv < CONSISTENT_CV;
    match distribution_type {
        DistributionType::Normal if consistent => {
            answer(STABLE_QUESTION, Answer::Yes, "Response times are tightly grouped around the mean")
        }
        DistributionType::Normal => {
            answer(STABLE_QUESTION, Answer::Mostly, "The shape is symmetric but the spread is wide")
        }
        DistributionType::LeftSkewed if consistent => {
            answer(STABLE_QUESTION, Answer::Yes, "Most requests complete in a narrow band")
        }
        DistributionType::LeftSkewed => answer(
            STABLE_QUESTION,
            Answer::Mostly,
            "Most requests complete in a narrow band with some outliers",
        ),
        DistributionType::RightSkewed => answer(
            STABLE_QUESTION,
            Answer::Mostly,
            "Typical requests are consistent but the slow tail is not",
        ),
        DistributionType::Multimodal => answer(
            STABLE_QUESTION,
            Answer::Partially,
            "Each cluster is consistent but users land in different clusters",
        ),
        DistributionType::HighVariance | DistributionType::InsufficientData => {
            answer(STABLE_QUESTION, Answer::No, "Response times are spread too widely to be predictable")
        }
    }
}

fn resources(distribution_type: DistributionType, signals: &Signals) -> BusinessAnswer {
    let clean_shape = matches!(
        distribution_type,
        DistributionType::Normal | DistributionType::LeftSkewed
    );

    if signals.sla_compliance < PARTIAL_SLA_PCT || signals.error_rate > PARTIAL_ERROR_RATE_PCT {
        answer(
            RESOURCES_QUESTION,
            Answer::No,
            &format!(
                "Only {:.1}% of requests met the SLA with a {:.2}% error rate",
                signals.sla_compliance, signals.error_rate
            ),
        )
    } else if signals.sla_compliance < SUFFICIENT_SLA_PCT
        || signals.error_rate > SUFFICIENT_ERROR_RATE_PCT
    {
        answer(
            RESOURCES_QUESTION,
            Answer::Partially,
            &format!(
                "{:.1}% of requests met the SLA; part of the traffic runs short",
                signals.sla_compliance
            ),
        )
    } else if clean_shape {
        answer(RESOURCES_QUESTION, Answer::Yes, "SLA is met and no tail indicates requests waiting on resources")
    } else {
        answer(
            RESOURCES_QUESTION,
            Answer::Mostly,
            "SLA is met overall but the shape shows some requests waiting on resources",
        )
    }
}

fn contention(distribution_type: DistributionType) -> BusinessAnswer {
    match distribution_type {
        DistributionType::Normal => {
            answer(CONTENTION_QUESTION, Answer::No, "A symmetric distribution shows no queuing effects")
        }
        DistributionType::LeftSkewed => {
            answer(CONTENTION_QUESTION, Answer::No, "Fast outliers do not indicate contention")
        }
        DistributionType::RightSkewed => answer(
            CONTENTION_QUESTION,
            Answer::Yes,
            "The long tail is characteristic of requests queuing for shared resources",
        ),
        DistributionType::Multimodal => answer(
            CONTENTION_QUESTION,
            Answer::Yes,
            "Distinct clusters often come from requests that wait versus requests that do not",
        ),
        DistributionType::HighVariance | DistributionType::InsufficientData => {
            answer(CONTENTION_QUESTION, Answer::Yes, "Wide variance is a common symptom of contention")
        }
    }
}

fn bottleneck(distribution_type: DistributionType, signals: &Signals) -> BusinessAnswer {
    if signals.avg > AVG_TARGET_MS {
        return answer(
            BOTTLENECK_QUESTION,
            Answer::Yes,
            &format!("Average response time of {:.0} ms is above the {:.0} ms target", signals.avg, AVG_TARGET_MS),
        );
    }
    if signals.p95 > 0.0 && signals.p99 > TAIL_RATIO * signals.p95 {
        return answer(
            BOTTLENECK_QUESTION,
            Answer::Yes,
            &format!("p99 is {:.1}x p95, so the slowest requests hit a constrained component", signals.p99 / signals.p95),
        );
    }

    match distribution_type {
        DistributionType::Normal | DistributionType::LeftSkewed => {
            answer(BOTTLENECK_QUESTION, Answer::No, "Requests are fast and no subset is disproportionately slow")
        }
        DistributionType::RightSkewed => answer(
            BOTTLENECK_QUESTION,
            Answer::Mostly,
            "A subset of requests is held up, though the tail stays within bounds",
        ),
        DistributionType::Multimodal => {
            answer(BOTTLENECK_QUESTION, Answer::Partially, "The slowest cluster points at a specific path")
        }
        DistributionType::HighVariance | DistributionType::InsufficientData => {
            answer(BOTTLENECK_QUESTION, Answer::Partially, "No single bottleneck stands out in the shape alone")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_signals() -> Signals {
        Signals {
            avg: 200.0,
            p95: 260.0,
            p99: 300.0,
            max: 350.0,
            error_rate: 0.0,
            throughput: 50.0,
            sla_compliance: 100.0,
            skewness: 0.0,
        }
    }

    fn slow_signals() -> Signals {
        Signals {
            avg: 5000.0,
            p95: 5400.0,
            p99: 5600.0,
            max: 5900.0,
            sla_compliance: 0.0,
            ..fast_signals()
        }
    }

    fn answer_to(answers: &[BusinessAnswer], question: &str) -> Answer {
        answers
            .iter()
            .find(|a| a.question == question)
            .map(|a| a.answer)
            .expect("question answered")
    }

    #[test]
    fn test_fast_normal_run_is_healthy() {
        let answers = business_answers(DistributionType::Normal, 0.1, &fast_signals());

        assert_eq!(answers.len(), 4);
        assert_eq!(answer_to(&answers, STABLE_QUESTION), Answer::Yes);
        assert_eq!(answer_to(&answers, RESOURCES_QUESTION), Answer::Yes);
        assert_eq!(answer_to(&answers, CONTENTION_QUESTION), Answer::No);
        assert_eq!(answer_to(&answers, BOTTLENECK_QUESTION), Answer::No);
    }

    #[test]
    fn test_slow_normal_run_is_short_on_resources() {
        let answers = business_answers(DistributionType::Normal, 0.05, &slow_signals());

        assert_eq!(answer_to(&answers, RESOURCES_QUESTION), Answer::No);
        assert_eq!(answer_to(&answers, BOTTLENECK_QUESTION), Answer::Yes);
    }

    #[test]
    fn test_partial_sla_is_partially_sufficient() {
        let signals = Signals {
            sla_compliance: 88.0,
            ..fast_signals()
        };
        let answers = business_answers(DistributionType::Normal, 0.1, &signals);
        assert_eq!(answer_to(&answers, RESOURCES_QUESTION), Answer::Partially);
    }

    #[test]
    fn test_error_rate_gates_resources() {
        let signals = Signals {
            error_rate: 7.5,
            ..fast_signals()
        };
        let answers = business_answers(DistributionType::Normal, 0.1, &signals);
        assert_eq!(answer_to(&answers, RESOURCES_QUESTION), Answer::No);
    }

    #[test]
    fn test_heavy_tail_is_a_bottleneck() {
        let signals = Signals {
            p95: 400.0,
            p99: 1200.0,
            ..fast_signals()
        };
        let answers = business_answers(DistributionType::Normal, 0.2, &signals);
        assert_eq!(answer_to(&answers, BOTTLENECK_QUESTION), Answer::Yes);
    }

    #[test]
    fn test_insufficient_data_has_no_answers() {
        assert!(business_answers(DistributionType::InsufficientData, 0.0, &fast_signals()).is_empty());
    }
}
