use perf_types::{
    BottleneckAnalysis, BottleneckSignature, CapacityVerdict, Disturbance, StabilityVerdict,
    TestType,
};

fn describe_test_type(test_type: TestType) -> &'static str {
    match test_type {
        TestType::ConstantLoad => "The test applied a constant load",
        TestType::RampUp => "The test ramped load up over time",
        TestType::SpikeTest => "The test applied a sudden load spike",
        TestType::VariableLoad => "The test applied a variable load",
        TestType::Unknown => "The load pattern could not be determined",
    }
}

fn describe_stability(stability: StabilityVerdict) -> &'static str {
    match stability {
        StabilityVerdict::HighlyStable => "the system was highly stable throughout",
        StabilityVerdict::Stable => "the system was stable with occasional disturbances",
        StabilityVerdict::ModeratelyStable => "the system was moderately stable",
        StabilityVerdict::Unstable => "the system was unstable",
        StabilityVerdict::Unknown => "stability could not be assessed",
    }
}

fn describe_capacity(capacity: CapacityVerdict) -> &'static str {
    match capacity {
        CapacityVerdict::AtCapacity => {
            "Response time rose with concurrency, so the system is operating at capacity."
        }
        CapacityVerdict::NearCapacity => {
            "Slowdowns occurred without added load, so the system is running near capacity."
        }
        CapacityVerdict::VariablePerformance => {
            "Response times varied widely independent of load."
        }
        CapacityVerdict::WithinCapacity => "The system handled the load within its capacity.",
        CapacityVerdict::Unknown => "Capacity could not be assessed.",
    }
}

/// Assemble the plain-language summary of a behavior analysis.
pub(crate) fn compose(
    test_type: TestType,
    coverage: f64,
    disturbances: &[Disturbance],
    bottleneck: &BottleneckAnalysis,
    stability: StabilityVerdict,
    capacity: CapacityVerdict,
) -> String {
    let mut text = format!(
        "{} and {} ({:.0}% of the run in steady state). ",
        describe_test_type(test_type),
        describe_stability(stability),
        coverage * 100.0
    );

    match disturbances.len() {
        0 => text.push_str("No disturbances were detected. "),
        1 => text.push_str("1 disturbance was detected. "),
        n => text.push_str(&format!("{n} disturbances were detected. ")),
    }

    match bottleneck.signature {
        BottleneckSignature::BackendBottleneck => text.push_str(&format!(
            "The disturbance pattern indicates a backend bottleneck ({:.0}% confidence). ",
            bottleneck.confidence * 100.0
        )),
        BottleneckSignature::PossibleBackendBottleneck => text.push_str(&format!(
            "A backend bottleneck is possible ({:.0}% confidence). ",
            bottleneck.confidence * 100.0
        )),
        BottleneckSignature::Unknown | BottleneckSignature::None => {}
    }

    text.push_str(describe_capacity(capacity));
    text
}
