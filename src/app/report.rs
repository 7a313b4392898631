//! Human-readable sentences for every result the screens show.

use crate::data::DatasetSummary;
use crate::testing::effect::relative_uplift;
use crate::testing::power::PowerAnalysisInput;
use crate::testing::utils::round_to;
use crate::testing::{ConfidenceInterval, Decision, ProportionTestResult};

/// Convert a fraction to a percentage rounded to two decimals.
///
/// Scaling happens before rounding, so 0.12345 becomes 12.35 and not 12.34 or 12.350000001.
pub fn percent(fraction: f64) -> f64 {
    round_to(fraction * 100.0, 2)
}

fn optional_percent(fraction: Option<f64>) -> String {
    match fraction {
        Some(f) => format!("{}%", percent(f)),
        None => "n/a".to_string(),
    }
}

pub fn power_analysis_sentence(input: &PowerAnalysisInput, required_size: u64) -> String {
    format!(
        "The required size to obtain an effect size of {}%, given an {}% power test and \
         significance level of {}% should at least consist of {} observations per group.",
        percent(input.desired_effect_size),
        percent(input.power),
        percent(input.alpha),
        required_size
    )
}

pub fn decision_sentence(result: &ProportionTestResult, alpha: f64) -> String {
    let p_value = round_to(result.p_value, 3);
    match result.decision(alpha) {
        Decision::Reject => format!(
            "With a p-value of {} we reject the null hypothesis and therefore there is a \
             statistically significant difference between both groups.",
            p_value
        ),
        Decision::FailToReject => format!(
            "With a p-value of {} we fail to reject the null hypothesis and therefore there is \
             not enough evidence to suggest there is a statistically significant difference \
             between both groups.",
            p_value
        ),
    }
}

pub fn interval_sentence(group: &str, interval: &ConfidenceInterval) -> String {
    format!(
        "The confidence interval for the {} group is [{}, {}].",
        group,
        round_to(interval.lower, 3),
        round_to(interval.upper, 3)
    )
}

fn uplift_sentence(result: &ProportionTestResult) -> String {
    let points = round_to(result.uplift() * 100.0, 2);
    let relative = match relative_uplift(result.control_rate, result.treatment_rate) {
        Some(r) => format!(", {}% relative", percent(r)),
        None => String::new(),
    };
    format!(
        "The treatment group converted at {}% against {}% in the control group ({} percentage points{}).",
        percent(result.treatment_rate),
        percent(result.control_rate),
        points,
        relative
    )
}

/// Decision, both intervals and the observed uplift.
pub fn test_outcome_lines(result: &ProportionTestResult, alpha: f64) -> Vec<String> {
    vec![
        decision_sentence(result, alpha),
        interval_sentence("control", &result.control_interval),
        interval_sentence("treatment", &result.treatment_interval),
        uplift_sentence(result),
    ]
}

pub fn dataset_insight_lines(summary: &DatasetSummary) -> Vec<String> {
    let counts = &summary.counts;
    vec![
        "Some insights about the file provided:".to_string(),
        format!(
            "1. There are {} observations: {} belong to the control group (around {}) and {} to \
             the treatment group (around {}).",
            summary.total_rows,
            counts.control_observations,
            optional_percent(summary.control_share()),
            counts.treatment_observations,
            optional_percent(summary.treatment_share())
        ),
        format!(
            "2. There are {} conversions in the control group and {} in the treatment group.",
            counts.control_conversions, counts.treatment_conversions
        ),
        format!(
            "3. The conversion rate is around {} in the control group and {} in the treatment group.",
            optional_percent(summary.control_rate()),
            optional_percent(summary.treatment_rate())
        ),
    ]
}
