//! Two-proportion z-test and Wald confidence intervals.
//!
//! The test uses the pooled rate under the null hypothesis of equal proportions. Intervals
//! are the plain normal-approximation (Wald) intervals without continuity correction, and
//! are not clamped to [0, 1].

use crate::error::{AbTestError, Result};
use crate::testing::utils::{check_open_unit, standard_normal, z_critical};
use crate::testing::{Alternative, ConfidenceInterval, ExperimentCounts, ProportionTestResult};
use log::debug;
use statrs::distribution::ContinuousCDF;

/// Raw output of [`proportions_z_test`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZTestOutcome {
    pub statistic: f64,
    pub p_value: f64,
    pub pooled_rate: f64,
    pub standard_error: f64,
}

fn require_observations(counts: &ExperimentCounts) -> Result<()> {
    counts.validate()?;
    if counts.control_observations == 0 {
        return Err(AbTestError::invalid("control group has zero observations"));
    }
    if counts.treatment_observations == 0 {
        return Err(AbTestError::invalid("treatment group has zero observations"));
    }
    Ok(())
}

/// Perform a pooled two-proportion z-test of treatment against control.
///
/// `z = (rate_t − rate_c) / √(p(1 − p)(1/n_c + 1/n_t))` with `p` the pooled rate.
/// When `p` is 0 or 1 both groups have the same rate and the standard error vanishes;
/// the statistic is then reported as 0 with a p-value of 1.
pub fn proportions_z_test(
    counts: &ExperimentCounts,
    alternative: Alternative,
) -> Result<ZTestOutcome> {
    require_observations(counts)?;

    let n_control = counts.control_observations as f64;
    let n_treatment = counts.treatment_observations as f64;
    let control_rate = counts.control_conversions as f64 / n_control;
    let treatment_rate = counts.treatment_conversions as f64 / n_treatment;

    let pooled_rate = counts
        .pooled_rate()
        .ok_or_else(|| AbTestError::invalid("experiment has no observations"))?;
    let standard_error =
        (pooled_rate * (1.0 - pooled_rate) * (1.0 / n_control + 1.0 / n_treatment)).sqrt();

    if standard_error == 0.0 {
        return Ok(ZTestOutcome {
            statistic: 0.0,
            p_value: 1.0,
            pooled_rate,
            standard_error,
        });
    }

    let statistic = (treatment_rate - control_rate) / standard_error;
    let normal = standard_normal();
    let p_value = match alternative {
        Alternative::TwoSided => 2.0 * (1.0 - normal.cdf(statistic.abs())),
        Alternative::Less => normal.cdf(statistic),
        Alternative::Greater => 1.0 - normal.cdf(statistic),
    };

    Ok(ZTestOutcome {
        statistic,
        p_value: p_value.clamp(0.0, 1.0),
        pooled_rate,
        standard_error,
    })
}

/// Wald confidence interval for a single proportion at significance level `alpha`.
///
/// # Arguments
///
/// * `conversions` - Number of successes
/// * `observations` - Number of trials, must be positive
/// * `alpha` - Two-sided significance level, 0.05 gives a 95% interval
pub fn wald_interval(
    conversions: u64,
    observations: u64,
    alpha: f64,
) -> Result<ConfidenceInterval> {
    check_open_unit("alpha", alpha)?;
    if observations == 0 {
        return Err(AbTestError::invalid(
            "cannot build an interval from zero observations",
        ));
    }
    if conversions > observations {
        return Err(AbTestError::invalid(format!(
            "conversions ({}) exceed observations ({})",
            conversions, observations
        )));
    }

    let n = observations as f64;
    let rate = conversions as f64 / n;
    let half_width = z_critical(alpha) * (rate * (1.0 - rate) / n).sqrt();

    Ok(ConfidenceInterval::new(rate - half_width, rate + half_width))
}

/// Evaluate an experiment with a two-sided pooled z-test and per-group Wald intervals.
///
/// # Arguments
///
/// * `control_observations`, `treatment_observations` - Group sizes, both must be positive
/// * `control_conversions`, `treatment_conversions` - Conversions, at most the group size
/// * `alpha` - Significance level of the intervals, conventionally 0.05
///
/// # Returns
///
/// A [`ProportionTestResult`]; use [`ProportionTestResult::decision`] to apply the
/// rejection rule.
pub fn evaluate(
    control_observations: u64,
    treatment_observations: u64,
    control_conversions: u64,
    treatment_conversions: u64,
    alpha: f64,
) -> Result<ProportionTestResult> {
    let counts = ExperimentCounts::new(
        control_observations,
        treatment_observations,
        control_conversions,
        treatment_conversions,
    )?;
    evaluate_counts(&counts, alpha)
}

pub fn evaluate_counts(counts: &ExperimentCounts, alpha: f64) -> Result<ProportionTestResult> {
    check_open_unit("alpha", alpha)?;
    let outcome = proportions_z_test(counts, Alternative::TwoSided)?;

    let control_interval =
        wald_interval(counts.control_conversions, counts.control_observations, alpha)?;
    let treatment_interval = wald_interval(
        counts.treatment_conversions,
        counts.treatment_observations,
        alpha,
    )?;

    let control_rate = counts.control_conversions as f64 / counts.control_observations as f64;
    let treatment_rate =
        counts.treatment_conversions as f64 / counts.treatment_observations as f64;

    debug!(
        "z-test: control {}/{}, treatment {}/{}, z = {:.4}, p = {:.6}",
        counts.control_conversions,
        counts.control_observations,
        counts.treatment_conversions,
        counts.treatment_observations,
        outcome.statistic,
        outcome.p_value
    );

    Ok(ProportionTestResult {
        statistic: outcome.statistic,
        p_value: outcome.p_value,
        control_interval,
        treatment_interval,
        control_rate,
        treatment_rate,
        pooled_rate: outcome.pooled_rate,
        standard_error: outcome.standard_error,
        alpha,
    })
}
