//! Power analysis for the two-sided two-proportion z-test.
//!
//! Sample sizes are computed on Cohen's h (see [`proportion_effect_size`]) with a normal
//! approximation and equal allocation between the two groups. The required size is the
//! root of the full two-tailed power equation, not just the usual one-tail shortcut,
//! so small samples with large effects come out right.

use crate::error::{AbTestError, Result};
use crate::testing::effect::proportion_effect_size;
use crate::testing::utils::{check_closed_unit, check_open_unit, standard_normal, z_critical};
use log::{debug, trace};
use statrs::distribution::ContinuousCDF;

pub const DEFAULT_POWER: f64 = 0.8;
pub const DEFAULT_ALPHA: f64 = 0.05;

// Absorbs float noise in `control_rate + desired_effect_size <= 1`, e.g. 0.7 + 0.3.
const RATE_SUM_TOLERANCE: f64 = 1e-12;
const MAX_BISECTIONS: usize = 200;
const MAX_BRACKET_DOUBLINGS: usize = 64;

/// Inputs of a power analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerAnalysisInput {
    /// Baseline conversion rate of the control group.
    pub control_rate: f64,
    /// Absolute uplift to detect, so the treatment rate is `control_rate + desired_effect_size`.
    pub desired_effect_size: f64,
    pub power: f64,
    pub alpha: f64,
}

impl PowerAnalysisInput {
    pub fn new(control_rate: f64, desired_effect_size: f64) -> Self {
        PowerAnalysisInput {
            control_rate,
            desired_effect_size,
            power: DEFAULT_POWER,
            alpha: DEFAULT_ALPHA,
        }
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Treatment rate implied by the baseline and the uplift.
    pub fn treatment_rate(&self) -> f64 {
        (self.control_rate + self.desired_effect_size).min(1.0)
    }

    /// Check the input and return its Cohen's h.
    pub fn effect_size(&self) -> Result<f64> {
        check_closed_unit("control rate", self.control_rate)?;
        if !self.desired_effect_size.is_finite() || self.desired_effect_size < 0.0 {
            return Err(AbTestError::invalid(format!(
                "desired effect size must be non-negative, got {}",
                self.desired_effect_size
            )));
        }
        if self.control_rate + self.desired_effect_size > 1.0 + RATE_SUM_TOLERANCE {
            return Err(AbTestError::invalid(format!(
                "control rate plus desired effect size must be at most 1, got {} + {}",
                self.control_rate, self.desired_effect_size
            )));
        }
        if self.desired_effect_size == 0.0 {
            return Err(AbTestError::invalid(
                "desired effect size is zero, no finite sample size can detect it",
            ));
        }
        let effect_size = proportion_effect_size(self.control_rate, self.treatment_rate())?;
        // an uplift below the f64 resolution of the baseline leaves both rates equal
        if effect_size == 0.0 || !effect_size.is_finite() {
            return Err(AbTestError::invalid(format!(
                "desired effect size {} does not change the control rate {}",
                self.desired_effect_size, self.control_rate
            )));
        }
        Ok(effect_size)
    }

    pub fn required_sample_size(&self) -> Result<u64> {
        required_sample_size(
            self.control_rate,
            self.desired_effect_size,
            self.power,
            self.alpha,
        )
    }
}

/// Power of the two-sided test at `nobs` observations per group.
///
/// With `d = |h|·√(n/2)` and `c = z(1 − α/2)` this is `1 − Φ(c − d) + Φ(−c − d)`.
/// At `nobs = 0` the power equals `alpha`.
pub fn achieved_power(effect_size: f64, nobs: f64, alpha: f64) -> Result<f64> {
    check_open_unit("alpha", alpha)?;
    if !nobs.is_finite() || nobs < 0.0 {
        return Err(AbTestError::invalid(format!(
            "observations per group must be non-negative, got {}",
            nobs
        )));
    }
    if !effect_size.is_finite() {
        return Err(AbTestError::invalid("effect size must be finite"));
    }
    Ok(power_unchecked(effect_size.abs(), nobs, alpha))
}

fn power_unchecked(effect_size: f64, nobs: f64, alpha: f64) -> f64 {
    let normal = standard_normal();
    let crit = z_critical(alpha);
    let shift = effect_size * (nobs / 2.0).sqrt();
    (1.0 - normal.cdf(crit - shift)) + normal.cdf(-crit - shift)
}

/// Minimum number of observations **per group** needed to detect an absolute uplift of
/// `desired_effect_size` over `control_rate` with the given power and significance level.
///
/// # Arguments
///
/// * `control_rate` - Baseline conversion rate in [0, 1]
/// * `desired_effect_size` - Absolute uplift, with `control_rate + desired_effect_size <= 1`
/// * `power` - Target power in (0, 1), usually [`DEFAULT_POWER`]
/// * `alpha` - Two-sided significance level in (0, 1), usually [`DEFAULT_ALPHA`]
///
/// # Returns
///
/// The continuous solution rounded half-to-even, never less than 1.
///
/// # Errors
///
/// `InvalidInput` for a zero effect (including an uplift too small to change the rate in
/// `f64`), out-of-range rates, `power`/`alpha` outside (0, 1), `power <= alpha` (the test
/// already has power `alpha` with no data at all), or a size that does not fit in `u64`.
pub fn required_sample_size(
    control_rate: f64,
    desired_effect_size: f64,
    power: f64,
    alpha: f64,
) -> Result<u64> {
    check_open_unit("power", power)?;
    check_open_unit("alpha", alpha)?;
    if power <= alpha {
        return Err(AbTestError::invalid(format!(
            "power ({}) must exceed alpha ({})",
            power, alpha
        )));
    }

    let input = PowerAnalysisInput {
        control_rate,
        desired_effect_size,
        power,
        alpha,
    };
    let effect_size = input.effect_size()?.abs();
    let nobs = solve_nobs(effect_size, power, alpha)?;

    debug!(
        "power analysis: rates {} -> {}, h = {:.6}, n = {:.4}",
        control_rate,
        input.treatment_rate(),
        effect_size,
        nobs
    );

    let rounded = nobs.round_ties_even();
    if !rounded.is_finite() || rounded >= u64::MAX as f64 {
        return Err(AbTestError::invalid(format!(
            "required sample size for effect size {} is too large to represent",
            effect_size
        )));
    }
    Ok((rounded as u64).max(1))
}

/// Solve `power(n) = target` for continuous `n` by bisection on a bracketing interval.
fn solve_nobs(effect_size: f64, target: f64, alpha: f64) -> Result<f64> {
    let z_alpha = z_critical(alpha);
    let z_power = standard_normal().inverse_cdf(target);
    let estimate = 2.0 * ((z_alpha + z_power) / effect_size).powi(2);

    // The far tail only adds power, so the one-tail estimate is normally an upper bound.
    let mut upper = estimate.max(f64::MIN_POSITIVE);
    let mut doublings = 0;
    while power_unchecked(effect_size, upper, alpha) < target {
        if doublings == MAX_BRACKET_DOUBLINGS {
            return Err(AbTestError::invalid(format!(
                "could not bracket the sample size for effect size {}",
                effect_size
            )));
        }
        upper *= 2.0;
        doublings += 1;
    }
    let mut lower = 0.0;
    debug!("sample size bracket: [{}, {}]", lower, upper);

    for iteration in 0..MAX_BISECTIONS {
        let mid = 0.5 * (lower + upper);
        if power_unchecked(effect_size, mid, alpha) < target {
            lower = mid;
        } else {
            upper = mid;
        }
        trace!("bisection {}: [{}, {}]", iteration, lower, upper);
        if upper - lower <= 1e-10 * upper.max(1.0) {
            break;
        }
    }

    Ok(0.5 * (lower + upper))
}
