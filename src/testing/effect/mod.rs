//! Effect size measures for comparing two proportions.

use crate::error::Result;
use crate::testing::utils::check_closed_unit;

/// Calculate Cohen's h, the arcsine-transformed difference between two proportions.
///
/// `h = 2·asin(√p2) − 2·asin(√p1)`. The transform stabilises the variance of a
/// proportion, so the same `|h|` needs the same sample size regardless of baseline.
/// The sign follows the direction of change from `p1` to `p2`.
pub fn proportion_effect_size(p1: f64, p2: f64) -> Result<f64> {
    check_closed_unit("first proportion", p1)?;
    check_closed_unit("second proportion", p2)?;

    Ok(2.0 * p2.sqrt().asin() - 2.0 * p1.sqrt().asin())
}

/// Relative uplift of `treatment_rate` over `control_rate`, `None` for a zero baseline.
pub fn relative_uplift(control_rate: f64, treatment_rate: f64) -> Option<f64> {
    if control_rate == 0.0 {
        return None;
    }
    Some((treatment_rate - control_rate) / control_rate)
}
