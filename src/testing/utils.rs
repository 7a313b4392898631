use crate::error::{AbTestError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// The standard normal distribution N(0, 1).
pub fn standard_normal() -> Normal {
    // mean 0 and std dev 1 are always valid parameters
    Normal::standard()
}

/// Upper-tail critical value `z` such that `P(Z > z) = alpha / 2`.
pub fn z_critical(alpha: f64) -> f64 {
    standard_normal().inverse_cdf(1.0 - alpha / 2.0)
}

/// Check that `value` lies strictly inside (0, 1).
pub fn check_open_unit(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value >= 1.0 {
        return Err(AbTestError::invalid(format!(
            "{} must be in (0, 1), got {}",
            name, value
        )));
    }
    Ok(())
}

/// Check that `value` lies inside [0, 1].
pub fn check_closed_unit(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AbTestError::invalid(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )));
    }
    Ok(())
}

/// Round `value` to `digits` decimal places.
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}
