//! Analysis parameters shared by the screens.

use crate::error::{AbTestError, Result};
use crate::testing::power::{DEFAULT_ALPHA, DEFAULT_POWER};
use crate::testing::utils::check_open_unit;

/// Significance level of the z-test decision and of the reported intervals.
pub const DEFAULT_TEST_ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisConfig {
    /// Target power of the power analysis.
    pub power: f64,
    /// Significance level of the power analysis.
    pub alpha: f64,
    /// Significance level of the A/B test screens. Fixed at 0.05 (95% intervals)
    /// independently of `alpha`.
    pub test_alpha: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            power: DEFAULT_POWER,
            alpha: DEFAULT_ALPHA,
            test_alpha: DEFAULT_TEST_ALPHA,
        }
    }
}

impl AnalysisConfig {
    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_test_alpha(mut self, test_alpha: f64) -> Self {
        self.test_alpha = test_alpha;
        self
    }

    pub fn validate(&self) -> Result<()> {
        check_open_unit("power", self.power)?;
        check_open_unit("alpha", self.alpha)?;
        check_open_unit("test alpha", self.test_alpha)?;
        if self.power <= self.alpha {
            return Err(AbTestError::invalid(format!(
                "power ({}) must exceed alpha ({})",
                self.power, self.alpha
            )));
        }
        Ok(())
    }
}
