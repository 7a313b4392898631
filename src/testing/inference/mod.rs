use crate::error::Result;
use crate::testing::{Alternative, ConfidenceInterval, ExperimentCounts, ProportionTestResult};

pub mod proportion;

pub use proportion::{ZTestOutcome, evaluate, evaluate_counts, proportions_z_test, wald_interval};

/// Hypothesis tests available on a pair of control/treatment counts.
pub trait ExperimentStatTests {
    fn z_test(&self, alternative: Alternative) -> Result<ZTestOutcome>;

    /// Wald intervals for the control and treatment rates, in that order.
    fn confidence_intervals(&self, alpha: f64) -> Result<(ConfidenceInterval, ConfidenceInterval)>;

    fn evaluate(&self, alpha: f64) -> Result<ProportionTestResult>;
}

impl ExperimentStatTests for ExperimentCounts {
    fn z_test(&self, alternative: Alternative) -> Result<ZTestOutcome> {
        proportions_z_test(self, alternative)
    }

    fn confidence_intervals(&self, alpha: f64) -> Result<(ConfidenceInterval, ConfidenceInterval)> {
        let control = wald_interval(self.control_conversions, self.control_observations, alpha)?;
        let treatment =
            wald_interval(self.treatment_conversions, self.treatment_observations, alpha)?;
        Ok((control, treatment))
    }

    fn evaluate(&self, alpha: f64) -> Result<ProportionTestResult> {
        evaluate_counts(self, alpha)
    }
}
