use crate::error::{AbTestError, Result};
use std::fmt;

pub mod effect;
pub mod inference;
pub mod power;

pub mod utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alternative {
    #[default]
    TwoSided,
    Less,    // treatment rate below control rate
    Greater, // treatment rate above control rate
}

/// Outcome of comparing a p-value with the significance level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Reject,
    FailToReject,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Reject => write!(f, "reject"),
            Decision::FailToReject => write!(f, "fail to reject"),
        }
    }
}

/// Observation and conversion counts for the control and treatment groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExperimentCounts {
    pub control_observations: u64,
    pub treatment_observations: u64,
    pub control_conversions: u64,
    pub treatment_conversions: u64,
}

impl ExperimentCounts {
    /// Build counts, rejecting a group with more conversions than observations.
    pub fn new(
        control_observations: u64,
        treatment_observations: u64,
        control_conversions: u64,
        treatment_conversions: u64,
    ) -> Result<Self> {
        let counts = ExperimentCounts {
            control_observations,
            treatment_observations,
            control_conversions,
            treatment_conversions,
        };
        counts.validate()?;
        Ok(counts)
    }

    pub fn validate(&self) -> Result<()> {
        if self.control_conversions > self.control_observations {
            return Err(AbTestError::invalid(format!(
                "control conversions ({}) exceed control observations ({})",
                self.control_conversions, self.control_observations
            )));
        }
        if self.treatment_conversions > self.treatment_observations {
            return Err(AbTestError::invalid(format!(
                "treatment conversions ({}) exceed treatment observations ({})",
                self.treatment_conversions, self.treatment_observations
            )));
        }
        Ok(())
    }

    /// Observations across both groups, saturating at `u64::MAX`.
    pub fn total_observations(&self) -> u64 {
        self.control_observations.saturating_add(self.treatment_observations)
    }

    /// Conversions across both groups, saturating at `u64::MAX`.
    pub fn total_conversions(&self) -> u64 {
        self.control_conversions.saturating_add(self.treatment_conversions)
    }

    /// Conversion rate of both groups combined, `None` when there are no observations.
    pub fn pooled_rate(&self) -> Option<f64> {
        let observations = self.control_observations as f64 + self.treatment_observations as f64;
        let conversions = self.control_conversions as f64 + self.treatment_conversions as f64;
        if observations == 0.0 {
            None
        } else {
            Some(conversions / observations)
        }
    }

    /// Control conversion rate, `None` when the group is empty.
    pub fn control_rate(&self) -> Option<f64> {
        rate(self.control_conversions, self.control_observations)
    }

    /// Treatment conversion rate, `None` when the group is empty.
    pub fn treatment_rate(&self) -> Option<f64> {
        rate(self.treatment_conversions, self.treatment_observations)
    }
}

fn rate(conversions: u64, observations: u64) -> Option<f64> {
    if observations == 0 {
        None
    } else {
        Some(conversions as f64 / observations as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub fn new(lower: f64, upper: f64) -> Self {
        ConfidenceInterval { lower, upper }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone)]
pub struct ProportionTestResult {
    /// The z statistic, positive when the treatment rate exceeds the control rate
    pub statistic: f64,
    /// The p-value of the test
    pub p_value: f64,
    /// Wald interval for the control group's conversion rate
    pub control_interval: ConfidenceInterval,
    /// Wald interval for the treatment group's conversion rate
    pub treatment_interval: ConfidenceInterval,
    pub control_rate: f64,
    pub treatment_rate: f64,
    /// Combined conversion rate under the null hypothesis
    pub pooled_rate: f64,
    /// Standard error of the rate difference under the null hypothesis
    pub standard_error: f64,
    /// Significance level the intervals were built at
    pub alpha: f64,
}

impl ProportionTestResult {
    /// Absolute difference between the treatment and control rates.
    pub fn uplift(&self) -> f64 {
        self.treatment_rate - self.control_rate
    }

    /// Check if the result is statistically significant at the given threshold.
    ///
    /// The boundary counts as significant: `p_value == alpha` rejects.
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value <= alpha
    }

    pub fn decision(&self, alpha: f64) -> Decision {
        if self.is_significant(alpha) {
            Decision::Reject
        } else {
            Decision::FailToReject
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_with_p(p_value: f64) -> ProportionTestResult {
        ProportionTestResult {
            statistic: 0.0,
            p_value,
            control_interval: ConfidenceInterval::new(0.0, 0.1),
            treatment_interval: ConfidenceInterval::new(0.0, 0.1),
            control_rate: 0.05,
            treatment_rate: 0.07,
            pooled_rate: 0.06,
            standard_error: 0.01,
            alpha: 0.05,
        }
    }

    #[test]
    fn test_counts_validation() {
        assert!(ExperimentCounts::new(10, 10, 10, 0).is_ok());
        assert!(ExperimentCounts::new(10, 10, 11, 0).is_err());
        assert!(ExperimentCounts::new(10, 10, 0, 11).is_err());
        // empty groups are representable; the test itself rejects them
        assert!(ExperimentCounts::new(0, 0, 0, 0).is_ok());
    }

    #[test]
    fn test_counts_rates() {
        let counts = ExperimentCounts::new(200, 0, 50, 0).unwrap();
        assert_eq!(counts.control_rate(), Some(0.25));
        assert_eq!(counts.treatment_rate(), None);
        assert_eq!(counts.total_observations(), 200);
        assert_eq!(counts.total_conversions(), 50);
        assert_eq!(counts.pooled_rate(), Some(0.25));
        assert_eq!(ExperimentCounts::default().pooled_rate(), None);
    }

    #[test]
    fn test_totals_do_not_overflow() {
        let counts = ExperimentCounts::new(u64::MAX, 1, u64::MAX, 1).unwrap();
        assert_eq!(counts.total_observations(), u64::MAX);
        assert_eq!(counts.total_conversions(), u64::MAX);
        assert_eq!(counts.pooled_rate(), Some(1.0));
    }

    #[test]
    fn test_decision_boundary_rejects() {
        assert_eq!(result_with_p(0.05).decision(0.05), Decision::Reject);
        assert_eq!(result_with_p(0.0500001).decision(0.05), Decision::FailToReject);
        assert_eq!(result_with_p(0.01).decision(0.05), Decision::Reject);
    }

    #[test]
    fn test_decision_display() {
        assert_eq!(Decision::Reject.to_string(), "reject");
        assert_eq!(Decision::FailToReject.to_string(), "fail to reject");
    }

    #[test]
    fn test_interval_helpers() {
        let ci = ConfidenceInterval::new(0.1, 0.3);
        assert!(ci.contains(0.2));
        assert!(!ci.contains(0.31));
        assert!((ci.width() - 0.2).abs() < 1e-12);
        assert!((result_with_p(0.5).uplift() - 0.02).abs() < 1e-12);
    }
}
