//! # ab-statistics
//!
//! Statistical tooling for A/B experiments on conversion rates.
//!
//! The crate answers the two questions an experiment raises: how many observations are needed
//! before it starts, and whether the observed difference is significant once it ends. All
//! computations are pure functions of their inputs, based on the normal approximation to the
//! binomial.
//!
//! ## Core Features
//!
//! - **Power Analysis**: minimum per-group sample size to detect an absolute uplift, using
//!   Cohen's h and the two-sided two-proportion z-test
//! - **Proportion Tests**: pooled two-proportion z-test with per-group Wald confidence intervals
//! - **Dataset Aggregation**: CSV and XLSX uploads of `id, group, converted` rows reduced to
//!   per-group counts
//!
//! ## Quick Start
//!
//! ```rust
//! use ab_statistics::testing::inference::evaluate;
//! use ab_statistics::testing::power::required_sample_size;
//!
//! let n = required_sample_size(0.10, 0.02, 0.8, 0.05).unwrap();
//! assert_eq!(n, 3835);
//!
//! let result = evaluate(1000, 1000, 100, 150, 0.05).unwrap();
//! assert!(result.p_value < 0.05);
//! ```
//!
//! ## Module Organization
//!
//! - **[`testing`]**: Power analysis, effect sizes and the two-proportion z-test
//! - **[`data`]**: File type detection, CSV/XLSX loading and aggregation
//! - **[`app`]**: Screen dispatch and textual reports
//! - **[`config`]**: Default analysis parameters

pub mod app;
pub mod config;
pub mod data;
pub mod error;
pub mod testing;

pub use error::{AbTestError, Result};
