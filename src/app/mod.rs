//! Screens of the A/B testing tool.
//!
//! Each screen is an independent handler. A [`Request`] names the screen and carries every
//! input that screen needs, so handlers hold no state between calls; [`dispatch`] routes a
//! request to its handler and returns the rendered [`Page`].

pub mod report;

use crate::config::AnalysisConfig;
use crate::data::{DatasetSummary, load_rows};
use crate::error::{AbTestError, Result};
use crate::testing::ExperimentCounts;
use crate::testing::inference::evaluate_counts;
use crate::testing::power::PowerAnalysisInput;
use log::info;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    PowerAnalysis,
    ManualTest,
    AutomaticTest,
}

impl Screen {
    pub const ALL: [Screen; 4] = [
        Screen::Home,
        Screen::PowerAnalysis,
        Screen::ManualTest,
        Screen::AutomaticTest,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Home => "A/B Testing",
            Screen::PowerAnalysis => "Power Analysis - Required sample size",
            Screen::ManualTest => "Manual A/B Testing",
            Screen::AutomaticTest => "Automatic A/B Testing",
        }
    }
}

/// An uploaded dataset: the original file name selects the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Home,
    PowerAnalysis(PowerAnalysisInput),
    ManualTest(ExperimentCounts),
    AutomaticTest(Upload),
}

impl Request {
    pub fn screen(&self) -> Screen {
        match self {
            Request::Home => Screen::Home,
            Request::PowerAnalysis(_) => Screen::PowerAnalysis,
            Request::ManualTest(_) => Screen::ManualTest,
            Request::AutomaticTest(_) => Screen::AutomaticTest,
        }
    }
}

/// Rendered output of one screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub screen: Screen,
    pub lines: Vec<String>,
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = self.screen.title();
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.len()))?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

pub fn dispatch(request: &Request, config: &AnalysisConfig) -> Result<Page> {
    config.validate()?;
    let screen = request.screen();
    info!("rendering screen {:?}", screen);

    let lines = match request {
        Request::Home => home(),
        Request::PowerAnalysis(input) => power_analysis(input)?,
        Request::ManualTest(counts) => manual_test(counts, config)?,
        Request::AutomaticTest(upload) => automatic_test(upload, config)?,
    };

    Ok(Page { screen, lines })
}

fn home() -> Vec<String> {
    vec![
        "This is a simple tool that provides several A/B testing utilities.".to_string(),
        "1. Perform power analysis to determine the appropriate sample size to capture a specific effect.".to_string(),
        "2. Perform manual A/B testing by providing the number of observations and conversions in the control and treatment groups.".to_string(),
        "3. Perform automatic A/B testing by providing an Excel or CSV file with the experiment results.".to_string(),
    ]
}

fn power_analysis(input: &PowerAnalysisInput) -> Result<Vec<String>> {
    let required_size = input.required_sample_size()?;
    Ok(vec![report::power_analysis_sentence(input, required_size)])
}

fn manual_test(counts: &ExperimentCounts, config: &AnalysisConfig) -> Result<Vec<String>> {
    let result = evaluate_counts(counts, config.test_alpha)?;
    Ok(report::test_outcome_lines(&result, config.test_alpha))
}

fn automatic_test(upload: &Upload, config: &AnalysisConfig) -> Result<Vec<String>> {
    let rows = load_rows(&upload.file_name, &upload.bytes)?;
    let summary = DatasetSummary::from_rows(&rows)?;
    let result = evaluate_counts(&summary.counts, config.test_alpha)?;

    let mut lines = report::dataset_insight_lines(&summary);
    lines.extend(report::test_outcome_lines(&result, config.test_alpha));
    Ok(lines)
}

/// Build a power-analysis input from an effect entered as a percentage of the baseline scale.
///
/// `effect_percent` must lie in `[0, 100 − control_rate·100]`; it is divided by 100.
pub fn power_input_from_percent(
    control_rate: f64,
    effect_percent: f64,
    config: &AnalysisConfig,
) -> Result<PowerAnalysisInput> {
    let max_percent = 100.0 - control_rate * 100.0;
    if !(0.0..=max_percent + 1e-9).contains(&effect_percent) {
        return Err(AbTestError::invalid(format!(
            "desired effect must be between 0% and {}%, got {}%",
            report::percent(max_percent / 100.0),
            effect_percent
        )));
    }
    Ok(PowerAnalysisInput::new(control_rate, effect_percent / 100.0)
        .with_power(config.power)
        .with_alpha(config.alpha))
}
