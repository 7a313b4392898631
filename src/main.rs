use std::path::PathBuf;
use std::process::ExitCode;

use ab_statistics::app::{self, Request, Upload};
use ab_statistics::config::AnalysisConfig;
use ab_statistics::testing::ExperimentCounts;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;

/// Power analysis and significance testing for A/B experiments.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log computed quantities at debug level.
    #[arg(global = true, long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe the available tools.
    Home,

    /// Required sample size per group to detect an uplift over the control rate.
    Power {
        /// Control conversion rate, as a fraction in [0, 1].
        #[arg(long)]
        control_rate: f64,

        /// Desired effect over the control rate, in percent (control rate + effect <= 100%).
        #[arg(long, default_value_t = 2.0)]
        effect: f64,

        /// Power of the test.
        #[arg(long, default_value_t = AnalysisConfig::default().power)]
        power: f64,

        /// Significance level.
        #[arg(long, default_value_t = AnalysisConfig::default().alpha)]
        alpha: f64,
    },

    /// Two-sided test from observation and conversion counts.
    Manual {
        #[arg(long)]
        control_obs: u64,

        #[arg(long)]
        treatment_obs: u64,

        #[arg(long)]
        control_conversions: u64,

        #[arg(long)]
        treatment_conversions: u64,
    },

    /// Two-sided test from a CSV or XLSX file with `id, group, converted` columns.
    Auto {
        /// Path to the .csv or .xlsx file.
        file: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn build_request(command: Command, config: &mut AnalysisConfig) -> Result<Request> {
    let request = match command {
        Command::Home => Request::Home,
        Command::Power {
            control_rate,
            effect,
            power,
            alpha,
        } => {
            *config = config.with_power(power).with_alpha(alpha);
            let input = app::power_input_from_percent(control_rate, effect, config)?;
            Request::PowerAnalysis(input)
        }
        Command::Manual {
            control_obs,
            treatment_obs,
            control_conversions,
            treatment_conversions,
        } => Request::ManualTest(ExperimentCounts::new(
            control_obs,
            treatment_obs,
            control_conversions,
            treatment_conversions,
        )?),
        Command::Auto { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            Request::AutomaticTest(Upload { file_name, bytes })
        }
    };
    Ok(request)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AnalysisConfig::default();
    let request = build_request(cli.command, &mut config)?;
    let screen = request.screen();
    let page = app::dispatch(&request, &config)
        .with_context(|| format!("{} failed", screen.title()))?;
    print!("{}", page);
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
