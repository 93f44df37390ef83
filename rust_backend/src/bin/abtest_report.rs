//! Experiment report binary
//!
//! Loads control and experiment data, optionally sizes the experiment from a
//! configured baseline, runs the analysis and prints everything as JSON.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin abtest-report --features cli -- control.csv experiment.csv [abtest.toml]
//! ```
//!
//! Without a config argument, `abtest.toml` is looked up in the standard
//! locations and defaults are used when none is found.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter directives, e.g. `abtest_rust=debug` (default: info)

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use abtest_rust::config::AnalysisConfig;
use abtest_rust::io::loaders::{BaselineLoader, ExperimentLoader};
use abtest_rust::services::analysis::{analyze_experiment, AnalysisOutcome};
use abtest_rust::services::planning::{plan_experiment, ExperimentPlan};

#[derive(Serialize)]
struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    plan: Option<ExperimentPlan>,
    outcome: AnalysisOutcome,
}

/// Builds the log filter from `RUST_LOG` directives, falling back to info.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn load_config(path: Option<PathBuf>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_file(&path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => match AnalysisConfig::from_default_location() {
            Ok(config) => Ok(config),
            Err(e) => {
                warn!("{}; using default parameters", e);
                Ok(AnalysisConfig::default())
            }
        },
    }
}

fn main() -> Result<()> {
    // Log to stderr so stdout carries only the JSON report
    FmtSubscriber::builder()
        .with_env_filter(log_filter(env::var("RUST_LOG").ok().as_deref()))
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() < 2 || args.len() > 3 {
        bail!("usage: abtest-report <control> <experiment> [config.toml]");
    }
    let control_path = PathBuf::from(&args[0]);
    let experiment_path = PathBuf::from(&args[1]);
    let config = load_config(args.get(2).map(PathBuf::from))?;

    let plan = match BaselineLoader::from_config(&config)? {
        Some(baseline) => Some(plan_experiment(&baseline, &config.parameters, &config.planning)?),
        None => {
            info!("No baseline configured; skipping experiment sizing");
            None
        }
    };

    let run = ExperimentLoader::load_run(&control_path, &experiment_path, config.parameters.clone())?;
    let outcome = analyze_experiment(&run, config.window_days)?;
    if !outcome.is_conclusive() {
        warn!("Sanity checks failed; evaluation metrics were not analyzed");
    }

    let report = Report { plan, outcome };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize report")?
    );

    Ok(())
}
