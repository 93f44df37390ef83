use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use std::path::Path;

use crate::config::AnalysisConfig;
use crate::core::domain::{BaselineMetrics, DailyRecord, ExperimentParameters, ExperimentRun};
use crate::parsing::csv_parser;
use crate::parsing::json_parser;

/// Represents the source type of daily data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSourceType {
    Json,
    Csv,
}

impl DataSourceType {
    /// Detects the source type from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .with_context(|| format!("File has no extension: {}", path.display()))?;

        match extension.to_lowercase().as_str() {
            "json" => Ok(DataSourceType::Json),
            "csv" => Ok(DataSourceType::Csv),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }
}

/// Result of loading one group's daily data
#[derive(Debug)]
pub struct DailyLoadResult {
    pub records: Vec<DailyRecord>,
    pub source_type: DataSourceType,
    pub num_days: usize,
}

impl DailyLoadResult {
    pub fn new(records: Vec<DailyRecord>, source_type: DataSourceType) -> Self {
        let num_days = records.len();
        Self {
            records,
            source_type,
            num_days,
        }
    }

    /// Tabular view of the records with the standard column names
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        csv_parser::records_to_dataframe(&self.records)
    }
}

/// Unified interface for loading experiment data from JSON or CSV
pub struct ExperimentLoader;

impl ExperimentLoader {
    /// Load one group's daily data from a file (auto-detects JSON or CSV)
    pub fn load_from_file(path: &Path) -> Result<DailyLoadResult> {
        match DataSourceType::from_path(path)? {
            DataSourceType::Json => Self::load_from_json(path),
            DataSourceType::Csv => Self::load_from_csv(path),
        }
    }

    /// Load one group's daily data from a JSON array file
    pub fn load_from_json(json_path: &Path) -> Result<DailyLoadResult> {
        let records =
            json_parser::parse_daily_json(json_path).context("Failed to parse JSON file")?;
        Ok(DailyLoadResult::new(records, DataSourceType::Json))
    }

    /// Load one group's daily data from a CSV file
    pub fn load_from_csv(csv_path: &Path) -> Result<DailyLoadResult> {
        let records = csv_parser::parse_daily_csv_to_records(csv_path)
            .context("Failed to parse CSV file")?;
        Ok(DailyLoadResult::new(records, DataSourceType::Csv))
    }

    /// Load control and experiment data from two files
    pub fn load_pair(
        control_path: &Path,
        experiment_path: &Path,
    ) -> Result<(Vec<DailyRecord>, Vec<DailyRecord>)> {
        let control = Self::load_from_file(control_path)
            .with_context(|| format!("Failed to load control data from {}", control_path.display()))?;
        let experiment = Self::load_from_file(experiment_path).with_context(|| {
            format!(
                "Failed to load experiment data from {}",
                experiment_path.display()
            )
        })?;
        log::info!(
            "Loaded {} control and {} experiment days",
            control.num_days,
            experiment.num_days
        );
        Ok((control.records, experiment.records))
    }

    /// Load both groups from one `{"control": [...], "experiment": [...]}` file
    pub fn load_combined_json(json_path: &Path) -> Result<(Vec<DailyRecord>, Vec<DailyRecord>)> {
        json_parser::parse_experiment_json(json_path).context("Failed to parse experiment JSON")
    }

    /// Load both groups and build a validated run
    pub fn load_run(
        control_path: &Path,
        experiment_path: &Path,
        parameters: ExperimentParameters,
    ) -> Result<ExperimentRun> {
        let (control, experiment) = Self::load_pair(control_path, experiment_path)?;
        let run = ExperimentRun::new(control, experiment, parameters)
            .context("Loaded data does not form a valid experiment run")?;
        Ok(run)
    }
}

/// Loader for historical baseline metrics
pub struct BaselineLoader;

impl BaselineLoader {
    /// Load baseline metrics from a headerless CSV table or a JSON object
    pub fn load_from_file(path: &Path) -> Result<BaselineMetrics> {
        let baseline = match DataSourceType::from_path(path)? {
            DataSourceType::Csv => csv_parser::parse_baseline_csv(path)?,
            DataSourceType::Json => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;
                serde_json::from_str(&content)
                    .with_context(|| format!("Invalid baseline JSON in {}", path.display()))?
            }
        };
        baseline
            .validate()
            .with_context(|| format!("Invalid baseline values in {}", path.display()))?;
        Ok(baseline)
    }

    /// Baseline named by a configuration: `baseline_file` first, then the inline table
    pub fn from_config(config: &AnalysisConfig) -> Result<Option<BaselineMetrics>> {
        match (&config.baseline_file, &config.baseline) {
            (Some(path), _) => Self::load_from_file(path).map(Some),
            (None, Some(baseline)) => Ok(Some(baseline.clone())),
            (None, None) => Ok(None),
        }
    }
}
