use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::Path;

use crate::core::domain::DailyRecord;

/// Raw JSON structure for one day, accepting the CSV column names as aliases
#[derive(Debug, Deserialize)]
struct RawDailyRecord {
    #[serde(alias = "Date")]
    date: String,
    #[serde(alias = "Pageviews")]
    pageviews: u64,
    #[serde(alias = "Clicks")]
    clicks: u64,
    #[serde(default, alias = "Enrollments")]
    enrollments: Option<u64>,
    #[serde(default, alias = "Payments")]
    payments: Option<u64>,
}

impl From<RawDailyRecord> for DailyRecord {
    fn from(raw: RawDailyRecord) -> Self {
        DailyRecord::new(
            raw.date.trim(),
            raw.pageviews,
            raw.clicks,
            raw.enrollments,
            raw.payments,
        )
    }
}

/// Container for a file holding both groups
#[derive(Debug, Deserialize)]
struct ExperimentJson {
    control: Vec<RawDailyRecord>,
    experiment: Vec<RawDailyRecord>,
}

/// Deserializes with the JSON path of the first offending value in the error.
fn from_str_with_path<T: DeserializeOwned>(json_str: &str) -> Result<T> {
    let deserializer = &mut serde_json::Deserializer::from_str(json_str);
    serde_path_to_error::deserialize(deserializer).map_err(|e| {
        let path = e.path().to_string();
        anyhow!("JSON deserialization error at '{}': {}", path, e.into_inner())
    })
}

fn read_json(json_path: &Path) -> Result<String> {
    std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read JSON file: {}", json_path.display()))
}

/// Parse one group's daily records from a JSON array
pub fn parse_daily_json_str(json_str: &str) -> Result<Vec<DailyRecord>> {
    let raw: Vec<RawDailyRecord> = from_str_with_path(json_str)?;
    Ok(raw.into_iter().map(DailyRecord::from).collect())
}

/// Parse one group's daily records from a JSON file
pub fn parse_daily_json(json_path: &Path) -> Result<Vec<DailyRecord>> {
    let content = read_json(json_path)?;
    parse_daily_json_str(&content)
        .with_context(|| format!("Invalid daily data in {}", json_path.display()))
}

/// Parse both groups from a `{"control": [...], "experiment": [...]}` document
pub fn parse_experiment_json_str(json_str: &str) -> Result<(Vec<DailyRecord>, Vec<DailyRecord>)> {
    let raw: ExperimentJson = from_str_with_path(json_str)?;
    Ok((
        raw.control.into_iter().map(DailyRecord::from).collect(),
        raw.experiment.into_iter().map(DailyRecord::from).collect(),
    ))
}

/// Parse both groups from a JSON file
pub fn parse_experiment_json(json_path: &Path) -> Result<(Vec<DailyRecord>, Vec<DailyRecord>)> {
    let content = read_json(json_path)?;
    parse_experiment_json_str(&content)
        .with_context(|| format!("Invalid experiment data in {}", json_path.display()))
}
