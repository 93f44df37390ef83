//! Analysis configuration file support.
//!
//! Reads analysis parameters, the evaluation window and planning settings
//! from a TOML file. Every field is optional; defaults reproduce the
//! standard analysis (alpha 0.05, power 0.8, effects 0.01 / 0.0075).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::domain::{BaselineMetrics, ExperimentParameters};
use crate::core::error::{AnalysisError, AnalysisResult};
use crate::services::planning::PlanningSettings;

/// Analysis configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Days analyzed from the start of the data; the full length when unset
    #[serde(default)]
    pub window_days: Option<usize>,
    /// Headerless baseline table; relative paths resolve against the config file
    #[serde(default)]
    pub baseline_file: Option<PathBuf>,
    /// Inline baseline, used when no `baseline_file` is given
    #[serde(default)]
    pub baseline: Option<BaselineMetrics>,
    #[serde(default)]
    pub parameters: ExperimentParameters,
    #[serde(default)]
    pub planning: PlanningSettings,
}

impl AnalysisConfig {
    /// Parse and validate configuration from TOML text.
    pub fn from_toml_str(content: &str) -> AnalysisResult<Self> {
        let config: AnalysisConfig = toml::from_str(content).map_err(|e| {
            AnalysisError::Configuration(format!("Failed to parse config file: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load analysis configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(AnalysisConfig)` if the file parses and every value is valid
    /// * `Err(AnalysisError::Configuration)` otherwise
    pub fn from_file<P: AsRef<Path>>(path: P) -> AnalysisResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AnalysisError::Configuration(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        if let (Some(baseline_file), Some(dir)) = (config.baseline_file.as_mut(), path.parent()) {
            if baseline_file.is_relative() {
                *baseline_file = dir.join(&*baseline_file);
            }
        }

        log::info!("Loaded analysis configuration from {}", path.display());
        Ok(config)
    }

    /// Load analysis configuration from the default location.
    ///
    /// Searches for `abtest.toml` in:
    /// 1. Current directory
    /// 2. `rust_backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> AnalysisResult<Self> {
        let search_paths = [
            PathBuf::from("abtest.toml"),
            PathBuf::from("rust_backend/abtest.toml"),
            PathBuf::from("../abtest.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(AnalysisError::Configuration(
            "No abtest.toml found in standard locations".to_string(),
        ))
    }

    /// Checks every parameter before it reaches the pipeline.
    pub fn validate(&self) -> AnalysisResult<()> {
        self.parameters
            .validate()
            .map_err(|e| AnalysisError::Configuration(e.to_string()))?;
        self.planning
            .validate()
            .map_err(|e| AnalysisError::Configuration(e.to_string()))?;
        if self.window_days == Some(0) {
            return Err(AnalysisError::Configuration(
                "window_days must be at least 1".to_string(),
            ));
        }
        if let Some(baseline) = &self.baseline {
            baseline
                .validate()
                .map_err(|e| AnalysisError::Configuration(e.to_string()))?;
        }
        Ok(())
    }
}
