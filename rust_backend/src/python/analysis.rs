use pyo3::exceptions::PyRuntimeError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::PathBuf;

use crate::config::AnalysisConfig;
use crate::io::loaders::{BaselineLoader, ExperimentLoader};
use crate::preprocessing::validator::{RecordValidator, ValidationStats};
use crate::python::algorithms::to_py_err;
use crate::services::analysis::analyze_experiment;
use crate::services::planning::plan_experiment;

fn load_config(config_path: Option<&str>) -> PyResult<AnalysisConfig> {
    match config_path {
        Some(path) => AnalysisConfig::from_file(PathBuf::from(path)).map_err(to_py_err),
        None => Ok(AnalysisConfig::default()),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> PyResult<String> {
    serde_json::to_string(value)
        .map_err(|e| PyRuntimeError::new_err(format!("Failed to serialize report: {}", e)))
}

/// Python wrapper for ValidationResult
#[pyclass]
#[derive(Clone)]
pub struct PyValidationResult {
    #[pyo3(get)]
    pub is_valid: bool,
    #[pyo3(get)]
    pub errors: Vec<String>,
    #[pyo3(get)]
    pub warnings: Vec<String>,
    stats: ValidationStats,
}

#[pymethods]
impl PyValidationResult {
    fn __repr__(&self) -> String {
        format!(
            "ValidationResult(valid={}, errors={}, warnings={})",
            self.is_valid,
            self.errors.len(),
            self.warnings.len()
        )
    }

    /// Get statistics as a Python dict
    fn get_stats<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyDict>> {
        let dict = PyDict::new(py);
        dict.set_item("total_days", self.stats.total_days)?;
        dict.set_item("zero_click_days", self.stats.zero_click_days)?;
        dict.set_item("missing_enrollment_days", self.stats.missing_enrollment_days)?;
        dict.set_item("missing_payment_days", self.stats.missing_payment_days)?;
        dict.set_item("invariant_violations", self.stats.invariant_violations)?;
        Ok(dict)
    }
}

/// Validate a control/experiment file pair without analyzing it
#[pyfunction]
pub fn validate_experiment_files(
    control_path: &str,
    experiment_path: &str,
) -> PyResult<PyValidationResult> {
    let (control, experiment) =
        ExperimentLoader::load_pair(&PathBuf::from(control_path), &PathBuf::from(experiment_path))
            .map_err(|e| PyRuntimeError::new_err(format!("Failed to load data: {:#}", e)))?;
    let result = RecordValidator::validate_pair(&control, &experiment);
    Ok(PyValidationResult {
        is_valid: result.is_valid,
        errors: result.errors,
        warnings: result.warnings,
        stats: result.stats,
    })
}

/// Analyze a control/experiment file pair and return the outcome as JSON
///
/// Args:
///     control_path: Control group CSV or JSON file
///     experiment_path: Experiment group CSV or JSON file
///     config_path: Optional abtest.toml with parameters and window
///     window_days: Optional window overriding the configuration
///
/// Returns:
///     str: JSON with `status` set to `completed` or `inconclusive`
///
/// Example:
///     >>> import json, abtest_rust
///     >>> report = json.loads(abtest_rust.analyze_experiment_files(
///     ...     "control.csv", "experiment.csv", window_days=23))
///     >>> report["status"]
///     'completed'
#[pyfunction]
#[pyo3(signature = (control_path, experiment_path, config_path=None, window_days=None))]
pub fn analyze_experiment_files(
    control_path: &str,
    experiment_path: &str,
    config_path: Option<&str>,
    window_days: Option<usize>,
) -> PyResult<String> {
    let config = load_config(config_path)?;
    let run = ExperimentLoader::load_run(
        &PathBuf::from(control_path),
        &PathBuf::from(experiment_path),
        config.parameters.clone(),
    )
    .map_err(|e| PyRuntimeError::new_err(format!("Failed to load experiment: {:#}", e)))?;

    let outcome =
        analyze_experiment(&run, window_days.or(config.window_days)).map_err(to_py_err)?;
    to_json(&outcome)
}

/// Size an experiment from a baseline table and return the plan as JSON
#[pyfunction]
#[pyo3(signature = (baseline_path, config_path=None))]
pub fn plan_experiment_file(baseline_path: &str, config_path: Option<&str>) -> PyResult<String> {
    let config = load_config(config_path)?;
    let baseline = BaselineLoader::load_from_file(&PathBuf::from(baseline_path))
        .map_err(|e| PyRuntimeError::new_err(format!("Failed to load baseline: {:#}", e)))?;
    let plan =
        plan_experiment(&baseline, &config.parameters, &config.planning).map_err(to_py_err)?;
    to_json(&plan)
}
