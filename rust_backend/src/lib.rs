//! Statistical analysis backend for funnel A/B experiments.
//!
//! Takes per-day counts for a control and an experiment group (pageviews,
//! clicks, enrollments, payments) and produces experiment sizing, invariant
//! sanity checks, confidence intervals on evaluation metrics and a day-level
//! sign test.
//!
//! # Example
//!
//! ```
//! use abtest_rust::core::domain::{DailyRecord, ExperimentParameters, ExperimentRun};
//! use abtest_rust::services::analysis::ExperimentAnalyzer;
//!
//! let control = vec![
//!     DailyRecord::new("Sat, Oct 11", 7723, 687, Some(134), Some(70)),
//!     DailyRecord::new("Sun, Oct 12", 9102, 779, Some(147), Some(70)),
//! ];
//! let experiment = vec![
//!     DailyRecord::new("Sat, Oct 11", 7716, 686, Some(105), Some(34)),
//!     DailyRecord::new("Sun, Oct 12", 9288, 785, Some(116), Some(91)),
//! ];
//! let run = ExperimentRun::new(control, experiment, ExperimentParameters::default()).unwrap();
//! let outcome = ExperimentAnalyzer::new().analyze(&run).unwrap();
//! assert!(outcome.is_conclusive());
//! ```

pub mod algorithms;
pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod services;

#[cfg(feature = "python")]
pub mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Experiment analysis backend for the Python dashboard
#[cfg(feature = "python")]
#[pymodule]
fn abtest_rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Statistical building blocks
    m.add_function(wrap_pyfunction!(python::py_sample_size, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_check_split, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_evaluate_significance, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_sign_test, m)?)?;

    // File-based workflows
    m.add_function(wrap_pyfunction!(python::validate_experiment_files, m)?)?;
    m.add_function(wrap_pyfunction!(python::analyze_experiment_files, m)?)?;
    m.add_function(wrap_pyfunction!(python::plan_experiment_file, m)?)?;

    m.add_class::<python::PySanityResult>()?;
    m.add_class::<python::PySignificanceVerdict>()?;
    m.add_class::<python::PySignTestResult>()?;
    m.add_class::<python::PyValidationResult>()?;

    Ok(())
}
