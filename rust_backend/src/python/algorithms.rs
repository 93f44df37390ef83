use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::algorithms::sample_size;
use crate::algorithms::sanity::{self, SanityResult};
use crate::algorithms::sign_test::{self, SignTestResult};
use crate::algorithms::significance::{evaluate_counts, ProportionCounts, SignificanceVerdict};
use crate::core::domain::EvaluationMetric;
use crate::core::error::AnalysisError;

pub(crate) fn to_py_err(err: AnalysisError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_metric(metric: &str) -> PyResult<EvaluationMetric> {
    match metric.to_lowercase().replace([' ', '-'], "_").as_str() {
        "gross_conversion" | "gross" => Ok(EvaluationMetric::GrossConversion),
        "net_conversion" | "net" => Ok(EvaluationMetric::NetConversion),
        other => Err(PyValueError::new_err(format!(
            "Unknown metric '{}'. Use 'gross_conversion' or 'net_conversion'",
            other
        ))),
    }
}

/// Python wrapper for SanityResult
#[pyclass]
#[derive(Clone)]
pub struct PySanityResult {
    #[pyo3(get)]
    pub observed_proportion: f64,
    #[pyo3(get)]
    pub lower_bound: f64,
    #[pyo3(get)]
    pub upper_bound: f64,
    #[pyo3(get)]
    pub passes: bool,
}

#[pymethods]
impl PySanityResult {
    fn __repr__(&self) -> String {
        format!(
            "SanityResult(observed={:.4}, interval=({:.4}, {:.4}), passes={})",
            self.observed_proportion, self.lower_bound, self.upper_bound, self.passes
        )
    }
}

impl From<SanityResult> for PySanityResult {
    fn from(result: SanityResult) -> Self {
        PySanityResult {
            observed_proportion: result.observed_proportion,
            lower_bound: result.lower_bound,
            upper_bound: result.upper_bound,
            passes: result.passes,
        }
    }
}

/// Python wrapper for SignificanceVerdict
#[pyclass]
#[derive(Clone)]
pub struct PySignificanceVerdict {
    #[pyo3(get)]
    pub metric: String,
    #[pyo3(get)]
    pub observed_difference: f64,
    #[pyo3(get)]
    pub lower_bound: f64,
    #[pyo3(get)]
    pub upper_bound: f64,
    #[pyo3(get)]
    pub is_statistically_significant: bool,
    #[pyo3(get)]
    pub is_practically_significant: bool,
}

#[pymethods]
impl PySignificanceVerdict {
    fn __repr__(&self) -> String {
        format!(
            "SignificanceVerdict(metric={}, diff={:.4}, ci=({:.4}, {:.4}), statistical={}, practical={})",
            self.metric,
            self.observed_difference,
            self.lower_bound,
            self.upper_bound,
            self.is_statistically_significant,
            self.is_practically_significant
        )
    }
}

impl From<SignificanceVerdict> for PySignificanceVerdict {
    fn from(verdict: SignificanceVerdict) -> Self {
        PySignificanceVerdict {
            metric: verdict.metric.name().to_string(),
            observed_difference: verdict.observed_difference,
            lower_bound: verdict.lower_bound,
            upper_bound: verdict.upper_bound,
            is_statistically_significant: verdict.is_statistically_significant,
            is_practically_significant: verdict.is_practically_significant,
        }
    }
}

/// Python wrapper for SignTestResult
#[pyclass]
#[derive(Clone)]
pub struct PySignTestResult {
    #[pyo3(get)]
    pub positive_days: u64,
    #[pyo3(get)]
    pub total_days: u64,
    #[pyo3(get)]
    pub p_value: f64,
    #[pyo3(get)]
    pub is_significant: bool,
}

#[pymethods]
impl PySignTestResult {
    fn __repr__(&self) -> String {
        format!(
            "SignTestResult({}/{} positive, p={:.4}, significant={})",
            self.positive_days, self.total_days, self.p_value, self.is_significant
        )
    }
}

impl From<SignTestResult> for PySignTestResult {
    fn from(result: SignTestResult) -> Self {
        PySignTestResult {
            positive_days: result.positive_days,
            total_days: result.total_days,
            p_value: result.p_value,
            is_significant: result.is_significant,
        }
    }
}

/// Per-arm clicks needed to detect a change of `delta` from `baseline`
///
/// Example:
///     >>> import abtest_rust
///     >>> abtest_rust.sample_size(0.05, 0.8, 0.20625, 0.01)
///     25835
#[pyfunction]
#[pyo3(name = "sample_size")]
pub fn py_sample_size(alpha: f64, power: f64, baseline: f64, delta: f64) -> PyResult<u64> {
    sample_size::estimate(alpha, power, baseline, delta).map_err(to_py_err)
}

/// Check an invariant count split against an even 50/50 assignment
#[pyfunction]
#[pyo3(name = "check_split", signature = (count_control, count_experiment, alpha=0.05))]
pub fn py_check_split(
    count_control: u64,
    count_experiment: u64,
    alpha: f64,
) -> PyResult<PySanityResult> {
    sanity::check_split(count_control, count_experiment, alpha)
        .map(PySanityResult::from)
        .map_err(to_py_err)
}

/// Confidence interval of the difference between two proportions
///
/// Args:
///     metric: 'gross_conversion' or 'net_conversion'
///     successes_control, trials_control: control counts
///     successes_experiment, trials_experiment: experiment counts
///     min_detectable_effect: practical significance boundary
///     alpha: significance level (default: 0.05)
#[pyfunction]
#[pyo3(
    name = "evaluate_significance",
    signature = (metric, successes_control, trials_control, successes_experiment, trials_experiment, min_detectable_effect, alpha=0.05)
)]
pub fn py_evaluate_significance(
    metric: &str,
    successes_control: u64,
    trials_control: u64,
    successes_experiment: u64,
    trials_experiment: u64,
    min_detectable_effect: f64,
    alpha: f64,
) -> PyResult<PySignificanceVerdict> {
    let metric = parse_metric(metric)?;
    evaluate_counts(
        metric,
        ProportionCounts::new(successes_control, trials_control),
        ProportionCounts::new(successes_experiment, trials_experiment),
        min_detectable_effect,
        alpha,
    )
    .map(PySignificanceVerdict::from)
    .map_err(to_py_err)
}

/// Two-sided sign test over daily differences
#[pyfunction]
#[pyo3(name = "sign_test", signature = (daily_diffs, alpha=0.05))]
pub fn py_sign_test(daily_diffs: Vec<f64>, alpha: f64) -> PyResult<PySignTestResult> {
    sign_test::sign_test(&daily_diffs, alpha)
        .map(PySignTestResult::from)
        .map_err(to_py_err)
}
