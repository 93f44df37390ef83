//! Sanity checks of the 50/50 split on invariant metrics.
//!
//! Under a correct random split, the share of events landing in control is
//! approximately normal with mean 0.5 and standard error `sqrt(0.25 / N)`.
//! A check passes when the observed share lies strictly inside the two-sided
//! `1 - alpha` interval around 0.5.

use serde::{Deserialize, Serialize};

use crate::algorithms::normal;
use crate::core::domain::{AggregateTotals, InvariantMetric};
use crate::core::error::{AnalysisError, AnalysisResult};

/// Outcome of one split check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityResult {
    pub observed_proportion: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub passes: bool,
}

/// Checks whether `count_control` out of `count_control + count_experiment`
/// is consistent with an even split.
///
/// # Examples
///
/// ```
/// use abtest_rust::algorithms::sanity::check_split;
///
/// let result = check_split(345543, 344660, 0.05).unwrap();
/// assert!(result.passes);
/// assert!((result.observed_proportion - 0.5006).abs() < 1e-4);
/// ```
pub fn check_split(
    count_control: u64,
    count_experiment: u64,
    alpha: f64,
) -> AnalysisResult<SanityResult> {
    let total = count_control + count_experiment;
    if total == 0 {
        return Err(AnalysisError::UndefinedRatio(
            "cannot check a split of zero events".to_string(),
        ));
    }

    let z = normal::two_sided_critical_value(alpha)?;
    let margin = z * (0.25 / total as f64).sqrt();
    let lower_bound = 0.5 - margin;
    let upper_bound = 0.5 + margin;
    let observed_proportion = count_control as f64 / total as f64;

    Ok(SanityResult {
        observed_proportion,
        lower_bound,
        upper_bound,
        passes: observed_proportion > lower_bound && observed_proportion < upper_bound,
    })
}

/// Split check of a named invariant metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvariantCheck {
    pub metric: InvariantMetric,
    pub count_control: u64,
    pub count_experiment: u64,
    #[serde(flatten)]
    pub result: SanityResult,
}

/// Split checks of every invariant metric over one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SanityReport {
    pub checks: Vec<InvariantCheck>,
}

impl SanityReport {
    /// The run is sane only if every invariant passes.
    pub fn all_pass(&self) -> bool {
        self.checks.iter().all(|c| c.result.passes)
    }

    pub fn failed(&self) -> impl Iterator<Item = &InvariantCheck> {
        self.checks.iter().filter(|c| !c.result.passes)
    }

    pub fn get(&self, metric: InvariantMetric) -> Option<&InvariantCheck> {
        self.checks.iter().find(|c| c.metric == metric)
    }
}

/// Runs [`check_split`] on pageviews and clicks.
pub fn run_sanity_checks(totals: &AggregateTotals, alpha: f64) -> AnalysisResult<SanityReport> {
    let checks = InvariantMetric::ALL
        .iter()
        .map(|&metric| {
            let count_control = metric.count(&totals.control);
            let count_experiment = metric.count(&totals.experiment);
            let result = check_split(count_control, count_experiment, alpha)?;
            log::debug!(
                "{} split: observed {:.4} in ({:.4}, {:.4})",
                metric,
                result.observed_proportion,
                result.lower_bound,
                result.upper_bound
            );
            Ok(InvariantCheck {
                metric,
                count_control,
                count_experiment,
                result,
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    Ok(SanityReport { checks })
}
