//! Pooled-proportion confidence intervals for evaluation metrics.
//!
//! For a metric `numerator / clicks` the interval around the observed
//! difference `experiment - control` uses the pooled standard error
//! `sqrt(p̂ (1 - p̂) (1/N_cont + 1/N_exp))`. A metric is statistically
//! significant when the interval excludes zero, and practically significant
//! when `d_min < min(|lower|, |upper|)`. The practical rule looks only at the
//! magnitudes of the bounds, so an interval that straddles zero with both
//! bounds beyond `d_min` is practically but not statistically significant.

use serde::{Deserialize, Serialize};

use crate::algorithms::normal;
use crate::core::domain::{EvaluationMetric, GroupTotals};
use crate::core::error::{AnalysisError, AnalysisResult};

/// Confidence interval and verdicts of one evaluation metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignificanceVerdict {
    pub metric: EvaluationMetric,
    pub observed_difference: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub margin: f64,
    pub min_detectable_effect: f64,
    pub is_statistically_significant: bool,
    pub is_practically_significant: bool,
}

/// Successes and trials of one group for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProportionCounts {
    pub successes: u64,
    pub trials: u64,
}

impl ProportionCounts {
    pub fn new(successes: u64, trials: u64) -> Self {
        Self { successes, trials }
    }

    fn of(totals: &GroupTotals, metric: EvaluationMetric) -> Self {
        Self::new(totals.numerator(metric), totals.denominator(metric))
    }
}

/// Evaluates `metric` from two groups' window totals.
pub fn evaluate_significance(
    control: &GroupTotals,
    experiment: &GroupTotals,
    metric: EvaluationMetric,
    min_detectable_effect: f64,
    alpha: f64,
) -> AnalysisResult<SignificanceVerdict> {
    evaluate_counts(
        metric,
        ProportionCounts::of(control, metric),
        ProportionCounts::of(experiment, metric),
        min_detectable_effect,
        alpha,
    )
}

/// Evaluates a metric directly from success/trial counts.
///
/// # Examples
///
/// ```
/// use abtest_rust::algorithms::significance::{evaluate_counts, ProportionCounts};
/// use abtest_rust::core::domain::EvaluationMetric;
///
/// let verdict = evaluate_counts(
///     EvaluationMetric::GrossConversion,
///     ProportionCounts::new(3785, 17293),
///     ProportionCounts::new(3423, 17260),
///     0.01,
///     0.05,
/// )
/// .unwrap();
/// assert!((verdict.observed_difference + 0.0206).abs() < 1e-4);
/// assert!(verdict.is_statistically_significant);
/// assert!(verdict.is_practically_significant);
/// ```
pub fn evaluate_counts(
    metric: EvaluationMetric,
    control: ProportionCounts,
    experiment: ProportionCounts,
    min_detectable_effect: f64,
    alpha: f64,
) -> AnalysisResult<SignificanceVerdict> {
    if !(min_detectable_effect.is_finite() && min_detectable_effect >= 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "minimum detectable effect must be non-negative, got {}",
            min_detectable_effect
        )));
    }
    for (group, counts) in [("control", control), ("experiment", experiment)] {
        if counts.trials == 0 {
            return Err(AnalysisError::UndefinedRatio(format!(
                "{} has no clicks with reported {}",
                group,
                metric.name().to_lowercase()
            )));
        }
        if counts.successes > counts.trials {
            return Err(AnalysisError::InvalidParameter(format!(
                "{} {} has {} successes out of {} trials",
                group, metric, counts.successes, counts.trials
            )));
        }
    }

    let z = normal::two_sided_critical_value(alpha)?;

    let trials_control = control.trials as f64;
    let trials_experiment = experiment.trials as f64;
    let pooled = (control.successes + experiment.successes) as f64
        / (trials_control + trials_experiment);
    let pooled_std_err =
        (pooled * (1.0 - pooled) * (1.0 / trials_control + 1.0 / trials_experiment)).sqrt();
    let margin = z * pooled_std_err;

    let diff = experiment.successes as f64 / trials_experiment
        - control.successes as f64 / trials_control;

    let is_statistically_significant = margin < diff.abs();
    let is_practically_significant =
        min_detectable_effect < (diff - margin).abs().min((diff + margin).abs());

    log::debug!(
        "{}: pooled={:.6} se={:.6} margin={:.6} diff={:.6}",
        metric,
        pooled,
        pooled_std_err,
        margin,
        diff
    );

    Ok(SignificanceVerdict {
        metric,
        observed_difference: diff,
        lower_bound: diff - margin,
        upper_bound: diff + margin,
        margin,
        min_detectable_effect,
        is_statistically_significant,
        is_practically_significant,
    })
}
