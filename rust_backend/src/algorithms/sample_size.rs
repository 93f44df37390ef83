//! Two-proportion sample size estimation and experiment sizing.
//!
//! The per-arm estimate follows Evan Miller's calculator: a standard-error
//! approximation in which the null variance assumes equal proportions in both
//! arms and the alternative variance shifts one arm by `delta`. This is not the
//! pooled variance used later when evaluating significance.

use serde::{Deserialize, Serialize};

use crate::algorithms::normal;
use crate::core::error::{ensure_open_unit, AnalysisError, AnalysisResult};

/// Minimum number of trials per arm needed to detect an absolute change
/// `delta` in a proportion with the given significance and power.
///
/// # Examples
///
/// ```
/// use abtest_rust::algorithms::sample_size::estimate;
///
/// // Classic worked example: 20.625% baseline, 1 point change
/// assert_eq!(estimate(0.05, 0.8, 0.20625, 0.01).unwrap(), 25835);
/// ```
pub fn estimate(alpha: f64, power: f64, baseline: f64, delta: f64) -> AnalysisResult<u64> {
    ensure_open_unit("alpha", alpha)?;
    ensure_open_unit("power", power)?;
    ensure_open_unit("baseline", baseline)?;
    ensure_open_unit("delta", delta)?;

    // Symmetric around 0.5
    let p = if baseline > 0.5 { 1.0 - baseline } else { baseline };
    if p + delta >= 1.0 {
        return Err(AnalysisError::InvalidParameter(format!(
            "baseline {} shifted by {} leaves the unit interval",
            p, delta
        )));
    }

    let z_alpha = normal::two_sided_critical_value(alpha)?;
    let z_beta = normal::quantile(power)?;

    let sd_null = (2.0 * p * (1.0 - p)).sqrt();
    let sd_alternative = (p * (1.0 - p) + (p + delta) * (1.0 - p - delta)).sqrt();

    let size = ((z_alpha * sd_null + z_beta * sd_alternative) / delta).powi(2);
    log::debug!(
        "sample size: z_alpha={:.6} z_beta={:.6} sd1={:.6} sd2={:.6} n={:.3}",
        z_alpha,
        z_beta,
        sd_null,
        sd_alternative,
        size
    );
    to_count("sample size", size)
}

/// Rounds `value` up to a whole count, refusing values a `u64` cannot hold.
fn to_count(what: &str, value: f64) -> AnalysisResult<u64> {
    let rounded = value.ceil();
    // u64::MAX as f64 rounds up to 2^64, which is itself out of range
    if !(rounded.is_finite() && rounded >= 0.0 && rounded < u64::MAX as f64) {
        return Err(AnalysisError::InvalidParameter(format!(
            "{} {} does not fit in a count",
            what, value
        )));
    }
    Ok(rounded as u64)
}

/// Converts a per-arm click sample size into total pageviews across both arms.
///
/// `ceil(2 * clicks / click_through_rate)`
pub fn pageview_sample_size(click_sample_size: u64, click_through_rate: f64) -> AnalysisResult<u64> {
    if !(click_through_rate.is_finite() && click_through_rate > 0.0 && click_through_rate <= 1.0)
    {
        return Err(AnalysisError::InvalidParameter(format!(
            "click-through rate must lie in (0, 1], got {}",
            click_through_rate
        )));
    }
    to_count(
        "pageview sample size",
        2.0 * click_sample_size as f64 / click_through_rate,
    )
}

/// Standard deviation of a click-based proportion `p` for a sample of
/// `pageviews` pageviews, of which a `click_through_rate` share click.
pub fn analytic_standard_deviation(
    proportion: f64,
    pageviews: f64,
    click_through_rate: f64,
) -> AnalysisResult<f64> {
    ensure_open_unit("proportion", proportion)?;
    ensure_open_unit("click_through_rate", click_through_rate)?;
    if !(pageviews.is_finite() && pageviews > 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "pageviews must be positive, got {}",
            pageviews
        )));
    }
    Ok((proportion * (1.0 - proportion) / (pageviews * click_through_rate)).sqrt())
}

/// Sample size requirement of a single evaluation metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSampleSize {
    pub baseline: f64,
    pub min_detectable_effect: f64,
    /// Per-arm clicks
    pub click_sample_size: u64,
    /// Pageviews over both arms
    pub pageview_sample_size: u64,
}

/// Computes the per-metric requirement, scaled from clicks to pageviews.
pub fn metric_sample_size(
    alpha: f64,
    power: f64,
    baseline: f64,
    min_detectable_effect: f64,
    click_through_rate: f64,
) -> AnalysisResult<MetricSampleSize> {
    let click_sample_size = estimate(alpha, power, baseline, min_detectable_effect)?;
    let pageview_sample_size = pageview_sample_size(click_sample_size, click_through_rate)?;
    Ok(MetricSampleSize {
        baseline,
        min_detectable_effect,
        click_sample_size,
        pageview_sample_size,
    })
}

/// Pageviews required so that every metric is adequately powered.
pub fn required_pageviews<'a, I>(requirements: I) -> AnalysisResult<u64>
where
    I: IntoIterator<Item = &'a MetricSampleSize>,
{
    requirements
        .into_iter()
        .map(|r| r.pageview_sample_size)
        .max()
        .ok_or_else(|| {
            AnalysisError::InsufficientData("no evaluation metrics to size".to_string())
        })
}

/// Days needed to collect `pageviews` when a share `exposure` of
/// `pageviews_per_day` is diverted to the experiment.
pub fn duration_days(pageviews: u64, pageviews_per_day: f64, exposure: f64) -> AnalysisResult<u64> {
    if !(pageviews_per_day.is_finite() && pageviews_per_day > 0.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "pageviews per day must be positive, got {}",
            pageviews_per_day
        )));
    }
    if !(exposure.is_finite() && exposure > 0.0 && exposure <= 1.0) {
        return Err(AnalysisError::InvalidParameter(format!(
            "exposure must lie in (0, 1], got {}",
            exposure
        )));
    }
    to_count("duration", pageviews as f64 / (pageviews_per_day * exposure))
}
