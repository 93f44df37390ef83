//! Experiment sizing from historical baseline metrics.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::algorithms::sample_size::{
    analytic_standard_deviation, duration_days, metric_sample_size, required_pageviews,
    MetricSampleSize,
};
use crate::core::domain::{BaselineMetrics, EvaluationMetric, ExperimentParameters};
use crate::core::error::{AnalysisError, AnalysisResult};

/// Pageviews of the reference sample used for analytic variability.
pub const VARIABILITY_PAGEVIEWS: f64 = 5000.0;

/// How traffic is diverted to the experiment and when it starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningSettings {
    /// Fraction of daily traffic diverted to the experiment, in (0, 1]
    #[serde(default = "default_exposure")]
    pub exposure: f64,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

fn default_exposure() -> f64 {
    1.0
}

impl Default for PlanningSettings {
    fn default() -> Self {
        Self {
            exposure: default_exposure(),
            start_date: None,
        }
    }
}

impl PlanningSettings {
    pub fn validate(&self) -> AnalysisResult<()> {
        if !(self.exposure.is_finite() && self.exposure > 0.0 && self.exposure <= 1.0) {
            return Err(AnalysisError::InvalidParameter(format!(
                "exposure must lie in (0, 1], got {}",
                self.exposure
            )));
        }
        Ok(())
    }
}

/// Sizing of one evaluation metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPlan {
    pub metric: EvaluationMetric,
    #[serde(flatten)]
    pub sample_size: MetricSampleSize,
    /// Standard deviation of the metric over [`VARIABILITY_PAGEVIEWS`] pageviews
    pub standard_deviation: f64,
}

/// Sample sizes, duration and projected dates of an experiment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentPlan {
    pub metrics: Vec<MetricPlan>,
    /// Pageviews over both arms so that every metric is powered
    pub total_pageviews: u64,
    pub duration_days: u64,
    pub exposure: f64,
    pub start_date: Option<NaiveDate>,
    /// Last day of data collection, inclusive
    pub end_date: Option<NaiveDate>,
}

impl ExperimentPlan {
    pub fn metric(&self, metric: EvaluationMetric) -> Option<&MetricPlan> {
        self.metrics.iter().find(|m| m.metric == metric)
    }

    /// Metric that drives the total pageview requirement.
    pub fn limiting_metric(&self) -> Option<EvaluationMetric> {
        self.metrics
            .iter()
            .max_by_key(|m| m.sample_size.pageview_sample_size)
            .map(|m| m.metric)
    }
}

/// Sizes an experiment for every evaluation metric.
///
/// # Examples
///
/// ```
/// use abtest_rust::core::domain::{BaselineMetrics, ExperimentParameters};
/// use abtest_rust::services::planning::{plan_experiment, PlanningSettings};
///
/// let baseline = BaselineMetrics {
///     pageviews_per_day: 40000.0,
///     clicks_per_day: 3200.0,
///     enrollments_per_day: 660.0,
///     click_through_rate: 0.08,
///     gross_conversion: 0.20625,
///     retention: 0.53,
///     net_conversion: 0.1093125,
/// };
/// let plan = plan_experiment(&baseline, &ExperimentParameters::default(), &PlanningSettings::default()).unwrap();
/// assert_eq!(plan.total_pageviews, 685350);
/// assert_eq!(plan.duration_days, 18);
/// ```
pub fn plan_experiment(
    baseline: &BaselineMetrics,
    parameters: &ExperimentParameters,
    settings: &PlanningSettings,
) -> AnalysisResult<ExperimentPlan> {
    baseline.validate()?;
    parameters.validate()?;
    settings.validate()?;

    let metrics = EvaluationMetric::ALL
        .iter()
        .map(|&metric| {
            let proportion = baseline.proportion(metric);
            let sample_size = metric_sample_size(
                parameters.alpha,
                parameters.power,
                proportion,
                parameters.min_detectable_effect.get(metric),
                baseline.click_through_rate,
            )?;
            let standard_deviation = analytic_standard_deviation(
                proportion,
                VARIABILITY_PAGEVIEWS,
                baseline.click_through_rate,
            )?;
            log::debug!(
                "{}: {} clicks per arm, {} pageviews, sd={:.4}",
                metric,
                sample_size.click_sample_size,
                sample_size.pageview_sample_size,
                standard_deviation
            );
            Ok(MetricPlan {
                metric,
                sample_size,
                standard_deviation,
            })
        })
        .collect::<AnalysisResult<Vec<_>>>()?;

    let total_pageviews = required_pageviews(metrics.iter().map(|m| &m.sample_size))?;
    let duration_days = duration_days(
        total_pageviews,
        baseline.pageviews_per_day,
        settings.exposure,
    )?;

    let end_date = match settings.start_date {
        Some(start) => Some(
            start
                .checked_add_days(Days::new(duration_days.saturating_sub(1)))
                .ok_or_else(|| {
                    AnalysisError::InvalidParameter(format!(
                        "end date overflows for start {} and {} days",
                        start, duration_days
                    ))
                })?,
        ),
        None => None,
    };

    log::info!(
        "Experiment needs {} pageviews: {} days at {:.0}% exposure",
        total_pageviews,
        duration_days,
        settings.exposure * 100.0
    );

    Ok(ExperimentPlan {
        metrics,
        total_pageviews,
        duration_days,
        exposure: settings.exposure,
        start_date: settings.start_date,
        end_date,
    })
}
