//! Domain models for two-group funnel experiments.
//!
//! This module provides the core data structures consumed and produced by the
//! analysis pipeline: per-day funnel counts, per-group totals, baseline metrics
//! used for sizing, and the immutable parameter set of an analysis run.

use serde::{Deserialize, Serialize};

use crate::core::error::{ensure_open_unit, AnalysisError, AnalysisResult};
use crate::preprocessing::validator::RecordValidator;

/// One calendar day of funnel counts for one group.
///
/// `enrollments` and `payments` are optional: the source data stops reporting
/// them after a cutoff date, and a missing value must never be read as zero.
///
/// # Examples
///
/// ```
/// use abtest_rust::core::domain::{DailyRecord, EvaluationMetric};
///
/// let day = DailyRecord::new("Sat, Oct 11", 7723, 687, Some(134), Some(70));
/// let gross = day.conversion(EvaluationMetric::GrossConversion).unwrap();
/// assert!((gross - 134.0 / 687.0).abs() < 1e-12);
///
/// let ragged = DailyRecord::new("Mon, Nov 3", 9437, 788, None, None);
/// assert_eq!(ragged.conversion(EvaluationMetric::NetConversion), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: String,
    pub pageviews: u64,
    pub clicks: u64,
    #[serde(default)]
    pub enrollments: Option<u64>,
    #[serde(default)]
    pub payments: Option<u64>,
}

impl DailyRecord {
    pub fn new(
        date: impl Into<String>,
        pageviews: u64,
        clicks: u64,
        enrollments: Option<u64>,
        payments: Option<u64>,
    ) -> Self {
        Self {
            date: date.into(),
            pageviews,
            clicks,
            enrollments,
            payments,
        }
    }

    /// Returns the day's value for `metric`, or `None` when the numerator is
    /// missing or the day has no clicks.
    pub fn conversion(&self, metric: EvaluationMetric) -> Option<f64> {
        if self.clicks == 0 {
            return None;
        }
        metric
            .numerator(self)
            .map(|numerator| numerator as f64 / self.clicks as f64)
    }
}

/// Experiment arm a record or total belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Control,
    Experiment,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Group::Control => write!(f, "control"),
            Group::Experiment => write!(f, "experiment"),
        }
    }
}

/// Metrics the experiment is designed to move, all ratios over clicks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMetric {
    /// Enrollments / clicks
    GrossConversion,
    /// Payments / clicks
    NetConversion,
}

impl EvaluationMetric {
    pub const ALL: [EvaluationMetric; 2] = [
        EvaluationMetric::GrossConversion,
        EvaluationMetric::NetConversion,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EvaluationMetric::GrossConversion => "Gross conversion",
            EvaluationMetric::NetConversion => "Net conversion",
        }
    }

    /// Numerator field of this metric for a single day.
    pub fn numerator(&self, record: &DailyRecord) -> Option<u64> {
        match self {
            EvaluationMetric::GrossConversion => record.enrollments,
            EvaluationMetric::NetConversion => record.payments,
        }
    }
}

impl std::fmt::Display for EvaluationMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pre-exposure metrics expected to split evenly between groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvariantMetric {
    /// Unique cookies viewing the course overview page
    Pageviews,
    /// Unique cookies clicking "start free trial"
    Clicks,
}

impl InvariantMetric {
    pub const ALL: [InvariantMetric; 2] = [InvariantMetric::Pageviews, InvariantMetric::Clicks];

    pub fn name(&self) -> &'static str {
        match self {
            InvariantMetric::Pageviews => "Cookies",
            InvariantMetric::Clicks => "Clicks",
        }
    }

    pub fn count(&self, totals: &GroupTotals) -> u64 {
        match self {
            InvariantMetric::Pageviews => totals.pageviews,
            InvariantMetric::Clicks => totals.clicks,
        }
    }
}

impl std::fmt::Display for InvariantMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Summed counts of one group over an analysis window.
///
/// `enrollment_clicks` and `payment_clicks` are the clicks of the days on which
/// the corresponding numerator was reported; they are the denominators of the
/// conversion ratios, so days with missing numerators drop out of both sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTotals {
    pub days: usize,
    pub pageviews: u64,
    pub clicks: u64,
    pub enrollments: u64,
    pub payments: u64,
    pub enrollment_clicks: u64,
    pub payment_clicks: u64,
    pub gross_conversion: Option<f64>,
    pub net_conversion: Option<f64>,
}

impl GroupTotals {
    pub fn numerator(&self, metric: EvaluationMetric) -> u64 {
        match metric {
            EvaluationMetric::GrossConversion => self.enrollments,
            EvaluationMetric::NetConversion => self.payments,
        }
    }

    pub fn denominator(&self, metric: EvaluationMetric) -> u64 {
        match metric {
            EvaluationMetric::GrossConversion => self.enrollment_clicks,
            EvaluationMetric::NetConversion => self.payment_clicks,
        }
    }

    pub fn conversion(&self, metric: EvaluationMetric) -> Option<f64> {
        match metric {
            EvaluationMetric::GrossConversion => self.gross_conversion,
            EvaluationMetric::NetConversion => self.net_conversion,
        }
    }
}

/// Totals of both groups over the same window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTotals {
    pub window_days: usize,
    pub control: GroupTotals,
    pub experiment: GroupTotals,
}

impl AggregateTotals {
    pub fn group(&self, group: Group) -> &GroupTotals {
        match group {
            Group::Control => &self.control,
            Group::Experiment => &self.experiment,
        }
    }
}

/// Historical per-day baseline estimates used for experiment sizing.
///
/// Field order matches the row order of the baseline table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineMetrics {
    pub pageviews_per_day: f64,
    pub clicks_per_day: f64,
    pub enrollments_per_day: f64,
    pub click_through_rate: f64,
    pub gross_conversion: f64,
    pub retention: f64,
    pub net_conversion: f64,
}

impl BaselineMetrics {
    /// Baseline proportion of an evaluation metric.
    pub fn proportion(&self, metric: EvaluationMetric) -> f64 {
        match metric {
            EvaluationMetric::GrossConversion => self.gross_conversion,
            EvaluationMetric::NetConversion => self.net_conversion,
        }
    }

    pub fn validate(&self) -> AnalysisResult<()> {
        for (name, count) in [
            ("pageviews_per_day", self.pageviews_per_day),
            ("clicks_per_day", self.clicks_per_day),
            ("enrollments_per_day", self.enrollments_per_day),
        ] {
            if !(count.is_finite() && count > 0.0) {
                return Err(AnalysisError::InvalidParameter(format!(
                    "baseline {} must be positive, got {}",
                    name, count
                )));
            }
        }
        ensure_open_unit("baseline click_through_rate", self.click_through_rate)?;
        ensure_open_unit("baseline gross_conversion", self.gross_conversion)?;
        ensure_open_unit("baseline retention", self.retention)?;
        ensure_open_unit("baseline net_conversion", self.net_conversion)?;
        Ok(())
    }
}

/// Minimum difference in each evaluation metric that matters to the business.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinDetectableEffects {
    #[serde(default = "default_gross_conversion_effect")]
    pub gross_conversion: f64,
    #[serde(default = "default_net_conversion_effect")]
    pub net_conversion: f64,
}

fn default_gross_conversion_effect() -> f64 {
    0.01
}

fn default_net_conversion_effect() -> f64 {
    0.0075
}

impl Default for MinDetectableEffects {
    fn default() -> Self {
        Self {
            gross_conversion: default_gross_conversion_effect(),
            net_conversion: default_net_conversion_effect(),
        }
    }
}

impl MinDetectableEffects {
    pub fn get(&self, metric: EvaluationMetric) -> f64 {
        match metric {
            EvaluationMetric::GrossConversion => self.gross_conversion,
            EvaluationMetric::NetConversion => self.net_conversion,
        }
    }
}

/// Scalar parameters shared by every stage of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParameters {
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_power")]
    pub power: f64,
    #[serde(default)]
    pub min_detectable_effect: MinDetectableEffects,
}

fn default_alpha() -> f64 {
    0.05
}

fn default_power() -> f64 {
    0.8
}

impl Default for ExperimentParameters {
    fn default() -> Self {
        Self {
            alpha: default_alpha(),
            power: default_power(),
            min_detectable_effect: MinDetectableEffects::default(),
        }
    }
}

impl ExperimentParameters {
    pub fn validate(&self) -> AnalysisResult<()> {
        ensure_open_unit("alpha", self.alpha)?;
        ensure_open_unit("power", self.power)?;
        for metric in EvaluationMetric::ALL {
            let name = format!("minimum detectable effect for {}", metric);
            ensure_open_unit(&name, self.min_detectable_effect.get(metric))?;
        }
        Ok(())
    }
}

/// Validated control and experiment series plus analysis parameters.
///
/// Construction checks the record invariants and the date alignment of the two
/// groups, so every run handed to the pipeline is internally consistent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentRun {
    control: Vec<DailyRecord>,
    experiment: Vec<DailyRecord>,
    parameters: ExperimentParameters,
}

impl ExperimentRun {
    pub fn new(
        control: Vec<DailyRecord>,
        experiment: Vec<DailyRecord>,
        parameters: ExperimentParameters,
    ) -> AnalysisResult<Self> {
        parameters.validate()?;

        if control.len() != experiment.len() {
            return Err(AnalysisError::MisalignedGroups(format!(
                "control has {} days but experiment has {}",
                control.len(),
                experiment.len()
            )));
        }
        if let Some((index, (c, e))) = control
            .iter()
            .zip(experiment.iter())
            .enumerate()
            .find(|(_, (c, e))| c.date != e.date)
        {
            return Err(AnalysisError::MisalignedGroups(format!(
                "day {} is '{}' in control but '{}' in experiment",
                index, c.date, e.date
            )));
        }

        let validation = RecordValidator::validate_pair(&control, &experiment);
        for warning in &validation.warnings {
            log::warn!("{}", warning);
        }
        if !validation.is_valid {
            return Err(AnalysisError::InvalidRecord(validation.errors.join("; ")));
        }

        Ok(Self {
            control,
            experiment,
            parameters,
        })
    }

    pub fn control(&self) -> &[DailyRecord] {
        &self.control
    }

    pub fn experiment(&self) -> &[DailyRecord] {
        &self.experiment
    }

    pub fn group(&self, group: Group) -> &[DailyRecord] {
        match group {
            Group::Control => &self.control,
            Group::Experiment => &self.experiment,
        }
    }

    pub fn parameters(&self) -> &ExperimentParameters {
        &self.parameters
    }

    /// Number of aligned days available for analysis.
    pub fn len(&self) -> usize {
        self.control.len()
    }

    pub fn is_empty(&self) -> bool {
        self.control.is_empty()
    }
}
