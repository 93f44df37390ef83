//! Analysis pipeline: sanity checks, significance and sign tests.
//!
//! The pipeline aggregates both groups over the requested window, then checks
//! the invariant metrics. Evaluation only proceeds when every invariant passes;
//! otherwise the run is reported as inconclusive so the split can be
//! investigated before any effect is trusted.

use serde::Serialize;

use crate::algorithms::aggregation::aggregate_run;
use crate::algorithms::sanity::{run_sanity_checks, SanityReport};
use crate::algorithms::sign_test::{
    daily_differences, sign_test_daily, DailyDifference, SignTestResult,
};
use crate::algorithms::significance::{evaluate_significance, SignificanceVerdict};
use crate::core::domain::{AggregateTotals, DailyRecord, EvaluationMetric, ExperimentRun};
use crate::core::error::{AnalysisError, AnalysisResult};

/// Confidence interval and sign test of one evaluation metric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricEvaluation {
    pub metric: EvaluationMetric,
    pub verdict: SignificanceVerdict,
    pub daily_differences: Vec<DailyDifference>,
    pub sign_test: SignTestResult,
    /// Whether the interval and the sign test reach the same significance verdict
    pub tests_agree: bool,
}

/// Full report of a run whose sanity checks passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub totals: AggregateTotals,
    pub sanity: SanityReport,
    pub metrics: Vec<MetricEvaluation>,
}

impl AnalysisReport {
    pub fn metric(&self, metric: EvaluationMetric) -> Option<&MetricEvaluation> {
        self.metrics.iter().find(|m| m.metric == metric)
    }
}

/// Terminal state of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisOutcome {
    /// An invariant metric failed its split check; investigate before evaluating.
    Inconclusive {
        totals: AggregateTotals,
        sanity: SanityReport,
    },
    Completed(AnalysisReport),
}

impl AnalysisOutcome {
    pub fn is_conclusive(&self) -> bool {
        matches!(self, AnalysisOutcome::Completed(_))
    }

    pub fn report(&self) -> Option<&AnalysisReport> {
        match self {
            AnalysisOutcome::Completed(report) => Some(report),
            AnalysisOutcome::Inconclusive { .. } => None,
        }
    }

    pub fn totals(&self) -> &AggregateTotals {
        match self {
            AnalysisOutcome::Completed(report) => &report.totals,
            AnalysisOutcome::Inconclusive { totals, .. } => totals,
        }
    }

    pub fn sanity(&self) -> &SanityReport {
        match self {
            AnalysisOutcome::Completed(report) => &report.sanity,
            AnalysisOutcome::Inconclusive { sanity, .. } => sanity,
        }
    }
}

/// Runs the analysis pipeline over a window of an experiment run.
///
/// The analyzer holds no state between calls: re-running with another window
/// recomputes every total and verdict from the immutable run.
///
/// # Examples
///
/// ```
/// use abtest_rust::core::domain::{DailyRecord, ExperimentParameters, ExperimentRun};
/// use abtest_rust::services::analysis::ExperimentAnalyzer;
///
/// let control = vec![DailyRecord::new("Sat, Oct 11", 7723, 687, Some(134), Some(70))];
/// let experiment = vec![DailyRecord::new("Sat, Oct 11", 7716, 686, Some(105), Some(34))];
/// let run = ExperimentRun::new(control, experiment, ExperimentParameters::default()).unwrap();
///
/// let outcome = ExperimentAnalyzer::new().analyze(&run).unwrap();
/// assert!(outcome.is_conclusive());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExperimentAnalyzer {
    window_days: Option<usize>,
}

impl ExperimentAnalyzer {
    /// Analyzer over the full length of each run.
    pub fn new() -> Self {
        Self { window_days: None }
    }

    /// Analyzer over the first `window_days` days of each run.
    pub fn with_window(window_days: usize) -> Self {
        Self {
            window_days: Some(window_days),
        }
    }

    pub fn window_days(&self) -> Option<usize> {
        self.window_days
    }

    pub fn analyze(&self, run: &ExperimentRun) -> AnalysisResult<AnalysisOutcome> {
        let window = self.window_days.unwrap_or(run.len());
        let params = run.parameters();
        log::info!(
            "Analyzing {} of {} days (alpha={}, power={})",
            window,
            run.len(),
            params.alpha,
            params.power
        );

        // Step 1: Aggregate both groups over the window
        let totals = aggregate_run(run, window)?;

        // Step 2: Sanity checks on invariant metrics
        let sanity = run_sanity_checks(&totals, params.alpha)?;
        if !sanity.all_pass() {
            for check in sanity.failed() {
                log::warn!(
                    "Sanity check failed for {}: observed {:.4} outside ({:.4}, {:.4})",
                    check.metric,
                    check.result.observed_proportion,
                    check.result.lower_bound,
                    check.result.upper_bound
                );
            }
            log::warn!("Analysis inconclusive: investigate the group assignment");
            return Ok(AnalysisOutcome::Inconclusive { totals, sanity });
        }
        log::info!("All sanity checks passed");

        // Step 3: Confidence intervals and sign tests per evaluation metric
        let control = &run.control()[..window];
        let experiment = &run.experiment()[..window];
        let metrics = EvaluationMetric::ALL
            .iter()
            .map(|&metric| {
                Self::evaluate_metric(run, &totals, control, experiment, metric)
            })
            .collect::<AnalysisResult<Vec<_>>>()?;

        Ok(AnalysisOutcome::Completed(AnalysisReport {
            totals,
            sanity,
            metrics,
        }))
    }

    fn evaluate_metric(
        run: &ExperimentRun,
        totals: &AggregateTotals,
        control: &[DailyRecord],
        experiment: &[DailyRecord],
        metric: EvaluationMetric,
    ) -> AnalysisResult<MetricEvaluation> {
        let params = run.parameters();
        let verdict = evaluate_significance(
            &totals.control,
            &totals.experiment,
            metric,
            params.min_detectable_effect.get(metric),
            params.alpha,
        )?;

        let differences = daily_differences(control, experiment, metric)?;
        let sign_test = sign_test_daily(&differences, params.alpha).map_err(|e| match e {
            AnalysisError::InsufficientData(msg) => {
                AnalysisError::InsufficientData(format!("{}: {}", metric, msg))
            }
            other => other,
        })?;

        let tests_agree = verdict.is_statistically_significant == sign_test.is_significant;
        log::info!(
            "{}: diff={:.4} CI=({:.4}, {:.4}) statistical={} practical={} sign-test p={:.4}",
            metric,
            verdict.observed_difference,
            verdict.lower_bound,
            verdict.upper_bound,
            verdict.is_statistically_significant,
            verdict.is_practically_significant,
            sign_test.p_value
        );
        if !tests_agree {
            log::warn!(
                "{}: confidence interval and sign test disagree on significance",
                metric
            );
        }

        Ok(MetricEvaluation {
            metric,
            verdict,
            daily_differences: differences,
            sign_test,
            tests_agree,
        })
    }
}

/// Convenience function to analyze a run over an optional window.
pub fn analyze_experiment(
    run: &ExperimentRun,
    window_days: Option<usize>,
) -> AnalysisResult<AnalysisOutcome> {
    let analyzer = match window_days {
        Some(days) => ExperimentAnalyzer::with_window(days),
        None => ExperimentAnalyzer::new(),
    };
    analyzer.analyze(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{ExperimentParameters, InvariantMetric};

    fn balanced_run() -> ExperimentRun {
        let control = (0..10)
            .map(|i| DailyRecord::new(format!("d{}", i), 10_000, 800, Some(160), Some(90)))
            .collect();
        let experiment = (0..10)
            .map(|i| DailyRecord::new(format!("d{}", i), 10_000, 800, Some(130), Some(88)))
            .collect();
        ExperimentRun::new(control, experiment, ExperimentParameters::default()).unwrap()
    }

    #[test]
    fn test_completed_report() {
        let outcome = ExperimentAnalyzer::new().analyze(&balanced_run()).unwrap();
        let report = outcome.report().expect("sanity checks should pass");
        assert_eq!(report.totals.window_days, 10);
        assert_eq!(report.metrics.len(), 2);

        let gross = report.metric(EvaluationMetric::GrossConversion).unwrap();
        assert!(gross.verdict.is_statistically_significant);
        assert_eq!(gross.sign_test.positive_days, 0);
        assert_eq!(gross.sign_test.total_days, 10);
        assert!(gross.sign_test.is_significant);
        assert!(gross.tests_agree);
    }

    #[test]
    fn test_window_limits_days() {
        let outcome = ExperimentAnalyzer::with_window(4)
            .analyze(&balanced_run())
            .unwrap();
        assert_eq!(outcome.totals().control.pageviews, 40_000);
        let report = outcome.report().unwrap();
        assert_eq!(report.metrics[0].daily_differences.len(), 4);
    }

    #[test]
    fn test_failed_sanity_is_inconclusive() {
        let control = vec![DailyRecord::new("d1", 60_000, 4_800, Some(900), Some(500))];
        let experiment = vec![DailyRecord::new("d1", 40_000, 3_200, Some(600), Some(330))];
        let run = ExperimentRun::new(control, experiment, ExperimentParameters::default()).unwrap();

        let outcome = analyze_experiment(&run, None).unwrap();
        assert!(!outcome.is_conclusive());
        assert!(outcome.report().is_none());
        let pageviews = outcome.sanity().get(InvariantMetric::Pageviews).unwrap();
        assert!(!pageviews.result.passes);
    }

    #[test]
    fn test_window_out_of_range() {
        let result = analyze_experiment(&balanced_run(), Some(11));
        assert!(matches!(result, Err(AnalysisError::InvalidParameter(_))));
    }

    #[test]
    fn test_outcome_serializes_with_status() {
        let outcome = ExperimentAnalyzer::new().analyze(&balanced_run()).unwrap();
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "completed");
        assert_eq!(json["metrics"][0]["metric"], "gross_conversion");
    }
}
