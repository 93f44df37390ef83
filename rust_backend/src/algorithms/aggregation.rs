//! Reduction of daily funnel counts into per-group totals.

use crate::core::domain::{AggregateTotals, DailyRecord, ExperimentRun, GroupTotals};
use crate::core::error::{AnalysisError, AnalysisResult};

fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// Sums the first `window_length` records of one group.
///
/// Missing enrollments and payments are skipped, and so are the clicks of
/// those days in the matching conversion denominator. Fails when the window is
/// empty or longer than the data, or when the window contains no clicks.
///
/// # Examples
///
/// ```
/// use abtest_rust::algorithms::aggregation::aggregate;
/// use abtest_rust::core::domain::DailyRecord;
///
/// let records = vec![
///     DailyRecord::new("Sat, Oct 11", 7723, 687, Some(134), Some(70)),
///     DailyRecord::new("Sun, Oct 12", 9102, 779, Some(147), Some(70)),
///     DailyRecord::new("Mon, Nov 3", 9437, 788, None, None),
/// ];
/// let totals = aggregate(&records, 3).unwrap();
/// assert_eq!(totals.clicks, 2254);
/// assert_eq!(totals.enrollments, 281);
/// assert_eq!(totals.enrollment_clicks, 1466);
/// ```
pub fn aggregate(records: &[DailyRecord], window_length: usize) -> AnalysisResult<GroupTotals> {
    if window_length == 0 {
        return Err(AnalysisError::InvalidParameter(
            "window length must be at least one day".to_string(),
        ));
    }
    if window_length > records.len() {
        return Err(AnalysisError::InvalidParameter(format!(
            "window length {} exceeds the {} available days",
            window_length,
            records.len()
        )));
    }

    let window = &records[..window_length];
    let mut totals = GroupTotals {
        days: window_length,
        pageviews: 0,
        clicks: 0,
        enrollments: 0,
        payments: 0,
        enrollment_clicks: 0,
        payment_clicks: 0,
        gross_conversion: None,
        net_conversion: None,
    };

    for record in window {
        totals.pageviews += record.pageviews;
        totals.clicks += record.clicks;
        if let Some(enrollments) = record.enrollments {
            totals.enrollments += enrollments;
            totals.enrollment_clicks += record.clicks;
        }
        if let Some(payments) = record.payments {
            totals.payments += payments;
            totals.payment_clicks += record.clicks;
        }
    }

    if totals.clicks == 0 {
        return Err(AnalysisError::UndefinedRatio(format!(
            "no clicks in the first {} days",
            window_length
        )));
    }

    totals.gross_conversion = ratio(totals.enrollments, totals.enrollment_clicks);
    totals.net_conversion = ratio(totals.payments, totals.payment_clicks);
    Ok(totals)
}

/// Aggregates both groups of a run over the same window.
pub fn aggregate_run(run: &ExperimentRun, window_length: usize) -> AnalysisResult<AggregateTotals> {
    let control = aggregate(run.control(), window_length)
        .map_err(|e| annotate(e, "control"))?;
    let experiment = aggregate(run.experiment(), window_length)
        .map_err(|e| annotate(e, "experiment"))?;

    Ok(AggregateTotals {
        window_days: window_length,
        control,
        experiment,
    })
}

fn annotate(error: AnalysisError, group: &str) -> AnalysisError {
    match error {
        AnalysisError::UndefinedRatio(msg) => {
            AnalysisError::UndefinedRatio(format!("{} group: {}", group, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{EvaluationMetric, ExperimentParameters};

    fn records() -> Vec<DailyRecord> {
        vec![
            DailyRecord::new("d1", 1000, 100, Some(20), Some(10)),
            DailyRecord::new("d2", 1200, 120, Some(30), Some(12)),
            DailyRecord::new("d3", 900, 80, None, None),
        ]
    }

    #[test]
    fn test_aggregate_prefix() {
        let totals = aggregate(&records(), 2).unwrap();
        assert_eq!(totals.days, 2);
        assert_eq!(totals.pageviews, 2200);
        assert_eq!(totals.clicks, 220);
        assert_eq!(totals.enrollments, 50);
        assert_eq!(totals.payments, 22);
        assert_eq!(totals.gross_conversion, Some(50.0 / 220.0));
        assert_eq!(totals.net_conversion, Some(22.0 / 220.0));
    }

    #[test]
    fn test_aggregate_skips_missing_values() {
        let totals = aggregate(&records(), 3).unwrap();
        assert_eq!(totals.clicks, 300);
        assert_eq!(totals.enrollments, 50);
        assert_eq!(totals.enrollment_clicks, 220);
        assert_eq!(totals.conversion(EvaluationMetric::GrossConversion), Some(50.0 / 220.0));
    }

    #[test]
    fn test_aggregate_all_missing_numerators() {
        let data = vec![DailyRecord::new("d1", 100, 10, None, None)];
        let totals = aggregate(&data, 1).unwrap();
        assert_eq!(totals.gross_conversion, None);
        assert_eq!(totals.net_conversion, None);
    }

    #[test]
    fn test_aggregate_window_bounds() {
        assert!(matches!(
            aggregate(&records(), 0),
            Err(AnalysisError::InvalidParameter(_))
        ));
        assert!(matches!(
            aggregate(&records(), 4),
            Err(AnalysisError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_aggregate_zero_clicks() {
        let data = vec![DailyRecord::new("d1", 100, 0, Some(0), Some(0))];
        assert!(matches!(
            aggregate(&data, 1),
            Err(AnalysisError::UndefinedRatio(_))
        ));
    }

    #[test]
    fn test_aggregate_run_names_group() {
        let control = vec![DailyRecord::new("d1", 100, 0, Some(0), Some(0))];
        let experiment = vec![DailyRecord::new("d1", 100, 10, Some(2), Some(1))];
        let run = ExperimentRun::new(control, experiment, ExperimentParameters::default()).unwrap();
        match aggregate_run(&run, 1) {
            Err(AnalysisError::UndefinedRatio(msg)) => assert!(msg.starts_with("control group")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
