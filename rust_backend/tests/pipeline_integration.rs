//! End-to-end tests of loading, sizing and analysis.
//!
//! The fixtures under `tests/data/` hold 37 aligned days per group. Enrollments
//! and payments stop after the 23rd day, and their totals match the reference
//! course experiment (pageviews 345543 / 344660, clicks 28378 / 28325,
//! enrollments 3785 / 3423 and payments 2033 / 1945 over 17293 / 17260 clicks).

use std::path::{Path, PathBuf};

use abtest_rust::config::AnalysisConfig;
use abtest_rust::core::domain::{
    EvaluationMetric, ExperimentParameters, ExperimentRun, InvariantMetric,
};
use abtest_rust::core::error::AnalysisError;
use abtest_rust::io::loaders::{BaselineLoader, ExperimentLoader};
use abtest_rust::services::analysis::{analyze_experiment, AnalysisOutcome, ExperimentAnalyzer};
use abtest_rust::services::planning::plan_experiment;
use chrono::NaiveDate;

fn data_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("data").join(name)
}

fn load_fixture_run() -> ExperimentRun {
    ExperimentLoader::load_run(
        &data_path("control.csv"),
        &data_path("experiment.csv"),
        ExperimentParameters::default(),
    )
    .expect("fixtures load")
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    assert!(
        (actual - expected).abs() < tolerance,
        "expected {} within {} of {}",
        actual,
        tolerance,
        expected
    );
}

#[test]
fn test_fixture_totals() {
    let run = load_fixture_run();
    assert_eq!(run.len(), 37);

    let outcome = ExperimentAnalyzer::new().analyze(&run).unwrap();
    let totals = outcome.totals();
    assert_eq!(totals.control.pageviews, 345543);
    assert_eq!(totals.experiment.pageviews, 344660);
    assert_eq!(totals.control.clicks, 28378);
    assert_eq!(totals.experiment.clicks, 28325);
    assert_eq!(totals.control.enrollments, 3785);
    assert_eq!(totals.control.enrollment_clicks, 17293);
    assert_eq!(totals.experiment.payments, 1945);
    assert_eq!(totals.experiment.payment_clicks, 17260);
}

#[test]
fn test_experiment_sizing_from_baseline_file() {
    let baseline = BaselineLoader::load_from_file(&data_path("baseline.csv")).unwrap();
    let config = AnalysisConfig::from_toml_str(
        "[planning]\nexposure = 1.0\nstart_date = \"2014-10-11\"\n",
    )
    .unwrap();

    let plan = plan_experiment(&baseline, &config.parameters, &config.planning).unwrap();
    let gross = plan.metric(EvaluationMetric::GrossConversion).unwrap();
    let net = plan.metric(EvaluationMetric::NetConversion).unwrap();
    assert_eq!(gross.sample_size.click_sample_size, 25835);
    assert_eq!(net.sample_size.click_sample_size, 27414);
    assert_eq!(plan.total_pageviews, 685350);
    assert_eq!(plan.duration_days, 18);
    assert_eq!(plan.end_date, NaiveDate::from_ymd_opt(2014, 10, 28));
}

#[test]
fn test_sanity_checks_pass_on_full_window() {
    let run = load_fixture_run();
    let outcome = analyze_experiment(&run, None).unwrap();
    assert!(outcome.sanity().all_pass());

    let pageviews = outcome.sanity().get(InvariantMetric::Pageviews).unwrap();
    assert_close(pageviews.result.observed_proportion, 0.5006397, 1e-6);
    assert_close(pageviews.result.lower_bound, 0.4988204, 1e-6);
    assert_close(pageviews.result.upper_bound, 0.5011796, 1e-6);

    let clicks = outcome.sanity().get(InvariantMetric::Clicks).unwrap();
    assert_close(clicks.result.lower_bound, 0.4958846, 1e-6);
    assert_close(clicks.result.upper_bound, 0.5041154, 1e-6);
}

#[test]
fn test_effect_size_and_sign_tests() {
    let run = load_fixture_run();
    let outcome = analyze_experiment(&run, None).unwrap();
    let report = outcome.report().expect("sanity checks pass");

    let gross = report.metric(EvaluationMetric::GrossConversion).unwrap();
    assert_close(gross.verdict.observed_difference, -0.0205549, 1e-6);
    assert_close(gross.verdict.lower_bound, -0.0291232, 1e-6);
    assert_close(gross.verdict.upper_bound, -0.0119865, 1e-6);
    assert!(gross.verdict.is_statistically_significant);
    assert!(gross.verdict.is_practically_significant);
    assert_eq!(gross.sign_test.positive_days, 4);
    assert_eq!(gross.sign_test.total_days, 23);
    assert_close(gross.sign_test.p_value, 0.0025995, 1e-6);
    assert!(gross.sign_test.is_significant);
    assert!(gross.tests_agree);
    assert_eq!(gross.daily_differences.len(), 37);
    assert_eq!(
        gross.daily_differences.iter().filter(|d| d.difference.is_none()).count(),
        14
    );

    let net = report.metric(EvaluationMetric::NetConversion).unwrap();
    assert_close(net.verdict.observed_difference, -0.0048737, 1e-6);
    assert_close(net.verdict.lower_bound, -0.0116045, 1e-6);
    assert_close(net.verdict.upper_bound, 0.0018571, 1e-6);
    assert!(!net.verdict.is_statistically_significant);
    assert!(!net.verdict.is_practically_significant);
    assert_eq!(net.sign_test.positive_days, 10);
    assert_close(net.sign_test.p_value, 0.6776395, 1e-6);
    assert!(!net.sign_test.is_significant);
    assert!(net.tests_agree);
}

#[test]
fn test_window_of_reported_days_matches_full_window() {
    let run = load_fixture_run();
    let full = analyze_experiment(&run, None).unwrap();
    let reported = analyze_experiment(&run, Some(23)).unwrap();

    let full_gross = full.report().unwrap().metric(EvaluationMetric::GrossConversion).unwrap();
    let window_gross = reported
        .report()
        .unwrap()
        .metric(EvaluationMetric::GrossConversion)
        .unwrap();
    assert_eq!(full_gross.verdict, window_gross.verdict);
    assert_eq!(full_gross.sign_test, window_gross.sign_test);
}

#[test]
fn test_short_window_is_inconclusive() {
    let run = load_fixture_run();
    let outcome = analyze_experiment(&run, Some(14)).unwrap();

    match &outcome {
        AnalysisOutcome::Inconclusive { totals, sanity } => {
            assert_eq!(totals.control.pageviews, 130781);
            assert_eq!(totals.experiment.pageviews, 129452);
            let pageviews = sanity.get(InvariantMetric::Pageviews).unwrap();
            assert!(!pageviews.result.passes);
        }
        AnalysisOutcome::Completed(_) => panic!("expected an inconclusive outcome"),
    }
}

#[test]
fn test_window_longer_than_data() {
    let run = load_fixture_run();
    let result = analyze_experiment(&run, Some(38));
    assert!(matches!(result, Err(AnalysisError::InvalidParameter(_))));
}

#[test]
fn test_rerun_is_deterministic() {
    let run = load_fixture_run();
    let analyzer = ExperimentAnalyzer::with_window(30);
    assert_eq!(analyzer.analyze(&run).unwrap(), analyzer.analyze(&run).unwrap());
}

#[test]
fn test_json_input_matches_csv_input() {
    let run = load_fixture_run();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("experiment.json");
    let document = serde_json::json!({
        "control": run.control(),
        "experiment": run.experiment(),
    });
    std::fs::write(&path, serde_json::to_string(&document).unwrap()).unwrap();

    let (control, experiment) = ExperimentLoader::load_combined_json(&path).unwrap();
    let json_run = ExperimentRun::new(control, experiment, ExperimentParameters::default()).unwrap();
    assert_eq!(
        analyze_experiment(&json_run, None).unwrap(),
        analyze_experiment(&run, None).unwrap()
    );
}

#[test]
fn test_config_file_drives_window_and_parameters() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(data_path("baseline.csv"), dir.path().join("baseline.csv")).unwrap();
    let config_path = dir.path().join("abtest.toml");
    std::fs::write(
        &config_path,
        "window_days = 23\nbaseline_file = \"baseline.csv\"\n\n[parameters]\nalpha = 0.05\npower = 0.8\n",
    )
    .unwrap();

    let config = AnalysisConfig::from_file(&config_path).unwrap();
    assert!(BaselineLoader::from_config(&config).unwrap().is_some());

    let run = ExperimentLoader::load_run(
        &data_path("control.csv"),
        &data_path("experiment.csv"),
        config.parameters.clone(),
    )
    .unwrap();
    let outcome = analyze_experiment(&run, config.window_days).unwrap();
    assert_eq!(outcome.totals().window_days, 23);
}

#[test]
fn test_invalid_records_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let control = dir.path().join("control.csv");
    let experiment = dir.path().join("experiment.csv");
    std::fs::write(
        &control,
        "Date,Pageviews,Clicks,Enrollments,Payments\nd1,100,120,10,5\n",
    )
    .unwrap();
    std::fs::write(
        &experiment,
        "Date,Pageviews,Clicks,Enrollments,Payments\nd1,100,10,5,2\n",
    )
    .unwrap();

    let result = ExperimentLoader::load_run(&control, &experiment, ExperimentParameters::default());
    let err = result.unwrap_err();
    let analysis_error = err.downcast_ref::<AnalysisError>();
    assert!(
        matches!(analysis_error, Some(AnalysisError::InvalidRecord(_))),
        "unexpected error: {:#}",
        err
    );
}
