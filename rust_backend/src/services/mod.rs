//! Service layer for analysis orchestration and experiment planning.
//!
//! Services sit between the loaders and the Python bindings: they combine the
//! statistical routines in [`crate::algorithms`] into complete workflows.

pub mod analysis;
pub mod planning;

pub use analysis::{
    analyze_experiment, AnalysisOutcome, AnalysisReport, ExperimentAnalyzer, MetricEvaluation,
};
pub use planning::{plan_experiment, ExperimentPlan, MetricPlan, PlanningSettings};
