//! Core domain models and error types for experiment analysis.
//!
//! This module defines the fundamental data structures shared by every stage of
//! the pipeline: daily funnel counts, per-group totals, baseline metrics and the
//! immutable parameters of an analysis run.

pub mod domain;
pub mod error;

pub use domain::{
    AggregateTotals, BaselineMetrics, DailyRecord, EvaluationMetric, ExperimentParameters,
    ExperimentRun, Group, GroupTotals, InvariantMetric, MinDetectableEffects,
};
pub use error::{AnalysisError, AnalysisResult};
