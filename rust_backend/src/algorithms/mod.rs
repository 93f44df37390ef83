//! Statistical computations of the experiment analysis.
//!
//! Every function here is pure: it reads its numeric inputs, never mutates them,
//! and returns either a value or an [`AnalysisError`](crate::core::AnalysisError).
//!
//! # Components
//!
//! - [`normal`]: Standard normal quantile and CDF
//! - [`sample_size`]: Per-arm sample size and experiment sizing
//! - [`aggregation`]: Window totals and conversion ratios per group
//! - [`sanity`]: Even-split checks on invariant metrics
//! - [`significance`]: Pooled confidence intervals and verdicts
//! - [`sign_test`]: Day-level binomial sign test
//!
//! # Example
//!
//! ```
//! use abtest_rust::algorithms::{check_split, sample_size};
//!
//! let clicks_per_arm = sample_size(0.05, 0.8, 0.20625, 0.01).unwrap();
//! assert_eq!(clicks_per_arm, 25835);
//!
//! let split = check_split(28378, 28325, 0.05).unwrap();
//! assert!(split.passes);
//! ```

pub mod aggregation;
pub mod normal;
pub mod sample_size;
pub mod sanity;
pub mod significance;

pub use aggregation::{aggregate, aggregate_run};
pub use sample_size::{estimate as sample_size, MetricSampleSize};
pub use sanity::{check_split, run_sanity_checks, InvariantCheck, SanityReport, SanityResult};
pub use sign_test::{daily_differences, sign_test, sign_test_daily, DailyDifference, SignTestResult};
pub use significance::{evaluate_counts, evaluate_significance, ProportionCounts, SignificanceVerdict};
