//! High-level data loading utilities.
//!
//! This module provides loaders that combine parsing logic with domain model
//! construction. They detect the file format, attach error context naming the
//! offending file, and produce ready-to-analyze records.
//!
//! # Example
//!
//! ```no_run
//! use abtest_rust::core::domain::ExperimentParameters;
//! use abtest_rust::io::loaders::ExperimentLoader;
//! use std::path::Path;
//!
//! let run = ExperimentLoader::load_run(
//!     Path::new("control.csv"),
//!     Path::new("experiment.csv"),
//!     ExperimentParameters::default(),
//! )
//! .expect("Failed to load");
//! println!("Loaded {} days", run.len());
//! ```

pub mod loaders;


pub use loaders::{BaselineLoader, DailyLoadResult, DataSourceType, ExperimentLoader};
