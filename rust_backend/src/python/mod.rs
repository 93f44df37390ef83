//! Python bindings for the experiment analysis backend.
//!
//! This module exposes the statistical routines and the file-based analysis
//! pipeline to a Python dashboard via PyO3.
//!
//! # Modules
//!
//! - [`algorithms`]: sample size, split check, significance and sign test
//! - [`analysis`]: validation, planning and full analysis of data files
//!
//! # Python API
//!
//! All functions are available in the `abtest_rust` Python module after installation.

pub mod algorithms;
pub mod analysis;

pub use algorithms::*;
pub use analysis::*;
