//! Parsers for experiment data formats.
//!
//! - [`csv_parser`]: daily funnel tables and the headerless baseline table
//! - [`json_parser`]: daily records as JSON, one group or both groups per file
//!
//! # Example
//!
//! ```no_run
//! use abtest_rust::parsing::csv_parser::parse_daily_csv_to_records;
//! use std::path::Path;
//!
//! let records = parse_daily_csv_to_records(Path::new("control.csv"))
//!     .expect("Failed to parse control data");
//! ```

pub mod csv_parser;
pub mod json_parser;

#[cfg(test)]
mod json_parser_tests;
