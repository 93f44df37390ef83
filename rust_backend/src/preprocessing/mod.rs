//! Input validation applied before any statistics are computed.

pub mod validator;

pub use validator::{RecordValidator, ValidationResult, ValidationStats};
