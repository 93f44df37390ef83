//! Error types for experiment analysis.

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Error type for analysis operations.
///
/// A failed sanity check is not an error: it is reported as
/// [`AnalysisOutcome::Inconclusive`](crate::services::analysis::AnalysisOutcome).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnalysisError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Undefined ratio: {0}")]
    UndefinedRatio(String),

    #[error("Misaligned groups: {0}")]
    MisalignedGroups(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Statistics error: {0}")]
    Statistics(String),
}

impl AnalysisError {
    /// Error for a probability-like argument outside the open unit interval.
    pub fn out_of_unit_interval(name: &str, value: f64) -> Self {
        AnalysisError::InvalidParameter(format!(
            "{} must lie strictly between 0 and 1, got {}",
            name, value
        ))
    }
}

/// Validates that `value` lies in the open interval (0, 1).
pub(crate) fn ensure_open_unit(name: &str, value: f64) -> AnalysisResult<f64> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(AnalysisError::out_of_unit_interval(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_open_unit_bounds() {
        assert_eq!(ensure_open_unit("alpha", 0.05), Ok(0.05));
        assert!(ensure_open_unit("alpha", 0.0).is_err());
        assert!(ensure_open_unit("alpha", 1.0).is_err());
        assert!(ensure_open_unit("alpha", f64::NAN).is_err());
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::UndefinedRatio("zero clicks in control".to_string());
        assert_eq!(err.to_string(), "Undefined ratio: zero clicks in control");
    }
}
