//! Daily record validation with detailed error and warning reporting.
//!
//! This module checks funnel counts for internal consistency (clicks never
//! exceed pageviews, enrollments never exceed clicks) and for alignment between
//! the control and experiment series. Data-quality issues that do not break the
//! analysis, such as ragged enrollment columns, are reported as warnings.

use serde::{Deserialize, Serialize};

use crate::core::domain::DailyRecord;

/// Most individual issues of one kind reported before summarizing.
const MAX_REPORTED: usize = 5;

/// Validation result with categorized issues and statistics.
///
/// Errors make `is_valid` false, while warnings are informational.
///
/// # Examples
///
/// ```
/// use abtest_rust::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("clicks exceed pageviews".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
///
/// # Fields
///
/// * `total_days` - Number of records validated (both groups when validating a pair)
/// * `zero_click_days` - Records with no clicks, whose conversions are undefined
/// * `missing_enrollment_days` - Records without an enrollment count
/// * `missing_payment_days` - Records without a payment count
/// * `invariant_violations` - Records breaking a funnel ordering invariant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_days: usize,
    pub zero_click_days: usize,
    pub missing_enrollment_days: usize,
    pub missing_payment_days: usize,
    pub invariant_violations: usize,
}

impl ValidationResult {
    /// Creates a new validation result with valid status and empty error/warning lists.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-critical warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    fn merge(&mut self, other: ValidationResult) {
        self.is_valid &= other.is_valid;
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        self.stats.total_days += other.stats.total_days;
        self.stats.zero_click_days += other.stats.zero_click_days;
        self.stats.missing_enrollment_days += other.stats.missing_enrollment_days;
        self.stats.missing_payment_days += other.stats.missing_payment_days;
        self.stats.invariant_violations += other.stats.invariant_violations;
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for daily funnel records.
///
/// # Examples
///
/// ```
/// use abtest_rust::core::domain::DailyRecord;
/// use abtest_rust::preprocessing::validator::RecordValidator;
///
/// let records = vec![
///     DailyRecord::new("Sat, Oct 11", 7723, 687, Some(134), Some(70)),
///     DailyRecord::new("Sun, Nov 2", 8836, 724, None, None),
/// ];
/// let result = RecordValidator::validate_records("control", &records);
/// assert!(result.is_valid);
/// assert_eq!(result.stats.missing_enrollment_days, 1);
/// ```
pub struct RecordValidator;

impl RecordValidator {
    /// Validates one group's records.
    ///
    /// # Error Conditions
    ///
    /// - Clicks exceeding pageviews
    /// - Enrollments exceeding clicks
    /// - Payments reported on a day without enrollments
    ///
    /// Payments exceeding enrollments are only a warning: the source data does
    /// not enforce that ordering.
    pub fn validate_records(group: &str, records: &[DailyRecord]) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_days = records.len();

        let mut zero_click_dates = Vec::new();
        let mut seen_missing_enrollments = false;

        for record in records {
            Self::validate_record(group, record, &mut result);

            if record.clicks == 0 {
                result.stats.zero_click_days += 1;
                zero_click_dates.push(record.date.as_str());
            }
            match record.enrollments {
                None => {
                    result.stats.missing_enrollment_days += 1;
                    seen_missing_enrollments = true;
                }
                Some(_) if seen_missing_enrollments => {
                    result.add_warning(format!(
                        "{}: enrollments reported on {} after earlier missing days",
                        group, record.date
                    ));
                }
                Some(_) => {}
            }
            if record.payments.is_none() {
                result.stats.missing_payment_days += 1;
            }
        }

        for date in zero_click_dates.iter().take(MAX_REPORTED) {
            result.add_warning(format!(
                "{}: no clicks on {}, conversions undefined for that day",
                group, date
            ));
        }
        if zero_click_dates.len() > MAX_REPORTED {
            result.add_warning(format!(
                "{}: total zero-click days: {} (showing first {})",
                group,
                zero_click_dates.len(),
                MAX_REPORTED
            ));
        }
        if result.stats.missing_enrollment_days > 0 {
            result.add_warning(format!(
                "{}: {} of {} days have no enrollment data",
                group, result.stats.missing_enrollment_days, result.stats.total_days
            ));
        }
        if result.stats.missing_payment_days > result.stats.missing_enrollment_days {
            result.add_warning(format!(
                "{}: {} of {} days have no payment data",
                group, result.stats.missing_payment_days, result.stats.total_days
            ));
        }

        result
    }

    /// Validates both groups and their date alignment.
    pub fn validate_pair(control: &[DailyRecord], experiment: &[DailyRecord]) -> ValidationResult {
        let mut result = Self::validate_records("control", control);
        result.merge(Self::validate_records("experiment", experiment));

        if control.len() != experiment.len() {
            result.add_error(format!(
                "control has {} days but experiment has {}",
                control.len(),
                experiment.len()
            ));
        }
        let mismatched: Vec<_> = control
            .iter()
            .zip(experiment)
            .filter(|(c, e)| c.date != e.date)
            .collect();
        for (c, e) in mismatched.iter().take(MAX_REPORTED) {
            result.add_error(format!(
                "date mismatch: control '{}' vs experiment '{}'",
                c.date, e.date
            ));
        }

        result
    }

    fn validate_record(group: &str, record: &DailyRecord, result: &mut ValidationResult) {
        let mut violated = false;

        if record.clicks > record.pageviews {
            violated = true;
            result.add_error(format!(
                "{} {}: clicks ({}) exceed pageviews ({})",
                group, record.date, record.clicks, record.pageviews
            ));
        }
        if let Some(enrollments) = record.enrollments {
            if enrollments > record.clicks {
                violated = true;
                result.add_error(format!(
                    "{} {}: enrollments ({}) exceed clicks ({})",
                    group, record.date, enrollments, record.clicks
                ));
            }
        }
        match (record.enrollments, record.payments) {
            (None, Some(payments)) => {
                violated = true;
                result.add_error(format!(
                    "{} {}: {} payments reported without enrollments",
                    group, record.date, payments
                ));
            }
            (Some(enrollments), Some(payments)) if payments > enrollments => {
                result.add_warning(format!(
                    "{} {}: payments ({}) exceed enrollments ({})",
                    group, record.date, payments, enrollments
                ));
            }
            _ => {}
        }

        if violated {
            result.stats.invariant_violations += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_records() {
        let records = vec![
            DailyRecord::new("d1", 1000, 100, Some(20), Some(10)),
            DailyRecord::new("d2", 1100, 110, Some(22), Some(11)),
        ];
        let result = RecordValidator::validate_records("control", &records);
        assert!(result.is_valid);
        assert!(result.warnings.is_empty());
        assert_eq!(result.stats.total_days, 2);
    }

    #[test]
    fn test_clicks_exceed_pageviews() {
        let records = vec![DailyRecord::new("d1", 10, 100, Some(20), Some(10))];
        let result = RecordValidator::validate_records("control", &records);
        assert!(!result.is_valid);
        assert_eq!(result.stats.invariant_violations, 1);
        assert!(result.errors[0].contains("exceed pageviews"));
    }

    #[test]
    fn test_payments_without_enrollments() {
        let records = vec![DailyRecord::new("d1", 1000, 100, None, Some(3))];
        let result = RecordValidator::validate_records("experiment", &records);
        assert!(!result.is_valid);
    }

    #[test]
    fn test_payments_exceed_enrollments_is_warning() {
        let records = vec![DailyRecord::new("d1", 1000, 100, Some(5), Some(8))];
        let result = RecordValidator::validate_records("control", &records);
        assert!(result.is_valid);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_zero_click_days_are_summarized() {
        let records: Vec<_> = (0..7)
            .map(|i| DailyRecord::new(format!("d{}", i), 100, 0, Some(0), Some(0)))
            .collect();
        let result = RecordValidator::validate_records("control", &records);
        assert!(result.is_valid);
        assert_eq!(result.stats.zero_click_days, 7);
        assert_eq!(result.warnings.len(), MAX_REPORTED + 1);
    }

    #[test]
    fn test_ragged_tail_counts() {
        let records = vec![
            DailyRecord::new("d1", 1000, 100, Some(20), Some(10)),
            DailyRecord::new("d2", 1000, 100, None, None),
            DailyRecord::new("d3", 1000, 100, None, None),
        ];
        let result = RecordValidator::validate_records("control", &records);
        assert!(result.is_valid);
        assert_eq!(result.stats.missing_enrollment_days, 2);
        assert_eq!(result.stats.missing_payment_days, 2);
    }

    #[test]
    fn test_validate_pair_alignment() {
        let control = vec![DailyRecord::new("d1", 1000, 100, Some(20), Some(10))];
        let experiment = vec![DailyRecord::new("d2", 1000, 100, Some(20), Some(10))];
        let result = RecordValidator::validate_pair(&control, &experiment);
        assert!(!result.is_valid);
        assert!(result.errors[0].contains("date mismatch"));

        let result = RecordValidator::validate_pair(&control, &control[..0]);
        assert!(!result.is_valid);
        assert_eq!(result.stats.total_days, 1);
    }
}
