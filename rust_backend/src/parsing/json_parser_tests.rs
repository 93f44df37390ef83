#[cfg(test)]
mod tests {
    use crate::core::domain::DailyRecord;
    use crate::parsing::json_parser::{
        parse_daily_json, parse_daily_json_str, parse_experiment_json, parse_experiment_json_str,
    };
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test parsing a single group with snake_case keys
    #[test]
    fn test_parse_daily_records() {
        let json = r#"[
            {"date": "Sat, Oct 11", "pageviews": 7723, "clicks": 687, "enrollments": 134, "payments": 70},
            {"date": "Sun, Oct 12", "pageviews": 9102, "clicks": 779, "enrollments": 147, "payments": 70}
        ]"#;

        let records = parse_daily_json_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0],
            DailyRecord::new("Sat, Oct 11", 7723, 687, Some(134), Some(70))
        );
    }

    /// Test that the CSV column names are accepted as keys
    #[test]
    fn test_parse_capitalized_keys() {
        let json = r#"[{"Date": "d1", "Pageviews": 100, "Clicks": 10, "Enrollments": 2, "Payments": 1}]"#;

        let records = parse_daily_json_str(json).unwrap();
        assert_eq!(records[0], DailyRecord::new("d1", 100, 10, Some(2), Some(1)));
    }

    /// Test that absent and null counts are missing, not zero
    #[test]
    fn test_parse_missing_counts() {
        let json = r#"[
            {"date": "d1", "pageviews": 100, "clicks": 10},
            {"date": "d2", "pageviews": 100, "clicks": 10, "enrollments": null, "payments": null}
        ]"#;

        let records = parse_daily_json_str(json).unwrap();
        assert_eq!(records[0].enrollments, None);
        assert_eq!(records[1].payments, None);
    }

    /// Test that errors name the path of the offending value
    #[test]
    fn test_error_reports_path() {
        let json = r#"[
            {"date": "d1", "pageviews": 100, "clicks": 10},
            {"date": "d2", "pageviews": "lots", "clicks": 10}
        ]"#;

        let err = parse_daily_json_str(json).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("[1].pageviews"), "unexpected error: {}", message);
    }

    #[test]
    fn test_negative_count_rejected() {
        let json = r#"[{"date": "d1", "pageviews": 100, "clicks": -1}]"#;
        assert!(parse_daily_json_str(json).is_err());
    }

    #[test]
    fn test_invalid_syntax() {
        assert!(parse_daily_json_str("[{\"date\": ").is_err());
    }

    #[test]
    fn test_parse_experiment_document() {
        let json = r#"{
            "control": [{"date": "d1", "pageviews": 100, "clicks": 10, "enrollments": 2}],
            "experiment": [{"date": "d1", "pageviews": 98, "clicks": 9, "enrollments": 1}]
        }"#;

        let (control, experiment) = parse_experiment_json_str(json).unwrap();
        assert_eq!(control.len(), 1);
        assert_eq!(experiment[0].pageviews, 98);
        assert_eq!(experiment[0].payments, None);
    }

    #[test]
    fn test_experiment_document_requires_both_groups() {
        let json = r#"{"control": []}"#;
        let message = parse_experiment_json_str(json).unwrap_err().to_string();
        assert!(message.contains("experiment"), "unexpected error: {}", message);
    }

    #[test]
    fn test_parse_from_files() {
        let mut daily = NamedTempFile::new().unwrap();
        write!(daily, r#"[{{"date": "d1", "pageviews": 100, "clicks": 10}}]"#).unwrap();
        assert_eq!(parse_daily_json(daily.path()).unwrap().len(), 1);

        let mut combined = NamedTempFile::new().unwrap();
        write!(combined, r#"{{"control": [], "experiment": []}}"#).unwrap();
        let (control, experiment) = parse_experiment_json(combined.path()).unwrap();
        assert!(control.is_empty() && experiment.is_empty());
    }

    #[test]
    fn test_nonexistent_file() {
        let result = parse_daily_json(std::path::Path::new("/nonexistent/control.json"));
        assert!(result.is_err());
    }
}
