use anyhow::{bail, Context, Result};
use polars::prelude::*;
use std::path::Path;

use crate::core::domain::{BaselineMetrics, DailyRecord};

/// Column names of a daily funnel table.
pub const DATE_COLUMN: &str = "Date";
pub const PAGEVIEWS_COLUMN: &str = "Pageviews";
pub const CLICKS_COLUMN: &str = "Clicks";
pub const ENROLLMENTS_COLUMN: &str = "Enrollments";
pub const PAYMENTS_COLUMN: &str = "Payments";

/// Rows of the baseline table, in file order.
const BASELINE_ROWS: usize = 7;

/// Parse a daily funnel CSV file into a Polars DataFrame
pub fn parse_daily_csv(csv_path: &Path) -> Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(csv_path.into()))?
        .finish()
        .with_context(|| format!("Failed to parse CSV {} into DataFrame", csv_path.display()))?;
    Ok(df)
}

/// Parse a daily funnel CSV and convert it to daily records
pub fn parse_daily_csv_to_records(csv_path: &Path) -> Result<Vec<DailyRecord>> {
    let df = parse_daily_csv(csv_path)?;
    dataframe_to_records(&df)
        .with_context(|| format!("Invalid daily data in {}", csv_path.display()))
}

/// Finds a column by name, ignoring case and surrounding whitespace.
fn find_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Column> {
    df.get_columns()
        .iter()
        .find(|c| c.name().trim().eq_ignore_ascii_case(name))
}

/// Casts a count column to `Int64`; empty cells stay null.
fn count_column(df: &DataFrame, name: &str) -> Result<Option<Int64Chunked>> {
    match find_column(df, name) {
        Some(column) => {
            let cast = column
                .strict_cast(&DataType::Int64)
                .with_context(|| format!("Column '{}' must contain whole numbers", name))?;
            Ok(Some(cast.i64()?.clone()))
        }
        None => Ok(None),
    }
}

fn to_count(value: Option<i64>, column: &str, row: usize) -> Result<Option<u64>> {
    match value {
        Some(v) => u64::try_from(v)
            .map(Some)
            .with_context(|| format!("Negative {} ({}) at row {}", column, v, row)),
        None => Ok(None),
    }
}

/// Convert a Polars DataFrame to daily records
///
/// `Date`, `Pageviews` and `Clicks` are required. `Enrollments` and `Payments`
/// may be absent or contain empty cells, which become `None`.
pub fn dataframe_to_records(df: &DataFrame) -> Result<Vec<DailyRecord>> {
    let dates = find_column(df, DATE_COLUMN)
        .with_context(|| format!("Missing '{}' column", DATE_COLUMN))?
        .cast(&DataType::String)?;
    let dates = dates.str()?;
    let pageviews = count_column(df, PAGEVIEWS_COLUMN)?
        .with_context(|| format!("Missing '{}' column", PAGEVIEWS_COLUMN))?;
    let clicks = count_column(df, CLICKS_COLUMN)?
        .with_context(|| format!("Missing '{}' column", CLICKS_COLUMN))?;
    let enrollments = count_column(df, ENROLLMENTS_COLUMN)?;
    let payments = count_column(df, PAYMENTS_COLUMN)?;

    let mut records = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let date = dates
            .get(i)
            .with_context(|| format!("Missing {} at row {}", DATE_COLUMN, i))?
            .trim()
            .to_string();
        let day_pageviews = to_count(pageviews.get(i), PAGEVIEWS_COLUMN, i)?
            .with_context(|| format!("Missing {} at row {}", PAGEVIEWS_COLUMN, i))?;
        let day_clicks = to_count(clicks.get(i), CLICKS_COLUMN, i)?
            .with_context(|| format!("Missing {} at row {}", CLICKS_COLUMN, i))?;
        let day_enrollments = match &enrollments {
            Some(col) => to_count(col.get(i), ENROLLMENTS_COLUMN, i)?,
            None => None,
        };
        let day_payments = match &payments {
            Some(col) => to_count(col.get(i), PAYMENTS_COLUMN, i)?,
            None => None,
        };

        records.push(DailyRecord::new(
            date,
            day_pageviews,
            day_clicks,
            day_enrollments,
            day_payments,
        ));
    }

    log::debug!("Parsed {} daily records", records.len());
    Ok(records)
}

/// Convert daily records to a Polars DataFrame with the standard column names
pub fn records_to_dataframe(records: &[DailyRecord]) -> Result<DataFrame> {
    let dates: Vec<&str> = records.iter().map(|r| r.date.as_str()).collect();
    let pageviews: Vec<u64> = records.iter().map(|r| r.pageviews).collect();
    let clicks: Vec<u64> = records.iter().map(|r| r.clicks).collect();
    let enrollments: Vec<Option<u64>> = records.iter().map(|r| r.enrollments).collect();
    let payments: Vec<Option<u64>> = records.iter().map(|r| r.payments).collect();

    let df = DataFrame::new(vec![
        Column::new(DATE_COLUMN.into(), dates),
        Column::new(PAGEVIEWS_COLUMN.into(), pageviews),
        Column::new(CLICKS_COLUMN.into(), clicks),
        Column::new(ENROLLMENTS_COLUMN.into(), enrollments),
        Column::new(PAYMENTS_COLUMN.into(), payments),
    ])
    .context("Failed to build daily DataFrame")?;
    Ok(df)
}

/// Parse the headerless two-column baseline table (`metric name, value`).
///
/// Rows are positional: pageviews, clicks and enrollments per day, then
/// click-through rate, gross conversion, retention and net conversion.
/// Rows after the seventh are ignored.
pub fn parse_baseline_csv(csv_path: &Path) -> Result<BaselineMetrics> {
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .try_into_reader_with_file_path(Some(csv_path.into()))?
        .finish()
        .with_context(|| format!("Failed to parse baseline CSV {}", csv_path.display()))?;
    dataframe_to_baseline(&df)
        .with_context(|| format!("Invalid baseline table in {}", csv_path.display()))
}

/// Convert a headerless baseline DataFrame to baseline metrics
pub fn dataframe_to_baseline(df: &DataFrame) -> Result<BaselineMetrics> {
    if df.width() < 2 {
        bail!("Baseline table needs a name and a value column, found {}", df.width());
    }
    if df.height() < BASELINE_ROWS {
        bail!(
            "Baseline table needs {} rows, found {}",
            BASELINE_ROWS,
            df.height()
        );
    }

    let values = df.get_columns()[1]
        .strict_cast(&DataType::Float64)
        .context("Baseline values must be numeric")?;
    let values = values.f64()?;

    let mut parsed = [0.0; BASELINE_ROWS];
    for (i, slot) in parsed.iter_mut().enumerate() {
        *slot = values
            .get(i)
            .with_context(|| format!("Missing baseline value at row {}", i))?;
    }
    let [pageviews_per_day, clicks_per_day, enrollments_per_day, click_through_rate, gross_conversion, retention, net_conversion] =
        parsed;

    Ok(BaselineMetrics {
        pageviews_per_day,
        clicks_per_day,
        enrollments_per_day,
        click_through_rate,
        gross_conversion,
        retention,
        net_conversion,
    })
}
