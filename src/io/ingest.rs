//! CSV ingest and normalization.
//!
//! This module is responsible for turning a sales export into a clean,
//! immutable set of [`SalesRecord`]s that every later stage can trust.
//!
//! Design goals:
//! - **Strict schema** for required columns (typed `DataLoadError`)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Derived fields computed once** (margin, period bucket)
//! - **Separation of concerns**: no filtering or aggregation here

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use tracing::{debug, info, warn};

use crate::domain::SalesRecord;
use crate::error::DataLoadError;

const COL_ORDER_ID: &str = "order_id";
const COL_REGION: &str = "region";
const COL_CATEGORY: &str = "category";
const COL_SALES: &str = "sales";
const COL_PROFIT: &str = "profit";
const COL_ORDER_DATE: &str = "order_date";

/// Normalized column key paired with the header name shown in error messages.
const REQUIRED_COLUMNS: [(&str, &str); 6] = [
    (COL_ORDER_ID, "Order ID"),
    (COL_REGION, "Region"),
    (COL_CATEGORY, "Category"),
    (COL_SALES, "Sales"),
    (COL_PROFIT, "Profit"),
    (COL_ORDER_DATE, "Order Date"),
];

/// A row dropped during ingest. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based CSV line (the header is line 1).
    pub line: usize,
    pub order_id: Option<String>,
    pub message: String,
}

/// The session dataset: validated records plus ingest diagnostics.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<SalesRecord>,
    pub warnings: Vec<RowError>,
    pub rows_read: usize,
    pub source: Option<PathBuf>,
}

impl Dataset {
    pub fn rows_used(&self) -> usize {
        self.records.len()
    }

    pub fn rows_dropped(&self) -> usize {
        self.warnings.len()
    }

    /// Distinct regions, sorted.
    pub fn regions(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.region.as_str()))
    }

    /// Distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.category.as_str()))
    }

    /// Earliest and latest order dates.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let min = self.records.iter().map(|r| r.order_date).min()?;
        let max = self.records.iter().map(|r| r.order_date).max()?;
        Some((min, max))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Load and validate a sales CSV from disk.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_dataset(path: &Path) -> Result<Dataset, DataLoadError> {
    let file = File::open(path).map_err(|source| DataLoadError::from_io(path, source))?;

    let mut dataset = load_dataset_from_reader(file)?;
    dataset.source = Some(path.to_path_buf());
    Ok(dataset)
}

/// Load and validate sales CSV content from any reader.
pub fn load_dataset_from_reader<R: Read>(reader: R) -> Result<Dataset, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut warnings = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and CSV lines are 1-based.
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warnings.push(RowError {
                    line,
                    order_id: None,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &header_map) {
            Ok(row) => records.push(row),
            Err(message) => warnings.push(RowError {
                line,
                order_id: get_optional(&record, &header_map, COL_ORDER_ID).map(str::to_string),
                message,
            }),
        }
    }

    for w in &warnings {
        debug!(line = w.line, order_id = ?w.order_id, reason = %w.message, "Dropped row");
    }
    if !warnings.is_empty() {
        warn!(dropped = warnings.len(), rows_read, "Dropped malformed rows during load");
    }

    if records.is_empty() {
        return Err(DataLoadError::NoValidRows {
            rows_read,
            rows_dropped: warnings.len(),
        });
    }

    info!(rows_read, rows_used = records.len(), "Dataset loaded");

    Ok(Dataset {
        records,
        warnings,
        rows_read,
        source: None,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

/// `Order ID`, `order_id` and `order-id` all map to `order_id`.
fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}').trim();
    name.chars()
        .map(|c| match c {
            ' ' | '-' => '_',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), DataLoadError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|(key, _)| !header_map.contains_key(*key))
        .map(|(_, label)| label.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataLoadError::MissingColumns(missing))
    }
}

fn parse_row(record: &StringRecord, header_map: &HashMap<String, usize>) -> Result<SalesRecord, String> {
    let order_id = get_required(record, header_map, COL_ORDER_ID)?;
    let region = get_required(record, header_map, COL_REGION)?;
    let category = get_required(record, header_map, COL_CATEGORY)?;

    let sales = parse_amount(get_required(record, header_map, COL_SALES)?, COL_SALES)?;
    if sales < 0.0 {
        return Err(format!("Negative `sales` value: {sales}"));
    }
    let profit = parse_amount(get_required(record, header_map, COL_PROFIT)?, COL_PROFIT)?;
    let order_date = parse_date(get_required(record, header_map, COL_ORDER_DATE)?)?;

    Ok(SalesRecord::new(order_id, region, category, sales, profit, order_date))
}

fn get_required<'a>(
    record: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<&'a str, String> {
    let idx = header_map
        .get(name)
        .ok_or_else(|| format!("Missing required column: `{name}`"))?;
    record
        .get(*idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required value: `{name}`"))
}

fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(name)?;
    record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a currency-ish number: `1234.5`, `$1,234.50`, `-$12`.
fn parse_amount(s: &str, name: &str) -> Result<f64, String> {
    let cleaned: String = s.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let v = cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("Invalid `{name}` value '{s}'."))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("Non-finite `{name}` value '{s}'."))
    }
}

/// Order dates outside this window are treated as parse failures. `%Y` accepts
/// short years, so `01/16/23` would otherwise load as year 23.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // ISO first. Slash-separated day-first dates are ambiguous with US exports,
    // so `/` is read month-first and `-` with a trailing year is read day-first.
    const DATE_FMTS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];
    const DATETIME_FMTS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

    let parsed = DATE_FMTS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FMTS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        });

    match parsed {
        Some(d) if PLAUSIBLE_YEARS.contains(&d.year()) => Ok(d),
        Some(d) => Err(format!(
            "Implausible year {} in date '{s}'. Years must be written with four digits.",
            d.year()
        )),
        None => Err(format!(
            "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, DD-MM-YYYY."
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Order ID,Region,Category,Sales,Profit,Order Date\n";

    fn load(body: &str) -> Result<Dataset, DataLoadError> {
        load_dataset_from_reader(format!("{HEADER}{body}").as_bytes())
    }

    #[test]
    fn loads_valid_rows_with_derived_fields() {
        let ds = load("1001,East,Technology,200,60,2023-01-01\n1002,West,Furniture,450,120,2023-01-16\n").unwrap();
        assert_eq!(ds.rows_read, 2);
        assert_eq!(ds.rows_used(), 2);
        assert!(ds.warnings.is_empty());
        assert_eq!(ds.records[0].order_id, "1001");
        assert_eq!(ds.records[0].profit_margin, Some(0.3));
        assert_eq!(ds.records[1].order_period.to_string(), "2023-01");
    }

    #[test]
    fn drops_malformed_rows_with_line_numbers() {
        let ds = load(
            "1,East,Technology,abc,10,2023-01-01\n\
             2,East,Technology,100,10,not-a-date\n\
             3,East,Technology,-5,10,2023-01-01\n\
             4,,Technology,100,10,2023-01-01\n\
             5,East,Technology,100,10,2023-01-02\n",
        )
        .unwrap();

        assert_eq!(ds.rows_read, 5);
        assert_eq!(ds.rows_used(), 1);
        assert_eq!(ds.rows_dropped(), 4);
        let lines: Vec<usize> = ds.warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![2, 3, 4, 5]);
        assert_eq!(ds.warnings[0].order_id.as_deref(), Some("1"));
    }

    #[test]
    fn missing_columns_are_reported_by_name() {
        let err = load_dataset_from_reader("Order ID,Region,Sales\n1,East,10\n".as_bytes()).unwrap_err();
        match err {
            DataLoadError::MissingColumns(cols) => {
                assert_eq!(cols, vec!["Category", "Profit", "Order Date"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn no_valid_rows_is_an_error() {
        let err = load("1,East,Technology,oops,10,2023-01-01\n").unwrap_err();
        assert!(matches!(
            err,
            DataLoadError::NoValidRows {
                rows_read: 1,
                rows_dropped: 1
            }
        ));
    }

    #[test]
    fn header_only_file_is_an_error() {
        let err = load("").unwrap_err();
        assert!(matches!(err, DataLoadError::NoValidRows { rows_read: 0, .. }));
    }

    #[test]
    fn header_names_are_normalized() {
        assert_eq!(normalize_header_name("\u{feff}Order ID"), "order_id");
        assert_eq!(normalize_header_name(" order-date "), "order_date");
        assert_eq!(normalize_header_name("SALES"), "sales");
    }

    #[test]
    fn amounts_accept_currency_formatting() {
        assert_eq!(parse_amount("$1,234.50", "sales").unwrap(), 1234.5);
        assert_eq!(parse_amount("-12", "profit").unwrap(), -12.0);
        assert!(parse_amount("NaN", "sales").is_err());
        assert!(parse_amount("twelve", "sales").is_err());
    }

    #[test]
    fn dates_accept_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 1, 16).unwrap();
        assert_eq!(parse_date("2023-01-16").unwrap(), expected);
        assert_eq!(parse_date("2023/01/16").unwrap(), expected);
        assert_eq!(parse_date("01/16/2023").unwrap(), expected);
        assert_eq!(parse_date("16-01-2023").unwrap(), expected);
        assert_eq!(parse_date("2023-01-16 08:30:00").unwrap(), expected);
        assert!(parse_date("2023-02-30").is_err());
    }

    #[test]
    fn two_digit_years_are_rejected() {
        assert!(parse_date("01/16/23").is_err());
        assert!(parse_date("10/11/12").is_err());
        assert!(parse_date("23-01-16").is_err());

        let ds = load("1,East,Technology,10,1,01/16/23\n2,East,Technology,10,1,10/11/12\n3,East,Technology,10,1,01/16/2023\n")
            .unwrap();
        assert_eq!(ds.rows_used(), 1);
        assert_eq!(ds.records[0].order_date, NaiveDate::from_ymd_opt(2023, 1, 16).unwrap());
        let lines: Vec<usize> = ds.warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![2, 3]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = load_dataset(Path::new("definitely/not/here/sales.csv")).unwrap_err();
        assert!(matches!(err, DataLoadError::NotFound(_)));
    }

    #[test]
    fn dataset_exposes_dimensions() {
        let ds = load(
            "1,West,Furniture,10,1,2023-03-01\n2,East,Technology,10,1,2023-01-01\n3,East,Furniture,10,1,2023-02-01\n",
        )
        .unwrap();
        assert_eq!(ds.regions(), vec!["East", "West"]);
        assert_eq!(ds.categories(), vec!["Furniture", "Technology"]);
        let (start, end) = ds.date_span().unwrap();
        assert_eq!(start.to_string(), "2023-01-01");
        assert_eq!(end.to_string(), "2023-03-01");
    }
}
