//! Export pipeline outputs to CSV and JSON.
//!
//! The exports are meant to be easy to consume in spreadsheets or downstream
//! scripts. Each one is a pure snapshot of a single recomputation pass.

use std::fs::File;
use std::path::Path;

use serde::Serialize;

use crate::app::pipeline::DashboardOutput;
use crate::domain::{
    FilterCriteria, GroupRow, GroupedSummary, MetricsSummary, RankMetric, SalesRecord, TrendPoint,
};
use crate::error::AppError;

/// Write grouped rows (display order) to a CSV file.
pub fn write_grouped_csv(path: &Path, grouped: &GroupedSummary<String>) -> Result<(), AppError> {
    write_rows_csv(path, grouped.rows())
}

/// Write a period trend to a CSV file. Undefined growth values are left blank.
pub fn write_trend_csv(path: &Path, trend: &[TrendPoint]) -> Result<(), AppError> {
    write_rows_csv(path, trend.iter().copied())
}

fn write_rows_csv<T: Serialize>(path: &Path, rows: impl IntoIterator<Item = T>) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// JSON shape of a dashboard export.
#[derive(Debug, Serialize)]
pub struct DashboardSnapshot<'a> {
    pub tool: &'static str,
    pub source: Option<String>,
    pub criteria: &'a FilterCriteria,
    pub summary: MetricsSummary,
    pub by_region: Vec<GroupRow>,
    pub by_category: Vec<GroupRow>,
    pub by_region_category: Vec<GroupRow>,
    pub trend: &'a [TrendPoint],
    pub rank_by: RankMetric,
    pub top_performers: &'a [SalesRecord],
}

impl<'a> DashboardSnapshot<'a> {
    pub fn new(output: &'a DashboardOutput, source: Option<&Path>) -> Self {
        Self {
            tool: "sales",
            source: source.map(|p| p.display().to_string()),
            criteria: &output.criteria,
            summary: output.summary,
            by_region: output.by_region.rows(),
            by_category: output.by_category.rows(),
            by_region_category: output.by_region_category.rows(),
            trend: &output.trend,
            rank_by: output.rank_by,
            top_performers: &output.top_performers,
        }
    }
}

/// Write a full dashboard snapshot as pretty-printed JSON.
pub fn write_dashboard_json(path: &Path, output: &DashboardOutput, source: Option<&Path>) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &DashboardSnapshot::new(output, source))
        .map_err(|e| AppError::new(4, format!("Failed to write export JSON: {e}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{compute_period_trend, group_by_key};
    use crate::domain::GroupKey;
    use chrono::NaiveDate;
    use std::fs;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("sales_insights_{}_{name}", std::process::id()))
    }

    fn records() -> Vec<SalesRecord> {
        let d = |m| NaiveDate::from_ymd_opt(2023, m, 1).unwrap();
        vec![
            SalesRecord::new("1", "East", "Technology", 200.0, 60.0, d(1)),
            SalesRecord::new("2", "West", "Furniture", 450.0, 120.0, d(2)),
        ]
    }

    #[test]
    fn grouped_csv_has_header_and_display_order() {
        let path = temp_path("export_groups.csv");
        let _ = fs::remove_file(&path);

        let grouped = group_by_key(&records(), GroupKey::Region);
        write_grouped_csv(&path, &grouped).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "key,sales,profit,count,avg_margin");
        assert!(lines[1].starts_with("West,450"));
        assert!(lines[2].starts_with("East,200"));

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn trend_csv_leaves_undefined_growth_blank() {
        let path = temp_path("export_trend.csv");
        let _ = fs::remove_file(&path);

        write_trend_csv(&path, &compute_period_trend(&records())).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "period,total_sales,total_profit,order_count,sales_growth,profit_growth"
        );
        assert_eq!(lines[1], "2023-01,200.0,60.0,1,,");
        assert_eq!(lines[2], "2023-02,450.0,120.0,1,125.0,100.0");

        fs::remove_file(&path).unwrap();
    }
}
