//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the analytics code stays clean and testable
//! - output changes are localized (important for snapshot-style tests)

use crate::app::pipeline::{DashboardOutput, DashboardView};
use crate::domain::{FilterCriteria, GroupKey, GroupedSummary, MetricsSummary, RankMetric, SalesRecord, TrendPoint};
use crate::io::ingest::Dataset;

/// Message shown when a selection matches nothing.
pub const EMPTY_SELECTION_MESSAGE: &str = "No data for this selection.";

/// Dataset provenance and the active selection.
pub fn format_header(dataset: &Dataset, criteria: &FilterCriteria) -> String {
    let mut out = String::new();

    out.push_str("=== Sales Insights Dashboard ===\n");
    if let Some(source) = &dataset.source {
        out.push_str(&format!("Source: {}\n", source.display()));
    }
    out.push_str(&format!(
        "Rows: used={} | read={} | dropped={}\n",
        dataset.rows_used(),
        dataset.rows_read,
        dataset.rows_dropped()
    ));
    if let Some((start, end)) = dataset.date_span() {
        out.push_str(&format!("Orders: {start} .. {end}\n"));
    }
    out.push_str(&format!("Filter: {}\n", describe_criteria(criteria)));

    out
}

/// One-line description of a selection, e.g. `regions=[East, South] | categories=all | dates=all`.
pub fn describe_criteria(criteria: &FilterCriteria) -> String {
    let set = |values: &std::collections::BTreeSet<String>| {
        if values.is_empty() {
            "all".to_string()
        } else {
            format!("[{}]", values.iter().cloned().collect::<Vec<_>>().join(", "))
        }
    };

    let range = &criteria.date_range;
    let dates = if range.is_unbounded() {
        "all".to_string()
    } else {
        let start = if range.start() == chrono::NaiveDate::MIN {
            "..".to_string()
        } else {
            range.start().to_string()
        };
        let end = if range.end() == chrono::NaiveDate::MAX {
            "..".to_string()
        } else {
            range.end().to_string()
        };
        format!("{start} to {end}")
    };

    format!(
        "regions={} | categories={} | dates={dates}",
        set(&criteria.regions),
        set(&criteria.categories)
    )
}

/// Headline KPIs.
pub fn format_kpis(summary: &MetricsSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("Total Sales:       {}\n", fmt_money(summary.total_sales)));
    out.push_str(&format!("Total Profit:      {}\n", fmt_money(summary.total_profit)));
    out.push_str(&format!("Profit Margin:     {:.1}%\n", summary.avg_profit_margin));
    out.push_str(&format!("Orders:            {}\n", summary.order_count));
    out.push_str(&format!("Avg Order Value:   {}\n", fmt_money_cents(summary.avg_order_value)));
    out
}

/// A grouped table in display order (descending sales).
pub fn format_grouped(title: &str, key: GroupKey, grouped: &GroupedSummary<String>) -> String {
    let mut out = String::new();
    out.push_str(title);
    out.push_str(":\n");

    push_row(
        &mut out,
        format!(
            "{:<32} {:>14} {:>14} {:>7} {:>8}",
            key.display_name(),
            "sales",
            "profit",
            "orders",
            "margin"
        ),
    );
    push_row(&mut out, format!("{:-<32} {:-<14} {:-<14} {:-<7} {:-<8}", "", "", "", "", ""));

    for (label, g) in grouped.sorted_by_sales() {
        push_row(
            &mut out,
            format!(
                "{:<32} {:>14} {:>14} {:>7} {:>7.1}%",
                truncate(label, 32),
                fmt_money(g.sales),
                fmt_money(g.profit),
                g.count,
                g.avg_margin
            ),
        );
    }

    out
}

/// Month-by-month totals with growth.
pub fn format_trend(trend: &[TrendPoint]) -> String {
    let mut out = String::new();
    out.push_str("Monthly trend:\n");

    push_row(
        &mut out,
        format!(
            "{:<8} {:>14} {:>10} {:>14} {:>10} {:>7}",
            "month", "sales", "sales MoM", "profit", "profit MoM", "orders"
        ),
    );
    push_row(&mut out, format!("{:-<8} {:-<14} {:-<10} {:-<14} {:-<10} {:-<7}", "", "", "", "", "", ""));

    for t in trend {
        push_row(
            &mut out,
            format!(
                "{:<8} {:>14} {:>10} {:>14} {:>10} {:>7}",
                t.period.to_string(),
                fmt_money(t.total_sales),
                fmt_growth(t.sales_growth),
                fmt_money(t.total_profit),
                fmt_growth(t.profit_growth),
                t.order_count
            ),
        );
    }

    out
}

/// Top performers table.
pub fn format_top(records: &[SalesRecord], by: RankMetric) -> String {
    let mut out = String::new();
    out.push_str(&format!("Top {} orders by {}:\n", records.len(), by.display_name()));

    push_row(
        &mut out,
        format!(
            "{:<14} {:<12} {:<18} {:>12} {:>12} {:>10}",
            "order_id", "region", "category", "sales", "profit", "date"
        ),
    );
    push_row(
        &mut out,
        format!("{:-<14} {:-<12} {:-<18} {:-<12} {:-<12} {:-<10}", "", "", "", "", "", ""),
    );

    for r in records {
        push_row(
            &mut out,
            format!(
                "{:<14} {:<12} {:<18} {:>12} {:>12} {:>10}",
                truncate(&r.order_id, 14),
                truncate(&r.region, 12),
                truncate(&r.category, 18),
                fmt_money_cents(r.sales),
                fmt_money_cents(r.profit),
                r.order_date.to_string()
            ),
        );
    }

    out
}

/// The full dashboard: header, KPIs, category and region tables, trend, top performers.
pub fn format_dashboard(dataset: &Dataset, view: &DashboardView) -> String {
    let mut out = format_header(dataset, view.criteria());
    out.push('\n');

    let Some(output) = view.output() else {
        out.push_str(EMPTY_SELECTION_MESSAGE);
        out.push('\n');
        return out;
    };

    out.push_str(&format_body(output));
    out
}

fn format_body(output: &DashboardOutput) -> String {
    let mut out = String::new();
    out.push_str(&format_kpis(&output.summary));
    out.push('\n');
    out.push_str(&format_grouped("Sales by category", GroupKey::Category, &output.by_category));
    out.push('\n');
    out.push_str(&format_grouped("Sales by region", GroupKey::Region, &output.by_region));
    out.push('\n');
    out.push_str(&format_trend(&output.trend));
    out.push('\n');
    out.push_str(&format_top(&output.top_performers, output.rank_by));
    out
}

fn push_row(out: &mut String, row: String) {
    out.push_str(row.trim_end());
    out.push('\n');
}

/// Whole dollars with thousands separators: `$1,235`, `-$40`.
pub fn fmt_money(v: f64) -> String {
    let sign = if v < 0.0 && v.round() != 0.0 { "-" } else { "" };
    format!("{sign}${}", group_thousands(&format!("{:.0}", v.abs())))
}

/// Dollars and cents with thousands separators: `$1,234.50`.
pub fn fmt_money_cents(v: f64) -> String {
    let sign = if v < 0.0 && (v * 100.0).round() != 0.0 { "-" } else { "" };
    let text = format!("{:.2}", v.abs());
    let (int_part, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{sign}${}.{frac}", group_thousands(int_part))
}

/// Signed percentage, or `n/a` when growth is undefined.
pub fn fmt_growth(v: Option<f64>) -> String {
    match v {
        Some(g) => format!("{g:+.1}%"),
        None => "n/a".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::build_dashboard;
    use crate::domain::{DateRange, Period};
    use crate::io::ingest::load_dataset_from_reader;
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        load_dataset_from_reader(
            "Order ID,Region,Category,Sales,Profit,Order Date\n\
             1001,East,Technology,200,60,2023-01-01\n\
             1002,West,Furniture,450,120,2023-01-16\n\
             1003,South,OfficeSupplies,300,75,2023-02-01\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn money_is_grouped_and_signed() {
        assert_eq!(fmt_money(0.0), "$0");
        assert_eq!(fmt_money(950.0), "$950");
        assert_eq!(fmt_money(1234567.4), "$1,234,567");
        assert_eq!(fmt_money(-1500.0), "-$1,500");
        assert_eq!(fmt_money(-0.2), "$0");
        assert_eq!(fmt_money_cents(1234.5), "$1,234.50");
        assert_eq!(fmt_money_cents(-20.0), "-$20.00");
    }

    #[test]
    fn undefined_growth_prints_na() {
        assert_eq!(fmt_growth(None), "n/a");
        assert_eq!(fmt_growth(Some(12.345)), "+12.3%");
        assert_eq!(fmt_growth(Some(-50.0)), "-50.0%");
    }

    #[test]
    fn criteria_description_lists_active_filters() {
        let d = |m, day| NaiveDate::from_ymd_opt(2023, m, day).unwrap();
        let criteria = FilterCriteria::new()
            .with_regions(["South", "East"])
            .with_date_range(DateRange::from_bounds(Some(d(1, 1)), None).unwrap());
        assert_eq!(
            describe_criteria(&criteria),
            "regions=[East, South] | categories=all | dates=2023-01-01 to .."
        );
    }

    #[test]
    fn trend_table_marks_first_month_na() {
        let trend = vec![TrendPoint {
            period: Period { year: 2023, month: 1 },
            total_sales: 200.0,
            total_profit: 60.0,
            order_count: 1,
            sales_growth: None,
            profit_growth: None,
        }];
        let table = format_trend(&trend);
        let row = table.lines().nth(3).unwrap();
        assert!(row.starts_with("2023-01"));
        assert!(row.contains("n/a"));
    }

    #[test]
    fn dashboard_contains_every_section() {
        let ds = dataset();
        let view = build_dashboard(&ds, &FilterCriteria::new(), 2, RankMetric::Sales);
        let text = format_dashboard(&ds, &view);

        assert!(text.contains("Total Sales:       $950"));
        assert!(text.contains("Sales by category:"));
        assert!(text.contains("Sales by region:"));
        assert!(text.contains("Monthly trend:"));
        assert!(text.contains("Top 2 orders by sales:"));
        assert!(!text.contains(EMPTY_SELECTION_MESSAGE));
    }

    #[test]
    fn empty_view_prints_message_instead_of_tables() {
        let ds = dataset();
        let criteria = FilterCriteria::new().with_regions(["North"]);
        let view = build_dashboard(&ds, &criteria, 5, RankMetric::Profit);
        let text = format_dashboard(&ds, &view);

        assert!(text.contains(EMPTY_SELECTION_MESSAGE));
        assert!(!text.contains("Monthly trend:"));
    }
}
