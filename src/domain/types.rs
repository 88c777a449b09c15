//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - built once at load time and shared read-only across recomputations
//! - exported to JSON/CSV
//! - printed by the report module without further conversion

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::ValueEnum;
use serde::{Serialize, Serializer};

use crate::error::AppError;

/// Calendar year-month bucket derived from an order date.
///
/// Field order makes the derived `Ord` chronological.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Integer key (`year * 12 + month - 1`); consecutive months differ by one.
    pub fn key(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One validated row of the sales dataset.
///
/// Build with [`SalesRecord::new`] so the derived fields stay consistent with
/// the raw ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesRecord {
    pub order_id: String,
    pub region: String,
    pub category: String,
    /// Order value; never negative.
    pub sales: f64,
    /// May be negative (loss-making orders).
    pub profit: f64,
    pub order_date: NaiveDate,

    /// `profit / sales`, or `None` when `sales == 0`.
    pub profit_margin: Option<f64>,
    pub order_period: Period,
}

impl SalesRecord {
    pub fn new(
        order_id: impl Into<String>,
        region: impl Into<String>,
        category: impl Into<String>,
        sales: f64,
        profit: f64,
        order_date: NaiveDate,
    ) -> Self {
        let profit_margin = if sales != 0.0 { Some(profit / sales) } else { None };
        Self {
            order_id: order_id.into(),
            region: region.into(),
            category: category.into(),
            sales,
            profit,
            order_date,
            profit_margin,
            order_period: Period::from_date(order_date),
        }
    }

    pub fn metric(&self, by: RankMetric) -> f64 {
        match by {
            RankMetric::Profit => self.profit,
            RankMetric::Sales => self.sales,
        }
    }
}

/// Inclusive date bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::new(
                2,
                format!("Invalid date range: start {start} is after end {end}."),
            ));
        }
        Ok(Self { start, end })
    }

    /// Covers every representable date.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    /// Build from optional bounds; a missing side stays open.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, AppError> {
        Self::new(start.unwrap_or(NaiveDate::MIN), end.unwrap_or(NaiveDate::MAX))
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.start == NaiveDate::MIN && self.end == NaiveDate::MAX
    }
}

impl Default for DateRange {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// The user's current selection. Rebuilt on every interaction.
///
/// Empty `regions` / `categories` sets mean "no restriction".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    pub regions: BTreeSet<String>,
    pub categories: BTreeSet<String>,
    pub date_range: DateRange,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Whether a single record passes every active restriction.
    pub fn matches(&self, record: &SalesRecord) -> bool {
        (self.regions.is_empty() || self.regions.contains(&record.region))
            && (self.categories.is_empty() || self.categories.contains(&record.category))
            && self.date_range.contains(record.order_date)
    }

    pub fn is_unrestricted(&self) -> bool {
        self.regions.is_empty() && self.categories.is_empty() && self.date_range.is_unbounded()
    }
}

/// Headline KPIs for the filtered set.
///
/// An empty set yields `MetricsSummary::default()` (all zeros).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total_sales: f64,
    pub total_profit: f64,
    /// Percentage (`27.0` means 27%).
    pub avg_profit_margin: f64,
    pub order_count: usize,
    pub avg_order_value: f64,
}

impl MetricsSummary {
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }
}

/// Aggregates for one group of a [`GroupedSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupMetrics {
    pub sales: f64,
    pub profit: f64,
    pub count: usize,
    /// Percentage, `profit / sales * 100`; zero when the group has no sales.
    pub avg_margin: f64,
}

/// Group key → aggregates. Iteration follows key order; use
/// [`GroupedSummary::sorted_by_sales`] for display order.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedSummary<K: Ord> {
    pub groups: BTreeMap<K, GroupMetrics>,
}

impl<K: Ord> GroupedSummary<K> {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, key: &K) -> Option<&GroupMetrics> {
        self.groups.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &GroupMetrics)> {
        self.groups.iter()
    }

    /// Sum of member counts across all groups.
    pub fn total_count(&self) -> usize {
        self.groups.values().map(|g| g.count).sum()
    }

    /// Groups ordered by descending sales, ties by key.
    pub fn sorted_by_sales(&self) -> Vec<(&K, &GroupMetrics)> {
        let mut rows: Vec<_> = self.groups.iter().collect();
        rows.sort_by(|a, b| b.1.sales.total_cmp(&a.1.sales).then_with(|| a.0.cmp(b.0)));
        rows
    }
}

impl<K: Ord + fmt::Display> GroupedSummary<K> {
    /// Flatten into labelled rows (display order) for export.
    pub fn rows(&self) -> Vec<GroupRow> {
        self.sorted_by_sales()
            .into_iter()
            .map(|(key, m)| GroupRow {
                key: key.to_string(),
                sales: m.sales,
                profit: m.profit,
                count: m.count,
                avg_margin: m.avg_margin,
            })
            .collect()
    }
}

/// A labelled group row, as exported to CSV/JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    pub sales: f64,
    pub profit: f64,
    pub count: usize,
    pub avg_margin: f64,
}

/// One period of the month-over-month trend.
///
/// Growth values are percentages; `None` means "not applicable" (first period,
/// or the prior period's value was zero).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub period: Period,
    pub total_sales: f64,
    pub total_profit: f64,
    pub order_count: usize,
    pub sales_growth: Option<f64>,
    pub profit_growth: Option<f64>,
}

/// Metric used to rank top performers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RankMetric {
    Profit,
    Sales,
}

impl RankMetric {
    pub fn display_name(self) -> &'static str {
        match self {
            RankMetric::Profit => "profit",
            RankMetric::Sales => "sales",
        }
    }
}

/// Fixed grouping dimensions offered by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupKey {
    Region,
    Category,
    RegionCategory,
    Period,
}

impl GroupKey {
    pub fn display_name(self) -> &'static str {
        match self {
            GroupKey::Region => "Region",
            GroupKey::Category => "Category",
            GroupKey::RegionCategory => "Region / Category",
            GroupKey::Period => "Month",
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags, `.env`, and defaults.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub criteria: FilterCriteria,
    pub top_n: usize,
    pub rank_by: RankMetric,
    pub group_by: GroupKey,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
}
