//! Shared dashboard pipeline used by every CLI view.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! filter -> summary -> group-bys -> trend -> top performers
//!
//! The command handlers can then focus on presentation (which tables to print,
//! which files to export).

use tracing::{debug, info};

use crate::analytics::{apply_filter, compute_period_trend, compute_summary, group_by_key, rank_top_performers};
use crate::domain::{FilterCriteria, GroupKey, GroupedSummary, MetricsSummary, RankMetric, SalesRecord, TrendPoint};
use crate::io::ingest::Dataset;

/// All computed outputs of one recomputation pass.
#[derive(Debug, Clone)]
pub struct DashboardOutput {
    pub criteria: FilterCriteria,
    pub records: Vec<SalesRecord>,
    pub summary: MetricsSummary,
    pub by_region: GroupedSummary<String>,
    pub by_category: GroupedSummary<String>,
    pub by_region_category: GroupedSummary<String>,
    pub trend: Vec<TrendPoint>,
    pub rank_by: RankMetric,
    pub top_performers: Vec<SalesRecord>,
}

/// Result of a pass: either data, or the explicit "nothing matched" state.
///
/// Load failures never get this far, so callers can always tell the two apart.
#[derive(Debug, Clone)]
pub enum DashboardView {
    Empty { criteria: FilterCriteria },
    Populated(Box<DashboardOutput>),
}

impl DashboardView {
    pub fn is_empty(&self) -> bool {
        matches!(self, DashboardView::Empty { .. })
    }

    pub fn criteria(&self) -> &FilterCriteria {
        match self {
            DashboardView::Empty { criteria } => criteria,
            DashboardView::Populated(output) => &output.criteria,
        }
    }

    /// Headline KPIs; all zeros for the empty state.
    pub fn summary(&self) -> MetricsSummary {
        match self {
            DashboardView::Empty { .. } => MetricsSummary::default(),
            DashboardView::Populated(output) => output.summary,
        }
    }

    pub fn output(&self) -> Option<&DashboardOutput> {
        match self {
            DashboardView::Empty { .. } => None,
            DashboardView::Populated(output) => Some(output.as_ref()),
        }
    }
}

/// Run one full pass over the dataset for the given selection.
#[tracing::instrument(skip_all, fields(rows = dataset.records.len(), top_n = top_n, rank_by = rank_by.display_name()))]
pub fn build_dashboard(dataset: &Dataset, criteria: &FilterCriteria, top_n: usize, rank_by: RankMetric) -> DashboardView {
    let records = apply_filter(&dataset.records, criteria);
    debug!(matched = records.len(), "Filter applied");

    if records.is_empty() {
        info!("No records match the current selection");
        return DashboardView::Empty {
            criteria: criteria.clone(),
        };
    }

    let summary = compute_summary(&records);
    let by_region = group_by_key(&records, GroupKey::Region);
    let by_category = group_by_key(&records, GroupKey::Category);
    let by_region_category = group_by_key(&records, GroupKey::RegionCategory);
    let trend = compute_period_trend(&records);
    let top_performers = rank_top_performers(&records, top_n, rank_by);

    info!(
        orders = summary.order_count,
        total_sales = summary.total_sales,
        periods = trend.len(),
        "Dashboard computed"
    );

    DashboardView::Populated(Box::new(DashboardOutput {
        criteria: criteria.clone(),
        records,
        summary,
        by_region,
        by_category,
        by_region_category,
        trend,
        rank_by,
        top_performers,
    }))
}
