use std::collections::BTreeMap;

use crate::domain::{GroupKey, GroupMetrics, GroupedSummary, MetricsSummary, SalesRecord};

/// `profit / sales * 100`, or zero when `sales` is not positive.
pub fn margin_pct(profit: f64, sales: f64) -> f64 {
    if sales > 0.0 { profit / sales * 100.0 } else { 0.0 }
}

/// Headline KPIs. An empty slice yields all zeros.
pub fn compute_summary(records: &[SalesRecord]) -> MetricsSummary {
    if records.is_empty() {
        return MetricsSummary::default();
    }

    let total_sales: f64 = records.iter().map(|r| r.sales).sum();
    let total_profit: f64 = records.iter().map(|r| r.profit).sum();
    let order_count = records.len();

    MetricsSummary {
        total_sales,
        total_profit,
        avg_profit_margin: margin_pct(total_profit, total_sales),
        order_count,
        avg_order_value: total_sales / order_count as f64,
    }
}

/// Group records by a caller-supplied key.
///
/// Keys compare exactly; every record lands in exactly one group.
pub fn group_by<K, F>(records: &[SalesRecord], key_selector: F) -> GroupedSummary<K>
where
    K: Ord,
    F: Fn(&SalesRecord) -> K,
{
    let mut groups: BTreeMap<K, GroupMetrics> = BTreeMap::new();

    for r in records {
        let g = groups.entry(key_selector(r)).or_default();
        g.sales += r.sales;
        g.profit += r.profit;
        g.count += 1;
    }

    for g in groups.values_mut() {
        g.avg_margin = margin_pct(g.profit, g.sales);
    }

    GroupedSummary { groups }
}

/// Group by one of the fixed dimensions, with display labels as keys.
pub fn group_by_key(records: &[SalesRecord], key: GroupKey) -> GroupedSummary<String> {
    match key {
        GroupKey::Region => group_by(records, |r| r.region.clone()),
        GroupKey::Category => group_by(records, |r| r.category.clone()),
        GroupKey::RegionCategory => group_by(records, |r| format!("{} / {}", r.region, r.category)),
        GroupKey::Period => group_by(records, |r| r.order_period.to_string()),
    }
}
