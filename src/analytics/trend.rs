use crate::analytics::summary::group_by;
use crate::domain::{SalesRecord, TrendPoint};

/// Percentage change from `previous` to `current`.
///
/// `None` when `previous` is zero or negative (no usable base).
pub fn growth_pct(previous: f64, current: f64) -> Option<f64> {
    if previous <= 0.0 || !previous.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// Per-month totals in ascending period order, with month-over-month growth.
///
/// Growth compares adjacent periods that have data; the first period never has
/// a growth value.
pub fn compute_period_trend(records: &[SalesRecord]) -> Vec<TrendPoint> {
    let by_period = group_by(records, |r| r.order_period);

    let mut out: Vec<TrendPoint> = Vec::with_capacity(by_period.len());
    for (period, m) in by_period.iter() {
        let (sales_growth, profit_growth) = match out.last() {
            Some(prev) => (
                growth_pct(prev.total_sales, m.sales),
                growth_pct(prev.total_profit, m.profit),
            ),
            None => (None, None),
        };

        out.push(TrendPoint {
            period: *period,
            total_sales: m.sales,
            total_profit: m.profit,
            order_count: m.count,
            sales_growth,
            profit_growth,
        });
    }

    out
}
