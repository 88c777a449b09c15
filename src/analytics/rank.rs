use std::cmp::Ordering;

use crate::domain::{RankMetric, SalesRecord};

/// Top `n` records by `by`, descending; ties go to the smaller order id.
///
/// `n` beyond the record count returns every record.
pub fn rank_top_performers(records: &[SalesRecord], n: usize, by: RankMetric) -> Vec<SalesRecord> {
    let mut sorted: Vec<&SalesRecord> = records.iter().collect();
    sorted.sort_by(|a, b| {
        b.metric(by)
            .total_cmp(&a.metric(by))
            .then_with(|| cmp_order_ids(&a.order_id, &b.order_id))
    });
    sorted.into_iter().take(n).cloned().collect()
}

/// Total order on order ids: integer ids first by value, then the rest lexically.
pub fn cmp_order_ids(a: &str, b: &str) -> Ordering {
    order_id_key(a).cmp(&order_id_key(b))
}

fn order_id_key(id: &str) -> (bool, Option<u64>, &str) {
    let numeric = id.parse::<u64>().ok();
    (numeric.is_none(), numeric, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn rec(id: &str, sales: f64, profit: f64) -> SalesRecord {
        SalesRecord::new(id, "East", "Technology", sales, profit, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap())
    }

    fn ids(records: &[SalesRecord]) -> Vec<&str> {
        records.iter().map(|r| r.order_id.as_str()).collect()
    }

    #[test]
    fn ranks_by_profit_with_id_tie_break() {
        let records = vec![
            rec("1", 100.0, 60.0),
            rec("2", 100.0, 120.0),
            rec("3", 100.0, 75.0),
            rec("4", 100.0, 120.0),
        ];
        let top = rank_top_performers(&records, 3, RankMetric::Profit);
        assert_eq!(ids(&top), vec!["2", "4", "3"]);
    }

    #[test]
    fn tie_break_does_not_depend_on_input_order() {
        let records = vec![rec("4", 1.0, 120.0), rec("2", 1.0, 120.0)];
        let top = rank_top_performers(&records, 2, RankMetric::Profit);
        assert_eq!(ids(&top), vec!["2", "4"]);
    }

    #[test]
    fn ranks_by_sales() {
        let records = vec![rec("1", 200.0, 1.0), rec("2", 450.0, 1.0), rec("3", 300.0, 1.0)];
        let top = rank_top_performers(&records, 2, RankMetric::Sales);
        assert_eq!(ids(&top), vec!["2", "3"]);
    }

    #[test]
    fn n_larger_than_input_returns_all() {
        let records = vec![rec("1", 1.0, 1.0), rec("2", 2.0, 2.0)];
        assert_eq!(rank_top_performers(&records, 10, RankMetric::Sales).len(), 2);
        assert!(rank_top_performers(&[], 3, RankMetric::Profit).is_empty());
        assert!(rank_top_performers(&records, 0, RankMetric::Profit).is_empty());
    }

    #[test]
    fn numeric_ids_compare_numerically() {
        assert_eq!(cmp_order_ids("9", "10"), Ordering::Less);
        assert_eq!(cmp_order_ids("CA-10", "CA-9"), Ordering::Less);
        assert_eq!(cmp_order_ids("007", "7"), Ordering::Less);
        assert_eq!(cmp_order_ids("10", "1a"), Ordering::Less);
        assert_eq!(cmp_order_ids("1a", "2"), Ordering::Greater);
    }

    #[test]
    fn mixed_id_ties_rank_the_same_for_every_input_order() {
        let ids_in = ["2", "10", "1a"];
        let orders = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

        for order in orders {
            let records: Vec<SalesRecord> = order.iter().map(|&i| rec(ids_in[i], 5.0, 50.0)).collect();
            let top = rank_top_performers(&records, 3, RankMetric::Profit);
            assert_eq!(ids(&top), vec!["2", "10", "1a"], "input order {order:?}");
        }
    }
}
