use crate::domain::{FilterCriteria, SalesRecord};

/// Records matching `criteria`, in their original order.
///
/// An empty result is a normal outcome.
pub fn apply_filter(records: &[SalesRecord], criteria: &FilterCriteria) -> Vec<SalesRecord> {
    records.iter().filter(|r| criteria.matches(r)).cloned().collect()
}
