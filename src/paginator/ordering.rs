use crate::models::{MessageRecord, SortOrder};

/// Sort records by `created_time` in place.
///
/// The sort is stable in both directions: records with equal timestamps keep their
/// delivery order.
pub fn sort_records(records: &mut [MessageRecord], order: SortOrder) {
    match order {
        SortOrder::Ascending => records.sort_by(|a, b| a.created_time.cmp(&b.created_time)),
        SortOrder::Descending => records.sort_by(|a, b| b.created_time.cmp(&a.created_time)),
    }
}
