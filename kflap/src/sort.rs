use std::cmp::Ordering;

use crate::monitor::ObjectRecord;

/// Most changes first, then highest resourceVersion. Ties on both fall back
/// to the identity so equal inputs always rank the same way.
pub fn compare_records(a: &ObjectRecord, b: &ObjectRecord) -> Ordering {
    b.changes
        .cmp(&a.changes)
        .then_with(|| b.last_version.cmp(&a.last_version))
        .then_with(|| a.identity.cmp(&b.identity))
}

/// Returns the top `limit` records of `records`, ranked.
pub fn rank(records: &[ObjectRecord], limit: usize) -> Vec<ObjectRecord> {
    let mut ranked = records.to_vec();
    ranked.sort_by(compare_records);
    ranked.truncate(limit);
    ranked
}
