//! Set algebra over unordered identifier collections.
//!
//! Every function is total and pure. Outputs are deduplicated and sorted
//! ascending so results compare equal regardless of input order.

use std::collections::BTreeSet;

/// Remove duplicates from `ids`.
#[must_use]
pub fn dedup(ids: &[u32]) -> Vec<u32> {
    ids.iter().copied().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Elements of `a` that are not present in `b`.
#[must_use]
pub fn diff(a: &[u32], b: &[u32]) -> Vec<u32> {
    let b: BTreeSet<u32> = b.iter().copied().collect();
    a.iter()
        .copied()
        .filter(|id| !b.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Elements present in both `a` and `b`.
#[must_use]
pub fn intersect(a: &[u32], b: &[u32]) -> Vec<u32> {
    let b: BTreeSet<u32> = b.iter().copied().collect();
    a.iter()
        .copied()
        .filter(|id| b.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
