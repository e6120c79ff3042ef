//! Hostgroup matching.
//!
//! A hostgroup satisfies a requirement set `F` when its own feature set
//! contains every element of `F`. Partial matches never count.

use std::collections::{BTreeMap, BTreeSet};

use inv_core::errors::InventoryError;
use inv_core::ids;

use crate::error::DatabaseError;

/// Source of candidate hostgroups and their features.
#[allow(async_fn_in_trait)]
pub trait HostgroupPool {
    /// Hostgroups visible to the given scope, ascending.
    ///
    /// A product (or team) scope admits hostgroups owned by it and hostgroups
    /// shared with it. `None` leaves that dimension unrestricted.
    async fn candidates(
        &self,
        product_id: Option<u32>,
        team_id: Option<u32>,
    ) -> Result<Vec<u32>, DatabaseError>;

    /// Feature sets of the given hostgroups. Hostgroups without features may
    /// be absent from the map.
    async fn features_of(
        &self,
        hostgroups: &[u32],
    ) -> Result<BTreeMap<u32, Vec<u32>>, DatabaseError>;
}

/// Hostgroups in `pool` whose features cover `required`, ascending.
///
/// An empty requirement matches the whole pool.
///
/// # Errors
///
/// Returns `InventoryError::FeatureUnsatisfiable` when `required` is non-empty
/// and no hostgroup qualifies. `missing` lists the required features that no
/// hostgroup in the pool provides at all, and is empty when each feature is
/// available somewhere but never all together.
pub fn select_matching(
    required: &[u32],
    pool: &BTreeMap<u32, Vec<u32>>,
) -> Result<Vec<u32>, InventoryError> {
    let required = ids::dedup(required);
    if required.is_empty() {
        return Ok(pool.keys().copied().collect());
    }

    let matching: Vec<u32> = pool
        .iter()
        .filter(|(_, features)| ids::diff(&required, features).is_empty())
        .map(|(hostgroup, _)| *hostgroup)
        .collect();

    if matching.is_empty() {
        let offered: BTreeSet<u32> = pool.values().flatten().copied().collect();
        let missing = required
            .into_iter()
            .filter(|feature| !offered.contains(feature))
            .collect();
        return Err(InventoryError::FeatureUnsatisfiable { missing });
    }
    Ok(matching)
}

/// Load the scoped pool and select the hostgroups covering `required`.
///
/// `required` must already be reference-validated.
///
/// # Errors
///
/// Returns `FeatureUnsatisfiable` as described in [`select_matching`], or
/// `StoreFailure` if the pool cannot be read.
pub async fn match_hostgroups<P: HostgroupPool>(
    pool: &P,
    required: &[u32],
    product_id: Option<u32>,
    team_id: Option<u32>,
) -> Result<Vec<u32>, InventoryError> {
    let candidates = pool.candidates(product_id, team_id).await?;
    let mut features = pool.features_of(&candidates).await?;

    let scoped: BTreeMap<u32, Vec<u32>> = candidates
        .into_iter()
        .map(|hostgroup| (hostgroup, features.remove(&hostgroup).unwrap_or_default()))
        .collect();

    let result = select_matching(required, &scoped);
    tracing::debug!(
        ?product_id,
        ?team_id,
        candidates = scoped.len(),
        matched = result.as_ref().map_or(0, Vec::len),
        "hostgroup match evaluated"
    );
    result
}
