//! Association synchronization.
//!
//! An owner's association set is never rewritten wholesale. The desired set
//! is compared with what the store holds and only the difference is applied:
//! identifiers in both sets are left untouched.

use inv_core::errors::InventoryError;
use inv_core::ids;
use inv_core::kinds::AssociationKind;

use crate::error::DatabaseError;

/// Read and write access to association rows.
#[allow(async_fn_in_trait)]
pub trait AssociationStore {
    /// Identifiers currently associated with `owner_id`.
    async fn current(&self, assoc: AssociationKind, owner_id: u32)
    -> Result<Vec<u32>, DatabaseError>;

    /// Insert association rows for `ids`.
    async fn bind(
        &self,
        assoc: AssociationKind,
        owner_id: u32,
        ids: &[u32],
    ) -> Result<u64, DatabaseError>;

    /// Delete association rows for `ids`.
    async fn unbind(
        &self,
        assoc: AssociationKind,
        owner_id: u32,
        ids: &[u32],
    ) -> Result<u64, DatabaseError>;
}

/// The rows to insert and delete to move from `current` to `desired`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationDelta {
    pub to_add: Vec<u32>,
    pub to_remove: Vec<u32>,
}

impl AssociationDelta {
    #[must_use]
    pub fn compute(desired: &[u32], current: &[u32]) -> Self {
        Self {
            to_add: ids::diff(desired, current),
            to_remove: ids::diff(current, desired),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Bring one owner's association set to `desired`. Returns the applied delta.
///
/// Removals are applied before insertions.
///
/// # Errors
///
/// Returns `StoreFailure` if reading or writing association rows fails.
pub async fn synchronize<S: AssociationStore>(
    store: &S,
    assoc: AssociationKind,
    owner_id: u32,
    desired: &[u32],
) -> Result<AssociationDelta, InventoryError> {
    let current = store.current(assoc, owner_id).await?;
    let delta = AssociationDelta::compute(desired, &current);

    if !delta.to_remove.is_empty() {
        store.unbind(assoc, owner_id, &delta.to_remove).await?;
    }
    if !delta.to_add.is_empty() {
        store.bind(assoc, owner_id, &delta.to_add).await?;
    }

    tracing::debug!(
        %assoc,
        owner_id,
        added = delta.to_add.len(),
        removed = delta.to_remove.len(),
        "association synchronized"
    );
    Ok(delta)
}
