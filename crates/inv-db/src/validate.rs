//! Reference validation.
//!
//! Before any write, the foreign identifiers carried by a batch are grouped
//! by target kind and checked against the store, one query per kind. The
//! first kind (in [`ValidationOrder`]) with a missing identifier fails the
//! whole batch.

use inv_config::ValidationConfig;
use inv_core::errors::InventoryError;
use inv_core::ids;
use inv_core::kinds::ResourceKind;
use inv_core::resource::{ReferenceSet, Resource};

use crate::error::DatabaseError;

/// Read-only existence lookups.
#[allow(async_fn_in_trait)]
pub trait ExistenceChecker {
    /// Which of `ids` exist for `kind`, ascending.
    async fn existing(&self, kind: ResourceKind, ids: &[u32])
    -> Result<Vec<u32>, DatabaseError>;
}

/// The order in which reference buckets are checked.
///
/// Kinds not named in the configured order are checked afterwards, in
/// `ResourceKind::ALL` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOrder {
    sequence: Vec<ResourceKind>,
}

impl ValidationOrder {
    #[must_use]
    pub fn new(configured: &[ResourceKind]) -> Self {
        let mut sequence: Vec<ResourceKind> = Vec::with_capacity(ResourceKind::ALL.len());
        for kind in configured.iter().chain(ResourceKind::ALL.iter()) {
            if !sequence.contains(kind) {
                sequence.push(*kind);
            }
        }
        Self { sequence }
    }

    #[must_use]
    pub fn from_config(config: &ValidationConfig) -> Self {
        Self::new(&config.order)
    }

    /// Every kind, in check order.
    #[must_use]
    pub fn sequence(&self) -> &[ResourceKind] {
        &self.sequence
    }
}

impl Default for ValidationOrder {
    fn default() -> Self {
        Self::from_config(&ValidationConfig::default())
    }
}

/// Gather the foreign identifiers of every entity in a batch.
#[must_use]
pub fn collect<T: Resource>(batch: &[T]) -> ReferenceSet {
    let mut refs = ReferenceSet::new();
    for entity in batch {
        entity.collect_references(&mut refs);
    }
    refs
}

/// Check every bucket of `refs` against the store.
///
/// # Errors
///
/// Returns `InventoryError::MissingReference` for the first kind (in `order`)
/// with absent identifiers, listing all of that kind's missing ids, or
/// `StoreFailure` if a lookup fails.
pub async fn validate_references<E: ExistenceChecker>(
    checker: &E,
    refs: &ReferenceSet,
    order: &ValidationOrder,
) -> Result<(), InventoryError> {
    for kind in order.sequence() {
        let wanted = refs.bucket(*kind);
        if wanted.is_empty() {
            continue;
        }
        let found = checker.existing(*kind, &wanted).await?;
        let missing = ids::diff(&wanted, &found);
        if !missing.is_empty() {
            tracing::debug!(%kind, ?missing, "reference validation failed");
            return Err(InventoryError::MissingReference { kind: *kind, ids: missing });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;

    use super::*;
    use inv_core::entities::{Application, Cluster};

    /// Existence backed by a fixed map.
    struct FixedStore(BTreeMap<ResourceKind, Vec<u32>>);

    impl ExistenceChecker for FixedStore {
        async fn existing(
            &self,
            kind: ResourceKind,
            ids: &[u32],
        ) -> Result<Vec<u32>, DatabaseError> {
            let present = self.0.get(&kind).cloned().unwrap_or_default();
            Ok(ids::intersect(ids, &present))
        }
    }

    fn app(tags: Vec<u32>) -> Application {
        Application {
            name: "checkout".into(),
            product_id: 1,
            team_id: 1,
            tags_id: tags,
            ..Application::default()
        }
    }

    #[test]
    fn order_appends_unlisted_kinds() {
        let order = ValidationOrder::new(&[ResourceKind::Tag, ResourceKind::Product]);
        assert_eq!(&order.sequence()[..3], &[
            ResourceKind::Tag,
            ResourceKind::Product,
            ResourceKind::Team
        ]);
        assert_eq!(order.sequence().len(), ResourceKind::ALL.len());
        assert_eq!(ValidationOrder::default().sequence()[0], ResourceKind::Product);
    }

    #[test]
    fn collect_spans_the_batch() {
        let refs = collect(&[app(vec![1, 2]), app(vec![2, 3])]);
        assert_eq!(refs.bucket(ResourceKind::Tag), vec![1, 2, 3]);
        assert_eq!(refs.bucket(ResourceKind::Product), vec![1]);
    }

    #[tokio::test]
    async fn reports_all_missing_ids_of_first_failing_kind() {
        let store = FixedStore(BTreeMap::from([
            (ResourceKind::Product, vec![1]),
            (ResourceKind::Team, vec![1]),
            (ResourceKind::Tag, vec![1]),
        ]));
        let refs = collect(&[app(vec![1, 4, 9])]);

        let err = validate_references(&store, &refs, &ValidationOrder::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::MissingReference { kind: ResourceKind::Tag, ref ids } if *ids == vec![4, 9]
        ));
    }

    #[tokio::test]
    async fn configured_order_decides_which_kind_is_reported() {
        let store = FixedStore(BTreeMap::new());
        let refs = collect(&[app(vec![5])]);

        let default = validate_references(&store, &refs, &ValidationOrder::default()).await;
        assert!(matches!(
            default,
            Err(InventoryError::MissingReference { kind: ResourceKind::Product, .. })
        ));

        let tag_first = ValidationOrder::new(&[ResourceKind::Tag]);
        let reordered = validate_references(&store, &refs, &tag_first).await;
        assert!(matches!(
            reordered,
            Err(InventoryError::MissingReference { kind: ResourceKind::Tag, .. })
        ));
    }

    #[tokio::test]
    async fn passes_when_everything_exists() {
        let store = FixedStore(BTreeMap::from([(ResourceKind::Datacenter, vec![2])]));
        let cluster = Cluster {
            name: "k8s".into(),
            datacenter_id: 2,
            ..Cluster::default()
        };
        let refs = collect(&[cluster]);
        assert!(validate_references(&store, &refs, &ValidationOrder::default()).await.is_ok());
    }
}
