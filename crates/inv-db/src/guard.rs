//! Deletion guard.
//!
//! The store declares no foreign keys, so deleting a row that is still
//! referenced would leave dangling identifiers behind. [`DependencyGraph`]
//! lists, for each kind, every place another row can point at it; the guard
//! counts references in all of them and deletes only when every count is
//! zero.

use std::fmt;

use serde::Serialize;

use inv_core::errors::InventoryError;
use inv_core::kinds::{AssociationKind, ResourceKind};

use crate::error::DatabaseError;

/// A place that can hold references to a deleted kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dependent {
    /// A reference column on another kind's primary table.
    Column {
        kind: ResourceKind,
        column: &'static str,
    },
    /// An association table whose `associated_id` targets the deleted kind.
    Association(AssociationKind),
}

impl Dependent {
    /// `table.column` or the association table name.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Column { kind, column } => format!("{}.{column}", kind.table()),
            Self::Association(assoc) => assoc.table().to_string(),
        }
    }
}

impl fmt::Display for Dependent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

const fn column(kind: ResourceKind, column: &'static str) -> Dependent {
    Dependent::Column { kind, column }
}

/// Which dependents must be empty before a kind may be deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyGraph {
    edges: Vec<(ResourceKind, Vec<Dependent>)>,
}

impl Default for DependencyGraph {
    fn default() -> Self {
        use AssociationKind as A;
        use ResourceKind as K;

        Self {
            edges: vec![
                (K::Product, vec![
                    column(K::Hostgroup, "product_id"),
                    column(K::Application, "product_id"),
                    Dependent::Association(A::HostgroupProducts),
                ]),
                (K::Team, vec![
                    column(K::Hostgroup, "team_id"),
                    column(K::Application, "team_id"),
                    column(K::User, "team_id"),
                    Dependent::Association(A::HostgroupTeams),
                ]),
                (K::Environment, vec![column(K::Hostgroup, "environment_id")]),
                (K::Datacenter, vec![column(K::Cluster, "datacenter_id")]),
                (K::Cluster, vec![column(K::Hostgroup, "cluster_id")]),
                (K::Feature, vec![
                    Dependent::Association(A::ApplicationFeatures),
                    Dependent::Association(A::HostgroupFeatures),
                ]),
                (K::Tag, vec![
                    Dependent::Association(A::ApplicationTags),
                    Dependent::Association(A::HostgroupTags),
                ]),
                (K::Hostgroup, vec![Dependent::Association(
                    A::ApplicationHostgroups,
                )]),
                (K::User, vec![column(K::Application, "owner_id")]),
            ],
        }
    }
}

impl DependencyGraph {
    /// A graph with no edges: every delete is allowed.
    #[must_use]
    pub const fn empty() -> Self {
        Self { edges: Vec::new() }
    }

    /// Add a dependent for `kind`, after any already registered.
    #[must_use]
    pub fn with_dependent(mut self, kind: ResourceKind, dependent: Dependent) -> Self {
        match self.edges.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, dependents)) => dependents.push(dependent),
            None => self.edges.push((kind, vec![dependent])),
        }
        self
    }

    /// Dependents that block deleting `kind`, in check order.
    #[must_use]
    pub fn dependents_of(&self, kind: ResourceKind) -> &[Dependent] {
        self.edges
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(&[], |(_, dependents)| dependents.as_slice())
    }

    /// Kinds whose rows hold references to `kind` (inverse view).
    #[must_use]
    pub fn required_by(&self, kind: ResourceKind) -> Vec<ResourceKind> {
        let mut kinds: Vec<ResourceKind> = self
            .dependents_of(kind)
            .iter()
            .map(|dependent| match dependent {
                Dependent::Column { kind, .. } => *kind,
                Dependent::Association(assoc) => assoc.owner(),
            })
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }
}

/// Counts references held by one dependent.
#[allow(async_fn_in_trait)]
pub trait RequireCounter {
    /// Number of references from `dependent` to any of `ids`.
    async fn count_require(&self, dependent: &Dependent, ids: &[u32])
    -> Result<u64, DatabaseError>;
}

/// Deletes primary rows.
#[allow(async_fn_in_trait)]
pub trait Remover {
    /// Delete `ids` of `kind`, returning the number of rows removed.
    async fn remove(&self, kind: ResourceKind, ids: &[u32]) -> Result<u64, DatabaseError>;
}

/// Count every dependent of `kind` and fail on the first non-zero one.
///
/// All dependents are counted before deciding; the error names the first
/// offender in graph order.
///
/// # Errors
///
/// Returns `InventoryError::ResourceInUse` if any dependent still references
/// `ids`, or `StoreFailure` if counting fails.
pub async fn check_deletable<S: RequireCounter>(
    store: &S,
    graph: &DependencyGraph,
    kind: ResourceKind,
    ids: &[u32],
) -> Result<(), InventoryError> {
    let mut offenders = Vec::new();
    for dependent in graph.dependents_of(kind) {
        let count = store.count_require(dependent, ids).await?;
        if count > 0 {
            offenders.push((dependent, count));
        }
    }

    tracing::debug!(%kind, ?ids, offenders = offenders.len(), "deletion guard evaluated");

    match offenders.first() {
        Some((dependent, count)) => Err(InventoryError::ResourceInUse {
            kind,
            dependent: dependent.name(),
            count: *count,
        }),
        None => Ok(()),
    }
}

/// Delete `ids` of `kind` only if nothing references them.
///
/// Returns the number of rows removed.
///
/// # Errors
///
/// Returns `ResourceInUse` without issuing the delete if any dependent still
/// holds a reference, or `StoreFailure` if the store fails.
pub async fn delete_guarded<S: RequireCounter + Remover>(
    store: &S,
    graph: &DependencyGraph,
    kind: ResourceKind,
    ids: &[u32],
) -> Result<u64, InventoryError> {
    check_deletable(store, graph, kind, ids).await?;
    Ok(store.remove(kind, ids).await?)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    /// Store that reports fixed counts and records remove calls.
    #[derive(Default)]
    struct SpyStore {
        counts: HashMap<String, u64>,
        removed: RefCell<Vec<(ResourceKind, Vec<u32>)>>,
        counted: RefCell<Vec<String>>,
    }

    impl SpyStore {
        fn with_count(mut self, dependent: &str, count: u64) -> Self {
            self.counts.insert(dependent.to_string(), count);
            self
        }
    }

    impl RequireCounter for SpyStore {
        async fn count_require(
            &self,
            dependent: &Dependent,
            _ids: &[u32],
        ) -> Result<u64, DatabaseError> {
            self.counted.borrow_mut().push(dependent.name());
            Ok(self.counts.get(&dependent.name()).copied().unwrap_or(0))
        }
    }

    impl Remover for SpyStore {
        async fn remove(&self, kind: ResourceKind, ids: &[u32]) -> Result<u64, DatabaseError> {
            self.removed.borrow_mut().push((kind, ids.to_vec()));
            Ok(ids.len() as u64)
        }
    }

    #[test]
    fn default_topology() {
        let graph = DependencyGraph::default();
        let names: Vec<_> = graph
            .dependents_of(ResourceKind::Product)
            .iter()
            .map(Dependent::name)
            .collect();
        assert_eq!(names, vec![
            "hostgroups.product_id",
            "applications.product_id",
            "hostgroup_products"
        ]);
        assert_eq!(graph.dependents_of(ResourceKind::Team).len(), 4);
        assert!(graph.dependents_of(ResourceKind::Application).is_empty());
        assert_eq!(graph.required_by(ResourceKind::Team), vec![
            ResourceKind::Hostgroup,
            ResourceKind::Application,
            ResourceKind::User
        ]);
        assert_eq!(graph.required_by(ResourceKind::Feature), vec![
            ResourceKind::Hostgroup,
            ResourceKind::Application
        ]);
    }

    #[test]
    fn with_dependent_extends_existing_kind() {
        let graph = DependencyGraph::empty()
            .with_dependent(ResourceKind::Tag, Dependent::Association(AssociationKind::HostgroupTags))
            .with_dependent(ResourceKind::Tag, Dependent::Association(AssociationKind::ApplicationTags));
        assert_eq!(graph.dependents_of(ResourceKind::Tag).len(), 2);
    }

    #[tokio::test]
    async fn blocked_delete_is_never_issued() {
        let store = SpyStore::default().with_count("hostgroups.product_id", 1);
        let err = delete_guarded(&store, &DependencyGraph::default(), ResourceKind::Product, &[1])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            InventoryError::ResourceInUse { kind: ResourceKind::Product, ref dependent, count: 1 }
                if dependent == "hostgroups.product_id"
        ));
        assert!(store.removed.borrow().is_empty());
    }

    #[tokio::test]
    async fn counts_every_dependent_and_reports_first_offender() {
        let store = SpyStore::default()
            .with_count("applications.team_id", 2)
            .with_count("hostgroup_teams", 5);
        let err = delete_guarded(&store, &DependencyGraph::default(), ResourceKind::Team, &[3])
            .await
            .unwrap_err();

        assert!(err.to_string().contains("applications.team_id (2 reference(s))"));
        assert_eq!(store.counted.borrow().len(), 4);
    }

    #[tokio::test]
    async fn unreferenced_delete_goes_through() {
        let store = SpyStore::default();
        let removed = delete_guarded(&store, &DependencyGraph::default(), ResourceKind::Tag, &[4, 5])
            .await
            .unwrap();

        assert_eq!(removed, 2);
        assert_eq!(*store.removed.borrow(), vec![(ResourceKind::Tag, vec![4, 5])]);
    }
}
