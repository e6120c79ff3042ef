//! Transaction and authorization coordinator.
//!
//! `InventoryService` is the engine's entry point. Every mutation runs as one
//! [`UnitOfWork`]: a libSQL transaction that walks the phases
//!
//! 1. `Authorize`: ask the policy evaluator for write access
//! 2. `Validate`: field checks, reference validation and cross-row constraints
//! 3. `Mutate`: primary-table writes (deletes go through the guard)
//! 4. `Synchronize`: association deltas for every affected owner
//! 5. `Commit`
//!
//! Any error moves the unit to `Rollback`; the transaction is rolled back and
//! the error that caused it is returned unchanged.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use inv_config::InventoryConfig;
use inv_core::errors::InventoryError;
use inv_core::filter::{FilterLimits, ListFilter};
use inv_core::identity::{Caller, Intent};
use inv_core::ids;
use inv_core::kinds::{AssociationKind, ResourceKind};
use inv_core::resource::{ReferenceSet, Resource};

use crate::InventoryDb;
use crate::error::DatabaseError;
use crate::guard::{self, Dependent, DependencyGraph};
use crate::matcher;
use crate::policy::{self, AllowAll, PolicyEvaluator};
use crate::repos::{self, Record};
use crate::store::SqlStore;
use crate::sync;
use crate::validate::{self, ValidationOrder};

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where a unit of work currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    Authorize,
    Validate,
    Mutate,
    Synchronize,
    Commit,
    Rollback,
}

impl Phase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Authorize => "authorize",
            Self::Validate => "validate",
            Self::Mutate => "mutate",
            Self::Synchronize => "synchronize",
            Self::Commit => "commit",
            Self::Rollback => "rollback",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UnitOfWork
// ---------------------------------------------------------------------------

/// One mutation's transaction plus its phase.
///
/// Holds the service's write lock for its whole lifetime.
pub struct UnitOfWork<'a> {
    tx: libsql::Transaction,
    kind: ResourceKind,
    phase: Phase,
    _lock: MutexGuard<'a, ()>,
}

impl<'a> UnitOfWork<'a> {
    fn new(tx: libsql::Transaction, kind: ResourceKind, lock: MutexGuard<'a, ()>) -> Self {
        tracing::debug!(%kind, phase = %Phase::Start, "unit of work");
        Self {
            tx,
            kind,
            phase: Phase::Start,
            _lock: lock,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(kind = %self.kind, from = %self.phase, phase = %phase, "unit of work");
        self.phase = phase;
    }

    fn store(&self) -> SqlStore<'_> {
        SqlStore::new(&self.tx)
    }

    /// Commit on success, roll back on failure.
    async fn finish<T>(mut self, result: Result<T, InventoryError>) -> Result<T, InventoryError> {
        match result {
            Ok(value) => {
                self.enter(Phase::Commit);
                self.tx.commit().await.map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(err) => Err(self.rollback(err).await),
        }
    }

    async fn rollback(mut self, err: InventoryError) -> InventoryError {
        let failed_in = self.phase;
        self.enter(Phase::Rollback);
        if let Err(rollback_err) = self.tx.rollback().await {
            tracing::warn!(
                kind = %self.kind,
                %failed_in,
                error = %rollback_err,
                "rollback failed; returning the original error"
            );
        }
        err
    }
}

// ---------------------------------------------------------------------------
// InventoryService
// ---------------------------------------------------------------------------

/// Consistency-enforcing front end over the inventory store.
///
/// The libSQL connection is shared, so units of work and reads are
/// serialized through one async lock: a read never observes rows from a
/// transaction that has not committed.
pub struct InventoryService {
    db: InventoryDb,
    policy: Arc<dyn PolicyEvaluator>,
    graph: DependencyGraph,
    order: ValidationOrder,
    limits: FilterLimits,
    lock: Mutex<()>,
}

impl InventoryService {
    /// Open the configured database and build the service from configuration.
    ///
    /// # Errors
    ///
    /// Returns `StoreFailure` if the database cannot be opened or migrated.
    pub async fn open(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let db = InventoryDb::open_local(&config.database.path).await?;
        Ok(Self::from_db(db)
            .with_policy(Arc::from(policy::from_config(&config.policy)))
            .with_validation_order(ValidationOrder::from_config(&config.validation))
            .with_limits(config.pagination.limits()))
    }

    /// Wrap an open database with default settings and an allow-all policy.
    #[must_use]
    pub fn from_db(db: InventoryDb) -> Self {
        Self {
            db,
            policy: Arc::new(AllowAll),
            graph: DependencyGraph::default(),
            order: ValidationOrder::default(),
            limits: FilterLimits::default(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn PolicyEvaluator>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_validation_order(mut self, order: ValidationOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub const fn with_limits(mut self, limits: FilterLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &InventoryDb {
        &self.db
    }

    /// Dependents that must be empty before `kind` can be deleted.
    #[must_use]
    pub fn dependents(&self, kind: ResourceKind) -> &[Dependent] {
        self.graph.dependents_of(kind)
    }

    /// Ask the policy evaluator whether `caller` may act on `kind`.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` on refusal, or the evaluator's own error.
    pub fn authorize(
        &self,
        caller: &Caller,
        kind: ResourceKind,
        intent: Intent,
    ) -> Result<(), InventoryError> {
        if self.policy.authorize(caller, kind, intent)? {
            Ok(())
        } else {
            Err(InventoryError::PermissionDenied {
                subject: caller.subject.clone(),
                kind,
                intent,
            })
        }
    }

    async fn begin(&self, kind: ResourceKind) -> Result<UnitOfWork<'_>, InventoryError> {
        let lock = self.lock.lock().await;
        let tx = self.db.begin().await?;
        Ok(UnitOfWork::new(tx, kind, lock))
    }

    // -- mutations ----------------------------------------------------------

    /// Insert a batch, returning the assigned identifiers in input order.
    ///
    /// Incoming `id` fields are ignored.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, `InvalidField`, `MissingReference`,
    /// `FeatureUnsatisfiable` or `StoreFailure`. Nothing is persisted on error.
    pub async fn create<T: Record>(
        &self,
        caller: &Caller,
        batch: Vec<T>,
    ) -> Result<Vec<u32>, InventoryError> {
        let mut uow = self.begin(T::KIND).await?;
        let result = self.create_in(&mut uow, caller, batch).await;
        uow.finish(result).await
    }

    async fn create_in<T: Record>(
        &self,
        uow: &mut UnitOfWork<'_>,
        caller: &Caller,
        mut batch: Vec<T>,
    ) -> Result<Vec<u32>, InventoryError> {
        uow.enter(Phase::Authorize);
        self.authorize(caller, T::KIND, Intent::Write)?;

        uow.enter(Phase::Validate);
        self.validate_batch(uow, &batch).await?;

        uow.enter(Phase::Mutate);
        let store = uow.store();
        let mut assigned = Vec::with_capacity(batch.len());
        for entity in &mut batch {
            let id = repos::insert(store.conn(), &*entity).await?;
            entity.set_id(id);
            assigned.push(id);
        }

        uow.enter(Phase::Synchronize);
        let store = uow.store();
        for entity in &batch {
            sync_owned(&store, entity).await?;
        }
        Ok(assigned)
    }

    /// Rewrite a batch of existing rows and resynchronize their associations.
    ///
    /// # Errors
    ///
    /// As [`Self::create`], plus `NotFound` when an `id` has no row.
    pub async fn update<T: Record>(
        &self,
        caller: &Caller,
        batch: Vec<T>,
    ) -> Result<(), InventoryError> {
        let mut uow = self.begin(T::KIND).await?;
        let result = self.update_in(&mut uow, caller, &batch).await;
        uow.finish(result).await
    }

    async fn update_in<T: Record>(
        &self,
        uow: &mut UnitOfWork<'_>,
        caller: &Caller,
        batch: &[T],
    ) -> Result<(), InventoryError> {
        uow.enter(Phase::Authorize);
        self.authorize(caller, T::KIND, Intent::Write)?;

        uow.enter(Phase::Validate);
        for entity in batch {
            if entity.id() == 0 {
                return Err(InventoryError::invalid_field(T::KIND, "id", "must be non-zero"));
            }
        }
        self.validate_batch(uow, batch).await?;

        uow.enter(Phase::Mutate);
        let store = uow.store();
        for entity in batch {
            if !repos::update(store.conn(), entity).await? {
                return Err(InventoryError::NotFound {
                    kind: T::KIND,
                    id: entity.id(),
                });
            }
        }

        uow.enter(Phase::Synchronize);
        let store = uow.store();
        for entity in batch {
            sync_owned(&store, entity).await?;
        }
        T::recheck_dependents(batch, &store).await
    }

    /// Delete rows that nothing references, along with their own association rows.
    ///
    /// # Errors
    ///
    /// `PermissionDenied`, `NotFound`, `ResourceInUse` or `StoreFailure`.
    pub async fn delete<T: Record>(&self, caller: &Caller, ids: &[u32]) -> Result<(), InventoryError> {
        let mut uow = self.begin(T::KIND).await?;
        let result = self.delete_in::<T>(&mut uow, caller, ids).await;
        uow.finish(result).await
    }

    async fn delete_in<T: Record>(
        &self,
        uow: &mut UnitOfWork<'_>,
        caller: &Caller,
        ids: &[u32],
    ) -> Result<(), InventoryError> {
        uow.enter(Phase::Authorize);
        self.authorize(caller, T::KIND, Intent::Write)?;

        uow.enter(Phase::Validate);
        let ids = ids::dedup(ids);
        let store = uow.store();
        let found = repos::existing_ids(store.conn(), T::KIND, &ids).await?;
        if let Some(id) = ids::diff(&ids, &found).first() {
            return Err(InventoryError::NotFound { kind: T::KIND, id: *id });
        }

        uow.enter(Phase::Mutate);
        guard::delete_guarded(&uow.store(), &self.graph, T::KIND, &ids).await?;

        uow.enter(Phase::Synchronize);
        let store = uow.store();
        for id in &ids {
            for assoc in AssociationKind::owned_by(T::KIND) {
                sync::synchronize(&store, *assoc, *id, &[]).await?;
            }
        }
        Ok(())
    }

    async fn validate_batch<T: Record>(
        &self,
        uow: &UnitOfWork<'_>,
        batch: &[T],
    ) -> Result<(), InventoryError> {
        for entity in batch {
            entity.check_fields()?;
        }
        let store = uow.store();
        validate::validate_references(&store, &validate::collect(batch), &self.order).await?;
        T::check_constraints(batch, &store).await
    }

    // -- reads --------------------------------------------------------------

    /// # Errors
    ///
    /// `NotFound` when no row has `id`, or `StoreFailure`.
    pub async fn get<T: Record>(&self, id: u32) -> Result<T, InventoryError> {
        let _lock = self.lock.lock().await;
        repos::fetch(self.db.conn(), id)
            .await?
            .ok_or(InventoryError::NotFound { kind: T::KIND, id })
    }

    /// # Errors
    ///
    /// `FilterInvalid` before touching the store, or `StoreFailure`.
    pub async fn list<T: Record>(&self, filter: &ListFilter) -> Result<Vec<T>, InventoryError> {
        filter.validate(T::KIND, self.limits)?;
        let _lock = self.lock.lock().await;
        Ok(repos::list(self.db.conn(), filter).await?)
    }

    /// Hostgroups in scope whose features cover `features`, ascending.
    ///
    /// # Errors
    ///
    /// `MissingReference` for unknown feature ids, `FeatureUnsatisfiable`
    /// when nothing qualifies, or `StoreFailure`.
    pub async fn match_hostgroups(
        &self,
        features: &[u32],
        product_id: Option<u32>,
        team_id: Option<u32>,
    ) -> Result<Vec<u32>, InventoryError> {
        let _lock = self.lock.lock().await;
        let store = SqlStore::new(self.db.conn());

        let mut refs = ReferenceSet::new();
        refs.add_all(ResourceKind::Feature, features);
        validate::validate_references(&store, &refs, &self.order).await?;

        matcher::match_hostgroups(&store, features, product_id, team_id).await
    }
}

/// Synchronize every association set owned by `entity`.
async fn sync_owned<T: Resource>(store: &SqlStore<'_>, entity: &T) -> Result<(), InventoryError> {
    for assoc in AssociationKind::owned_by(T::KIND) {
        sync::synchronize(store, *assoc, entity.id(), entity.association(*assoc)).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::policy::StaticPolicy;
    use crate::test_support::helpers::{admin, seed_hostgroup, seed_named, test_service};
    use inv_config::GrantConfig;
    use inv_core::entities::{Application, Feature, Hostgroup, Product, Tag, Team, User};

    #[test]
    fn phase_names() {
        assert_eq!(Phase::Synchronize.to_string(), "synchronize");
        assert_eq!(Phase::Rollback.as_str(), "rollback");
    }

    #[tokio::test]
    async fn create_assigns_ids_in_input_order() {
        let svc = test_service().await;
        let mut first = Tag::named("first");
        first.id = 77;
        let ids = svc
            .create(&admin(), vec![first, Tag::named("second")])
            .await
            .unwrap();

        assert_eq!(ids.len(), 2);
        assert!(ids[0] < ids[1]);
        assert_eq!(svc.get::<Tag>(ids[1]).await.unwrap().name, "second");
        assert!(matches!(
            svc.get::<Tag>(77).await,
            Err(InventoryError::NotFound { kind: ResourceKind::Tag, id: 77 })
        ));
    }

    #[tokio::test]
    async fn invalid_field_stops_before_store() {
        let svc = test_service().await;
        let err = svc
            .create(&admin(), vec![Product::named("Bad Name")])
            .await
            .unwrap_err();
        assert!(matches!(err, InventoryError::InvalidField { ref field, .. } if field == "name"));
        assert!(svc.list::<Product>(&ListFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_reference_rolls_back_whole_batch() {
        let svc = test_service().await;
        let team = seed_named::<Team>(&svc, "sre").await;
        let ok = User {
            name: "ok".into(),
            email: "ok@example.com".into(),
            team_id: Some(team),
            ..User::default()
        };
        let dangling = User {
            name: "dangling".into(),
            email: "d@example.com".into(),
            team_id: Some(999),
            ..User::default()
        };

        let err = svc.create(&admin(), vec![ok, dangling]).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::MissingReference { kind: ResourceKind::Team, ref ids } if *ids == vec![999]
        ));
        assert!(svc.list::<User>(&ListFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn denied_caller_changes_nothing() {
        let policy = StaticPolicy::new(&[GrantConfig {
            subject: "role:admin".into(),
            kind: None,
            intent: None,
        }]);
        let svc = test_service().await.with_policy(Arc::new(policy));

        let err = svc
            .create(&Caller::new("mallory"), vec![Tag::named("x")])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            InventoryError::PermissionDenied { kind: ResourceKind::Tag, intent: Intent::Write, .. }
        ));
        assert!(svc.create(&admin(), vec![Tag::named("x")]).await.is_ok());
    }

    #[tokio::test]
    async fn update_resynchronizes_associations() {
        let svc = test_service().await;
        let hg = seed_hostgroup(&svc, "web", &[]).await;
        let t1 = seed_named::<Tag>(&svc, "t1").await;
        let t2 = seed_named::<Tag>(&svc, "t2").await;

        let mut stored: Hostgroup = svc.get(hg).await.unwrap();
        stored.tags_id = vec![t1, t2];
        svc.update(&admin(), vec![stored.clone()]).await.unwrap();
        assert_eq!(svc.get::<Hostgroup>(hg).await.unwrap().tags_id, vec![t1, t2]);

        stored.tags_id = vec![t2];
        stored.description = Some("trimmed".into());
        svc.update(&admin(), vec![stored]).await.unwrap();
        let after: Hostgroup = svc.get(hg).await.unwrap();
        assert_eq!(after.tags_id, vec![t2]);
        assert_eq!(after.description.as_deref(), Some("trimmed"));
    }

    #[tokio::test]
    async fn update_of_absent_row_is_not_found() {
        let svc = test_service().await;
        let mut ghost = Tag::named("ghost");
        ghost.id = 42;
        assert!(matches!(
            svc.update(&admin(), vec![ghost]).await,
            Err(InventoryError::NotFound { id: 42, .. })
        ));

        let unset = Tag::named("unset");
        assert!(matches!(
            svc.update(&admin(), vec![unset]).await,
            Err(InventoryError::InvalidField { ref field, .. }) if field == "id"
        ));
    }

    #[tokio::test]
    async fn delete_reports_absent_ids() {
        let svc = test_service().await;
        let tag = seed_named::<Tag>(&svc, "t").await;
        assert!(matches!(
            svc.delete::<Tag>(&admin(), &[tag, 500]).await,
            Err(InventoryError::NotFound { id: 500, .. })
        ));
        assert!(svc.get::<Tag>(tag).await.is_ok());
    }

    #[tokio::test]
    async fn deleting_owner_clears_its_association_rows() {
        let svc = test_service().await;
        let f = seed_named::<Feature>(&svc, "ssd").await;
        let hg = seed_hostgroup(&svc, "db", &[f]).await;

        svc.delete::<Hostgroup>(&admin(), &[hg]).await.unwrap();

        // The feature is no longer referenced and can go too.
        svc.delete::<Feature>(&admin(), &[f]).await.unwrap();
    }

    #[tokio::test]
    async fn application_hostgroups_must_cover_its_features() {
        let svc = test_service().await;
        let f1 = seed_named::<Feature>(&svc, "gpu").await;
        let f2 = seed_named::<Feature>(&svc, "ssd").await;
        let hg = seed_hostgroup(&svc, "compute", &[f1]).await;
        let product = seed_named::<Product>(&svc, "ml").await;
        let team = seed_named::<Team>(&svc, "ml-team").await;

        let app = Application {
            name: "trainer".into(),
            product_id: product,
            team_id: team,
            features_id: vec![f1, f2],
            hostgroups_id: vec![hg],
            ..Application::default()
        };
        let err = svc.create(&admin(), vec![app]).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::FeatureUnsatisfiable { ref missing } if *missing == vec![f2]
        ));
    }

    #[tokio::test]
    async fn hostgroup_update_keeps_placed_applications_satisfied() {
        let svc = test_service().await;
        let gpu = seed_named::<Feature>(&svc, "gpu").await;
        let ssd = seed_named::<Feature>(&svc, "ssd").await;
        let nvme = seed_named::<Feature>(&svc, "nvme").await;
        let hg = seed_hostgroup(&svc, "compute", &[gpu, ssd]).await;
        let product = seed_named::<Product>(&svc, "ml").await;
        let team = seed_named::<Team>(&svc, "ml-team").await;

        let app = Application {
            name: "trainer".into(),
            product_id: product,
            team_id: team,
            features_id: vec![gpu],
            hostgroups_id: vec![hg],
            ..Application::default()
        };
        svc.create(&admin(), vec![app]).await.unwrap();

        // Dropping a feature nobody needs is fine.
        let mut hostgroup: Hostgroup = svc.get(hg).await.unwrap();
        hostgroup.features_id = vec![gpu, nvme];
        svc.update(&admin(), vec![hostgroup.clone()]).await.unwrap();

        hostgroup.features_id = vec![nvme];
        let err = svc.update(&admin(), vec![hostgroup]).await.unwrap_err();
        assert!(matches!(
            err,
            InventoryError::FeatureUnsatisfiable { ref missing } if *missing == vec![gpu]
        ));
        let stored: Hostgroup = svc.get(hg).await.unwrap();
        assert_eq!(stored.features_id, vec![gpu, nvme]);
    }

    #[tokio::test]
    async fn list_rejects_bad_filter() {
        let svc = test_service().await;
        let filter = ListFilter {
            product_ids: vec![1],
            ..ListFilter::default()
        };
        assert!(matches!(
            svc.list::<Tag>(&filter).await,
            Err(InventoryError::FilterInvalid(_))
        ));
    }

    #[tokio::test]
    async fn match_validates_feature_ids() {
        let svc = test_service().await;
        assert!(matches!(
            svc.match_hostgroups(&[3], None, None).await,
            Err(InventoryError::MissingReference { kind: ResourceKind::Feature, .. })
        ));
    }

    #[tokio::test]
    async fn dependents_follow_graph() {
        let svc = test_service().await;
        assert_eq!(svc.dependents(ResourceKind::Environment).len(), 1);
        assert!(svc.dependents(ResourceKind::Application).is_empty());
    }
}
