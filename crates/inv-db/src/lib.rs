//! # inv-db
//!
//! libSQL-backed consistency and association-synchronization engine.
//!
//! The schema declares no cross-entity foreign keys; this crate enforces them:
//! - [`validate`] checks that every referenced identifier exists before a write
//! - [`guard`] blocks deletion of anything still referenced elsewhere
//! - [`sync`] reconciles association sets by applying add/remove deltas
//! - [`matcher`] selects hostgroups carrying every required feature
//! - [`service`] wraps each mutation in one transaction behind a policy gate

pub mod error;
pub mod guard;
pub mod helpers;
pub mod matcher;
mod migrations;
pub mod policy;
pub mod repos;
pub mod service;
pub mod store;
pub mod sync;
pub mod validate;

mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle for all inventory state.
///
/// Wraps a libSQL database and a single connection. Mutations open a
/// transaction on this connection; `InventoryService` serializes them.
pub struct InventoryDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl InventoryDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let inventory_db = Self { db, conn };
        inventory_db.run_migrations().await?;
        Ok(inventory_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Begin a deferred transaction on the shared connection.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if `BEGIN` fails (e.g. a transaction is already open).
    pub async fn begin(&self) -> Result<libsql::Transaction, DatabaseError> {
        Ok(self.conn.transaction().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> InventoryDb {
        InventoryDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "products",
            "teams",
            "environments",
            "datacenters",
            "clusters",
            "features",
            "tags",
            "hostgroups",
            "applications",
            "users",
            "application_tags",
            "application_features",
            "application_hostgroups",
            "hostgroup_tags",
            "hostgroup_features",
            "hostgroup_teams",
            "hostgroup_products",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn association_unique_constraint() {
        let db = test_db().await;

        db.conn()
            .execute(
                "INSERT INTO application_tags (res_type, res_id, associated_id) VALUES ('application', 1, 1)",
                (),
            )
            .await
            .unwrap();

        let result = db
            .conn()
            .execute(
                "INSERT INTO application_tags (res_type, res_id, associated_id) VALUES ('application', 1, 1)",
                (),
            )
            .await;
        assert!(result.is_err(), "duplicate association row should be rejected");
    }

    #[tokio::test]
    async fn no_foreign_keys_declared() {
        let db = test_db().await;

        // A dangling reference is accepted by the store itself.
        db.conn()
            .execute(
                "INSERT INTO clusters (name, datacenter_id) VALUES ('orphan', 999)",
                (),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rolled_back_transaction_discards_writes() {
        let db = test_db().await;

        let tx = db.begin().await.unwrap();
        tx.execute("INSERT INTO tags (name) VALUES ('gone')", ())
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let mut rows = db
            .conn()
            .query("SELECT COUNT(*) FROM tags", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 0);
    }
}
