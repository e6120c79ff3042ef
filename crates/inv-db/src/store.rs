//! libSQL implementation of the engine's store seams.
//!
//! [`SqlStore`] borrows a connection (or an open transaction, which derefs to
//! one) so every check and write of a unit of work goes through the same
//! transaction.

use std::collections::BTreeMap;

use inv_core::kinds::{AssociationKind, ResourceKind};

use crate::error::DatabaseError;
use crate::guard::{Dependent, Remover, RequireCounter};
use crate::helpers::{get_id, id_value};
use crate::matcher::HostgroupPool;
use crate::repos::{self, association};
use crate::sync::AssociationStore;
use crate::validate::ExistenceChecker;

#[derive(Clone, Copy)]
pub struct SqlStore<'c> {
    conn: &'c libsql::Connection,
}

impl<'c> SqlStore<'c> {
    #[must_use]
    pub const fn new(conn: &'c libsql::Connection) -> Self {
        Self { conn }
    }

    #[must_use]
    pub const fn conn(&self) -> &'c libsql::Connection {
        self.conn
    }
}

impl ExistenceChecker for SqlStore<'_> {
    async fn existing(
        &self,
        kind: ResourceKind,
        ids: &[u32],
    ) -> Result<Vec<u32>, DatabaseError> {
        repos::existing_ids(self.conn, kind, ids).await
    }
}

impl RequireCounter for SqlStore<'_> {
    async fn count_require(
        &self,
        dependent: &Dependent,
        ids: &[u32],
    ) -> Result<u64, DatabaseError> {
        match dependent {
            Dependent::Column { kind, column } => {
                repos::count_column_refs(self.conn, *kind, column, ids).await
            }
            Dependent::Association(assoc) => {
                association::count_referencing(self.conn, *assoc, ids).await
            }
        }
    }
}

impl Remover for SqlStore<'_> {
    async fn remove(&self, kind: ResourceKind, ids: &[u32]) -> Result<u64, DatabaseError> {
        repos::delete_ids(self.conn, kind, ids).await
    }
}

impl AssociationStore for SqlStore<'_> {
    async fn current(
        &self,
        assoc: AssociationKind,
        owner_id: u32,
    ) -> Result<Vec<u32>, DatabaseError> {
        association::load(self.conn, assoc, owner_id).await
    }

    async fn bind(
        &self,
        assoc: AssociationKind,
        owner_id: u32,
        ids: &[u32],
    ) -> Result<u64, DatabaseError> {
        association::insert(self.conn, assoc, owner_id, ids).await
    }

    async fn unbind(
        &self,
        assoc: AssociationKind,
        owner_id: u32,
        ids: &[u32],
    ) -> Result<u64, DatabaseError> {
        association::delete(self.conn, assoc, owner_id, ids).await
    }
}

/// `column = ?n` or shared with `?n` through `assoc`.
fn scope_condition(column: &str, assoc: AssociationKind, idx: usize) -> String {
    format!(
        "({column} = ?{idx} OR id IN (SELECT res_id FROM {} \
         WHERE res_type = '{}' AND associated_id = ?{idx}))",
        assoc.table(),
        assoc.owner().as_str()
    )
}

impl HostgroupPool for SqlStore<'_> {
    async fn candidates(
        &self,
        product_id: Option<u32>,
        team_id: Option<u32>,
    ) -> Result<Vec<u32>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params = Vec::new();
        if let Some(product_id) = product_id {
            params.push(id_value(product_id));
            conditions.push(scope_condition(
                "product_id",
                AssociationKind::HostgroupProducts,
                params.len(),
            ));
        }
        if let Some(team_id) = team_id {
            params.push(id_value(team_id));
            conditions.push(scope_condition(
                "team_id",
                AssociationKind::HostgroupTeams,
                params.len(),
            ));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!("SELECT id FROM hostgroups{where_clause} ORDER BY id");

        let mut rows = self
            .conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next().await? {
            ids.push(get_id(&row, 0)?);
        }
        Ok(ids)
    }

    async fn features_of(
        &self,
        hostgroups: &[u32],
    ) -> Result<BTreeMap<u32, Vec<u32>>, DatabaseError> {
        association::load_many(self.conn, AssociationKind::HostgroupFeatures, hostgroups).await
    }
}
