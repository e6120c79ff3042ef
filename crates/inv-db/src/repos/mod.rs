//! Repository layer: SQL mapping for every entity plus the association tables.
//!
//! Each entity module implements [`Record`] for its `inv-core` struct. The
//! generic functions here build all CRUD SQL from a record's table and column
//! list, so per-entity modules only describe their columns and row layout.

pub mod application;
pub mod association;
pub mod catalog;
pub mod cluster;
pub mod hostgroup;
pub mod user;

use chrono::Utc;

use inv_core::errors::InventoryError;
use inv_core::filter::ListFilter;
use inv_core::kinds::{AssociationKind, ResourceKind};
use inv_core::resource::Resource;

use crate::error::DatabaseError;
use crate::helpers::{get_id, id_value, id_values, placeholders};
use crate::store::SqlStore;

/// SQL mapping for an entity stored in its own primary table.
#[allow(async_fn_in_trait)]
pub trait Record: Resource + Clone + Send + Sync + Sized {
    /// Writable columns after `id`, in bind order. Timestamps are excluded.
    const COLUMNS: &'static [&'static str];

    /// Column matched by `ListFilter::product_ids`, if any.
    const PRODUCT_COLUMN: Option<&'static str> = None;

    /// Column matched by `ListFilter::team_ids`, if any.
    const TEAM_COLUMN: Option<&'static str> = None;

    /// Values for `COLUMNS`, in the same order.
    fn bind(&self) -> Vec<libsql::Value>;

    /// Build from a row laid out as `id, COLUMNS..., created_at, updated_at`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a column is missing or has the wrong type.
    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError>;

    /// Cross-row constraints checked after reference validation.
    ///
    /// # Errors
    ///
    /// Returns the constraint violation as an `InventoryError`.
    async fn check_constraints(
        _batch: &[Self],
        _store: &SqlStore<'_>,
    ) -> Result<(), InventoryError> {
        Ok(())
    }
    /// Constraints held by other rows that an update of this batch may break.
    /// Runs after the batch's associations are synchronized.
    ///
    /// # Errors
    ///
    /// Returns the violation as an `InventoryError`.
    async fn recheck_dependents(
        _batch: &[Self],
        _store: &SqlStore<'_>,
    ) -> Result<(), InventoryError> {
        Ok(())
    }
}

fn select_clause<T: Record>() -> String {
    format!(
        "SELECT id, {}, created_at, updated_at FROM {}",
        T::COLUMNS.join(", "),
        T::KIND.table()
    )
}

/// Insert a new row and return its assigned identifier. `entity.id()` is ignored.
///
/// # Errors
///
/// Returns `DatabaseError` if the INSERT fails (including UNIQUE violations).
pub async fn insert<T: Record>(
    conn: &libsql::Connection,
    entity: &T,
) -> Result<u32, DatabaseError> {
    let now = Utc::now().to_rfc3339();
    let sql = format!(
        "INSERT INTO {} ({}, created_at, updated_at) VALUES ({}) RETURNING id",
        T::KIND.table(),
        T::COLUMNS.join(", "),
        placeholders(1, T::COLUMNS.len() + 2)
    );
    let mut params = entity.bind();
    params.push(libsql::Value::Text(now.clone()));
    params.push(libsql::Value::Text(now));

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    get_id(&row, 0)
}

/// Rewrite every writable column of an existing row.
///
/// Returns `false` when no row has `entity.id()`.
///
/// # Errors
///
/// Returns `DatabaseError` if the UPDATE fails.
pub async fn update<T: Record>(
    conn: &libsql::Connection,
    entity: &T,
) -> Result<bool, DatabaseError> {
    let count = T::COLUMNS.len();
    let sets = T::COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ?{}", i + 1))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE {} SET {sets}, updated_at = ?{} WHERE id = ?{}",
        T::KIND.table(),
        count + 1,
        count + 2
    );
    let mut params = entity.bind();
    params.push(libsql::Value::Text(Utc::now().to_rfc3339()));
    params.push(id_value(entity.id()));

    let affected = conn.execute(&sql, libsql::params_from_iter(params)).await?;
    Ok(affected > 0)
}

/// Fetch one row by identifier, with its association sets populated.
///
/// # Errors
///
/// Returns `DatabaseError` if the query or row parsing fails.
pub async fn fetch<T: Record>(
    conn: &libsql::Connection,
    id: u32,
) -> Result<Option<T>, DatabaseError> {
    let sql = format!("{} WHERE id = ?1", select_clause::<T>());
    let mut rows = conn.query(&sql, [id_value(id)]).await?;
    let Some(row) = rows.next().await? else {
        return Ok(None);
    };
    let mut items = vec![T::from_row(&row)?];
    hydrate(conn, &mut items).await?;
    Ok(items.pop())
}

/// One page of rows matching `filter`, ordered by identifier.
///
/// The filter must already have been validated for `T::KIND`.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails, or `InvalidState` if the filter
/// names a predicate `T` has no column for.
pub async fn list<T: Record>(
    conn: &libsql::Connection,
    filter: &ListFilter,
) -> Result<Vec<T>, DatabaseError> {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if !filter.ids.is_empty() {
        conditions.push(format!(
            "id IN ({})",
            placeholders(params.len() + 1, filter.ids.len())
        ));
        params.extend(id_values(&filter.ids));
    }
    if !filter.names.is_empty() {
        conditions.push(format!(
            "name IN ({})",
            placeholders(params.len() + 1, filter.names.len())
        ));
        params.extend(filter.names.iter().map(|n| libsql::Value::Text(n.clone())));
    }
    if !filter.product_ids.is_empty() {
        let column = T::PRODUCT_COLUMN.ok_or_else(|| {
            DatabaseError::InvalidState(format!("{} has no product column", T::KIND))
        })?;
        conditions.push(format!(
            "{column} IN ({})",
            placeholders(params.len() + 1, filter.product_ids.len())
        ));
        params.extend(id_values(&filter.product_ids));
    }
    if !filter.team_ids.is_empty() {
        let column = T::TEAM_COLUMN.ok_or_else(|| {
            DatabaseError::InvalidState(format!("{} has no team column", T::KIND))
        })?;
        conditions.push(format!(
            "{column} IN ({})",
            placeholders(params.len() + 1, filter.team_ids.len())
        ));
        params.extend(id_values(&filter.team_ids));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    let limit_idx = params.len() + 1;
    params.push(libsql::Value::Integer(i64::from(filter.page_size)));
    params.push(libsql::Value::Integer(
        i64::try_from(filter.offset()).unwrap_or(i64::MAX),
    ));

    let sql = format!(
        "{} {where_clause} ORDER BY id LIMIT ?{limit_idx} OFFSET ?{}",
        select_clause::<T>(),
        limit_idx + 1
    );
    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;

    let mut items = Vec::new();
    while let Some(row) = rows.next().await? {
        items.push(T::from_row(&row)?);
    }
    hydrate(conn, &mut items).await?;
    Ok(items)
}

/// Populate every association set owned by `T` for a slice of loaded rows.
///
/// # Errors
///
/// Returns `DatabaseError` if an association query fails.
pub async fn hydrate<T: Record>(
    conn: &libsql::Connection,
    items: &mut [T],
) -> Result<(), DatabaseError> {
    let owned = AssociationKind::owned_by(T::KIND);
    if owned.is_empty() || items.is_empty() {
        return Ok(());
    }
    let owner_ids: Vec<u32> = items.iter().map(Resource::id).collect();
    for assoc in owned {
        let mut by_owner = association::load_many(conn, *assoc, &owner_ids).await?;
        for item in items.iter_mut() {
            let ids = by_owner.remove(&item.id()).unwrap_or_default();
            item.set_association(*assoc, ids);
        }
    }
    Ok(())
}

/// Which of `ids` exist in `kind`'s primary table.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn existing_ids(
    conn: &libsql::Connection,
    kind: ResourceKind,
    ids: &[u32],
) -> Result<Vec<u32>, DatabaseError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT id FROM {} WHERE id IN ({}) ORDER BY id",
        kind.table(),
        placeholders(1, ids.len())
    );
    let mut rows = conn.query(&sql, libsql::params_from_iter(id_values(ids))).await?;
    let mut found = Vec::new();
    while let Some(row) = rows.next().await? {
        found.push(get_id(&row, 0)?);
    }
    Ok(found)
}

/// Count rows of `kind`'s primary table whose `column` holds any of `ids`.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn count_column_refs(
    conn: &libsql::Connection,
    kind: ResourceKind,
    column: &str,
    ids: &[u32],
) -> Result<u64, DatabaseError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE {column} IN ({})",
        kind.table(),
        placeholders(1, ids.len())
    );
    let mut rows = conn.query(&sql, libsql::params_from_iter(id_values(ids))).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let count = row.get::<i64>(0)?;
    u64::try_from(count).map_err(|_| DatabaseError::InvalidState(format!("negative count {count}")))
}

/// Delete primary rows by identifier. Returns the number of rows removed.
///
/// # Errors
///
/// Returns `DatabaseError` if the DELETE fails.
pub async fn delete_ids(
    conn: &libsql::Connection,
    kind: ResourceKind,
    ids: &[u32],
) -> Result<u64, DatabaseError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "DELETE FROM {} WHERE id IN ({})",
        kind.table(),
        placeholders(1, ids.len())
    );
    Ok(conn.execute(&sql, libsql::params_from_iter(id_values(ids))).await?)
}
