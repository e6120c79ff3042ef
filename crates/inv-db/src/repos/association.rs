//! Association table access.
//!
//! Every association table has the same `(res_type, res_id, associated_id)`
//! layout, so one set of functions serves all of them. `res_type` is always
//! the owner kind of the association.

use std::collections::BTreeMap;

use inv_core::kinds::AssociationKind;

use crate::error::DatabaseError;
use crate::helpers::{get_id, id_value, id_values, placeholders};

fn owner_type(assoc: AssociationKind) -> libsql::Value {
    libsql::Value::Text(assoc.owner().as_str().to_string())
}

/// Associated identifiers currently stored for one owner, ascending.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn load(
    conn: &libsql::Connection,
    assoc: AssociationKind,
    owner_id: u32,
) -> Result<Vec<u32>, DatabaseError> {
    let sql = format!(
        "SELECT associated_id FROM {} WHERE res_type = ?1 AND res_id = ?2 ORDER BY associated_id",
        assoc.table()
    );
    let mut rows = conn
        .query(&sql, [owner_type(assoc), id_value(owner_id)])
        .await?;
    let mut ids = Vec::new();
    while let Some(row) = rows.next().await? {
        ids.push(get_id(&row, 0)?);
    }
    Ok(ids)
}

/// Associated identifiers for many owners in one query, keyed by owner.
///
/// Owners with no rows are absent from the map.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn load_many(
    conn: &libsql::Connection,
    assoc: AssociationKind,
    owner_ids: &[u32],
) -> Result<BTreeMap<u32, Vec<u32>>, DatabaseError> {
    let mut by_owner: BTreeMap<u32, Vec<u32>> = BTreeMap::new();
    if owner_ids.is_empty() {
        return Ok(by_owner);
    }
    let sql = format!(
        "SELECT res_id, associated_id FROM {} WHERE res_type = ?1 AND res_id IN ({}) \
         ORDER BY res_id, associated_id",
        assoc.table(),
        placeholders(2, owner_ids.len())
    );
    let mut params = vec![owner_type(assoc)];
    params.extend(id_values(owner_ids));

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    while let Some(row) = rows.next().await? {
        by_owner
            .entry(get_id(&row, 0)?)
            .or_default()
            .push(get_id(&row, 1)?);
    }
    Ok(by_owner)
}

/// Owners whose association set contains any of `associated_ids`, ascending.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn owners_of(
    conn: &libsql::Connection,
    assoc: AssociationKind,
    associated_ids: &[u32],
) -> Result<Vec<u32>, DatabaseError> {
    if associated_ids.is_empty() {
        return Ok(Vec::new());
    }
    let sql = format!(
        "SELECT DISTINCT res_id FROM {} WHERE res_type = ?1 AND associated_id IN ({}) \
         ORDER BY res_id",
        assoc.table(),
        placeholders(2, associated_ids.len())
    );
    let mut params = vec![owner_type(assoc)];
    params.extend(id_values(associated_ids));

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let mut owners = Vec::new();
    while let Some(row) = rows.next().await? {
        owners.push(get_id(&row, 0)?);
    }
    Ok(owners)
}

/// Insert one row per identifier. Returns the number of rows written.
///
/// # Errors
///
/// Returns `DatabaseError` if the INSERT fails, including when a row already
/// exists (the UNIQUE constraint is not silently ignored).
pub async fn insert(
    conn: &libsql::Connection,
    assoc: AssociationKind,
    owner_id: u32,
    ids: &[u32],
) -> Result<u64, DatabaseError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let values = (0..ids.len())
        .map(|i| format!("(?1, ?2, ?{})", i + 3))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} (res_type, res_id, associated_id) VALUES {values}",
        assoc.table()
    );
    let mut params = vec![owner_type(assoc), id_value(owner_id)];
    params.extend(id_values(ids));

    Ok(conn.execute(&sql, libsql::params_from_iter(params)).await?)
}

/// Delete the rows for `ids` under one owner. Returns the number removed.
///
/// # Errors
///
/// Returns `DatabaseError` if the DELETE fails.
pub async fn delete(
    conn: &libsql::Connection,
    assoc: AssociationKind,
    owner_id: u32,
    ids: &[u32],
) -> Result<u64, DatabaseError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "DELETE FROM {} WHERE res_type = ?1 AND res_id = ?2 AND associated_id IN ({})",
        assoc.table(),
        placeholders(3, ids.len())
    );
    let mut params = vec![owner_type(assoc), id_value(owner_id)];
    params.extend(id_values(ids));

    Ok(conn.execute(&sql, libsql::params_from_iter(params)).await?)
}

/// Count rows whose `associated_id` is any of `ids`.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn count_referencing(
    conn: &libsql::Connection,
    assoc: AssociationKind,
    ids: &[u32],
) -> Result<u64, DatabaseError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "SELECT COUNT(*) FROM {} WHERE res_type = ?1 AND associated_id IN ({})",
        assoc.table(),
        placeholders(2, ids.len())
    );
    let mut params = vec![owner_type(assoc)];
    params.extend(id_values(ids));

    let mut rows = conn.query(&sql, libsql::params_from_iter(params)).await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    let count = row.get::<i64>(0)?;
    u64::try_from(count).map_err(|_| DatabaseError::InvalidState(format!("negative count {count}")))
}
