use inv_core::entities::Application;
use inv_core::errors::InventoryError;
use inv_core::ids;

use super::Record;
use crate::error::DatabaseError;
use crate::helpers::{get_id, get_opt_id, get_opt_string, get_timestamps, id_value, opt_id_value, opt_text_value};
use crate::matcher::HostgroupPool;
use crate::store::SqlStore;

impl Record for Application {
    const COLUMNS: &'static [&'static str] =
        &["name", "description", "product_id", "team_id", "owner_id"];
    const PRODUCT_COLUMN: Option<&'static str> = Some("product_id");
    const TEAM_COLUMN: Option<&'static str> = Some("team_id");

    fn bind(&self) -> Vec<libsql::Value> {
        vec![
            libsql::Value::Text(self.name.clone()),
            opt_text_value(self.description.as_deref()),
            id_value(self.product_id),
            id_value(self.team_id),
            opt_id_value(self.owner_id),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let (created_at, updated_at) = get_timestamps(row, 6)?;
        Ok(Self {
            id: get_id(row, 0)?,
            name: row.get::<String>(1)?,
            description: get_opt_string(row, 2)?,
            product_id: get_id(row, 3)?,
            team_id: get_id(row, 4)?,
            owner_id: get_opt_id(row, 5)?,
            tags_id: Vec::new(),
            features_id: Vec::new(),
            hostgroups_id: Vec::new(),
            created_at,
            updated_at,
        })
    }

    /// Every hostgroup an application is placed on must provide all of the
    /// application's required features.
    async fn check_constraints(
        batch: &[Self],
        store: &SqlStore<'_>,
    ) -> Result<(), InventoryError> {
        for app in batch {
            check_placement(store, &app.name, &app.features_id, &app.hostgroups_id).await?;
        }
        Ok(())
    }
}

/// Fail with `FeatureUnsatisfiable` if any of `hostgroups` lacks one of `features`.
pub(crate) async fn check_placement(
    store: &SqlStore<'_>,
    application: &str,
    features: &[u32],
    hostgroups: &[u32],
) -> Result<(), InventoryError> {
    if hostgroups.is_empty() || features.is_empty() {
        return Ok(());
    }
    let hostgroups = ids::dedup(hostgroups);
    let provided = store.features_of(&hostgroups).await?;
    for hostgroup in hostgroups {
        let offered = provided.get(&hostgroup).map_or(&[][..], Vec::as_slice);
        let missing = ids::diff(features, offered);
        if !missing.is_empty() {
            tracing::debug!(application, hostgroup, ?missing, "hostgroup lacks required features");
            return Err(InventoryError::FeatureUnsatisfiable { missing });
        }
    }
    Ok(())
}
