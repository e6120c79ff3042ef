use inv_core::entities::Hostgroup;
use inv_core::errors::InventoryError;
use inv_core::ids;
use inv_core::kinds::AssociationKind;

use super::{Record, application, association};
use crate::error::DatabaseError;
use crate::helpers::{get_id, get_opt_string, get_timestamps, id_value, opt_text_value};
use crate::store::SqlStore;

impl Record for Hostgroup {
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "description",
        "product_id",
        "team_id",
        "environment_id",
        "cluster_id",
    ];
    const PRODUCT_COLUMN: Option<&'static str> = Some("product_id");
    const TEAM_COLUMN: Option<&'static str> = Some("team_id");

    fn bind(&self) -> Vec<libsql::Value> {
        vec![
            libsql::Value::Text(self.name.clone()),
            opt_text_value(self.description.as_deref()),
            id_value(self.product_id),
            id_value(self.team_id),
            id_value(self.environment_id),
            id_value(self.cluster_id),
        ]
    }

    /// Association sets are left empty; `repos::hydrate` fills them.
    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let (created_at, updated_at) = get_timestamps(row, 7)?;
        Ok(Self {
            id: get_id(row, 0)?,
            name: row.get::<String>(1)?,
            description: get_opt_string(row, 2)?,
            product_id: get_id(row, 3)?,
            team_id: get_id(row, 4)?,
            environment_id: get_id(row, 5)?,
            cluster_id: get_id(row, 6)?,
            tags_id: Vec::new(),
            features_id: Vec::new(),
            shared_teams_id: Vec::new(),
            shared_products_id: Vec::new(),
            created_at,
            updated_at,
        })
    }

    /// Applications placed on an updated hostgroup must still find all of
    /// their features there.
    async fn recheck_dependents(
        batch: &[Self],
        store: &SqlStore<'_>,
    ) -> Result<(), InventoryError> {
        let updated: Vec<u32> = batch.iter().map(|hostgroup| hostgroup.id).collect();
        let conn = store.conn();
        let apps =
            association::owners_of(conn, AssociationKind::ApplicationHostgroups, &updated).await?;
        if apps.is_empty() {
            return Ok(());
        }
        let required =
            association::load_many(conn, AssociationKind::ApplicationFeatures, &apps).await?;
        let placed =
            association::load_many(conn, AssociationKind::ApplicationHostgroups, &apps).await?;

        for (app, features) in &required {
            let on = placed.get(app).map_or(&[][..], Vec::as_slice);
            let affected = ids::intersect(on, &updated);
            application::check_placement(store, &format!("#{app}"), features, &affected).await?;
        }
        Ok(())
    }
}
