use inv_core::entities::Cluster;

use super::Record;
use crate::error::DatabaseError;
use crate::helpers::{get_id, get_opt_string, get_timestamps, id_value, opt_text_value};

impl Record for Cluster {
    const COLUMNS: &'static [&'static str] = &["name", "description", "datacenter_id"];

    fn bind(&self) -> Vec<libsql::Value> {
        vec![
            libsql::Value::Text(self.name.clone()),
            opt_text_value(self.description.as_deref()),
            id_value(self.datacenter_id),
        ]
    }

    fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
        let (created_at, updated_at) = get_timestamps(row, 4)?;
        Ok(Self {
            id: get_id(row, 0)?,
            name: row.get::<String>(1)?,
            description: get_opt_string(row, 2)?,
            datacenter_id: get_id(row, 3)?,
            created_at,
            updated_at,
        })
    }
}
