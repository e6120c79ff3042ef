//! Catalog tables: `id, name, description` plus timestamps.

use inv_core::entities::{Datacenter, Environment, Feature, Product, Tag, Team};

use super::Record;
use crate::error::DatabaseError;
use crate::helpers::{get_id, get_opt_string, get_timestamps, opt_text_value};

macro_rules! catalog_record {
    ($($ty:ty),+ $(,)?) => {$(
        impl Record for $ty {
            const COLUMNS: &'static [&'static str] = &["name", "description"];

            fn bind(&self) -> Vec<libsql::Value> {
                vec![
                    libsql::Value::Text(self.name.clone()),
                    opt_text_value(self.description.as_deref()),
                ]
            }

            fn from_row(row: &libsql::Row) -> Result<Self, DatabaseError> {
                let (created_at, updated_at) = get_timestamps(row, 3)?;
                Ok(Self {
                    id: get_id(row, 0)?,
                    name: row.get::<String>(1)?,
                    description: get_opt_string(row, 2)?,
                    created_at,
                    updated_at,
                })
            }
        }
    )+};
}

catalog_record!(Product, Team, Environment, Datacenter, Feature, Tag);
