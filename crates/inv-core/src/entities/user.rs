use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::InventoryError;
use crate::kinds::ResourceKind;
use crate::resource::{ReferenceSet, Resource, validate_name};

/// A person who may own applications. Optionally a member of one team.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct User {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> u32 {
        self.id
    }

    fn set_id(&mut self, id: u32) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn check_fields(&self) -> Result<(), InventoryError> {
        validate_name(Self::KIND, &self.name)?;
        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
            _ => {
                return Err(InventoryError::invalid_field(
                    Self::KIND,
                    "email",
                    format!("'{email}' is not an email address"),
                ));
            }
        }
        if self.team_id == Some(0) {
            return Err(InventoryError::invalid_field(
                Self::KIND,
                "team_id",
                "must be non-zero when set",
            ));
        }
        Ok(())
    }

    fn collect_references(&self, refs: &mut ReferenceSet) {
        refs.add_optional(ResourceKind::Team, self.team_id);
    }
}
