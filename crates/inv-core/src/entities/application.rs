use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::InventoryError;
use crate::kinds::{AssociationKind, ResourceKind};
use crate::resource::{ReferenceSet, Resource, require_id, validate_name};

/// A deployable application.
///
/// `features_id` is the application's requirement set: every hostgroup in
/// `hostgroups_id` must provide all of those features.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Application {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub product_id: u32,
    pub team_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<u32>,
    #[serde(default)]
    pub tags_id: Vec<u32>,
    #[serde(default)]
    pub features_id: Vec<u32>,
    #[serde(default)]
    pub hostgroups_id: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Application {
    const KIND: ResourceKind = ResourceKind::Application;

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
        require_id(Self::KIND, "product_id", self.product_id)?;
        require_id(Self::KIND, "team_id", self.team_id)?;
        if self.owner_id == Some(0) {
            return Err(InventoryError::invalid_field(
                Self::KIND,
                "owner_id",
                "must be non-zero when set",
            ));
        }
        Ok(())
    }

    fn collect_references(&self, refs: &mut ReferenceSet) {
        refs.add(ResourceKind::Product, self.product_id);
        refs.add(ResourceKind::Team, self.team_id);
        refs.add_optional(ResourceKind::User, self.owner_id);
        refs.add_all(ResourceKind::Tag, &self.tags_id);
        refs.add_all(ResourceKind::Feature, &self.features_id);
        refs.add_all(ResourceKind::Hostgroup, &self.hostgroups_id);
    }

    fn association(&self, kind: AssociationKind) -> &[u32] {
        match kind {
            AssociationKind::ApplicationTags => &self.tags_id,
            AssociationKind::ApplicationFeatures => &self.features_id,
            AssociationKind::ApplicationHostgroups => &self.hostgroups_id,
            _ => &[],
        }
    }

    fn set_association(&mut self, kind: AssociationKind, ids: Vec<u32>) {
        match kind {
            AssociationKind::ApplicationTags => self.tags_id = ids,
            AssociationKind::ApplicationFeatures => self.features_id = ids,
            AssociationKind::ApplicationHostgroups => self.hostgroups_id = ids,
            _ => {}
        }
    }
}
