use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::InventoryError;
use crate::kinds::ResourceKind;
use crate::resource::{ReferenceSet, Resource, require_id, validate_name};

/// A compute cluster living in one datacenter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Cluster {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub datacenter_id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Cluster {
    const KIND: ResourceKind = ResourceKind::Cluster;

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
        require_id(Self::KIND, "datacenter_id", self.datacenter_id)
    }

    fn collect_references(&self, refs: &mut ReferenceSet) {
        refs.add(ResourceKind::Datacenter, self.datacenter_id);
    }
}
