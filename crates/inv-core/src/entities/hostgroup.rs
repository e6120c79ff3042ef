use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::InventoryError;
use crate::kinds::{AssociationKind, ResourceKind};
use crate::resource::{ReferenceSet, Resource, require_id, validate_name};

/// A group of hosts owned by one product and team, deployed to one cluster.
///
/// `shared_teams_id` and `shared_products_id` grant other teams and products
/// access to the hostgroup without transferring ownership.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Hostgroup {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub product_id: u32,
    pub team_id: u32,
    pub environment_id: u32,
    pub cluster_id: u32,
    #[serde(default)]
    pub tags_id: Vec<u32>,
    #[serde(default)]
    pub features_id: Vec<u32>,
    #[serde(default)]
    pub shared_teams_id: Vec<u32>,
    #[serde(default)]
    pub shared_products_id: Vec<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource for Hostgroup {
    const KIND: ResourceKind = ResourceKind::Hostgroup;

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
        require_id(Self::KIND, "environment_id", self.environment_id)?;
        require_id(Self::KIND, "cluster_id", self.cluster_id)
    }

    fn collect_references(&self, refs: &mut ReferenceSet) {
        refs.add(ResourceKind::Product, self.product_id);
        refs.add(ResourceKind::Team, self.team_id);
        refs.add(ResourceKind::Environment, self.environment_id);
        refs.add(ResourceKind::Cluster, self.cluster_id);
        refs.add_all(ResourceKind::Tag, &self.tags_id);
        refs.add_all(ResourceKind::Feature, &self.features_id);
        refs.add_all(ResourceKind::Team, &self.shared_teams_id);
        refs.add_all(ResourceKind::Product, &self.shared_products_id);
    }

    fn association(&self, kind: AssociationKind) -> &[u32] {
        match kind {
            AssociationKind::HostgroupTags => &self.tags_id,
            AssociationKind::HostgroupFeatures => &self.features_id,
            AssociationKind::HostgroupTeams => &self.shared_teams_id,
            AssociationKind::HostgroupProducts => &self.shared_products_id,
            _ => &[],
        }
    }

    fn set_association(&mut self, kind: AssociationKind, ids: Vec<u32>) {
        match kind {
            AssociationKind::HostgroupTags => self.tags_id = ids,
            AssociationKind::HostgroupFeatures => self.features_id = ids,
            AssociationKind::HostgroupTeams => self.shared_teams_id = ids,
            AssociationKind::HostgroupProducts => self.shared_products_id = ids,
            _ => {}
        }
    }
}
