//! Resource kinds and association kinds.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for SQL storage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::InventoryError;

// ---------------------------------------------------------------------------
// ResourceKind
// ---------------------------------------------------------------------------

/// Every kind of primary entity tracked by the inventory.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Product,
    Team,
    Environment,
    Datacenter,
    Cluster,
    Feature,
    Tag,
    Hostgroup,
    Application,
    User,
}

impl ResourceKind {
    pub const ALL: [Self; 10] = [
        Self::Product,
        Self::Team,
        Self::Environment,
        Self::Datacenter,
        Self::Cluster,
        Self::Feature,
        Self::Tag,
        Self::Hostgroup,
        Self::Application,
        Self::User,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Team => "team",
            Self::Environment => "environment",
            Self::Datacenter => "datacenter",
            Self::Cluster => "cluster",
            Self::Feature => "feature",
            Self::Tag => "tag",
            Self::Hostgroup => "hostgroup",
            Self::Application => "application",
            Self::User => "user",
        }
    }

    /// Primary table backing this kind.
    ///
    /// Exhaustive match: a new kind must be added here.
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Product => "products",
            Self::Team => "teams",
            Self::Environment => "environments",
            Self::Datacenter => "datacenters",
            Self::Cluster => "clusters",
            Self::Feature => "features",
            Self::Tag => "tags",
            Self::Hostgroup => "hostgroups",
            Self::Application => "applications",
            Self::User => "users",
        }
    }

    /// Whether list filters may carry `product_ids` for this kind.
    #[must_use]
    pub const fn has_product_column(self) -> bool {
        matches!(self, Self::Hostgroup | Self::Application)
    }

    /// Whether list filters may carry `team_ids` for this kind.
    #[must_use]
    pub const fn has_team_column(self) -> bool {
        matches!(self, Self::Hostgroup | Self::Application | Self::User)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.table() == s)
            .ok_or_else(|| InventoryError::InvalidField {
                kind: None,
                field: "kind".to_string(),
                reason: format!("unknown resource kind '{s}'"),
            })
    }
}

// ---------------------------------------------------------------------------
// AssociationKind
// ---------------------------------------------------------------------------

/// One many-to-many edge type between an owning entity and a shared entity.
///
/// Each variant is backed by its own association table whose rows have the
/// shape `(res_type, res_id, associated_id)`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AssociationKind {
    ApplicationTags,
    ApplicationFeatures,
    ApplicationHostgroups,
    HostgroupTags,
    HostgroupFeatures,
    HostgroupTeams,
    HostgroupProducts,
}

impl AssociationKind {
    pub const ALL: [Self; 7] = [
        Self::ApplicationTags,
        Self::ApplicationFeatures,
        Self::ApplicationHostgroups,
        Self::HostgroupTags,
        Self::HostgroupFeatures,
        Self::HostgroupTeams,
        Self::HostgroupProducts,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApplicationTags => "application_tags",
            Self::ApplicationFeatures => "application_features",
            Self::ApplicationHostgroups => "application_hostgroups",
            Self::HostgroupTags => "hostgroup_tags",
            Self::HostgroupFeatures => "hostgroup_features",
            Self::HostgroupTeams => "hostgroup_teams",
            Self::HostgroupProducts => "hostgroup_products",
        }
    }

    /// The association table name. Identical to `as_str()`.
    #[must_use]
    pub const fn table(self) -> &'static str {
        self.as_str()
    }

    /// Kind of the entity holding the association.
    #[must_use]
    pub const fn owner(self) -> ResourceKind {
        match self {
            Self::ApplicationTags | Self::ApplicationFeatures | Self::ApplicationHostgroups => {
                ResourceKind::Application
            }
            Self::HostgroupTags
            | Self::HostgroupFeatures
            | Self::HostgroupTeams
            | Self::HostgroupProducts => ResourceKind::Hostgroup,
        }
    }

    /// All association kinds owned by `owner`, in a fixed order.
    #[must_use]
    pub const fn owned_by(owner: ResourceKind) -> &'static [Self] {
        match owner {
            ResourceKind::Application => &[
                Self::ApplicationTags,
                Self::ApplicationFeatures,
                Self::ApplicationHostgroups,
            ],
            ResourceKind::Hostgroup => &[
                Self::HostgroupTags,
                Self::HostgroupFeatures,
                Self::HostgroupTeams,
                Self::HostgroupProducts,
            ],
            _ => &[],
        }
    }
}

impl fmt::Display for AssociationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_from_name_and_table() {
        assert_eq!("hostgroup".parse::<ResourceKind>().unwrap(), ResourceKind::Hostgroup);
        assert_eq!("hostgroups".parse::<ResourceKind>().unwrap(), ResourceKind::Hostgroup);
        assert!("widget".parse::<ResourceKind>().is_err());
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&ResourceKind::Datacenter).unwrap();
        assert_eq!(json, "\"datacenter\"");
    }

    #[test]
    fn associations_agree_with_owner() {
        for assoc in AssociationKind::ALL {
            assert!(
                AssociationKind::owned_by(assoc.owner()).contains(&assoc),
                "{assoc} missing from owned_by({})",
                assoc.owner()
            );
        }
        assert!(AssociationKind::owned_by(ResourceKind::Tag).is_empty());
    }
}
