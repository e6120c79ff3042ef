//! Plain catalog entities: named records with no outgoing references.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::kinds::ResourceKind;
use crate::resource::Resource;

macro_rules! catalog_entity {
    ($(#[$doc:meta])* $name:ident => $kind:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
        pub struct $name {
            #[serde(default)]
            pub id: u32,
            pub name: String,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub description: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub created_at: Option<DateTime<Utc>>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub updated_at: Option<DateTime<Utc>>,
        }

        impl $name {
            #[must_use]
            pub fn named(name: impl Into<String>) -> Self {
                Self {
                    name: name.into(),
                    ..Self::default()
                }
            }
        }

        impl Resource for $name {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> u32 {
                self.id
            }

            fn set_id(&mut self, id: u32) {
                self.id = id;
            }

            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

catalog_entity!(
    /// A product line; hostgroups and applications belong to exactly one.
    Product => ResourceKind::Product
);
catalog_entity!(
    /// An owning team.
    Team => ResourceKind::Team
);
catalog_entity!(
    /// A deployment environment (production, staging, ...).
    Environment => ResourceKind::Environment
);
catalog_entity!(
    /// A physical or cloud datacenter hosting clusters.
    Datacenter => ResourceKind::Datacenter
);
catalog_entity!(
    /// A capability a hostgroup provides and an application may require.
    Feature => ResourceKind::Feature
);
catalog_entity!(Tag => ResourceKind::Tag);
