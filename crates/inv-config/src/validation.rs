//! Reference validation order.
//!
//! Foreign-key buckets are checked in this order so that a request missing
//! several references always reports the same one first.

use std::collections::HashSet;

use inv_core::kinds::ResourceKind;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_order() -> Vec<ResourceKind> {
    vec![
        ResourceKind::Product,
        ResourceKind::Team,
        ResourceKind::Environment,
        ResourceKind::Datacenter,
        ResourceKind::Cluster,
        ResourceKind::Feature,
        ResourceKind::Tag,
        ResourceKind::Hostgroup,
        ResourceKind::User,
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ValidationConfig {
    #[serde(default = "default_order")]
    pub order: Vec<ResourceKind>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            order: default_order(),
        }
    }
}

impl ValidationConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for kind in &self.order {
            if !seen.insert(kind) {
                return Err(ConfigError::InvalidValue {
                    field: "validation.order".into(),
                    reason: format!("'{kind}' listed more than once"),
                });
            }
        }
        Ok(())
    }
}
