//! Static authorization grants.

use inv_core::identity::Intent;
use inv_core::kinds::ResourceKind;
use serde::{Deserialize, Serialize};

/// One grant. `None` on `kind` or `intent` means "any".
///
/// `subject` is a caller subject, `role:<name>` for a role, or `*`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GrantConfig {
    pub subject: String,
    #[serde(default)]
    pub kind: Option<ResourceKind>,
    #[serde(default)]
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicyConfig {
    /// When false every caller may do everything.
    #[serde(default)]
    pub enforce: bool,

    #[serde(default)]
    pub grants: Vec<GrantConfig>,
}
