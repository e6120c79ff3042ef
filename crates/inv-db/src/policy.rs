//! Authorization gate.
//!
//! The coordinator asks a [`PolicyEvaluator`] before every mutation. A
//! denial and an evaluator failure are distinct: `Ok(false)` becomes
//! `PermissionDenied`, while `Err` is returned as-is.

use inv_config::{GrantConfig, PolicyConfig};
use inv_core::errors::InventoryError;
use inv_core::identity::{Caller, Intent};
use inv_core::kinds::ResourceKind;

/// Decides whether a caller may act on a resource kind.
pub trait PolicyEvaluator: Send + Sync {
    /// # Errors
    ///
    /// Returns an error when the decision itself cannot be made.
    fn authorize(
        &self,
        caller: &Caller,
        kind: ResourceKind,
        intent: Intent,
    ) -> Result<bool, InventoryError>;
}

/// Permits everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl PolicyEvaluator for AllowAll {
    fn authorize(&self, _: &Caller, _: ResourceKind, _: Intent) -> Result<bool, InventoryError> {
        Ok(true)
    }
}

/// How a grant selects callers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Principal {
    Anyone,
    Subject(String),
    Role(String),
}

impl Principal {
    fn parse(raw: &str) -> Self {
        if raw == "*" {
            Self::Anyone
        } else if let Some(role) = raw.strip_prefix("role:") {
            Self::Role(role.to_string())
        } else {
            Self::Subject(raw.to_string())
        }
    }

    fn admits(&self, caller: &Caller) -> bool {
        match self {
            Self::Anyone => true,
            Self::Subject(subject) => caller.subject == *subject,
            Self::Role(role) => caller.roles.iter().any(|r| r == role),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Grant {
    principal: Principal,
    kind: Option<ResourceKind>,
    intent: Option<Intent>,
}

impl From<&GrantConfig> for Grant {
    fn from(config: &GrantConfig) -> Self {
        Self {
            principal: Principal::parse(&config.subject),
            kind: config.kind,
            intent: config.intent,
        }
    }
}

impl Grant {
    fn allows(&self, caller: &Caller, kind: ResourceKind, intent: Intent) -> bool {
        self.principal.admits(caller)
            && self.kind.is_none_or(|k| k == kind)
            && self.intent.is_none_or(|i| i == intent)
    }
}

/// Allow-list built from configured grants. Anything not granted is denied.
#[derive(Debug, Clone, Default)]
pub struct StaticPolicy {
    grants: Vec<Grant>,
}

impl StaticPolicy {
    #[must_use]
    pub fn new(grants: &[GrantConfig]) -> Self {
        Self {
            grants: grants.iter().map(Grant::from).collect(),
        }
    }
}

impl PolicyEvaluator for StaticPolicy {
    fn authorize(
        &self,
        caller: &Caller,
        kind: ResourceKind,
        intent: Intent,
    ) -> Result<bool, InventoryError> {
        let allowed = self.grants.iter().any(|g| g.allows(caller, kind, intent));
        if !allowed {
            tracing::debug!(subject = %caller.subject, %kind, %intent, "no grant matched");
        }
        Ok(allowed)
    }
}

/// Build the evaluator described by `config`.
#[must_use]
pub fn from_config(config: &PolicyConfig) -> Box<dyn PolicyEvaluator> {
    if config.enforce {
        Box::new(StaticPolicy::new(&config.grants))
    } else {
        Box::new(AllowAll)
    }
}
