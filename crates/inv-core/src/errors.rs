//! Error taxonomy for the inventory engine.
//!
//! Every failure path of the engine returns one of these variants. Store-level
//! errors (`DatabaseError` in `inv-db`) collapse into `StoreFailure` at the
//! engine boundary with their message preserved.

use thiserror::Error;

use crate::identity::Intent;
use crate::kinds::ResourceKind;

/// Errors surfaced to request handlers.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// A required field is empty or zero, or fails its format pattern.
    #[error("Invalid field '{field}'{}: {reason}", .kind.map(|k| format!(" on {k}")).unwrap_or_default())]
    InvalidField {
        kind: Option<ResourceKind>,
        field: String,
        reason: String,
    },

    /// One or more foreign identifiers do not exist in their target table.
    #[error("Missing {kind} reference(s): {ids:?}")]
    MissingReference { kind: ResourceKind, ids: Vec<u32> },

    /// Pagination bounds or filter cardinality violated.
    #[error("Invalid filter: {0}")]
    FilterInvalid(String),

    /// The authorization gate rejected the request.
    #[error("Permission denied: '{subject}' may not {intent} {kind}")]
    PermissionDenied {
        subject: String,
        kind: ResourceKind,
        intent: Intent,
    },

    /// Deletion blocked because a dependent still references the target.
    #[error("{kind} is still in use by {dependent} ({count} reference(s))")]
    ResourceInUse {
        kind: ResourceKind,
        dependent: String,
        count: u64,
    },

    /// Required features are not covered by the hostgroups on offer.
    #[error("Required features not satisfied by any candidate hostgroup (missing: {missing:?})")]
    FeatureUnsatisfiable { missing: Vec<u32> },

    /// Primary row lookup returned nothing.
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: u32 },

    /// The underlying store failed.
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl InventoryError {
    /// Shorthand for an `InvalidField` tied to a resource kind.
    #[must_use]
    pub fn invalid_field(kind: ResourceKind, field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            kind: Some(kind),
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
