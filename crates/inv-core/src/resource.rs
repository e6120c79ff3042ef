//! The `Resource` trait and the foreign-reference collector.
//!
//! Every entity struct implements `Resource`. The engine never inspects entity
//! fields directly: it asks the entity for its own field checks, for the
//! foreign identifiers it carries, and for its desired association sets.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::InventoryError;
use crate::ids;
use crate::kinds::{AssociationKind, ResourceKind};

/// Lowercase alphanumeric words joined by single hyphens.
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("name pattern compiles"));

/// Upper bound on name length, matching the `name` column width.
pub const MAX_NAME_LEN: usize = 63;

/// Check a resource name against the naming pattern.
///
/// # Errors
///
/// Returns `InventoryError::InvalidField` if the name is empty, too long, or
/// not lowercase-alphanumeric-with-internal-hyphens.
pub fn validate_name(kind: ResourceKind, name: &str) -> Result<(), InventoryError> {
    if name.is_empty() {
        return Err(InventoryError::invalid_field(kind, "name", "must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(InventoryError::invalid_field(
            kind,
            "name",
            format!("'{name}' exceeds {MAX_NAME_LEN} characters"),
        ));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(InventoryError::invalid_field(
            kind,
            "name",
            format!("'{name}' must be lowercase alphanumeric with internal hyphens"),
        ));
    }
    Ok(())
}

/// Check that a required single-valued reference is non-zero.
///
/// # Errors
///
/// Returns `InventoryError::InvalidField` if `id` is zero.
pub fn require_id(kind: ResourceKind, field: &str, id: u32) -> Result<(), InventoryError> {
    if id == 0 {
        return Err(InventoryError::invalid_field(kind, field, "must be non-zero"));
    }
    Ok(())
}

/// Foreign identifiers gathered from a batch, one bucket per target kind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReferenceSet {
    buckets: BTreeMap<ResourceKind, Vec<u32>>,
}

impl ReferenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a single-valued reference.
    pub fn add(&mut self, kind: ResourceKind, id: u32) {
        self.buckets.entry(kind).or_default().push(id);
    }

    /// Record an optional single-valued reference. `None` records nothing.
    pub fn add_optional(&mut self, kind: ResourceKind, id: Option<u32>) {
        if let Some(id) = id {
            self.add(kind, id);
        }
    }

    /// Record every identifier of a set-valued reference.
    pub fn add_all(&mut self, kind: ResourceKind, ids: &[u32]) {
        if ids.is_empty() {
            return;
        }
        self.buckets.entry(kind).or_default().extend_from_slice(ids);
    }

    /// Deduplicated identifiers referenced for `kind`.
    #[must_use]
    pub fn bucket(&self, kind: ResourceKind) -> Vec<u32> {
        self.buckets
            .get(&kind)
            .map(|ids| ids::dedup(ids))
            .unwrap_or_default()
    }

    /// Kinds with at least one referenced identifier.
    pub fn kinds(&self) -> impl Iterator<Item = ResourceKind> + '_ {
        self.buckets
            .iter()
            .filter(|(_, ids)| !ids.is_empty())
            .map(|(kind, _)| *kind)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.values().all(Vec::is_empty)
    }
}

/// Behaviour shared by every inventory entity.
pub trait Resource {
    const KIND: ResourceKind;

    fn id(&self) -> u32;

    fn set_id(&mut self, id: u32);

    fn name(&self) -> &str;

    /// Field-level checks run before any store access.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::InvalidField` on the first failing field.
    fn check_fields(&self) -> Result<(), InventoryError> {
        validate_name(Self::KIND, self.name())
    }

    /// Report every foreign identifier this entity carries.
    fn collect_references(&self, _refs: &mut ReferenceSet) {}

    /// Desired identifier set for one of this entity's association kinds.
    fn association(&self, _kind: AssociationKind) -> &[u32] {
        &[]
    }

    /// Replace the in-memory association set (used when hydrating from the store).
    fn set_association(&mut self, _kind: AssociationKind, _ids: Vec<u32>) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("web")]
    #[case("web-frontend")]
    #[case("dc1-rack-42")]
    #[case("a")]
    fn accepts_valid_names(#[case] name: &str) {
        assert!(validate_name(ResourceKind::Product, name).is_ok());
    }

    #[rstest]
    #[case("")]
    #[case("Web")]
    #[case("-web")]
    #[case("web-")]
    #[case("web--api")]
    #[case("web_api")]
    #[case("web api")]
    fn rejects_invalid_names(#[case] name: &str) {
        let err = validate_name(ResourceKind::Product, name).unwrap_err();
        assert!(matches!(err, InventoryError::InvalidField { ref field, .. } if field == "name"));
    }

    #[test]
    fn rejects_overlong_name() {
        let name = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(ResourceKind::Tag, &name).is_err());
    }

    #[test]
    fn reference_set_dedups_per_bucket() {
        let mut refs = ReferenceSet::new();
        refs.add(ResourceKind::Product, 1);
        refs.add(ResourceKind::Product, 1);
        refs.add_all(ResourceKind::Tag, &[3, 2, 3]);
        refs.add_optional(ResourceKind::User, None);
        refs.add_all(ResourceKind::Feature, &[]);

        assert_eq!(refs.bucket(ResourceKind::Product), vec![1]);
        assert_eq!(refs.bucket(ResourceKind::Tag), vec![2, 3]);
        assert!(refs.bucket(ResourceKind::User).is_empty());
        assert_eq!(
            refs.kinds().collect::<Vec<_>>(),
            vec![ResourceKind::Product, ResourceKind::Tag]
        );
    }

    #[test]
    fn require_id_rejects_zero() {
        assert!(require_id(ResourceKind::Hostgroup, "cluster_id", 0).is_err());
        assert!(require_id(ResourceKind::Hostgroup, "cluster_id", 3).is_ok());
    }
}
