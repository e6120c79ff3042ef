//! List filters with pagination and bounded predicates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::InventoryError;
use crate::kinds::ResourceKind;

/// Hard ceiling on page size.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Hard ceiling on values per predicate field.
pub const MAX_FILTER_VALUES: usize = 10;

const fn default_page() -> u32 {
    1
}

const fn default_page_size() -> u32 {
    20
}

/// Bounds applied when validating a `ListFilter`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterLimits {
    pub max_page_size: u32,
    pub max_filter_values: usize,
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self {
            max_page_size: MAX_PAGE_SIZE,
            max_filter_values: MAX_FILTER_VALUES,
        }
    }
}

/// Pagination plus equality/membership predicates for `list` calls.
///
/// Empty predicate vectors match everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ListFilter {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub product_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub team_ids: Vec<u32>,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            ids: Vec::new(),
            names: Vec::new(),
            product_ids: Vec::new(),
            team_ids: Vec::new(),
        }
    }
}

impl ListFilter {
    #[must_use]
    pub fn page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }

    /// Row offset of the first item on the requested page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Check pagination, predicate cardinality and predicate applicability.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::FilterInvalid` describing the first violation.
    pub fn validate(&self, kind: ResourceKind, limits: FilterLimits) -> Result<(), InventoryError> {
        if self.page < 1 {
            return Err(InventoryError::FilterInvalid("page must be >= 1".into()));
        }
        if self.page_size < 1 || self.page_size > limits.max_page_size {
            return Err(InventoryError::FilterInvalid(format!(
                "page_size must be between 1 and {}, got {}",
                limits.max_page_size, self.page_size
            )));
        }

        let counts = [
            ("ids", self.ids.len()),
            ("names", self.names.len()),
            ("product_ids", self.product_ids.len()),
            ("team_ids", self.team_ids.len()),
        ];
        for (field, count) in counts {
            if count > limits.max_filter_values {
                return Err(InventoryError::FilterInvalid(format!(
                    "{field} accepts at most {} values, got {count}",
                    limits.max_filter_values
                )));
            }
        }

        if !self.product_ids.is_empty() && !kind.has_product_column() {
            return Err(InventoryError::FilterInvalid(format!(
                "product_ids is not supported when listing {kind}"
            )));
        }
        if !self.team_ids.is_empty() && !kind.has_team_column() {
            return Err(InventoryError::FilterInvalid(format!(
                "team_ids is not supported when listing {kind}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 10)]
    #[case(1, 0)]
    #[case(1, 201)]
    fn rejects_out_of_range_pagination(#[case] page: u32, #[case] page_size: u32) {
        let filter = ListFilter::page(page, page_size);
        assert!(matches!(
            filter.validate(ResourceKind::Tag, FilterLimits::default()),
            Err(InventoryError::FilterInvalid(_))
        ));
    }

    #[rstest]
    #[case(1, 1)]
    #[case(3, 200)]
    fn accepts_in_range_pagination(#[case] page: u32, #[case] page_size: u32) {
        let filter = ListFilter::page(page, page_size);
        assert!(filter.validate(ResourceKind::Tag, FilterLimits::default()).is_ok());
    }

    #[test]
    fn rejects_too_many_values() {
        let filter = ListFilter {
            ids: (1..=11).collect(),
            ..ListFilter::default()
        };
        let err = filter
            .validate(ResourceKind::Feature, FilterLimits::default())
            .unwrap_err();
        assert!(err.to_string().contains("ids accepts at most 10"));
    }

    #[test]
    fn exactly_ten_values_allowed() {
        let filter = ListFilter {
            names: (0..10).map(|i| format!("n{i}")).collect(),
            ..ListFilter::default()
        };
        assert!(filter.validate(ResourceKind::Feature, FilterLimits::default()).is_ok());
    }

    #[test]
    fn rejects_unsupported_predicate() {
        let filter = ListFilter {
            product_ids: vec![1],
            ..ListFilter::default()
        };
        assert!(filter.validate(ResourceKind::Tag, FilterLimits::default()).is_err());
        assert!(filter.validate(ResourceKind::Hostgroup, FilterLimits::default()).is_ok());

        let filter = ListFilter {
            team_ids: vec![1],
            ..ListFilter::default()
        };
        assert!(filter.validate(ResourceKind::User, FilterLimits::default()).is_ok());
        assert!(filter.validate(ResourceKind::Cluster, FilterLimits::default()).is_err());
    }

    #[test]
    fn custom_limits_apply() {
        let limits = FilterLimits {
            max_page_size: 50,
            max_filter_values: 2,
        };
        assert!(ListFilter::page(1, 51).validate(ResourceKind::Tag, limits).is_err());
        let filter = ListFilter {
            ids: vec![1, 2, 3],
            ..ListFilter::default()
        };
        assert!(filter.validate(ResourceKind::Tag, limits).is_err());
    }

    #[test]
    fn offset_is_zero_based() {
        assert_eq!(ListFilter::page(1, 20).offset(), 0);
        assert_eq!(ListFilter::page(3, 20).offset(), 40);
    }

    #[test]
    fn deserializes_with_defaults() {
        let filter: ListFilter = serde_json::from_str(r#"{"names":["web"]}"#).unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 20);
        assert_eq!(filter.names, vec!["web"]);
    }
}
