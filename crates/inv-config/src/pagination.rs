//! List pagination bounds.

use inv_core::filter::{FilterLimits, MAX_FILTER_VALUES, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const fn default_page_size() -> u32 {
    20
}

const fn default_max_page_size() -> u32 {
    MAX_PAGE_SIZE
}

const fn default_max_filter_values() -> usize {
    MAX_FILTER_VALUES
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    /// Page size used by callers that do not ask for one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    /// Largest accepted page size. Cannot exceed 200.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,

    /// Largest accepted number of values per filter predicate.
    #[serde(default = "default_max_filter_values")]
    pub max_filter_values: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            max_filter_values: default_max_filter_values(),
        }
    }
}

impl PaginationConfig {
    #[must_use]
    pub const fn limits(&self) -> FilterLimits {
        FilterLimits {
            max_page_size: self.max_page_size,
            max_filter_values: self.max_filter_values,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.max_page_size == 0 || self.max_page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_page_size".into(),
                reason: format!("must be between 1 and {MAX_PAGE_SIZE}"),
            });
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigError::InvalidValue {
                field: "pagination.default_page_size".into(),
                reason: format!("must be between 1 and {}", self.max_page_size),
            });
        }
        if self.max_filter_values == 0 {
            return Err(ConfigError::InvalidValue {
                field: "pagination.max_filter_values".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = PaginationConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, 200);
        assert_eq!(config.max_filter_values, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_page_size_above_ceiling() {
        let config = PaginationConfig {
            max_page_size: 500,
            ..PaginationConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
