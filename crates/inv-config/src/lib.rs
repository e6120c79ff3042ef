//! # inv-config
//!
//! Layered configuration loading for the inventory engine using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`INVENTORY_*` prefix, `__` as separator)
//! 2. An explicit file passed to [`InventoryConfig::load_from`]
//! 3. Project-level `.inventory/config.toml`
//! 4. User-level `~/.config/inventory/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! `INVENTORY_DATABASE__PATH` -> `database.path`,
//! `INVENTORY_PAGINATION__MAX_PAGE_SIZE` -> `pagination.max_page_size`, etc.
//!
//! ```no_run
//! use inv_config::InventoryConfig;
//!
//! let config = InventoryConfig::load_with_dotenv().expect("config");
//! println!("database: {}", config.database.path);
//! ```

mod database;
mod error;
mod pagination;
mod policy;
mod validation;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use pagination::PaginationConfig;
pub use policy::{GrantConfig, PolicyConfig};
pub use validation::ValidationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InventoryConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

impl InventoryConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with an extra TOML file layered above the
    /// project-local file and below the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::base_figment()
            .merge(Toml::file(path))
            .merge(Self::env_provider())
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if extraction fails or a value is out of range.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the full figment provider chain.
    #[must_use]
    pub fn figment() -> Figment {
        Self::base_figment().merge(Self::env_provider())
    }

    /// Check cross-field constraints figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path".into(),
                reason: "must not be empty".into(),
            });
        }
        self.pagination.validate()?;
        self.validation.validate()
    }

    fn base_figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".inventory/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
    }

    fn env_provider() -> Env {
        Env::prefixed("INVENTORY_").split("__")
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("inventory").join("config.toml"))
    }
}
