use std::path::Path;

use anyhow::Context;

use inv_config::InventoryConfig;

use crate::cli::GlobalFlags;

/// Load layered configuration and apply command-line overrides.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<InventoryConfig> {
    let _ = dotenvy::dotenv();

    let mut config = match &flags.config {
        Some(path) => InventoryConfig::load_from(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => InventoryConfig::load().context("failed to load configuration")?,
    };

    if let Some(db) = &flags.db {
        config.database.path.clone_from(db);
        config.validate().context("invalid --db value")?;
    }
    Ok(config)
}

/// Create the database file's parent directory if it does not exist yet.
pub fn ensure_db_dir(config: &InventoryConfig) -> anyhow::Result<()> {
    if config.database.is_in_memory() {
        return Ok(());
    }
    if let Some(parent) = Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}
