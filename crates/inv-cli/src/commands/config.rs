use inv_config::InventoryConfig;

/// Handle `invctl config`.
pub fn handle(config: &InventoryConfig) -> anyhow::Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
