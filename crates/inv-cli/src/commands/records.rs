//! Generic record handlers shared by every resource kind.

use serde::Serialize;
use serde::de::DeserializeOwned;

use inv_config::InventoryConfig;
use inv_core::filter::ListFilter;
use inv_core::identity::Intent;
use inv_core::kinds::ResourceKind;
use inv_core::resource::Resource;
use inv_db::repos::Record;
use inv_db::service::InventoryService;

use super::shared::{parse_batch, read_payload};
use crate::cli::{GlobalFlags, ListArgs};
use crate::output::output;

#[derive(Debug, Serialize)]
struct CreatedResponse {
    kind: ResourceKind,
    ids: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct ChangedResponse {
    kind: ResourceKind,
    ids: Vec<u32>,
    action: &'static str,
}

/// Handle `invctl get`.
pub async fn get<T: Record + Serialize>(
    service: &InventoryService,
    flags: &GlobalFlags,
    id: u32,
) -> anyhow::Result<()> {
    service.authorize(&flags.caller(), T::KIND, Intent::Read)?;
    let item: T = service.get(id).await?;
    output(&item)
}

/// Handle `invctl list`.
pub async fn list<T: Record + Serialize>(
    service: &InventoryService,
    config: &InventoryConfig,
    flags: &GlobalFlags,
    args: &ListArgs,
) -> anyhow::Result<()> {
    service.authorize(&flags.caller(), T::KIND, Intent::Read)?;
    let filter = list_filter(args, config);
    let items: Vec<T> = service.list(&filter).await?;
    output(&items)
}

/// Handle `invctl create`.
pub async fn create<T: Record + DeserializeOwned>(
    service: &InventoryService,
    flags: &GlobalFlags,
    json: &str,
) -> anyhow::Result<()> {
    let batch: Vec<T> = parse_batch(&read_payload(json)?)?;
    let ids = service.create(&flags.caller(), batch).await?;
    output(&CreatedResponse { kind: T::KIND, ids })
}

/// Handle `invctl update`.
pub async fn update<T: Record + DeserializeOwned>(
    service: &InventoryService,
    flags: &GlobalFlags,
    json: &str,
) -> anyhow::Result<()> {
    let batch: Vec<T> = parse_batch(&read_payload(json)?)?;
    let ids = batch.iter().map(Resource::id).collect();
    service.update(&flags.caller(), batch).await?;
    output(&ChangedResponse {
        kind: T::KIND,
        ids,
        action: "updated",
    })
}

/// Handle `invctl delete`.
pub async fn delete<T: Record>(
    service: &InventoryService,
    flags: &GlobalFlags,
    ids: &[u32],
) -> anyhow::Result<()> {
    service.delete::<T>(&flags.caller(), ids).await?;
    output(&ChangedResponse {
        kind: T::KIND,
        ids: ids.to_vec(),
        action: "deleted",
    })
}

fn list_filter(args: &ListArgs, config: &InventoryConfig) -> ListFilter {
    ListFilter {
        page: args.page,
        page_size: args
            .page_size
            .unwrap_or(config.pagination.default_page_size),
        ids: args.ids.clone(),
        names: args.names.clone(),
        product_ids: args.product_ids.clone(),
        team_ids: args.team_ids.clone(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn list_filter_uses_configured_default_page_size() {
        let mut config = InventoryConfig::default();
        config.pagination.default_page_size = 7;
        let args = ListArgs {
            kind: ResourceKind::Tag,
            page: 2,
            page_size: None,
            ids: vec![],
            names: vec!["a".into()],
            product_ids: vec![],
            team_ids: vec![],
        };

        let filter = list_filter(&args, &config);
        assert_eq!(filter.page, 2);
        assert_eq!(filter.page_size, 7);
        assert_eq!(filter.names, vec!["a"]);
    }
}
