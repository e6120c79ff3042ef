use serde::Serialize;

use inv_config::InventoryConfig;
use inv_core::entities::{
    Application, Cluster, Datacenter, Environment, Feature, Hostgroup, Product, Tag, Team, User,
};
use inv_core::kinds::ResourceKind;
use inv_db::guard::Dependent;
use inv_db::service::InventoryService;

use super::records;
use crate::cli::{Commands, GlobalFlags};
use crate::output::output;

/// Run `$body` with `$t` bound to the entity type of `$kind`.
macro_rules! with_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            ResourceKind::Product => {
                type $t = Product;
                $body
            }
            ResourceKind::Team => {
                type $t = Team;
                $body
            }
            ResourceKind::Environment => {
                type $t = Environment;
                $body
            }
            ResourceKind::Datacenter => {
                type $t = Datacenter;
                $body
            }
            ResourceKind::Cluster => {
                type $t = Cluster;
                $body
            }
            ResourceKind::Feature => {
                type $t = Feature;
                $body
            }
            ResourceKind::Tag => {
                type $t = Tag;
                $body
            }
            ResourceKind::Hostgroup => {
                type $t = Hostgroup;
                $body
            }
            ResourceKind::Application => {
                type $t = Application;
                $body
            }
            ResourceKind::User => {
                type $t = User;
                $body
            }
        }
    };
}

#[derive(Debug, Serialize)]
struct MatchResponse {
    hostgroups: Vec<u32>,
}

#[derive(Debug, Serialize)]
struct DependentsResponse<'a> {
    kind: ResourceKind,
    dependents: &'a [Dependent],
}

/// Dispatch a parsed command to the corresponding handler.
pub async fn dispatch(
    command: Commands,
    service: &InventoryService,
    config: &InventoryConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Get { kind, id } => with_kind!(kind, T => records::get::<T>(service, flags, id).await),
        Commands::List(args) => {
            with_kind!(args.kind, T => records::list::<T>(service, config, flags, &args).await)
        }
        Commands::Create { kind, json } => {
            with_kind!(kind, T => records::create::<T>(service, flags, &json).await)
        }
        Commands::Update { kind, json } => {
            with_kind!(kind, T => records::update::<T>(service, flags, &json).await)
        }
        Commands::Delete { kind, ids } => {
            with_kind!(kind, T => records::delete::<T>(service, flags, &ids).await)
        }
        Commands::MatchHostgroups(args) => {
            let hostgroups = service
                .match_hostgroups(&args.features, args.product, args.team)
                .await?;
            output(&MatchResponse { hostgroups })
        }
        Commands::Dependents { kind } => output(&DependentsResponse {
            kind,
            dependents: service.dependents(kind),
        }),
        Commands::Config => super::config::handle(config),
    }
}
