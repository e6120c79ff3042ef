use clap::{Args, Subcommand};

use inv_core::kinds::ResourceKind;

/// Every `invctl` subcommand.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show one resource by id
    Get {
        /// Resource kind (product, team, hostgroup, ...)
        kind: ResourceKind,
        id: u32,
    },

    /// List resources of one kind
    List(ListArgs),

    /// Create resources from a JSON object or array (`@path` reads a file)
    Create {
        kind: ResourceKind,
        #[arg(long)]
        json: String,
    },

    /// Replace resources from a JSON object or array (`@path` reads a file)
    Update {
        kind: ResourceKind,
        #[arg(long)]
        json: String,
    },

    /// Delete resources that nothing references
    Delete {
        kind: ResourceKind,
        #[arg(required = true)]
        ids: Vec<u32>,
    },

    /// Hostgroups whose features cover every requested feature
    MatchHostgroups(MatchArgs),

    /// Show what blocks deleting a kind
    Dependents { kind: ResourceKind },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    pub kind: ResourceKind,

    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Defaults to `pagination.default_page_size`
    #[arg(long)]
    pub page_size: Option<u32>,

    #[arg(long = "id")]
    pub ids: Vec<u32>,

    #[arg(long = "name")]
    pub names: Vec<String>,

    #[arg(long = "product")]
    pub product_ids: Vec<u32>,

    #[arg(long = "team")]
    pub team_ids: Vec<u32>,
}

#[derive(Debug, Args)]
pub struct MatchArgs {
    #[arg(long = "feature")]
    pub features: Vec<u32>,

    #[arg(long)]
    pub product: Option<u32>,

    #[arg(long)]
    pub team: Option<u32>,
}
