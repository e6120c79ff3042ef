use std::path::PathBuf;

use clap::Parser;

pub mod global;
pub mod root_commands;

pub use global::GlobalFlags;
pub use root_commands::{Commands, ListArgs, MatchArgs};

/// Top-level CLI parser for the `invctl` binary.
#[derive(Debug, Parser)]
#[command(name = "invctl", version, about = "Inventory consistency engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extra TOML config file layered above the project config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path (overrides `database.path`)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Subject the request is made as
    #[arg(long = "as", global = true, default_value = "local")]
    pub subject: String,

    /// Role carried by the caller (repeatable)
    #[arg(long = "role", global = true)]
    pub roles: Vec<String>,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            config: self.config.clone(),
            db: self.db.clone(),
            subject: self.subject.clone(),
            roles: self.roles.clone(),
        }
    }
}
