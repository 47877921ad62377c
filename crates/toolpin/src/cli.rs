//! CLI command structure using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use toolpin_core::Overrides;

#[derive(Parser)]
#[command(name = "toolpin")]
#[command(version, about = "Install a version-pinned release binary", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub source: SourceArgs,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Where the tool comes from and where it is cached
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Config file (defaults to ./toolpin.toml when present)
    #[arg(long, global = true, env = "TOOLPIN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Tool name, also the executable name
    #[arg(long, global = true)]
    pub tool: Option<String>,

    /// Repository owner publishing the releases
    #[arg(long, global = true)]
    pub owner: Option<String>,

    /// Repository publishing the releases
    #[arg(long, global = true)]
    pub repo: Option<String>,

    /// Asset naming template, e.g. "{tool}_{os}_{arch}{ext}"
    #[arg(long, global = true)]
    pub asset_template: Option<String>,

    /// Cache root
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Registry bearer token (GITHUB_TOKEN is used when omitted)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Registry API root
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

impl SourceArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            tool: self.tool.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            asset_template: self.asset_template.clone(),
            cache_dir: self.cache_dir.clone(),
            token: self.token.clone(),
            api_url: self.api_url.clone(),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a version and print its directory
    Install {
        /// Version to install ("latest", "1.2.3" or "v1.2.3")
        version: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Install, add to PATH, verify, and optionally run one command
    Setup {
        /// Version to install ("latest", "1.2.3" or "v1.2.3")
        version: String,

        /// Stop after installing and verifying
        #[arg(long)]
        install_only: bool,

        /// Subcommand to run with the installed tool
        #[arg(long)]
        command: Option<String>,

        /// Arguments for the command, whitespace separated
        #[arg(long, allow_hyphen_values = true)]
        args: Option<String>,
    },
}
