//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Canopy content compiler and publisher CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: canopy.toml)
    #[arg(short = 'C', long, default_value = "canopy.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scaffold a workspace: config, content database and default theme
    Init {
        /// the name(path) of the workspace directory, relative to `root`
        name: Option<PathBuf>,
    },

    /// Render a site's content tree into the staging directory
    Build {
        /// Site to build
        site: String,

        /// Render only this item and its ancestor chain
        #[arg(short, long)]
        item: Option<String>,

        /// Also write sitemap.xml and robots.txt
        #[arg(long)]
        sitemap: bool,
    },

    /// Build and publish a site through its hosting provider
    Deploy {
        /// Site to publish
        site: String,

        /// Publish only this item and its ancestor chain
        #[arg(short, long)]
        item: Option<String>,

        /// Clear the remote tree even for a targeted publish
        #[arg(long)]
        clear_remote: bool,

        /// Skip sitemap.xml / robots.txt generation
        #[arg(long)]
        no_sitemap: bool,

        /// Commit message for this publish
        #[arg(short, long)]
        message: Option<String>,
    },

    /// First-time provisioning: create the remote repository, enable
    /// hosting and run the initial publishes
    Setup {
        /// Site to provision
        site: String,

        /// Publish into a same-named repository that already exists
        #[arg(long)]
        reuse_existing: bool,
    },

    /// Clear the remote site tree (the repository itself survives)
    Wipe {
        /// Site to wipe
        site: String,

        /// Confirm the destructive operation
        #[arg(long)]
        yes: bool,
    },

    /// Push individual staged files through the contents API
    Upload {
        /// Staged files (or directories) relative to the buffer path
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Delete individual remote files through the contents API
    Remove {
        /// Remote paths to delete
        #[arg(required = true)]
        paths: Vec<String>,
    },
}

impl Commands {
    /// Whether this command talks to the remote host.
    pub const fn needs_remote(&self) -> bool {
        matches!(
            self,
            Self::Deploy { .. }
                | Self::Setup { .. }
                | Self::Wipe { .. }
                | Self::Upload { .. }
                | Self::Remove { .. }
        )
    }

    pub const fn is_init(&self) -> bool {
        matches!(self, Self::Init { .. })
    }
}
