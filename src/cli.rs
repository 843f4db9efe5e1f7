//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// sitemeta - SEO & Open Graph manager CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Project root directory
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: sitemeta.toml)
    #[arg(short = 'C', long, default_value = "sitemeta.toml")]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Scaffold a new project (config, settings store, sample content export)
    Init {
        /// the name(path) of the project directory, relative to `root`
        name: Option<PathBuf>,
    },

    /// Serve page previews, sitemap.xml and robots.txt
    Serve {
        /// Interface to bind on
        #[arg(short, long)]
        interface: Option<String>,

        /// The port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Generate the sitemap XML
    Sitemap {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the filtered robots.txt
    Robots,

    /// Print the resolved head block for a content item (or the home page)
    Head {
        /// Content item identifier; omit for the home/collection context
        id: Option<u64>,
    },

    /// Inspect and edit stored settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },

    /// Remove persisted settings and per-content overrides
    /// (honors the cleanup_on_uninstall setting)
    Uninstall,
}

/// Settings editing actions
#[derive(Subcommand, Debug, Clone)]
pub enum SettingsAction {
    /// List all settings with stored or default values
    List,

    /// Print a single setting
    Get { key: String },

    /// Store a setting value (lists are comma-separated)
    Set { key: String, value: String },

    /// Remove a stored setting, reverting it to its default
    Unset { key: String },
}

impl Cli {
    pub fn root(&self) -> &Path {
        self.root.as_deref().unwrap_or(Path::new("./"))
    }

    pub const fn is_init(&self) -> bool {
        matches!(self.command, Commands::Init { .. })
    }
}
