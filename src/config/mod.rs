//! Tool configuration management for `sitemeta.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `[site]`  | Site identity (title, description, url, locale)  |
//! | `[data]`  | Settings store and content export locations      |
//! | `[serve]` | Preview server (port, interface)                 |
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! description = "A personal blog"
//! url = "https://example.com"
//!
//! [data]
//! settings = "settings.json"
//! content = "content.json"
//!
//! [serve]
//! port = 5280
//! ```

mod data;
pub mod defaults;
mod serve;
mod site;

pub use site::SiteInfo;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use data::DataConfig;
use educe::Educe;
use serde::{Deserialize, Serialize};
use serve::ServeConfig;
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("Config validation error: {0}")]
    Validation(String),
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing sitemeta.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site identity
    #[serde(default)]
    pub site: SiteInfo,

    /// Data file locations
    #[serde(default)]
    pub data: DataConfig,

    /// Preview server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Update configuration with CLI arguments and resolve paths against
    /// the project root.
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = match &cli.command {
            Commands::Init { name: Some(name) } => cli.root().join(name),
            _ => cli.root().to_path_buf(),
        };

        self.config_path = Self::normalize_path(&root.join(&cli.config));
        self.data.settings = Self::normalize_path(&root.join(&self.data.settings));
        self.data.content = Self::normalize_path(&root.join(&self.data.content));

        if let Commands::Serve { interface, port } = &cli.command {
            if let Some(interface) = interface {
                self.serve.interface = interface.clone();
            }
            if let Some(port) = port {
                self.serve.port = *port;
            }
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if self.site.url.is_empty() {
            bail!(ConfigError::Validation(
                "[site.url] is required for metadata and sitemap generation".into()
            ));
        }

        if !self.site.url.starts_with("http") {
            bail!(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into()
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
