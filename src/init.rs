//! Project initialization module.
//!
//! Creates a new project with a default configuration, an empty settings
//! store and a sample content export.

use crate::{config::SiteConfig, log};
use anyhow::{Context, Result, bail};
use std::{fs, path::Path};

/// Default config file content
const CONFIG_TEMPLATE: &str = include_str!("embed/sitemeta.toml");

/// Sample content export
const CONTENT_TEMPLATE: &str = include_str!("embed/content.json");

/// Create a new project with the default file set.
pub fn new_project(config: &SiteConfig, has_name: bool) -> Result<()> {
    let root = config
        .config_path
        .parent()
        .context("config path has no parent directory")?;

    // Safety check: if no name was provided (init in current dir),
    // the directory must be completely empty
    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `sitemeta init <NAME>` to create in a subdirectory."
        );
    }

    fs::create_dir_all(root)
        .with_context(|| format!("Failed to create project directory {}", root.display()))?;

    fs::write(&config.config_path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", config.config_path.display()))?;
    fs::write(&config.data.settings, "{}")
        .with_context(|| format!("Failed to write {}", config.data.settings.display()))?;
    fs::write(&config.data.content, CONTENT_TEMPLATE)
        .with_context(|| format!("Failed to write {}", config.data.content.display()))?;

    log!("init"; "created {}", root.display());
    log!("init"; "edit sitemeta.toml, then run `sitemeta serve`");
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}
