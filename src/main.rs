//! sitemeta - SEO & Open Graph manager for content sites.

mod cli;
mod config;
mod content;
mod generator;
mod init;
mod logger;
mod meta;
mod serve;
mod settings;
mod utils;

use anyhow::{Result, bail};
use clap::Parser;
use cli::{Cli, Commands, SettingsAction};
use config::SiteConfig;
use content::{ContentSource, export::ExportSource};
use generator::{SitemapError, build_sitemap};
use init::new_project;
use meta::{RenderContext, filter_robots, head_block, resolve};
use serve::serve_site;
use settings::{
    SettingKey, Settings, default_robots,
    store::{JsonStore, SettingsStore, initialize_defaults, uninstall},
};
use std::{fs, path::Path};

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));
    let config: &'static SiteConfig = Box::leak(Box::new(load_config(cli)?));

    match &cli.command {
        Commands::Init { name } => new_project(config, name.is_some()),
        Commands::Serve { .. } => {
            // Seed missing settings with defaults, like a first activation
            let store = JsonStore::new(&config.data.settings);
            initialize_defaults(&store, &config.site)?;
            serve_site(config)
        }
        Commands::Sitemap { output } => cmd_sitemap(config, output.as_deref()),
        Commands::Robots => cmd_robots(config),
        Commands::Head { id } => cmd_head(config, *id),
        Commands::Settings { action } => cmd_settings(config, action),
        Commands::Uninstall => cmd_uninstall(config),
    }
}

/// Load and validate configuration from CLI arguments
fn load_config(cli: &'static Cli) -> Result<SiteConfig> {
    let config_path = match &cli.command {
        Commands::Init { name: Some(name) } => cli.root().join(name).join(&cli.config),
        _ => cli.root().join(&cli.config),
    };

    let mut config = if config_path.exists() {
        SiteConfig::from_path(&config_path)?
    } else {
        SiteConfig::default()
    };
    config.update_with_cli(cli);

    // Validate config state based on command
    let config_exists = config.config_path.exists();
    match (cli.is_init(), config_exists) {
        (true, true) => {
            bail!("Config file already exists. Remove it manually or init in a different path.")
        }
        (false, false) => bail!("Config file not found."),
        _ => {}
    }

    if !cli.is_init() {
        config.validate()?;
    }

    Ok(config)
}

/// Generate the sitemap to stdout or a file.
fn cmd_sitemap(config: &SiteConfig, output: Option<&Path>) -> Result<()> {
    let store = JsonStore::new(&config.data.settings);
    let settings = Settings::load(&store, &config.site);
    let source = ExportSource::from_path(&config.data.content)?;

    let xml = match build_sitemap(&settings, &config.site, &source) {
        Ok(xml) => xml,
        Err(SitemapError::Disabled) => {
            bail!("sitemap generation is disabled (set sitemap_enable to \"1\" to enable it)")
        }
        Err(err) => return Err(err.into()),
    };

    match output {
        Some(path) => {
            fs::write(path, &xml)?;
            log!("sitemap"; "{}", path.display());
        }
        None => print!("{xml}"),
    }
    Ok(())
}

/// Print the filtered robots.txt.
fn cmd_robots(config: &SiteConfig) -> Result<()> {
    let store = JsonStore::new(&config.data.settings);
    let settings = Settings::load(&store, &config.site);
    let upstream = default_robots(&config.site);
    print!("{}", filter_robots(&settings.robots_txt, &upstream));
    Ok(())
}

/// Print the resolved head block for a content item or the home page.
fn cmd_head(config: &SiteConfig, id: Option<u64>) -> Result<()> {
    let store = JsonStore::new(&config.data.settings);
    let settings = Settings::load(&store, &config.site);

    let block = match id {
        None => head_block(&resolve(&RenderContext::Home, &settings, &config.site)),
        Some(id) => {
            let source = ExportSource::from_path(&config.data.content)?;
            let Some(item) = source.item(id)? else {
                bail!("no content item with id {id}");
            };
            head_block(&resolve(&RenderContext::Item(&item), &settings, &config.site))
        }
    };

    print!("{block}");
    Ok(())
}

/// Thin pass-through editing of the settings store.
fn cmd_settings(config: &SiteConfig, action: &SettingsAction) -> Result<()> {
    let store = JsonStore::new(&config.data.settings);

    match action {
        SettingsAction::List => {
            let stored = store.get_all()?;
            for key in SettingKey::ALL {
                match stored.get(&key) {
                    Some(value) => println!("{key} = {value}"),
                    None => println!("{key} = {} (default)", key.default_value(&config.site)),
                }
            }
        }
        SettingsAction::Get { key } => {
            let key = parse_key(key)?;
            match store.get(key)? {
                Some(value) => println!("{value}"),
                None => println!("{} (default)", key.default_value(&config.site)),
            }
        }
        SettingsAction::Set { key, value } => {
            let key = parse_key(key)?;
            store.set(key, key.value_from_input(value)?)?;
            log!("settings"; "{key} updated");
        }
        SettingsAction::Unset { key } => {
            let key = parse_key(key)?;
            store.delete(key)?;
            log!("settings"; "{key} reverted to default");
        }
    }
    Ok(())
}

/// Run the uninstall contract.
fn cmd_uninstall(config: &SiteConfig) -> Result<()> {
    let store = JsonStore::new(&config.data.settings);

    let cleanup = store
        .get(SettingKey::CleanupOnUninstall)?
        .is_some_and(|value| value.is_enabled());
    if !cleanup {
        log!("uninstall"; "cleanup_on_uninstall is disabled; leaving data in place");
        return Ok(());
    }

    let source = ExportSource::from_path(&config.data.content)?;
    uninstall(&store, &source)?;
    log!("uninstall"; "removed all settings and per-content overrides");
    Ok(())
}

fn parse_key(key: &str) -> Result<SettingKey> {
    match SettingKey::parse(key) {
        Some(key) => Ok(key),
        None => bail!("unknown setting key `{key}`"),
    }
}
