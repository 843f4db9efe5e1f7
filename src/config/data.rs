//! `[data]` section configuration.
//!
//! Paths to the settings store file and the content export consumed by
//! the resolver and sitemap generator.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[data]` section in sitemeta.toml - collaborator data locations.
///
/// # Example
/// ```toml
/// [data]
/// settings = "settings.json"
/// content = "content.json"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Settings store file (created lazily on first use).
    #[serde(default = "defaults::data::settings")]
    #[educe(Default = defaults::data::settings())]
    pub settings: PathBuf,

    /// Content export file (read-only CMS snapshot).
    #[serde(default = "defaults::data::content")]
    #[educe(Default = defaults::data::content())]
    pub content: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_data_config_defaults() {
        let config = r#"
            [site]
            title = "Example"
            description = "An example site"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.data.settings, PathBuf::from("settings.json"));
        assert_eq!(config.data.content, PathBuf::from("content.json"));
    }

    #[test]
    fn test_data_config_override() {
        let config = r#"
            [site]
            title = "Example"
            description = "An example site"

            [data]
            settings = "state/seo-settings.json"
            content = "export/site-content.json"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.data.settings, PathBuf::from("state/seo-settings.json"));
        assert_eq!(config.data.content, PathBuf::from("export/site-content.json"));
    }
}
