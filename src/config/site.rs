//! `[site]` section configuration.
//!
//! The identity the hosting site reports about itself: title, description,
//! home URL and locale. Resolver fallbacks and generated defaults (robots.txt,
//! default descriptions) are derived from these values.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in sitemeta.toml - site identity.
///
/// # Example
/// ```toml
/// [site]
/// title = "My Blog"
/// description = "A personal blog about Rust"
/// url = "https://myblog.com"
/// language = "en-US"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteInfo {
    /// Site title. Fallback for og:site_name and the home page title.
    pub title: String,

    /// Site description. Fallback for the default SEO description.
    pub description: String,

    /// Site root URL for canonical links, og:url and the sitemap.
    #[serde(default)]
    pub url: String,

    /// BCP 47 language code (e.g., "en-US", "zh-Hans"). Emitted as og:locale.
    #[serde(default = "defaults::site::language")]
    #[educe(Default = defaults::site::language())]
    pub language: String,
}
