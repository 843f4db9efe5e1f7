//! Persisted settings: keys, value shapes and the typed snapshot.
//!
//! Settings live in a key/value store behind the [`store::SettingsStore`]
//! trait. Every key has a defined default, so a missing stored value is
//! indistinguishable from "use default" at read time: consumers never see
//! the raw store, only the [`Settings`] snapshot merged from stored values
//! and defaults.
//!
//! Booleans are persisted as the strings `"1"` / `"0"`, matching the admin
//! form conventions of the hosting CMS.

pub mod store;

use crate::config::SiteInfo;
use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Setting Keys
// ============================================================================

/// The closed set of recognized setting keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SettingKey {
    OgSiteName,
    OgDefaultImage,
    OgDefaultType,
    OgTwitterCard,
    OgTwitterSite,
    SeoDefaultDescription,
    SeoEnableJsonld,
    SitemapEnable,
    SitemapPostTypes,
    SitemapExcludeIds,
    RobotsTxt,
    CleanupOnUninstall,
}

impl SettingKey {
    /// All keys, in persistence order.
    pub const ALL: [Self; 12] = [
        Self::OgSiteName,
        Self::OgDefaultImage,
        Self::OgDefaultType,
        Self::OgTwitterCard,
        Self::OgTwitterSite,
        Self::SeoDefaultDescription,
        Self::SeoEnableJsonld,
        Self::SitemapEnable,
        Self::SitemapPostTypes,
        Self::SitemapExcludeIds,
        Self::RobotsTxt,
        Self::CleanupOnUninstall,
    ];

    /// Stable string form used as the persistence key.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OgSiteName => "og_site_name",
            Self::OgDefaultImage => "og_default_image",
            Self::OgDefaultType => "og_default_type",
            Self::OgTwitterCard => "og_twitter_card",
            Self::OgTwitterSite => "og_twitter_site",
            Self::SeoDefaultDescription => "seo_default_description",
            Self::SeoEnableJsonld => "seo_enable_jsonld",
            Self::SitemapEnable => "sitemap_enable",
            Self::SitemapPostTypes => "sitemap_post_types",
            Self::SitemapExcludeIds => "sitemap_exclude_ids",
            Self::RobotsTxt => "robots_txt",
            Self::CleanupOnUninstall => "cleanup_on_uninstall",
        }
    }

    /// Parse a persistence key. Unknown keys return `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }

    /// The default value for this key, derived from the site identity
    /// where the documented default references it.
    pub fn default_value(self, site: &SiteInfo) -> SettingValue {
        match self {
            Self::OgSiteName => SettingValue::Text(site.title.clone()),
            Self::OgDefaultImage => SettingValue::Text(String::new()),
            Self::OgDefaultType => SettingValue::Text(OgType::Article.as_str().into()),
            Self::OgTwitterCard => {
                SettingValue::Text(TwitterCard::SummaryLargeImage.as_str().into())
            }
            Self::OgTwitterSite => SettingValue::Text(String::new()),
            Self::SeoDefaultDescription => SettingValue::Text(site.description.clone()),
            Self::SeoEnableJsonld => SettingValue::Text("1".into()),
            Self::SitemapEnable => SettingValue::Text("1".into()),
            Self::SitemapPostTypes => {
                SettingValue::TextList(vec!["post".into(), "page".into()])
            }
            Self::SitemapExcludeIds => SettingValue::IdList(Vec::new()),
            Self::RobotsTxt => SettingValue::Text(default_robots(site)),
            Self::CleanupOnUninstall => SettingValue::Text("0".into()),
        }
    }

    /// Build a value of this key's shape from raw CLI input.
    ///
    /// Lists are comma-separated; everything else is taken verbatim.
    pub fn value_from_input(self, raw: &str) -> Result<SettingValue> {
        match self {
            Self::SitemapPostTypes => Ok(SettingValue::TextList(
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            )),
            Self::SitemapExcludeIds => {
                let ids: Result<Vec<u64>, _> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse)
                    .collect();
                match ids {
                    Ok(ids) => Ok(SettingValue::IdList(ids)),
                    Err(_) => bail!("`{}` expects a comma-separated list of ids", self.as_str()),
                }
            }
            _ => Ok(SettingValue::Text(raw.to_string())),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Setting Values
// ============================================================================

/// A stored setting value: scalar text, a list of strings, or a list of ids.
///
/// Serialized untagged, so the store file holds plain JSON scalars and
/// arrays. An empty array is shape-ambiguous after a round-trip; the
/// accessors below coerce empty lists to either shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    Text(String),
    IdList(Vec<u64>),
    TextList(Vec<String>),
}

impl SettingValue {
    /// Scalar text, if this value is one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// String list, if this value is one (empty id lists coerce).
    pub fn as_text_list(&self) -> Option<Vec<String>> {
        match self {
            Self::TextList(list) => Some(list.clone()),
            Self::IdList(list) if list.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }

    /// Id list, if this value is one (empty string lists coerce).
    pub fn as_id_list(&self) -> Option<Vec<u64>> {
        match self {
            Self::IdList(list) => Some(list.clone()),
            Self::TextList(list) if list.is_empty() => Some(Vec::new()),
            _ => None,
        }
    }

    /// Boolean-string interpretation: exactly `"1"` is enabled.
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Text(s) if s == "1")
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::TextList(list) => f.write_str(&list.join(", ")),
            Self::IdList(list) => {
                let joined: Vec<String> = list.iter().map(u64::to_string).collect();
                f.write_str(&joined.join(", "))
            }
        }
    }
}

// ============================================================================
// Enumerated Settings
// ============================================================================

/// Fallback og:type for single content items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OgType {
    #[default]
    Article,
    Website,
}

impl OgType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Article => "article",
            Self::Website => "website",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "article" => Some(Self::Article),
            "website" => Some(Self::Website),
            _ => None,
        }
    }
}

/// twitter:card variant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TwitterCard {
    Summary,
    #[default]
    SummaryLargeImage,
}

impl TwitterCard {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Summary => "summary",
            Self::SummaryLargeImage => "summary_large_image",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "summary" => Some(Self::Summary),
            "summary_large_image" => Some(Self::SummaryLargeImage),
            _ => None,
        }
    }
}

// ============================================================================
// Settings Snapshot
// ============================================================================

/// Typed snapshot of all settings, merged from stored values and defaults.
///
/// Empty stored text falls back to the default for keys whose default is
/// non-empty; invalid enum text falls back to the default variant. Store
/// read failures degrade to pure defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub og_site_name: String,
    /// Fallback og:image URL; empty means none.
    pub og_default_image: String,
    pub og_default_type: OgType,
    pub og_twitter_card: TwitterCard,
    /// twitter:site handle; empty means the tag is omitted.
    pub og_twitter_site: String,
    pub seo_default_description: String,
    pub seo_enable_jsonld: bool,
    pub sitemap_enable: bool,
    pub sitemap_post_types: Vec<String>,
    pub sitemap_exclude_ids: Vec<u64>,
    /// Raw stored robots.txt body. Empty means "pass the upstream default
    /// through" - consumers apply [`crate::meta::filter_robots`].
    pub robots_txt: String,
    pub cleanup_on_uninstall: bool,
}

impl Settings {
    /// Snapshot of pure defaults for a site.
    pub fn defaults(site: &SiteInfo) -> Self {
        Self::from_values(&BTreeMap::new(), site)
    }

    /// Read a snapshot through a store. Read failures degrade to defaults.
    pub fn load(store: &dyn store::SettingsStore, site: &SiteInfo) -> Self {
        match store.get_all() {
            Ok(values) => Self::from_values(&values, site),
            Err(_) => Self::defaults(site),
        }
    }

    /// Merge raw stored values with defaults.
    pub fn from_values(values: &BTreeMap<SettingKey, SettingValue>, site: &SiteInfo) -> Self {
        let non_empty = |key: SettingKey| {
            values
                .get(&key)
                .and_then(SettingValue::as_text)
                .filter(|s| !s.is_empty())
                .map(String::from)
        };
        let flag = |key: SettingKey, default: bool| {
            values
                .get(&key)
                .map(SettingValue::is_enabled)
                .unwrap_or(default)
        };

        Self {
            og_site_name: non_empty(SettingKey::OgSiteName).unwrap_or_else(|| site.title.clone()),
            og_default_image: non_empty(SettingKey::OgDefaultImage).unwrap_or_default(),
            og_default_type: non_empty(SettingKey::OgDefaultType)
                .and_then(|s| OgType::parse(&s))
                .unwrap_or_default(),
            og_twitter_card: non_empty(SettingKey::OgTwitterCard)
                .and_then(|s| TwitterCard::parse(&s))
                .unwrap_or_default(),
            og_twitter_site: non_empty(SettingKey::OgTwitterSite).unwrap_or_default(),
            seo_default_description: non_empty(SettingKey::SeoDefaultDescription)
                .unwrap_or_else(|| site.description.clone()),
            seo_enable_jsonld: flag(SettingKey::SeoEnableJsonld, true),
            sitemap_enable: flag(SettingKey::SitemapEnable, true),
            sitemap_post_types: values
                .get(&SettingKey::SitemapPostTypes)
                .and_then(SettingValue::as_text_list)
                .unwrap_or_else(|| vec!["post".into(), "page".into()]),
            sitemap_exclude_ids: values
                .get(&SettingKey::SitemapExcludeIds)
                .and_then(SettingValue::as_id_list)
                .unwrap_or_default(),
            robots_txt: values
                .get(&SettingKey::RobotsTxt)
                .and_then(SettingValue::as_text)
                .map(String::from)
                .unwrap_or_default(),
            cleanup_on_uninstall: flag(SettingKey::CleanupOnUninstall, false),
        }
    }
}

/// Generated default robots.txt: allow everything, advertise the sitemap.
pub fn default_robots(site: &SiteInfo) -> String {
    let base = site.url.trim_end_matches('/');
    format!("User-agent: *\nDisallow:\n\nSitemap: {base}/sitemap.xml\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_site() -> SiteInfo {
        SiteInfo {
            title: "Example".into(),
            description: "An example site".into(),
            url: "https://example.com".into(),
            language: "en-US".into(),
        }
    }

    #[test]
    fn test_key_roundtrip() {
        for key in SettingKey::ALL {
            assert_eq!(SettingKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SettingKey::parse("no_such_key"), None);
    }

    #[test]
    fn test_value_untagged_serde() {
        let text = SettingValue::Text("hello".into());
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(json, r#""hello""#);
        assert_eq!(serde_json::from_str::<SettingValue>(&json).unwrap(), text);

        let ids = SettingValue::IdList(vec![1, 5, 9]);
        let json = serde_json::to_string(&ids).unwrap();
        assert_eq!(json, "[1,5,9]");
        assert_eq!(serde_json::from_str::<SettingValue>(&json).unwrap(), ids);

        let list = SettingValue::TextList(vec!["post".into(), "page".into()]);
        let json = serde_json::to_string(&list).unwrap();
        assert_eq!(serde_json::from_str::<SettingValue>(&json).unwrap(), list);
    }

    #[test]
    fn test_value_empty_list_coercion() {
        // An empty JSON array deserializes as an id list; both accessors
        // must still hand back an empty list of the requested shape.
        let value: SettingValue = serde_json::from_str("[]").unwrap();
        assert_eq!(value.as_id_list(), Some(Vec::new()));
        assert_eq!(value.as_text_list(), Some(Vec::new()));
    }

    #[test]
    fn test_value_is_enabled() {
        assert!(SettingValue::Text("1".into()).is_enabled());
        assert!(!SettingValue::Text("0".into()).is_enabled());
        assert!(!SettingValue::Text("yes".into()).is_enabled());
        assert!(!SettingValue::IdList(vec![1]).is_enabled());
    }

    #[test]
    fn test_defaults_reference_site() {
        let site = make_site();
        let settings = Settings::defaults(&site);

        assert_eq!(settings.og_site_name, "Example");
        assert_eq!(settings.seo_default_description, "An example site");
        assert_eq!(settings.og_default_type, OgType::Article);
        assert_eq!(settings.og_twitter_card, TwitterCard::SummaryLargeImage);
        assert!(settings.seo_enable_jsonld);
        assert!(settings.sitemap_enable);
        assert!(!settings.cleanup_on_uninstall);
        assert_eq!(settings.sitemap_post_types, vec!["post", "page"]);
        assert!(settings.sitemap_exclude_ids.is_empty());
        // robots.txt stays raw in the snapshot: empty means pass-through
        assert!(settings.robots_txt.is_empty());
    }

    #[test]
    fn test_empty_stored_text_falls_back() {
        let site = make_site();
        let mut values = BTreeMap::new();
        values.insert(SettingKey::OgSiteName, SettingValue::Text(String::new()));

        let settings = Settings::from_values(&values, &site);
        assert_eq!(settings.og_site_name, "Example");
    }

    #[test]
    fn test_robots_txt_kept_verbatim() {
        let site = make_site();
        let mut values = BTreeMap::new();
        values.insert(
            SettingKey::RobotsTxt,
            SettingValue::Text("User-agent: *\nDisallow: /\n".into()),
        );

        let settings = Settings::from_values(&values, &site);
        assert_eq!(settings.robots_txt, "User-agent: *\nDisallow: /\n");
    }

    #[test]
    fn test_robots_key_default_is_generated_text() {
        let site = make_site();
        let default = SettingKey::RobotsTxt.default_value(&site);
        let text = default.as_text().unwrap();
        assert!(text.starts_with("User-agent: *"));
        assert!(text.contains("Sitemap: https://example.com/sitemap.xml"));
    }

    #[test]
    fn test_invalid_enum_text_falls_back() {
        let site = make_site();
        let mut values = BTreeMap::new();
        values.insert(SettingKey::OgDefaultType, SettingValue::Text("book".into()));
        values.insert(SettingKey::OgTwitterCard, SettingValue::Text("player".into()));

        let settings = Settings::from_values(&values, &site);
        assert_eq!(settings.og_default_type, OgType::Article);
        assert_eq!(settings.og_twitter_card, TwitterCard::SummaryLargeImage);
    }

    #[test]
    fn test_stored_values_win() {
        let site = make_site();
        let mut values = BTreeMap::new();
        values.insert(SettingKey::OgSiteName, SettingValue::Text("Custom".into()));
        values.insert(SettingKey::SeoEnableJsonld, SettingValue::Text("0".into()));
        values.insert(SettingKey::SitemapEnable, SettingValue::Text("0".into()));
        values.insert(
            SettingKey::SitemapPostTypes,
            SettingValue::TextList(vec!["article".into()]),
        );
        values.insert(SettingKey::SitemapExcludeIds, SettingValue::IdList(vec![5]));

        let settings = Settings::from_values(&values, &site);
        assert_eq!(settings.og_site_name, "Custom");
        assert!(!settings.seo_enable_jsonld);
        assert!(!settings.sitemap_enable);
        assert_eq!(settings.sitemap_post_types, vec!["article"]);
        assert_eq!(settings.sitemap_exclude_ids, vec![5]);
    }

    #[test]
    fn test_value_from_input_shapes() {
        let value = SettingKey::SitemapPostTypes
            .value_from_input("post, page , docs")
            .unwrap();
        assert_eq!(
            value,
            SettingValue::TextList(vec!["post".into(), "page".into(), "docs".into()])
        );

        let value = SettingKey::SitemapExcludeIds.value_from_input("1,5, 9").unwrap();
        assert_eq!(value, SettingValue::IdList(vec![1, 5, 9]));

        assert!(SettingKey::SitemapExcludeIds.value_from_input("1,x").is_err());

        let value = SettingKey::OgSiteName.value_from_input("My Site").unwrap();
        assert_eq!(value, SettingValue::Text("My Site".into()));
    }

    #[test]
    fn test_default_robots_trims_trailing_slash() {
        let mut site = make_site();
        site.url = "https://example.com/".into();
        assert!(default_robots(&site).contains("Sitemap: https://example.com/sitemap.xml"));
    }
}
