//! Metadata resolution: the fallback-chain engine.
//!
//! For every field the first non-empty source wins, in this order:
//! per-item override, then the site-wide setting, then a value computed
//! from the content itself. Empty strings and absent values are treated
//! identically (both fall through). Resolution is total: missing upstream
//! data degrades to the home/collection path or to omitted fields, never
//! to an error.

use crate::config::SiteInfo;
use crate::content::ContentItem;
use crate::settings::Settings;
use crate::utils::date::to_iso8601;
use serde::Serialize;

/// Word limit for descriptions computed from the body text.
pub const DESCRIPTION_WORDS: usize = 30;

/// Marker appended when the body was truncated.
pub const ELLIPSIS: &str = "...";

// ============================================================================
// Render Context
// ============================================================================

/// What is being rendered: a single content item, or the home/collection
/// context (also the degradation target when no item is available).
#[derive(Debug, Clone, Copy)]
pub enum RenderContext<'a> {
    Home,
    Item(&'a ContentItem),
}

// ============================================================================
// Resolved Metadata
// ============================================================================

/// article:* companion fields, present only when the resolved og:type is
/// `"article"` on a single-item render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleMeta {
    pub published: String,
    pub modified: String,
    pub author: String,
}

/// schema.org Article payload for the JSON-LD block.
///
/// Its `description` is sourced from the excerpt only and its `image` from
/// the featured image only - both intentionally independent of the
/// og:description / og:image fallback chains.
#[derive(Debug, Clone, Serialize)]
pub struct ArticleLd {
    #[serde(rename = "@context")]
    pub context: &'static str,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub headline: String,
    #[serde(rename = "datePublished")]
    pub date_published: String,
    #[serde(rename = "dateModified")]
    pub date_modified: String,
    pub author: PersonLd,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// schema.org Person record for the article author.
#[derive(Debug, Clone, Serialize)]
pub struct PersonLd {
    #[serde(rename = "@type")]
    pub kind: &'static str,
    pub name: String,
}

impl ArticleLd {
    fn from_item(item: &ContentItem) -> Self {
        Self {
            context: "https://schema.org",
            kind: "Article",
            headline: item.title.clone(),
            date_published: to_iso8601(&item.published),
            date_modified: to_iso8601(&item.modified),
            author: PersonLd {
                kind: "Person",
                name: item.author.clone(),
            },
            image: non_empty_opt(&item.featured_image),
            description: non_empty_opt(&item.excerpt),
        }
    }
}

/// The final chosen value for every emitted field.
///
/// Request-scoped; recomputed per render. `Option` fields are omitted from
/// output when `None` - site name and locale are always emitted.
#[derive(Debug, Clone)]
pub struct ResolvedMeta {
    pub site_name: String,
    pub locale: String,
    pub og_type: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    pub article: Option<ArticleMeta>,
    pub twitter_card: String,
    pub twitter_site: Option<String>,
    pub seo_description: Option<String>,
    pub author: Option<String>,
    pub canonical: Option<String>,
    pub jsonld: Option<ArticleLd>,
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the full metadata set for a render context.
pub fn resolve(ctx: &RenderContext<'_>, settings: &Settings, site: &SiteInfo) -> ResolvedMeta {
    let site_name = non_empty(&settings.og_site_name).unwrap_or_else(|| site.title.clone());
    let locale = site.language.clone();
    let twitter_card = settings.og_twitter_card.as_str().to_string();
    let twitter_site = non_empty(&settings.og_twitter_site);

    match ctx {
        RenderContext::Home => {
            let description = non_empty(&settings.seo_default_description)
                .or_else(|| non_empty(&site.description));

            ResolvedMeta {
                og_type: "website".into(),
                title: non_empty(&site_name),
                description: description.clone(),
                url: non_empty(&site.url),
                image: non_empty(&settings.og_default_image),
                article: None,
                seo_description: description,
                author: None,
                canonical: non_empty(&site.url),
                jsonld: None,
                site_name,
                locale,
                twitter_card,
                twitter_site,
            }
        }
        RenderContext::Item(item) => {
            let og_type = non_empty_opt(&item.overrides.og_type)
                .unwrap_or_else(|| settings.og_default_type.as_str().to_string());

            let article = (og_type == "article").then(|| ArticleMeta {
                published: to_iso8601(&item.published),
                modified: to_iso8601(&item.modified),
                author: item.author.clone(),
            });

            let jsonld = settings
                .seo_enable_jsonld
                .then(|| ArticleLd::from_item(item));

            ResolvedMeta {
                og_type,
                title: non_empty_opt(&item.overrides.og_title)
                    .or_else(|| non_empty(&item.title)),
                description: item_description(&item.overrides.og_description, item, settings),
                url: non_empty(&item.permalink),
                image: non_empty_opt(&item.overrides.og_image)
                    .or_else(|| non_empty_opt(&item.featured_image))
                    .or_else(|| non_empty(&settings.og_default_image)),
                article,
                seo_description: item_description(
                    &item.overrides.seo_description,
                    item,
                    settings,
                ),
                author: non_empty(&item.author),
                canonical: non_empty(&item.permalink),
                jsonld,
                site_name,
                locale,
                twitter_card,
                twitter_site,
            }
        }
    }
}

/// Shared description chain for og:description and the SEO description:
/// override, excerpt, truncated body, site-wide default.
fn item_description(
    override_value: &Option<String>,
    item: &ContentItem,
    settings: &Settings,
) -> Option<String> {
    non_empty_opt(override_value)
        .or_else(|| non_empty_opt(&item.excerpt))
        .or_else(|| {
            let trimmed = trim_words(&item.body, DESCRIPTION_WORDS);
            (!trimmed.is_empty()).then_some(trimmed)
        })
        .or_else(|| non_empty(&settings.seo_default_description))
}

/// First `limit` whitespace-separated words, with an ellipsis marker when
/// the text was actually truncated.
pub fn trim_words(text: &str, limit: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() <= limit {
        words.join(" ")
    } else {
        let mut out = words[..limit].join(" ");
        out.push_str(ELLIPSIS);
        out
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn non_empty_opt(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(String::from)
}

// ============================================================================
// Tests
// ============================================================================
