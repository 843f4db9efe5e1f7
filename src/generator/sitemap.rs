//! Sitemap generation.
//!
//! Generates a sitemap.xml document listing the home page and all
//! published content for search engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2025-01-01T00:00:00+00:00</lastmod>
//!     <changefreq>daily</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```
//!
//! Entry order: home page first, then content grouped by configured type
//! in configured order, each group most-recently-modified first.

use crate::config::SiteInfo;
use crate::content::{ContentError, ContentSource};
use crate::settings::Settings;
use crate::utils::date::to_iso8601;
use std::borrow::Cow;
use thiserror::Error;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Home entry crawl hints.
const HOME_PRIORITY: &str = "1.0";
const HOME_CHANGEFREQ: &str = "daily";
/// Page-like content changes rarely but matters.
const PAGE_PRIORITY: &str = "0.8";
const PAGE_CHANGEFREQ: &str = "monthly";
/// Everything else.
const POST_PRIORITY: &str = "0.6";
const POST_CHANGEFREQ: &str = "weekly";

// ============================================================================
// Errors
// ============================================================================

/// Sitemap generation outcomes that are not a document.
#[derive(Debug, Error)]
pub enum SitemapError {
    /// Expected condition: the sitemap feature is switched off. Callers
    /// render a "not available" response, not a server error.
    #[error("sitemap generation is disabled")]
    Disabled,

    /// The content repository could not be enumerated. No partial
    /// document is ever produced.
    #[error("content source failed")]
    Content(#[from] ContentError),
}

// ============================================================================
// Public API
// ============================================================================

/// Generate the sitemap XML document.
pub fn build_sitemap(
    settings: &Settings,
    site: &SiteInfo,
    source: &dyn ContentSource,
) -> Result<String, SitemapError> {
    let sitemap = Sitemap::build(settings, site, source)?;
    Ok(sitemap.into_xml())
}

// ============================================================================
// Sitemap Implementation
// ============================================================================

/// Sitemap data structure
struct Sitemap {
    urls: Vec<UrlEntry>,
}

/// Single URL entry in the sitemap
struct UrlEntry {
    loc: String,
    lastmod: Option<String>,
    changefreq: &'static str,
    priority: &'static str,
}

impl Sitemap {
    /// Enumerate eligible content and apply filtering/exclusion/ordering.
    fn build(
        settings: &Settings,
        site: &SiteInfo,
        source: &dyn ContentSource,
    ) -> Result<Self, SitemapError> {
        if !settings.sitemap_enable {
            return Err(SitemapError::Disabled);
        }

        let mut urls = vec![UrlEntry {
            loc: site.url.clone(),
            lastmod: source.last_modified()?.as_ref().map(to_iso8601),
            changefreq: HOME_CHANGEFREQ,
            priority: HOME_PRIORITY,
        }];

        for kind in &settings.sitemap_post_types {
            let mut items = source.published(kind)?;
            items.retain(|item| !settings.sitemap_exclude_ids.contains(&item.id));
            items.sort_by(|a, b| b.modified.cmp(&a.modified));

            let (priority, changefreq) = if kind == "page" {
                (PAGE_PRIORITY, PAGE_CHANGEFREQ)
            } else {
                (POST_PRIORITY, POST_CHANGEFREQ)
            };

            urls.extend(items.into_iter().map(|item| UrlEntry {
                loc: item.permalink,
                lastmod: Some(to_iso8601(&item.modified)),
                changefreq,
                priority,
            }));
        }

        Ok(Self { urls })
    }

    /// Generate sitemap XML string.
    fn into_xml(self) -> String {
        let mut xml = String::with_capacity(4096);

        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"");
        xml.push_str(SITEMAP_NS);
        xml.push_str("\">\n");

        for entry in self.urls {
            xml.push_str("  <url>\n    <loc>");
            xml.push_str(&escape_xml(&entry.loc));
            xml.push_str("</loc>\n");
            if let Some(lastmod) = entry.lastmod {
                xml.push_str("    <lastmod>");
                xml.push_str(&lastmod);
                xml.push_str("</lastmod>\n");
            }
            xml.push_str("    <changefreq>");
            xml.push_str(entry.changefreq);
            xml.push_str("</changefreq>\n    <priority>");
            xml.push_str(entry.priority);
            xml.push_str("</priority>\n  </url>\n");
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Escape special XML characters.
fn escape_xml(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(s);
    }

    Cow::Owned(
        s.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
            .replace('\'', "&apos;"),
    )
}

// ============================================================================
// Tests
// ============================================================================
