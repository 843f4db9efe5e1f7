//! Tag rendering: serializes [`ResolvedMeta`] into text outputs.
//!
//! Three independent products: the HTML meta-tag block, the JSON-LD script
//! block, and the robots.txt text. Field order in the meta block is fixed
//! so output diffs stay reproducible:
//!
//! og:site_name, og:locale, og:type, og:title, og:description, og:url,
//! og:image, article:published_time, article:modified_time,
//! article:author, twitter:card, twitter:site, then the SEO tags
//! (description, author, canonical link).

use super::resolve::ResolvedMeta;
use std::borrow::Cow;
use std::fmt::Write;

// ============================================================================
// Public API
// ============================================================================

/// Render the meta-tag block, one line per non-omitted field.
pub fn meta_tags(meta: &ResolvedMeta) -> String {
    let mut out = String::with_capacity(1024);

    push_property(&mut out, "og:site_name", &meta.site_name);
    push_property(&mut out, "og:locale", &meta.locale);
    push_property(&mut out, "og:type", &meta.og_type);
    if let Some(title) = &meta.title {
        push_property(&mut out, "og:title", title);
    }
    if let Some(description) = &meta.description {
        push_property(&mut out, "og:description", description);
    }
    if let Some(url) = meta.url.as_deref().and_then(safe_url) {
        push_property(&mut out, "og:url", url);
    }
    if let Some(image) = meta.image.as_deref().and_then(safe_url) {
        push_property(&mut out, "og:image", image);
    }
    if let Some(article) = &meta.article {
        push_property(&mut out, "article:published_time", &article.published);
        push_property(&mut out, "article:modified_time", &article.modified);
        push_property(&mut out, "article:author", &article.author);
    }
    push_name(&mut out, "twitter:card", &meta.twitter_card);
    if let Some(site) = &meta.twitter_site {
        push_name(&mut out, "twitter:site", site);
    }
    if let Some(description) = &meta.seo_description {
        push_name(&mut out, "description", description);
    }
    if let Some(author) = &meta.author {
        push_name(&mut out, "author", author);
    }
    if let Some(canonical) = meta.canonical.as_deref().and_then(safe_url) {
        let _ = writeln!(
            out,
            r#"<link rel="canonical" href="{}">"#,
            html_escape(canonical)
        );
    }

    out
}

/// Render the JSON-LD script block, if structured data was resolved.
///
/// Slashes and non-ASCII characters are preserved literally in the JSON.
pub fn jsonld_script(meta: &ResolvedMeta) -> Option<String> {
    let jsonld = meta.jsonld.as_ref()?;
    let json = serde_json::to_string(jsonld).unwrap_or_else(|_| "{}".to_string());
    Some(format!(
        "<script type=\"application/ld+json\">{json}</script>\n"
    ))
}

/// The complete head block: meta tags plus the optional JSON-LD script.
pub fn head_block(meta: &ResolvedMeta) -> String {
    let mut out = meta_tags(meta);
    if let Some(script) = jsonld_script(meta) {
        out.push_str(&script);
    }
    out
}

/// robots.txt filter: the stored text verbatim when non-empty, otherwise
/// the upstream default unmodified. No parsing or validation is done.
pub fn filter_robots<'a>(stored: &'a str, upstream: &'a str) -> &'a str {
    if stored.trim().is_empty() { upstream } else { stored }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn push_property(out: &mut String, property: &str, content: &str) {
    let _ = writeln!(
        out,
        r#"<meta property="{property}" content="{}">"#,
        html_escape(content)
    );
}

fn push_name(out: &mut String, name: &str, content: &str) {
    let _ = writeln!(
        out,
        r#"<meta name="{name}" content="{}">"#,
        html_escape(content)
    );
}

/// Escape HTML special characters for attribute context.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub(crate) fn html_escape(s: &str) -> Cow<'_, str> {
    // Fast path: check if escaping is needed
    if !s.contains(['<', '>', '&', '"']) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '&' => result.push_str("&amp;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Accept only URLs safe for href/content attributes: absolute http(s)
/// or root-relative paths. Everything else (javascript:, data:, ...) is
/// rejected and the field omitted.
fn safe_url(s: &str) -> Option<&str> {
    let url = s.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with('/') {
        return Some(url);
    }
    let lower = url.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")).then_some(url)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteInfo;
    use crate::content::{ContentItem, Overrides};
    use crate::meta::resolve::{RenderContext, resolve};
    use crate::settings::Settings;
    use chrono::DateTime;

    fn make_site() -> SiteInfo {
        SiteInfo {
            title: "Example".into(),
            description: "An example site".into(),
            url: "https://example.com".into(),
            language: "en-US".into(),
        }
    }

    fn make_item() -> ContentItem {
        ContentItem {
            id: 1,
            kind: "post".into(),
            title: "Original".into(),
            body: "Some body text".into(),
            excerpt: Some("The excerpt".into()),
            published: DateTime::parse_from_rfc3339("2024-01-15T10:30:45+02:00").unwrap(),
            modified: DateTime::parse_from_rfc3339("2024-02-01T08:00:00+02:00").unwrap(),
            author: "Alice".into(),
            permalink: "https://example.com/original/".into(),
            featured_image: None,
            draft: false,
            overrides: Overrides::default(),
        }
    }

    fn resolve_item(item: &ContentItem) -> crate::meta::ResolvedMeta {
        let site = make_site();
        let settings = Settings::defaults(&site);
        resolve(&RenderContext::Item(item), &settings, &site)
    }

    #[test]
    fn test_override_title_rendered() {
        let mut item = make_item();
        item.overrides.og_title = Some("Custom".into());

        let tags = meta_tags(&resolve_item(&item));
        assert!(tags.contains(r#"<meta property="og:title" content="Custom">"#));
        assert!(!tags.contains("Original"));
    }

    #[test]
    fn test_field_order() {
        let item = make_item();
        let tags = meta_tags(&resolve_item(&item));

        let expected_order = [
            "og:site_name",
            "og:locale",
            "og:type",
            "og:title",
            "og:description",
            "og:url",
            "article:published_time",
            "article:modified_time",
            "article:author",
            "twitter:card",
            r#"name="description""#,
            r#"name="author""#,
            r#"rel="canonical""#,
        ];
        let positions: Vec<usize> = expected_order
            .iter()
            .map(|needle| tags.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
            .collect();
        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_attribute_escaping() {
        let mut item = make_item();
        item.overrides.og_title = Some(r#"Tom & "Jerry" <3"#.into());

        let tags = meta_tags(&resolve_item(&item));
        assert!(tags.contains("Tom &amp; &quot;Jerry&quot; &lt;3"));
    }

    #[test]
    fn test_unsafe_scheme_omits_field() {
        let mut item = make_item();
        item.overrides.og_image = Some("javascript:alert(1)".into());

        let tags = meta_tags(&resolve_item(&item));
        assert!(!tags.contains("og:image"));
        assert!(!tags.contains("javascript:"));
    }

    #[test]
    fn test_omitted_fields_never_emitted_empty() {
        let site = make_site();
        let mut settings = Settings::defaults(&site);
        settings.og_twitter_site = String::new();
        let mut item = make_item();
        item.excerpt = None;
        item.body = String::new();
        item.featured_image = None;
        let mut site_blank = site.clone();
        site_blank.description = String::new();
        let settings_blank = Settings {
            seo_default_description: String::new(),
            og_default_image: String::new(),
            ..settings
        };

        let meta = resolve(&RenderContext::Item(&item), &settings_blank, &site_blank);
        let tags = meta_tags(&meta);
        assert!(!tags.contains("og:description"));
        assert!(!tags.contains("og:image"));
        assert!(!tags.contains("twitter:site"));
        assert!(!tags.contains(r#"content="""#));
        // site name and locale stay, even for sparse metadata
        assert!(tags.contains("og:site_name"));
        assert!(tags.contains("og:locale"));
    }

    #[test]
    fn test_article_tags_absent_for_website_type() {
        let mut item = make_item();
        item.overrides.og_type = Some("website".into());

        let tags = meta_tags(&resolve_item(&item));
        assert!(!tags.contains("article:"));
    }

    #[test]
    fn test_jsonld_script_shape() {
        let item = make_item();
        let script = jsonld_script(&resolve_item(&item)).unwrap();

        assert!(script.starts_with("<script type=\"application/ld+json\">"));
        assert!(script.trim_end().ends_with("</script>"));
        assert!(script.contains(r#""@context":"https://schema.org""#));
        assert!(script.contains(r#""@type":"Article""#));
        assert!(script.contains(r#""headline":"Original""#));
        assert!(script.contains(r#""datePublished":"2024-01-15T10:30:45+02:00""#));
        assert!(script.contains(r#""author":{"@type":"Person","name":"Alice"}"#));
    }

    #[test]
    fn test_jsonld_preserves_slashes_and_unicode() {
        let mut item = make_item();
        item.title = "Ünïcode / slashes".into();

        let script = jsonld_script(&resolve_item(&item)).unwrap();
        // No \/ escaping, no \uXXXX escaping of non-ASCII
        assert!(script.contains(r#""headline":"Ünïcode / slashes""#));
        assert!(!script.contains(r"\/"));
        assert!(!script.contains(r"\u00"));
    }

    #[test]
    fn test_head_block_combines_tags_and_jsonld() {
        let item = make_item();
        let block = head_block(&resolve_item(&item));

        assert!(block.contains("og:title"));
        assert!(block.contains("application/ld+json"));
        let tags_end = block.find("application/ld+json").unwrap();
        assert!(block[..tags_end].contains("rel=\"canonical\""));
    }

    #[test]
    fn test_filter_robots_passthrough() {
        let upstream = "User-agent: *\nDisallow: /private/\n";
        assert_eq!(filter_robots("", upstream), upstream);
        assert_eq!(filter_robots("   \n", upstream), upstream);

        let stored = "User-agent: *\nDisallow: /\n";
        assert_eq!(filter_robots(stored, upstream), stored);
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html_escape("hello"), "hello");
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
        assert_eq!(html_escape("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_safe_url() {
        assert_eq!(safe_url("https://example.com/a"), Some("https://example.com/a"));
        assert_eq!(safe_url("HTTP://EXAMPLE.COM"), Some("HTTP://EXAMPLE.COM"));
        assert_eq!(safe_url("/relative/path"), Some("/relative/path"));
        assert_eq!(safe_url("javascript:alert(1)"), None);
        assert_eq!(safe_url("data:text/html,x"), None);
        assert_eq!(safe_url("ftp://example.com"), None);
        assert_eq!(safe_url(""), None);
    }
}
