//! Content model and the read-only content source boundary.
//!
//! The hosting CMS owns titles, bodies, excerpts, authorship, timestamps
//! and the taxonomy of post types. This module defines the slice of that
//! data the resolver and sitemap generator consume, plus the
//! [`ContentSource`] trait the hosting side implements.

pub mod export;

use crate::utils::date::{deserialize_rfc3339, serialize_rfc3339};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Content repository errors
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Content export parsing error")]
    Parse(#[from] serde_json::Error),
}

// ============================================================================
// Content Model
// ============================================================================

/// Per-item metadata overrides.
///
/// When present and non-empty, an override wins over every other source
/// for its field. An empty string is equivalent to no override.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Overrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub og_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_description: Option<String>,
}

impl Overrides {
    pub fn is_empty(&self) -> bool {
        self.og_title.is_none()
            && self.og_description.is_none()
            && self.og_image.is_none()
            && self.og_type.is_none()
            && self.seo_description.is_none()
    }
}

/// One addressable document (post, page, or other content type).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u64,

    /// Content type category (e.g., "post", "page").
    pub kind: String,

    pub title: String,

    /// Body text, consumed only for the truncated description fallback.
    #[serde(default)]
    pub body: String,

    /// Hand-written excerpt, if the author provided one.
    #[serde(default)]
    pub excerpt: Option<String>,

    #[serde(
        deserialize_with = "deserialize_rfc3339",
        serialize_with = "serialize_rfc3339"
    )]
    pub published: DateTime<FixedOffset>,

    #[serde(
        deserialize_with = "deserialize_rfc3339",
        serialize_with = "serialize_rfc3339"
    )]
    pub modified: DateTime<FixedOffset>,

    /// Author display name.
    #[serde(default)]
    pub author: String,

    /// Canonical URL.
    pub permalink: String,

    /// Featured image URL at the "large" render size, if one is set.
    #[serde(default)]
    pub featured_image: Option<String>,

    /// Draft items are excluded from the sitemap and listings.
    #[serde(default)]
    pub draft: bool,

    #[serde(default, skip_serializing_if = "Overrides::is_empty")]
    pub overrides: Overrides,
}

impl ContentItem {
    /// Lightweight sitemap row for this item.
    pub fn summary(&self) -> ContentSummary {
        ContentSummary {
            id: self.id,
            permalink: self.permalink.clone(),
            modified: self.modified,
        }
    }
}

/// Lightweight row for sitemap enumeration.
///
/// Carries only what a `<url>` entry needs, so sources never have to load
/// bodies, excerpts or taxonomy data for sitemap requests.
#[derive(Debug, Clone)]
pub struct ContentSummary {
    pub id: u64,
    pub permalink: String,
    pub modified: DateTime<FixedOffset>,
}

// ============================================================================
// Content Source Boundary
// ============================================================================

/// Read-only access to the hosting CMS content repository.
pub trait ContentSource {
    /// Fetch a single item with its full data, including overrides.
    fn item(&self, id: u64) -> Result<Option<ContentItem>, ContentError>;

    /// All published (non-draft) items of one content type, as sitemap rows.
    /// No ordering is guaranteed; callers sort.
    fn published(&self, kind: &str) -> Result<Vec<ContentSummary>, ContentError>;

    /// Most recent modification timestamp across all published content,
    /// regardless of type. `None` when nothing is published.
    fn last_modified(&self) -> Result<Option<DateTime<FixedOffset>>, ContentError>;

    /// Remove every per-item override. Used by the uninstall contract only.
    fn clear_overrides(&self) -> Result<(), ContentError>;
}

// ============================================================================
// Tests
// ============================================================================
