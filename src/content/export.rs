//! Content source backed by a JSON export of the CMS content.
//!
//! The export is a snapshot the hosting CMS writes out; this tool treats
//! it as the content repository. Overrides are the only thing ever written
//! back, and only by the uninstall contract.

use super::{ContentError, ContentItem, ContentSource, ContentSummary, Overrides};
use chrono::{DateTime, FixedOffset};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// On-disk export layout.
#[derive(Debug, Serialize, Deserialize)]
struct Export {
    items: Vec<ContentItem>,
}

/// Content source over a JSON export file.
#[derive(Debug)]
pub struct ExportSource {
    path: Option<PathBuf>,
    items: RwLock<Vec<ContentItem>>,
}

impl ExportSource {
    /// Load an export file.
    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let content =
            fs::read_to_string(path).map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
        let export: Export = serde_json::from_str(&content)?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            items: RwLock::new(export.items),
        })
    }

    /// In-memory source without file backing.
    #[allow(dead_code)] // Test constructor
    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self {
            path: None,
            items: RwLock::new(items),
        }
    }

    /// All published items with full data, for listings.
    pub fn published_items(&self) -> Vec<ContentItem> {
        self.items
            .read()
            .iter()
            .filter(|item| !item.draft)
            .cloned()
            .collect()
    }
}

impl ContentSource for ExportSource {
    fn item(&self, id: u64) -> Result<Option<ContentItem>, ContentError> {
        Ok(self.items.read().iter().find(|item| item.id == id).cloned())
    }

    fn published(&self, kind: &str) -> Result<Vec<ContentSummary>, ContentError> {
        Ok(self
            .items
            .read()
            .iter()
            .filter(|item| !item.draft && item.kind == kind)
            .map(ContentItem::summary)
            .collect())
    }

    fn last_modified(&self) -> Result<Option<DateTime<FixedOffset>>, ContentError> {
        Ok(self
            .items
            .read()
            .iter()
            .filter(|item| !item.draft)
            .map(|item| item.modified)
            .max())
    }

    fn clear_overrides(&self) -> Result<(), ContentError> {
        let mut items = self.items.write();
        for item in items.iter_mut() {
            item.overrides = Overrides::default();
        }

        if let Some(path) = &self.path {
            let export = Export {
                items: (*items).clone(),
            };
            let json = serde_json::to_string_pretty(&export)?;
            fs::write(path, json).map_err(|err| ContentError::Io(path.clone(), err))?;
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
