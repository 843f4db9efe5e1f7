//! Settings persistence: the store trait and its implementations.
//!
//! The store is a flat key → value table with replace-on-write semantics.
//! `JsonStore` is the file-backed implementation with lazy creation and a
//! read-through cache that is invalidated on every write; `MemoryStore`
//! backs tests and ephemeral runs.

use super::{SettingKey, SettingValue};
use crate::config::SiteInfo;
use crate::content::ContentSource;
use anyhow::Result;
use parking_lot::RwLock;
use std::{collections::BTreeMap, fs, path::PathBuf};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Settings store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Settings data parsing error")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Store Trait
// ============================================================================

/// Key/value persistence for settings.
///
/// Writes replace the whole value for a key (last writer wins); reads of
/// unset keys return `Ok(None)` so callers can substitute defaults.
pub trait SettingsStore {
    /// Create the backing table/file if it does not exist yet. Idempotent.
    fn ensure_initialized(&self) -> Result<(), StoreError>;

    /// Read a single setting. `Ok(None)` means "use the default".
    fn get(&self, key: SettingKey) -> Result<Option<SettingValue>, StoreError>;

    /// Read every stored setting.
    fn get_all(&self) -> Result<BTreeMap<SettingKey, SettingValue>, StoreError>;

    /// Store a setting, replacing any previous value.
    fn set(&self, key: SettingKey, value: SettingValue) -> Result<(), StoreError>;

    /// Remove a stored setting, reverting reads to the default.
    fn delete(&self, key: SettingKey) -> Result<(), StoreError>;
}

// ============================================================================
// In-Memory Store
// ============================================================================

/// Volatile store for tests and ephemeral runs.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<BTreeMap<SettingKey, SettingValue>>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn ensure_initialized(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn get(&self, key: SettingKey) -> Result<Option<SettingValue>, StoreError> {
        Ok(self.values.read().get(&key).cloned())
    }

    fn get_all(&self) -> Result<BTreeMap<SettingKey, SettingValue>, StoreError> {
        Ok(self.values.read().clone())
    }

    fn set(&self, key: SettingKey, value: SettingValue) -> Result<(), StoreError> {
        self.values.write().insert(key, value);
        Ok(())
    }

    fn delete(&self, key: SettingKey) -> Result<(), StoreError> {
        self.values.write().remove(&key);
        Ok(())
    }
}

// ============================================================================
// File-Backed Store
// ============================================================================

/// File-backed store over a flat JSON object.
///
/// The file is created lazily on first use. A read-through cache keeps the
/// parsed map for the lifetime of the store instance and is cleared by
/// every write, mirroring replace/upsert semantics of a settings table.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    cache: RwLock<Option<BTreeMap<SettingKey, SettingValue>>>,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: RwLock::new(None),
        }
    }

    /// Read the full map, through the cache.
    fn read_map(&self) -> Result<BTreeMap<SettingKey, SettingValue>, StoreError> {
        // Fast path: cached (read lock only)
        if let Some(map) = self.cache.read().as_ref() {
            return Ok(map.clone());
        }

        self.ensure_initialized()?;
        let content = fs::read_to_string(&self.path)
            .map_err(|err| StoreError::Io(self.path.clone(), err))?;
        let raw: BTreeMap<String, SettingValue> = serde_json::from_str(&content)?;

        // Keys are a fixed enumeration; anything else in the file is ignored
        let map: BTreeMap<SettingKey, SettingValue> = raw
            .into_iter()
            .filter_map(|(key, value)| SettingKey::parse(&key).map(|key| (key, value)))
            .collect();

        *self.cache.write() = Some(map.clone());
        Ok(map)
    }

    /// Write the full map and invalidate the cache.
    fn write_map(&self, map: &BTreeMap<SettingKey, SettingValue>) -> Result<(), StoreError> {
        let raw: BTreeMap<&str, &SettingValue> =
            map.iter().map(|(key, value)| (key.as_str(), value)).collect();
        let json = serde_json::to_string_pretty(&raw)?;

        fs::write(&self.path, json).map_err(|err| StoreError::Io(self.path.clone(), err))?;
        *self.cache.write() = None;
        Ok(())
    }
}

impl SettingsStore for JsonStore {
    fn ensure_initialized(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| StoreError::Io(self.path.clone(), err))?;
        }
        fs::write(&self.path, "{}").map_err(|err| StoreError::Io(self.path.clone(), err))
    }

    fn get(&self, key: SettingKey) -> Result<Option<SettingValue>, StoreError> {
        Ok(self.read_map()?.get(&key).cloned())
    }

    fn get_all(&self) -> Result<BTreeMap<SettingKey, SettingValue>, StoreError> {
        self.read_map()
    }

    fn set(&self, key: SettingKey, value: SettingValue) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        map.insert(key, value);
        self.write_map(&map)
    }

    fn delete(&self, key: SettingKey) -> Result<(), StoreError> {
        let mut map = self.read_map()?;
        map.remove(&key);
        self.write_map(&map)
    }
}

// ============================================================================
// Lifecycle Operations
// ============================================================================

/// Seed every missing key with its default value. Idempotent; already
/// stored values are left untouched.
pub fn initialize_defaults(store: &dyn SettingsStore, site: &SiteInfo) -> Result<(), StoreError> {
    store.ensure_initialized()?;
    for key in SettingKey::ALL {
        if store.get(key)?.is_none() {
            store.set(key, key.default_value(site))?;
        }
    }
    Ok(())
}

/// Run the uninstall contract.
///
/// When `cleanup_on_uninstall` is enabled, removes every persisted setting
/// and every per-content override. Returns whether cleanup ran.
pub fn uninstall(store: &dyn SettingsStore, source: &dyn ContentSource) -> Result<bool> {
    let cleanup = store
        .get(SettingKey::CleanupOnUninstall)?
        .is_some_and(|value| value.is_enabled());
    if !cleanup {
        return Ok(false);
    }

    for key in SettingKey::ALL {
        store.delete(key)?;
    }
    source.clear_overrides()?;

    Ok(true)
}

// ============================================================================
// Tests
// ============================================================================
