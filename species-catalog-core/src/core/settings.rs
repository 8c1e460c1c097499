//! Catalog settings persistence.
//!
//! Stores the catalog location and UI routing preferences in a JSON file at
//! an OS-appropriate location.

use crate::{PurgeStrategy, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted catalog settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// Path of the SQLite catalog file.
    pub database_path: String,
    /// Route prefix of the full-detail page; the record ID is appended.
    pub detail_route_prefix: String,
    /// How many operation log entries to keep.
    pub operation_log_keep_last: usize,
    /// When set, operations are kept for this many days instead of by count.
    pub operation_log_retention_days: Option<u32>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            database_path: default_database_path().to_string_lossy().to_string(),
            detail_route_prefix: "/species".to_string(),
            operation_log_keep_last: 1000,
            operation_log_retention_days: None,
        }
    }
}

impl CatalogSettings {
    /// The operation log retention these settings select.
    pub fn purge_strategy(&self) -> PurgeStrategy {
        match self.operation_log_retention_days {
            Some(retention_days) => PurgeStrategy::KeepDays { retention_days },
            None => PurgeStrategy::LocalOnly { keep_last: self.operation_log_keep_last },
        }
    }
}

/// Returns the path to the settings JSON file.
///
/// - macOS / Linux: `~/.config/species-catalog/settings.json`
/// - Windows: `%APPDATA%/SpeciesCatalog/settings.json`
pub fn settings_file_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("SpeciesCatalog").join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("species-catalog").join("settings.json")
    }
}

/// Returns the default catalog file: `<data dir>/species-catalog/catalog.db`.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
                .join("share")
        })
        .join("species-catalog")
        .join("catalog.db")
}

/// Loads settings from the default location.
pub fn load_settings() -> CatalogSettings {
    load_settings_from(&settings_file_path())
}

/// Loads settings from `path`; returns defaults if the file is missing or corrupt.
/// Keys absent from the file take their default values.
pub fn load_settings_from(path: &Path) -> CatalogSettings {
    match fs::read_to_string(path) {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
            log::warn!("ignoring corrupt settings file {}: {e}", path.display());
            CatalogSettings::default()
        }),
        Err(_) => CatalogSettings::default(),
    }
}

/// Saves settings to the default location.
pub fn save_settings(settings: &CatalogSettings) -> Result<()> {
    save_settings_to(&settings_file_path(), settings)
}

/// Saves settings to `path`, creating parent directories as needed.
pub fn save_settings_to(path: &Path, settings: &CatalogSettings) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
