//! Configuration management for UtiliCraft Markdown
//!
//! Handles loading, saving, and managing configuration. Configuration is
//! persisted as JSON under the user's configuration directory; every field
//! has a default so partial files are accepted.

use crate::error::{ConfigError, ConfigResult};
use crate::theme::ThemeState;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier following reverse-DNS convention
pub const APP_ID: &str = "com.utilicraft.Markdown";

/// Persisted preference key holding the theme name
pub const THEME_STORAGE_KEY: &str = "utilicraft-theme";

/// Persisted preference key holding the outer page view mode
pub const VIEW_STORAGE_KEY: &str = "utilicraft-view";

/// Parent theme polling interval in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Class added to every rendered table
pub const DEFAULT_TABLE_CLASS: &str = "markdown-table";

/// PDF page margin in millimetres
pub const DEFAULT_PDF_MARGIN_MM: f32 = 10.0;

/// PDF rasterization scale factor
pub const DEFAULT_PDF_SCALE: f32 = 2.0;

/// Configuration file name inside the configuration directory
const CONFIG_FILE: &str = "config.json";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme synchronization configuration
    pub theme: ThemeConfig,

    /// Render pipeline configuration
    pub render: RenderConfig,

    /// Export configuration
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from the default location or return defaults
    pub fn load() -> ConfigResult<Self> {
        let path = Self::config_dir()?.join(CONFIG_FILE);
        Self::load_from(&path)
    }

    /// Load configuration from a specific file
    ///
    /// A missing file yields the defaults.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            log::debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> ConfigResult<()> {
        let path = Self::config_dir()?.join(CONFIG_FILE);
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::SaveError(e.to_string()))
    }

    /// Get the configuration directory path
    pub fn config_dir() -> ConfigResult<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the data directory path (persisted preferences)
    pub fn data_dir() -> ConfigResult<PathBuf> {
        dirs::data_dir()
            .map(|p| p.join(APP_ID))
            .ok_or(ConfigError::DirectoryError)
    }
}

/// Theme synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Key holding the persisted theme name
    pub storage_key: String,

    /// Key holding the persisted outer page view mode
    pub view_storage_key: String,

    /// Parent polling interval in milliseconds
    pub poll_interval_ms: u64,

    /// Theme used when no source resolves one
    pub default_theme: ThemeState,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            storage_key: THEME_STORAGE_KEY.to_string(),
            view_storage_key: VIEW_STORAGE_KEY.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            default_theme: ThemeState::Dark,
        }
    }
}

/// Render pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Marker class added to tables during post-processing
    pub table_class: String,

    /// Skip the primary parser even when it is available
    pub force_fallback: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            table_class: DEFAULT_TABLE_CLASS.to_string(),
            force_fallback: false,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Document title; also used as the file stem when set
    pub title: Option<String>,

    /// Include a table of contents in HTML exports
    pub include_toc: bool,

    /// PDF page margin in millimetres (applied to all sides)
    pub pdf_margin_mm: f32,

    /// PDF rasterization scale factor
    pub pdf_scale: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            title: None,
            include_toc: false,
            pdf_margin_mm: DEFAULT_PDF_MARGIN_MM,
            pdf_scale: DEFAULT_PDF_SCALE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme.storage_key, "utilicraft-theme");
        assert_eq!(config.theme.default_theme, ThemeState::Dark);
        assert_eq!(config.render.table_class, "markdown-table");
        assert!(!config.render.force_fallback);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config.export.pdf_scale, deserialized.export.pdf_scale);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"theme": {"poll_interval_ms": 250}}"#).unwrap();
        assert_eq!(config.theme.poll_interval_ms, 250);
        assert_eq!(config.theme.view_storage_key, "utilicraft-view");
        assert_eq!(config.export.pdf_margin_mm, DEFAULT_PDF_MARGIN_MM);
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.theme.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let mut config = Config::default();
        config.export.include_toc = true;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert!(loaded.export.include_toc);
    }

    #[test]
    fn test_malformed_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseError(_))));
    }
}
