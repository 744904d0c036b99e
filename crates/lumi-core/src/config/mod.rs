//! Configuration management for Lumi.
//!
//! This module handles loading, saving, and managing bridge configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/lumi/config.toml` |
//! | macOS | `~/Library/Application Support/de.lumi.Lumi/config.toml` |
//! | Windows | `%APPDATA%\lumi\Lumi\config\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use lumi_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Packages use .{}", config.export.package_extension);
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for Lumi.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage locations
    pub paths: PathsConfig,
    /// Export dialog and package settings
    pub export: ExportConfig,
    /// Local web bridge settings
    pub web: WebConfig,
}

/// Storage locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding stored content
    pub content_dir: PathBuf,
    /// File persisting UI state between runs
    pub state_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let data_dir = Config::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            content_dir: data_dir.join("content"),
            state_file: data_dir.join("state.json"),
        }
    }
}

/// Export dialog and package settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Extension every package must carry (without the dot)
    pub package_extension: String,
    /// Format name shown in the file type filter
    pub format_name: String,
    /// Suggested filename when content has no title
    pub fallback_filename: String,
    /// Title of the save dialog
    pub dialog_title: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            package_extension: crate::PACKAGE_EXTENSION.to_string(),
            format_name: "H5P package".to_string(),
            fallback_filename: crate::DEFAULT_FALLBACK_FILENAME.to_string(),
            dialog_title: "Save H5P".to_string(),
        }
    }
}

/// Local web bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Port to listen on
    pub port: u16,
    /// Bind to localhost only
    pub localhost_only: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_WEB_PORT,
            localhost_only: true,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(&path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("de", "lumi", "Lumi")
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn data_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.export.package_extension, "h5p");
        assert_eq!(config.export.fallback_filename, "untitled");
        assert_eq!(config.web.port, crate::DEFAULT_WEB_PORT);
        assert!(config.web.localhost_only);
        assert!(config.paths.state_file.ends_with("state.json"));
    }

    #[test]
    fn test_config_deserialization_partial() {
        let partial_toml = r#"
[export]
fallback_filename = "lesson"

[web]
port = 9999
"#;

        let config: Config = toml::from_str(partial_toml).expect("parse partial config");

        assert_eq!(config.export.fallback_filename, "lesson");
        assert_eq!(config.web.port, 9999);

        assert_eq!(config.export.package_extension, "h5p");
        assert!(config.web.localhost_only);
    }

    #[test]
    fn test_config_serialization() {
        let toml_str = toml::to_string_pretty(&Config::default()).expect("serialize");

        assert!(toml_str.contains("[paths]"), "Should have [paths] section");
        assert!(toml_str.contains("[export]"), "Should have [export] section");
        assert!(toml_str.contains("[web]"), "Should have [web] section");
    }

    #[test]
    fn test_load_from_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.export.format_name, "H5P package");
    }

    #[test]
    fn test_load_from_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[export\nbroken").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_config_path() {
        assert!(Config::config_path().ends_with("config.toml"));
    }
}
