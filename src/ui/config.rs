//! # Configuration Persistence
//!
//! User configuration stored in `~/.config/dirac-monitor/config.json`.
//!
//! ```json
//! {
//!   "theme": "Nord",
//!   "base_url": "https://dirac.example.org/DIRAC/",
//!   "page_size": 100,
//!   "timeout_secs": 30
//! }
//! ```
//!
//! Every key is optional. Command line flags override what is stored here.

use crate::grid::DEFAULT_PAGE_SIZE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Persisted user configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The name of the selected theme (must match a built-in theme name).
    #[serde(default = "default_theme_name")]
    pub theme: String,

    /// Root URL of the web portal the monitors live under.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Initial grid page size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Per-request HTTP timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_theme_name() -> String {
    "Catppuccin Mocha".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme_name(),
            base_url: None,
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration from disk. Returns `Config::default()` if the file
    /// does not exist or cannot be parsed.
    pub fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "using default configuration");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load configuration from a specific path. Returns `Config::default()` if
    /// the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "dirac-monitor")
            .context("Could not determine config directory")?;
        Ok(dirs.config_dir().join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.theme, "Catppuccin Mocha");
        assert_eq!(config.page_size, 100);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let json = r#"{"base_url": "https://dirac.example.org/DIRAC/"}"#;
        let config: Config = serde_json::from_str(json).expect("deserialize");
        assert_eq!(config.theme, "Catppuccin Mocha");
        assert_eq!(config.page_size, 100);
        assert_eq!(
            config.base_url.as_deref(),
            Some("https://dirac.example.org/DIRAC/")
        );
    }

    #[test]
    fn test_save_to_load_from_roundtrip() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config_path = temp_dir.path().join("subdir").join("config.json");

        let config = Config {
            theme: "Nord".to_string(),
            base_url: Some("https://localhost:8443/DIRAC/".to_string()),
            page_size: 500,
            timeout_secs: 5,
        };

        config.save_to(&config_path).expect("save_to");
        let loaded = Config::load_from(&config_path).expect("load_from");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_from_missing_file_returns_default() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config_path = temp_dir.path().join("does_not_exist.json");

        let loaded = Config::load_from(&config_path).expect("load_from");
        assert_eq!(loaded, Config::default());
    }

    #[test]
    fn test_load_from_invalid_json() {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config_path = temp_dir.path().join("config.json");
        fs::write(&config_path, "{ not json").expect("write");

        let err = Config::load_from(&config_path).expect_err("must fail");
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_deny_unknown_fields() {
        let json = r#"{"theme": "Nord", "unknown_field": true}"#;
        let result: Result<Config, _> = serde_json::from_str(json);
        assert!(result.is_err(), "should reject unknown fields");
    }
}
