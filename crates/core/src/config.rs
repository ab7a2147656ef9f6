//! Application configuration.
//!
//! Settings come from a TOML file under the user config directory, layered
//! with `PHOENIX_`-prefixed environment variables (`PHOENIX_IGDB__CLIENT_ID`
//! overrides `igdb.client_id`). Provider credentials live here and nowhere
//! else.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::provider::IgdbCredentials;

/// Directory name used under the user's config, data and cache roots.
pub const APP_DIR: &str = "phoenix";

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path of the persisted game collection file.
    pub library_path: PathBuf,
    /// Directory holding cached header images.
    pub cache_dir: PathBuf,
    /// IGDB credentials forwarded with every provider request.
    pub igdb: IgdbCredentials,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_root = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        let cache_root = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR);
        Self {
            library_path: data_root.join("games.json"),
            cache_dir: cache_root.join("headers"),
            igdb: IgdbCredentials::default(),
        }
    }
}

impl AppConfig {
    /// Location of the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
            .join("config.toml")
    }

    /// Load configuration, layering file contents and environment overrides
    /// over the defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from an explicit file path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let defaults = AppConfig::default();
        let settings = Config::builder()
            .set_default(
                "library_path",
                defaults.library_path.to_string_lossy().as_ref(),
            )?
            .set_default("cache_dir", defaults.cache_dir.to_string_lossy().as_ref())?
            .set_default("igdb.client_id", "")?
            .set_default("igdb.access_token", "")?
            .add_source(File::from(path.into()).required(false))
            .add_source(Environment::with_prefix("PHOENIX").separator("__"))
            .build()
            .context("failed to read configuration")?;
        settings
            .try_deserialize()
            .context("failed to parse configuration")
    }
}

/// Write a default configuration file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let path = AppConfig::config_path();
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let serialized = toml::to_string_pretty(&AppConfig::default())
        .context("failed to serialize default configuration")?;
    fs::write(&path, serialized)
        .with_context(|| format!("failed to write {}", path.display()))
}
