use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use crate::collector::CollectorId;

/// Configuration for a single collector (e.g., API key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub api_key: String,
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Example TOML:
    /// [collectors.openweather]
    /// api_key = "..."
    pub collectors: HashMap<String, CollectorConfig>,

    /// Currencies always shown before the country's own ones.
    pub currencies: Vec<String>,

    /// Per-request HTTP timeout.
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            collectors: HashMap::new(),
            currencies: vec!["USD".to_string(), "EUR".to_string()],
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load config from disk and apply environment overrides.
    ///
    /// A missing file is not an error: the defaults are used instead.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load only what is stored on disk, without environment overrides.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Replace API keys with values found through `lookup` (normally the
    /// process environment), keyed by [`CollectorId::env_var`].
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for id in CollectorId::all() {
            if let Some(key) = lookup(id.env_var()).filter(|key| !key.trim().is_empty()) {
                self.upsert_api_key(*id, key.trim().to_string());
            }
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "locinfo", "locinfo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the API key of a collector.
    pub fn upsert_api_key(&mut self, id: CollectorId, api_key: String) {
        self.collectors.insert(id.as_str().to_string(), CollectorConfig { api_key });
    }

    /// Returns API key for a collector, if present.
    pub fn api_key(&self, id: CollectorId) -> Option<&str> {
        self.collectors.get(id.as_str()).map(|cfg| cfg.api_key.as_str())
    }

    #[cfg(test)]
    pub(crate) fn is_configured(&self, id: CollectorId) -> bool {
        self.api_key(id).is_some()
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}
