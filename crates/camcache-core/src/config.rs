//! Application configuration management.
//!
//! The configuration decides where the local camera store lives and how slow
//! the simulated remote service is. It is stored at
//! `~/.config/camcache/config.json`; environment variables override it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::source::remote::DEFAULT_SERVICE_LATENCY_MS;

/// Application name used for config/data directory paths
const APP_NAME: &str = "camcache";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// File backing the simulated remote service, inside the data directory
const REMOTE_FILE: &str = "remote.json";

/// Overrides the local store directory
pub const ENV_DATA_DIR: &str = "CAMCACHE_DATA_DIR";

/// Overrides the simulated remote latency, in milliseconds
pub const ENV_REMOTE_LATENCY_MS: &str = "CAMCACHE_REMOTE_LATENCY_MS";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub remote_latency_ms: Option<u64>,
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

fn default_seed_demo_data() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            remote_latency_ms: None,
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.is_empty()) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(raw) = lookup(ENV_REMOTE_LATENCY_MS) {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.remote_latency_ms = Some(ms),
                Err(e) => warn!(value = %raw, error = %e, "Ignoring invalid remote latency"),
            }
        }
    }

    /// Directory of the local camera store.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn remote_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(REMOTE_FILE))
    }

    pub fn remote_latency(&self) -> Duration {
        Duration::from_millis(self.remote_latency_ms.unwrap_or(DEFAULT_SERVICE_LATENCY_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.seed_demo_data);
        assert_eq!(
            config.remote_latency(),
            Duration::from_millis(DEFAULT_SERVICE_LATENCY_MS)
        );
    }

    #[test]
    fn test_missing_file_gives_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert!(config.data_dir.is_none());
        assert!(config.seed_demo_data);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE);
        let config = Config {
            data_dir: Some(PathBuf::from("/tmp/cams")),
            remote_latency_ms: Some(10),
            seed_demo_data: false,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.data_dir, Some(PathBuf::from("/tmp/cams")));
        assert_eq!(loaded.remote_latency(), Duration::from_millis(10));
        assert!(!loaded.seed_demo_data);
    }

    #[test]
    fn test_partial_file_uses_field_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, r#"{"remote_latency_ms": 0}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.remote_latency(), Duration::ZERO);
        assert!(loaded.seed_demo_data);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(lookup(&[
            (ENV_DATA_DIR, "/srv/cams"),
            (ENV_REMOTE_LATENCY_MS, "250"),
        ]));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/srv/cams"));
        assert_eq!(
            config.remote_path().unwrap(),
            PathBuf::from("/srv/cams").join(REMOTE_FILE)
        );
        assert_eq!(config.remote_latency(), Duration::from_millis(250));
    }

    #[test]
    fn test_invalid_latency_override_is_ignored() {
        let mut config = Config {
            remote_latency_ms: Some(42),
            ..Config::default()
        };
        config.apply_env_overrides(lookup(&[(ENV_REMOTE_LATENCY_MS, "soon")]));
        assert_eq!(config.remote_latency_ms, Some(42));
    }
}
