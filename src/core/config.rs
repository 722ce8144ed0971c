use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default = "ProviderConfig::default_base_url")]
    pub base_url: String,
    pub app_id: String,
}

impl ProviderConfig {
    fn default_base_url() -> String {
        "https://openexchangerates.org/api".to_string()
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_freshness_minutes")]
    pub freshness_minutes: u32,
    /// Return an expired table when a refresh fails instead of the error.
    #[serde(default)]
    pub serve_stale_on_error: bool,
}

impl CacheConfig {
    fn default_freshness_minutes() -> u32 {
        60
    }

    pub fn freshness(&self) -> chrono::Duration {
        chrono::Duration::minutes(i64::from(self.freshness_minutes))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            freshness_minutes: Self::default_freshness_minutes(),
            serve_stale_on_error: false,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "AppConfig::default_history_days")]
    pub history_days: u32,
    pub data_path: Option<String>,
}

impl AppConfig {
    fn default_history_days() -> u32 {
        5
    }

    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "fxconv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
provider:
  base_url: "http://example.com/api"
  app_id: "secret"
cache:
  freshness_minutes: 15
  serve_stale_on_error: true
history_days: 7
data_path: "/tmp/fxconv"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.base_url, "http://example.com/api");
        assert_eq!(config.provider.app_id, "secret");
        assert_eq!(config.cache.freshness_minutes, 15);
        assert_eq!(config.cache.freshness(), chrono::Duration::minutes(15));
        assert!(config.cache.serve_stale_on_error);
        assert_eq!(config.history_days, 7);
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/fxconv")
        );
    }

    #[test]
    fn test_config_defaults() {
        let yaml_str = r#"
provider:
  app_id: "secret"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.provider.base_url, "https://openexchangerates.org/api");
        assert_eq!(config.cache.freshness(), chrono::Duration::hours(1));
        assert!(!config.cache.serve_stale_on_error);
        assert_eq!(config.history_days, 5);
        assert!(config.data_path.is_none());
    }

    #[test]
    fn test_config_requires_app_id() {
        let yaml_str = r#"
provider:
  base_url: "http://example.com/api"
"#;
        assert!(serde_yaml::from_str::<AppConfig>(yaml_str).is_err());
    }
}
