//! CloudGrid configuration
//!
//! A single YAML file holds the proxy endpoint, the store backend and the
//! region coordinates used for locality scoring. Every section is optional.
//!
//! ```yaml
//! proxy:
//!   endpoint: http://localhost:1024/spider
//!   username: admin
//!   password: secret
//! store:
//!   backend: file
//!   path: /var/lib/cloudgrid/store.json
//! regions:
//!   ap-northeast-2: { latitude: 37.36, longitude: 126.78 }
//! ```

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_PATH_ENV: &str = "CLOUDGRID_CONFIG_PATH";
pub const PROXY_ENDPOINT_ENV: &str = "CLOUDGRID_PROXY_ENDPOINT";
pub const PROXY_USERNAME_ENV: &str = "CLOUDGRID_PROXY_USERNAME";
pub const PROXY_PASSWORD_ENV: &str = "CLOUDGRID_PROXY_PASSWORD";
pub const STORE_PATH_ENV: &str = "CLOUDGRID_STORE_PATH";

pub const DEFAULT_PROXY_ENDPOINT: &str = "http://localhost:1024/spider";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub proxy: ProxyConfig,
    pub store: StoreConfig,
    pub regions: BTreeMap<String, RegionLocation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PROXY_ENDPOINT.to_string(),
            username: None,
            password: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    #[default]
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// Snapshot file for the `file` backend; see [`StoreConfig::resolved_path`]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Configured path, or `{data_dir}/cloudgrid/store.json`
    pub fn resolved_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cloudgrid")
            .join("store.json")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl Config {
    /// Discover, load and validate the configuration.
    ///
    /// Falls back to defaults when no file is found. Environment overrides are
    /// applied last.
    pub fn discover() -> Result<Self> {
        let mut config = match find_config_file()? {
            Some(path) => Self::load(&path)?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml_str(&content)?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn apply_env_overrides(&mut self) {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = var(PROXY_ENDPOINT_ENV) {
            self.proxy.endpoint = endpoint;
        }
        if let Some(username) = var(PROXY_USERNAME_ENV) {
            self.proxy.username = Some(username);
        }
        if let Some(password) = var(PROXY_PASSWORD_ENV) {
            self.proxy.password = Some(password);
        }
        if let Some(path) = var(STORE_PATH_ENV) {
            self.store.path = Some(PathBuf::from(path));
        }
    }

    pub fn validate(&self) -> Result<()> {
        let endpoint = self.proxy.endpoint.trim();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "proxy.endpoint must be an http(s) URL, got '{}'",
                self.proxy.endpoint
            )));
        }
        if self.proxy.password.is_some() && self.proxy.username.is_none() {
            return Err(ConfigError::Invalid(
                "proxy.password is set without proxy.username".to_string(),
            ));
        }

        for (name, loc) in &self.regions {
            if !(-90.0..=90.0).contains(&loc.latitude) || !(-180.0..=180.0).contains(&loc.longitude) {
                return Err(ConfigError::Invalid(format!(
                    "region '{}' has out-of-range coordinates ({}, {})",
                    name, loc.latitude, loc.longitude
                )));
            }
        }
        Ok(())
    }
}

/// Locate the config file.
///
/// Search order:
/// 1. `CLOUDGRID_CONFIG_PATH` (must exist when set)
/// 2. current directory: `cloudgrid.yaml`, `.cloudgrid.yaml`
/// 3. `{config_dir}/cloudgrid/config.yaml`
pub fn find_config_file() -> Result<Option<PathBuf>> {
    // 1. explicit path
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if !path.exists() {
            return Err(ConfigError::ConfigFileNotFound(path));
        }
        return Ok(Some(path));
    }

    // 2. current directory
    let current_dir = std::env::current_dir()?;
    for filename in ["cloudgrid.yaml", ".cloudgrid.yaml"] {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    // 3. user config directory
    if let Some(config_dir) = dirs::config_dir() {
        let global = config_dir.join("cloudgrid").join("config.yaml");
        if global.exists() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}
