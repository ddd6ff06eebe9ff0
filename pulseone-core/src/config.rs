//! Client configuration
//!
//! Loaded from `config.json` in the user's config directory, then overridden
//! by `PULSE_*` environment variables.

use crate::error::{Error, StorageError};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const CONFIG_FILE: &str = "config.json";
const APP_NAME: &str = "PulseOne";

pub const ENV_API_URL: &str = "PULSE_API_URL";
pub const ENV_DATA_DIR: &str = "PULSE_DATA_DIR";
pub const ENV_LOGIN_PATH: &str = "PULSE_LOGIN_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base endpoint every request path is appended to
    pub api_base_url: String,
    /// Login entry point; unauthenticated navigation is redirected here
    pub login_path: String,
    /// Paths reachable without a session
    pub public_paths: Vec<String>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Overrides the platform data directory for the credential store
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001/api".to_string(),
            login_path: "/login".to_string(),
            public_paths: vec!["/login".to_string()],
            request_timeout_secs: 30,
            user_agent: format!("PulseOne-Client/{}", env!("CARGO_PKG_VERSION")),
            data_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Directory holding the credential store
    /// Linux: ~/.local/share/PulseOne/
    pub fn data_dir(&self) -> Result<PathBuf, StorageError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|d| d.join(APP_NAME))
                .ok_or(StorageError::DataDir),
        }
    }

    /// Apply overrides from the process environment
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (env-shaped keys)
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty(ENV_API_URL) {
            debug!("API base URL overridden by {}", ENV_API_URL);
            self.api_base_url = url;
        }
        if let Some(dir) = non_empty(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(path) = non_empty(ENV_LOGIN_PATH) {
            if !self.public_paths.contains(&path) {
                self.public_paths.push(path.clone());
            }
            self.login_path = path;
        }
        self
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            return Err(Error::Config(format!(
                "api_base_url must be an http(s) URL, got {:?}",
                self.api_base_url
            )));
        }
        if !self.login_path.starts_with('/') {
            return Err(Error::Config(format!(
                "login_path must start with '/', got {:?}",
                self.login_path
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Linux: ~/.config/PulseOne/
fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join(APP_NAME))
}

fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Load the config file, falling back to defaults
pub fn load_config() -> ClientConfig {
    match get_config_path() {
        Some(path) => load_config_from(&path),
        None => {
            debug!("Could not determine config path, using defaults");
            ClientConfig::default()
        }
    }
}

pub fn load_config_from(path: &std::path::Path) -> ClientConfig {
    if !path.exists() {
        debug!("Config file does not exist, using defaults");
        return ClientConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                error!("Failed to parse config file: {}", e);
                ClientConfig::default()
            }
        },
        Err(e) => {
            error!("Failed to read config file: {}", e);
            ClientConfig::default()
        }
    }
}

/// Save the config file
pub fn save_config(config: &ClientConfig) -> Result<(), StorageError> {
    let dir = get_config_dir().ok_or(StorageError::DataDir)?;
    save_config_to(config, &dir.join(CONFIG_FILE))
}

pub fn save_config_to(config: &ClientConfig, path: &std::path::Path) -> Result<(), StorageError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| StorageError::Serialize(e.to_string()))?;
    fs::write(path, json)?;

    info!("Saved config to {:?}", path);
    Ok(())
}
