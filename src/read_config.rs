// Lecture de la configuration du client depuis un fichier TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{DeviceClient, Endpoint, DEFAULT_PORT, DEFAULT_TIMEOUT};
use crate::error::{AppError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "udpcfg.toml";
pub const CONFIG_ENV_VAR: &str = "UDPCFG_CONFIG";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_host() -> String {
    "192.168.144.123".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AppError::ConfigError(format!("Failed to parse config: {}", e)))
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        Endpoint::new(self.host.clone(), self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn client(&self) -> Result<DeviceClient> {
        DeviceClient::new(self.endpoint()?, self.timeout())
    }
}

/// Loads the client configuration.
///
/// An explicit path (argument, then `UDPCFG_CONFIG`) must exist. Without one,
/// `udpcfg.toml` in the working directory is used when present, defaults
/// otherwise.
pub fn read_client_config(explicit: Option<&Path>) -> Result<ClientConfig> {
    let explicit: Option<PathBuf> = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from));

    let config_path = match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(AppError::ConfigError(format!("Config file not found: {}", path.display())));
            }
            path
        }
        None => {
            let path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if !path.exists() {
                log::debug!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                return Ok(ClientConfig::default());
            }
            path
        }
    };

    let config_content = fs::read_to_string(&config_path).map_err(|e| {
        AppError::ConfigError(format!("Failed to read config file {}: {}", config_path.display(), e))
    })?;

    let config: ClientConfig = toml::from_str(&config_content).map_err(|e| {
        AppError::ConfigError(format!("Failed to parse config file {}: {}", config_path.display(), e))
    })?;

    log::info!("Loaded configuration from {}", config_path.display());
    log::debug!("Config: {:?}", config);

    Ok(config)
}
