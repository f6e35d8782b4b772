//! Configuration management for the salon client
//!
//! Configuration is layered: a YAML file (or built-in defaults when the file
//! is missing), then `SALON_*` environment variables, then command-line
//! overrides. [`Config::validate`] runs last.

use crate::error::{Result, SalonError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default keyring service name
pub const DEFAULT_KEYRING_SERVICE: &str = "salon-client";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiConfig,
    /// Token persistence settings
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Remote API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every request path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Path of the token refresh endpoint, relative to `base_url`
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
}

impl ApiConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_refresh_path() -> String {
    crate::auth::refresh_endpoint::DEFAULT_REFRESH_PATH.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
            refresh_path: default_refresh_path(),
        }
    }
}

/// Where tokens are kept between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// OS keyring (persists across runs)
    #[default]
    Keyring,
    /// Process memory (lost on exit)
    Memory,
}

impl FromStr for StorageBackend {
    type Err = SalonError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "keyring" => Ok(Self::Keyring),
            "memory" => Ok(Self::Memory),
            other => Err(SalonError::Config(format!(
                "Unknown storage backend '{}' (expected keyring or memory)",
                other
            ))),
        }
    }
}

/// Token persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Service name under which keyring entries are stored
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,
}

fn default_keyring_service() -> String {
    DEFAULT_KEYRING_SERVICE.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            keyring_service: default_keyring_service(),
        }
    }
}

impl Config {
    /// Load configuration from file, environment and CLI
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SalonError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SalonError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("SALON_API_BASE_URL") {
            self.api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("SALON_API_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.api.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SALON_API_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(refresh_path) = std::env::var("SALON_REFRESH_PATH") {
            self.api.refresh_path = refresh_path;
        }

        if let Ok(backend) = std::env::var("SALON_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(value) => self.storage.backend = value,
                Err(e) => tracing::warn!("Invalid SALON_STORAGE_BACKEND: {}", e),
            }
        }

        if let Ok(service) = std::env::var("SALON_KEYRING_SERVICE") {
            self.storage.keyring_service = service;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(ref base_url) = cli.base_url {
            tracing::debug!("Overriding base URL from command line: {}", base_url);
            self.api.base_url = base_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let base_url = url::Url::parse(&self.api.base_url).map_err(|e| {
            SalonError::Config(format!(
                "api.base_url '{}' is not a valid URL: {}",
                self.api.base_url, e
            ))
        })?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(SalonError::Config(format!(
                "api.base_url must use http or https, got '{}'",
                base_url.scheme()
            ))
            .into());
        }

        if self.api.timeout_seconds == 0 {
            return Err(
                SalonError::Config("api.timeout_seconds must be greater than 0".to_string()).into(),
            );
        }

        if self.api.refresh_path.trim().is_empty() {
            return Err(
                SalonError::Config("api.refresh_path cannot be empty".to_string()).into(),
            );
        }
        crate::api::request::resolve_url(&base_url, &self.api.refresh_path).map_err(|e| {
            SalonError::Config(format!(
                "api.refresh_path '{}' cannot be resolved: {}",
                self.api.refresh_path, e
            ))
        })?;

        if self.storage.keyring_service.trim().is_empty() {
            return Err(
                SalonError::Config("storage.keyring_service cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}
