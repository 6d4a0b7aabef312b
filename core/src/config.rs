//! Controller configuration.
//!
//! Stored as JSON at `~/.taskreaper/config.json`. Every field has a default, so
//! a missing file or a partial file is valid.
//!
//! The cooperative shutdown address lives here rather than in code: each
//! controller instance on a host can point its children at a different port,
//! and the address is handed to the child through its environment at spawn.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::ConsoleEvent;
use crate::error::{Error, Result};

/// Loopback address children listen on for cooperative shutdown.
pub const DEFAULT_SHUTDOWN_ADDR: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 9977));

/// HTTP path of the cooperative shutdown endpoint.
pub const DEFAULT_SHUTDOWN_PATH: &str = "/shutdown";

/// Environment variable through which a child learns the shutdown address.
pub const DEFAULT_SHUTDOWN_ADDR_ENV: &str = "TASKREAPER_SHUTDOWN_ADDR";

/// Controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Address of the child's cooperative shutdown listener.
    #[serde(default = "default_shutdown_addr", rename = "shutdownAddr")]
    pub shutdown_addr: SocketAddr,

    /// HTTP path of the shutdown endpoint.
    #[serde(default = "default_shutdown_path", rename = "shutdownPath")]
    pub shutdown_path: String,

    /// Client timeout of the cooperative shutdown request, in seconds.
    #[serde(default = "default_shutdown_timeout", rename = "shutdownTimeoutSecs")]
    pub shutdown_timeout_secs: u64,

    /// Console event sent to the process group.
    #[serde(default, rename = "consoleEvent")]
    pub console_event: ConsoleEvent,

    /// Name of the environment variable carrying `shutdown_addr` to the child.
    #[serde(default = "default_shutdown_addr_env", rename = "shutdownAddrEnv")]
    pub shutdown_addr_env: String,

    /// How often `stop` checks whether the root has exited, in milliseconds.
    #[serde(default = "default_poll_interval", rename = "pollIntervalMs")]
    pub poll_interval_ms: u64,
}

fn default_shutdown_addr() -> SocketAddr {
    DEFAULT_SHUTDOWN_ADDR
}

fn default_shutdown_path() -> String {
    DEFAULT_SHUTDOWN_PATH.to_string()
}

fn default_shutdown_timeout() -> u64 {
    5
}

fn default_shutdown_addr_env() -> String {
    DEFAULT_SHUTDOWN_ADDR_ENV.to_string()
}

fn default_poll_interval() -> u64 {
    100
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            shutdown_addr: default_shutdown_addr(),
            shutdown_path: default_shutdown_path(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            console_event: ConsoleEvent::default(),
            shutdown_addr_env: default_shutdown_addr_env(),
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl ControllerConfig {
    /// Full URL of the cooperative shutdown endpoint.
    pub fn shutdown_url(&self) -> String {
        if self.shutdown_path.starts_with('/') {
            format!("http://{}{}", self.shutdown_addr, self.shutdown_path)
        } else {
            format!("http://{}/{}", self.shutdown_addr, self.shutdown_path)
        }
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Reject settings that would make the shutdown paths misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.shutdown_timeout_secs == 0 {
            return Err(Error::Config(
                "shutdownTimeoutSecs must be greater than zero".to_string(),
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config(
                "pollIntervalMs must be greater than zero".to_string(),
            ));
        }
        if self.shutdown_addr_env.is_empty() || self.shutdown_addr_env.contains('=') {
            return Err(Error::Config(format!(
                "Invalid environment variable name: {:?}",
                self.shutdown_addr_env
            )));
        }
        Ok(())
    }
}

/// Configuration store backed by a JSON file.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.taskreaper/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_path = home.join(".taskreaper").join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration from disk.
    ///
    /// Returns the default config if the file doesn't exist.
    pub async fn load(&self) -> Result<ControllerConfig> {
        if !self.config_path.exists() {
            return Ok(ControllerConfig::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        let config: ControllerConfig = serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &ControllerConfig) -> Result<()> {
        config.validate()?;

        if let Some(config_dir) = self.config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir).await.map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(config)?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}
