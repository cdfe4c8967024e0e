//! Dispatch configuration
//!
//! Resolved in three layers: built-in defaults, an optional TOML file, then
//! `GRID_DISPATCH_*` environment overrides.

use anyhow::{Context, Result};
use grid_dispatch_shared::{defaults, NewGridItem};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const ENV_TARGET_HOST: &str = "GRID_DISPATCH_TARGET_HOST";
pub const ENV_TARGET_PORT: &str = "GRID_DISPATCH_TARGET_PORT";
pub const ENV_SEND_TIMEOUT_MS: &str = "GRID_DISPATCH_SEND_TIMEOUT_MS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Where and how grid commands are sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Control listener host; every grid item targets the same listener
    pub target_host: String,
    pub target_port: u16,
    /// Bound on address resolution plus the datagram write
    pub send_timeout_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            target_host: defaults::TARGET_HOST.into(),
            target_port: defaults::TARGET_PORT,
            send_timeout_ms: defaults::SEND_TIMEOUT_MS,
        }
    }
}

impl DispatchConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_host.trim().is_empty() {
            return Err(ConfigError::Validation(
                "target_host must not be empty".into(),
            ));
        }
        if self.target_port == 0 {
            return Err(ConfigError::Validation(
                "target_port must not be 0".into(),
            ));
        }
        if self.send_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "send_timeout_ms must not be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration for the click driver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Items loaded into the in-memory store at startup
    #[serde(default)]
    pub grid_items: Vec<NewGridItem>,
}

impl AppConfig {
    /// Load from an optional file, then apply process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("reading config {}", path.display()))?;
                Self::from_toml_str(&raw)
                    .with_context(|| format!("parsing config {}", path.display()))?
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.dispatch.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `GRID_DISPATCH_*` overrides read through `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_TARGET_HOST) {
            self.dispatch.target_host = host;
        }
        if let Some(port) = lookup(ENV_TARGET_PORT) {
            self.dispatch.target_port =
                port.parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_TARGET_PORT,
                    value: port,
                })?;
        }
        if let Some(ms) = lookup(ENV_SEND_TIMEOUT_MS) {
            self.dispatch.send_timeout_ms =
                ms.parse().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_SEND_TIMEOUT_MS,
                    value: ms,
                })?;
        }
        Ok(())
    }
}
