// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Client configuration
//!
//! Defaults, optionally overlaid by a TOML file and then by environment
//! variables (a `.env` file is honoured by the CLI).

use crate::api::ApiConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Token signing secret used when none is configured
pub const DEFAULT_SESSION_SECRET: &str = "rojifi-local-session-secret";

/// Persisted tokens stay valid for one year
pub const DEFAULT_TTL_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

fn default_secret() -> String {
    DEFAULT_SESSION_SECRET.to_string()
}

fn default_ttl_days() -> i64 {
    DEFAULT_TTL_DAYS
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".rojifi/storage.json")
}

/// Session token settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_secret")]
    pub secret: String,
    #[serde(default = "default_ttl_days")]
    pub ttl_days: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            secret: default_secret(),
            ttl_days: default_ttl_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    /// Location of the durable storage file
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            storage_path: default_storage_path(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults overlaid with environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Overlay values from `lookup`
    ///
    /// Recognised keys: `ROJIFI_API_URL`, `ROJIFI_SERVER_PUBLIC_KEY`,
    /// `ROJIFI_REQUEST_TIMEOUT_SECS`, `ROJIFI_SESSION_SECRET`,
    /// `ROJIFI_SESSION_TTL_DAYS`, `ROJIFI_STORAGE_PATH`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ROJIFI_API_URL") {
            self.api.base_url = url;
        }
        if let Some(key) = lookup("ROJIFI_SERVER_PUBLIC_KEY") {
            self.api.server_public_key = Some(key);
        }
        if let Some(val) = lookup("ROJIFI_REQUEST_TIMEOUT_SECS") {
            let secs = parse_number("ROJIFI_REQUEST_TIMEOUT_SECS", &val)?;
            self.api.request_timeout_secs = Some(secs);
        }
        if let Some(secret) = lookup("ROJIFI_SESSION_SECRET") {
            self.session.secret = secret;
        }
        if let Some(val) = lookup("ROJIFI_SESSION_TTL_DAYS") {
            self.session.ttl_days = parse_number("ROJIFI_SESSION_TTL_DAYS", &val)?;
        }
        if let Some(path) = lookup("ROJIFI_STORAGE_PATH") {
            self.storage_path = PathBuf::from(path);
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
