//! Service configuration
//!
//! Defaults, optionally overlaid by a YAML file. Command-line flags and
//! `PEOPLE_GRAPH_*` environment variables are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    /// Default tracing filter, overridden by `RUST_LOG`
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Read `path` when given, otherwise start from the defaults
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            None => Ok(Self::default()),
            Some(path) => {
                let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml_str(&yaml)
            }
        }
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Port
    pub port: u16,
}

impl ServerConfig {
    /// Link prefix used when a request carries no `Host` header
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Embedded database settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Database directory, created when missing
    pub data_path: PathBuf,
    /// Keep everything in memory and skip the database
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("target/hello.db"),
            in_memory: false,
        }
    }
}
