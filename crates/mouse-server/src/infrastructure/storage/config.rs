//! Optional TOML settings for the mouse server.
//!
//! Ports, the bind address, and the read buffer size are fixed constants
//! (see [`crate::infrastructure::network`]) and cannot be changed here.  The
//! file only tunes what an operator may legitimately need per host:
//!
//! ```toml
//! [server]
//! log_level = "debug"
//!
//! [network]
//! advertise_address = "192.168.1.20"
//! ```
//!
//! The file lives at `<config dir>/mouse-server/config.toml`, where the
//! config dir comes from [`dirs::config_dir`] (`~/.config` on Linux,
//! `%APPDATA%` on Windows, `~/Library/Application Support` on macOS).  A
//! missing file, or a host with no config dir at all, yields defaults.

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Directory created under the platform config dir.
const APP_DIR: &str = "mouse-server";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// `advertise_address` does not hold a valid IP address.
    #[error("invalid advertise_address {value:?}: {source}")]
    InvalidAddress {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// General process settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Discovery settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct NetworkConfig {
    /// Address placed in discovery replies instead of the auto-detected one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advertise_address: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl NetworkConfig {
    /// The parsed `advertise_address`, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAddress`] if the value is not an IP.
    pub fn advertise_ip(&self) -> Result<Option<IpAddr>, ConfigError> {
        self.advertise_address
            .as_deref()
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|source| ConfigError::InvalidAddress {
                        value: value.to_string(),
                        source,
                    })
            })
            .transpose()
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Full path to the config file, if the platform has a config dir.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Loads `ServerConfig` from the platform config path, returning defaults if
/// there is no such path or no file at it.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<ServerConfig, ConfigError> {
    match config_file_path() {
        Some(path) => load_config_from(&path),
        None => Ok(ServerConfig::default()),
    }
}

/// Loads `ServerConfig` from `path`, returning defaults if it does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed or names a setting
/// that does not exist (such as a port).
pub fn load_config_from(path: &Path) -> Result<ServerConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ServerConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
