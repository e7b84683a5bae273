//! Storage infrastructure: configuration file loading.
//!
//! The `config` sub-module reads the optional TOML file (log level and
//! advertised address only) from the platform config directory and falls
//! back to built-in defaults when it does not exist.

pub mod config;

pub use config::{load_config, ConfigError, NetworkConfig, ServerConfig};
