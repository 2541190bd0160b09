use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;
use crate::UpstreamProtocol;

const LOCAL_CONFIG_PATH: &str = "ferrous-doh.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/ferrous-doh/config.toml";

/// Main configuration structure for Ferrous DoH
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream resolver and transport
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Response cache
    #[serde(default)]
    pub cache: CacheConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. ferrous-doh.toml in current directory
    /// 3. /etc/ferrous-doh/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path.map(str::to_string).or_else(Self::get_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(listen) = overrides.listen_address {
            self.server.listen_address = listen;
        }
        if let Some(upstream) = overrides.upstream_address {
            self.upstream.address = upstream;
        }
        if let Some(protocol) = overrides.upstream_protocol {
            self.upstream.protocol = protocol;
        }
        if overrides.disable_cache {
            self.cache.enabled = false;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        self.upstream_addr()?;

        if self.upstream.dial_timeout_secs == 0
            || self.upstream.read_timeout_secs == 0
            || self.upstream.write_timeout_secs == 0
        {
            return Err(ConfigError::Validation(
                "Upstream timeouts must be at least 1 second".to_string(),
            ));
        }

        if self.cache.enabled && self.cache.max_entries == 0 {
            return Err(ConfigError::Validation(
                "cache.max_entries cannot be 0 when the cache is enabled".to_string(),
            ));
        }

        if self.cache.enabled && self.cache.insert_queue_capacity == 0 {
            return Err(ConfigError::Validation(
                "cache.insert_queue_capacity cannot be 0 when the cache is enabled".to_string(),
            ));
        }

        if self.cache.min_ttl_secs > self.cache.max_ttl_secs {
            return Err(ConfigError::Validation(format!(
                "cache.min_ttl_secs ({}) exceeds cache.max_ttl_secs ({})",
                self.cache.min_ttl_secs, self.cache.max_ttl_secs
            )));
        }

        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.listen_address.parse().map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid listen address '{}': {}",
                self.server.listen_address, e
            ))
        })
    }

    pub fn upstream_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.upstream.address.parse().map_err(|e| {
            ConfigError::Validation(format!(
                "Invalid upstream address '{}': {}",
                self.upstream.address, e
            ))
        })
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|path| std::path::Path::new(path).exists())
            .map(str::to_string)
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub listen_address: Option<String>,
    pub upstream_address: Option<String>,
    pub upstream_protocol: Option<UpstreamProtocol>,
    pub disable_cache: bool,
    pub log_level: Option<String>,
}
