use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use super::dispatcher::DispatcherConfig;
use super::dns::DnsConfig;
use super::errors::ConfigError;
use super::ipv6::Ipv6Config;
use super::logging::{LogFormat, LoggingConfig};
use super::overrides::OverridesConfig;
use super::server::ServerConfig;

const LOCAL_CONFIG_PATH: &str = "autoptr6.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/autoptr6/config.toml";

/// Main configuration structure for autoptr6
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (port, bind address, transports)
    #[serde(default)]
    pub server: ServerConfig,

    /// Answer shaping (TTL, domain suffix)
    #[serde(default)]
    pub dns: DnsConfig,

    /// Owned IPv6 prefixes
    #[serde(default)]
    pub ipv6: Ipv6Config,

    /// Per-address PTR overrides
    #[serde(default)]
    pub overrides: OverridesConfig,

    /// Worker pool and queueing
    #[serde(default)]
    pub dispatcher: DispatcherConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file, environment and command line.
    ///
    /// Precedence, lowest first: built-in defaults, config file,
    /// `AUTOPTR6_*` environment variables, command line. The file is:
    /// 1. Explicitly provided path
    /// 2. autoptr6.toml in current directory
    /// 3. /etc/autoptr6/config.toml
    /// 4. none (defaults only)
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        Self::load_with_env(path, std::env::vars(), cli_overrides)
    }

    pub fn load_with_env<I, K, V>(
        path: Option<&str>,
        env: I,
        cli_overrides: CliOverrides,
    ) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = match path.map(str::to_string).or_else(Self::get_config_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_env_overrides(env)?;
        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    /// Load configuration from a specific file
    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    pub fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(enable) = overrides.enable_udp {
            self.server.enable_udp = enable;
        }
        if let Some(enable) = overrides.enable_tcp {
            self.server.enable_tcp = enable;
        }
        if let Some(verbose) = overrides.verbose {
            self.server.verbose = verbose;
        }
        if let Some(ttl) = overrides.ttl {
            self.dns.ttl = ttl;
        }
        if let Some(suffix) = overrides.domain_suffix {
            self.dns.domain_suffix = suffix;
        }
        if let Some(workers) = overrides.max_workers {
            self.dispatcher.max_workers = workers;
        }
        if let Some(subnets) = overrides.subnets {
            self.ipv6.subnets = subnets;
        }
        if let Some(file) = overrides.overrides_file {
            self.overrides.file = file;
        }
        if let Some(use_custom) = overrides.use_custom_overrides {
            self.overrides.use_custom = use_custom;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(format) = overrides.log_format {
            self.logging.format = format;
        }
        if let Some(file) = overrides.log_file {
            self.logging.file = Some(file);
        }
    }

    /// Validate listener and dispatcher settings. Subnets, suffix and
    /// overrides are checked when the snapshot is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("DNS port cannot be 0".to_string()));
        }

        if !self.server.enable_udp && !self.server.enable_tcp {
            return Err(ConfigError::Validation(
                "At least one of UDP or TCP must be enabled".to_string(),
            ));
        }

        if self.server.bind_address.parse::<IpAddr>().is_err() {
            return Err(ConfigError::Validation(format!(
                "Invalid bind address '{}'",
                self.server.bind_address
            )));
        }

        if self.server.tcp_idle_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "tcp_idle_timeout_secs must be at least 1".to_string(),
            ));
        }

        if self.server.max_tcp_connections == 0 {
            return Err(ConfigError::Validation(
                "max_tcp_connections must be at least 1".to_string(),
            ));
        }

        if self.dispatcher.query_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "query_timeout_ms must be at least 1".to_string(),
            ));
        }

        if self.dispatcher.max_workers == 0 {
            return Err(ConfigError::Validation(
                "max_workers must be at least 1".to_string(),
            ));
        }

        if self.dispatcher.queue_depth == 0 {
            return Err(ConfigError::Validation(
                "queue_depth must be at least 1".to_string(),
            ));
        }

        if self.ipv6.subnets.is_empty() {
            return Err(ConfigError::Validation("No subnets configured".to_string()));
        }

        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn get_config_path() -> Option<String> {
        [LOCAL_CONFIG_PATH, SYSTEM_CONFIG_PATH]
            .into_iter()
            .find(|path| std::path::Path::new(path).exists())
            .map(str::to_string)
    }

    /// `tracing` filter directive derived from verbosity and level.
    pub fn effective_log_level(&self) -> &str {
        match self.server.verbose {
            0 => &self.logging.level,
            1 => "info",
            _ => "debug",
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub enable_udp: Option<bool>,
    pub enable_tcp: Option<bool>,
    pub verbose: Option<u8>,
    pub ttl: Option<u32>,
    pub domain_suffix: Option<String>,
    pub max_workers: Option<usize>,
    pub subnets: Option<Vec<String>>,
    pub overrides_file: Option<String>,
    pub use_custom_overrides: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub log_file: Option<String>,
}
