//! `AUTOPTR6_*` environment overrides.

use super::errors::ConfigError;
use super::root::Config;
use std::str::FromStr;

pub const ENV_PREFIX: &str = "AUTOPTR6_";

/// Loose boolean parsing: `true`, `yes`, `1`, `on` and `enable` are true,
/// everything else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "1" | "on" | "enable"
    )
}

pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_num<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnv(key.to_string(), format!("{} ({})", value, e)))
}

impl Config {
    /// Applies recognised `AUTOPTR6_*` variables. Unknown variables are
    /// ignored; a recognised variable with an unparsable value is an error.
    pub fn apply_env_overrides<I, K, V>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let key = key.as_ref();
            let value = value.as_ref();
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            match name {
                "PORT" => self.server.port = parse_num(key, value)?,
                "BIND_ADDRESS" => self.server.bind_address = value.trim().to_string(),
                "ENABLE_TCP" => self.server.enable_tcp = parse_bool(value),
                "ENABLE_UDP" => self.server.enable_udp = parse_bool(value),
                "TCP_IDLE_TIMEOUT_SECS" => {
                    self.server.tcp_idle_timeout_secs = parse_num(key, value)?
                }
                "MAX_TCP_CONNECTIONS" => self.server.max_tcp_connections = parse_num(key, value)?,
                "VERBOSE" => self.server.verbose = parse_num(key, value)?,
                "TTL" => self.dns.ttl = parse_num(key, value)?,
                "DOMAIN_SUFFIX" => self.dns.domain_suffix = value.trim().to_string(),
                "MAX_WORKERS" => self.dispatcher.max_workers = parse_num(key, value)?,
                "QUEUE_DEPTH" => self.dispatcher.queue_depth = parse_num(key, value)?,
                "QUERY_TIMEOUT_MS" => self.dispatcher.query_timeout_ms = parse_num(key, value)?,
                "BACKPRESSURE" => {
                    self.dispatcher.backpressure = value
                        .parse()
                        .map_err(|e| ConfigError::InvalidEnv(key.to_string(), e))?
                }
                "SUBNETS" => self.ipv6.subnets = parse_list(value),
                "OVERRIDES_FILE" => self.overrides.file = value.trim().to_string(),
                "USE_CUSTOM_OVERRIDES" => self.overrides.use_custom = parse_bool(value),
                "LOG_LEVEL" => self.logging.level = value.trim().to_string(),
                "LOG_FORMAT" => {
                    self.logging.format = value
                        .parse()
                        .map_err(|e| ConfigError::InvalidEnv(key.to_string(), e))?
                }
                "LOG_FILE" => {
                    let path = value.trim();
                    self.logging.file = (!path.is_empty()).then(|| path.to_string());
                }
                _ => {}
            }
        }

        Ok(())
    }
}
