use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_true")]
    pub enable_udp: bool,

    #[serde(default)]
    pub enable_tcp: bool,

    /// 0 keeps the configured log level, 1 forces info, 2+ forces debug.
    #[serde(default)]
    pub verbose: u8,

    /// Idle TCP connections are closed after this many seconds.
    #[serde(default = "default_tcp_idle_timeout_secs")]
    pub tcp_idle_timeout_secs: u64,

    #[serde(default = "default_max_tcp_connections")]
    pub max_tcp_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
            enable_udp: true,
            enable_tcp: false,
            verbose: 0,
            tcp_idle_timeout_secs: default_tcp_idle_timeout_secs(),
            max_tcp_connections: default_max_tcp_connections(),
        }
    }
}

fn default_port() -> u16 {
    5353
}

fn default_bind_address() -> String {
    "::".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tcp_idle_timeout_secs() -> u64 {
    10
}

fn default_max_tcp_connections() -> usize {
    256
}
