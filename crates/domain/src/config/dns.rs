use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DnsConfig {
    #[serde(default = "default_ttl")]
    pub ttl: u32,

    /// Appended to synthesized names, e.g. `ip6.example.com.`
    #[serde(default = "default_domain_suffix")]
    pub domain_suffix: String,
}

impl Default for DnsConfig {
    fn default() -> Self {
        Self {
            ttl: default_ttl(),
            domain_suffix: default_domain_suffix(),
        }
    }
}

fn default_ttl() -> u32 {
    86_400
}

fn default_domain_suffix() -> String {
    "ip6.example.com.".to_string()
}
