use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Ipv6Config {
    /// Owned prefixes in CIDR notation.
    #[serde(default = "default_subnets")]
    pub subnets: Vec<String>,
}

impl Default for Ipv6Config {
    fn default() -> Self {
        Self {
            subnets: default_subnets(),
        }
    }
}

fn default_subnets() -> Vec<String> {
    vec!["2001:db8:1::/48".to_string(), "2001:db8:2::/64".to_string()]
}
