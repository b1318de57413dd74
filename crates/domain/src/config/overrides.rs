use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OverridesConfig {
    #[serde(default = "default_file")]
    pub file: String,

    #[serde(default = "default_true")]
    pub use_custom: bool,
}

impl Default for OverridesConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            use_custom: true,
        }
    }
}

fn default_file() -> String {
    "autoptr6.overrides".to_string()
}

fn default_true() -> bool {
    true
}
