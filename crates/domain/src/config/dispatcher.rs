use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// What a listener does when the query queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Backpressure {
    /// Wait for a free slot, bounded by the query deadline.
    #[default]
    Block,
    /// Answer REFUSED right away.
    Reject,
    /// Discard the query without answering.
    Drop,
}

impl FromStr for Backpressure {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(Backpressure::Block),
            "reject" => Ok(Backpressure::Reject),
            "drop" => Ok(Backpressure::Drop),
            other => Err(format!("unknown backpressure policy '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatcherConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,

    #[serde(default)]
    pub backpressure: Backpressure,

    #[serde(default = "default_query_timeout_ms")]
    pub query_timeout_ms: u64,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            queue_depth: default_queue_depth(),
            backpressure: Backpressure::Block,
            query_timeout_ms: default_query_timeout_ms(),
        }
    }
}

fn default_max_workers() -> usize {
    32
}

fn default_queue_depth() -> usize {
    1024
}

fn default_query_timeout_ms() -> u64 {
    2000
}
