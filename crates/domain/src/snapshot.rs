use crate::{OverrideTable, SubnetMatcher};
use std::sync::Arc;

/// Everything the resolution pipeline reads, frozen at build time.
///
/// Snapshots are never mutated; a reload publishes a new one and queries
/// already holding the old `Arc` finish against it.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    pub generation: u64,
    pub subnets: SubnetMatcher,
    pub overrides: OverrideTable,
    pub domain_suffix: Arc<str>,
    pub ttl: u32,
    pub enable_udp: bool,
    pub enable_tcp: bool,
}

impl ConfigSnapshot {
    pub fn new(subnets: SubnetMatcher, overrides: OverrideTable, domain_suffix: &str, ttl: u32) -> Self {
        Self {
            generation: 0,
            subnets,
            overrides,
            domain_suffix: Arc::from(domain_suffix),
            ttl,
            enable_udp: true,
            enable_tcp: false,
        }
    }

    pub fn with_transports(mut self, enable_udp: bool, enable_tcp: bool) -> Self {
        self.enable_udp = enable_udp;
        self.enable_tcp = enable_tcp;
        self
    }

    pub fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }
}
