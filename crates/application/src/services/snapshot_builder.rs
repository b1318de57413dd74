use crate::ports::OverrideSource;
use autoptr6_domain::{
    normalize_suffix, Config, ConfigSnapshot, DomainError, OverrideLoadWarning, OverrideTable,
    SubnetMatcher,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// A freshly built snapshot plus the override lines that were skipped.
#[derive(Debug, Clone)]
pub struct BuiltSnapshot {
    pub snapshot: ConfigSnapshot,
    pub warnings: Vec<OverrideLoadWarning>,
    /// Files the snapshot was read from. Left empty by [`SnapshotBuilder`],
    /// which never sees the config file itself.
    pub watched_paths: Vec<PathBuf>,
}

/// Turns a merged [`Config`] into a [`ConfigSnapshot`].
pub struct SnapshotBuilder {
    overrides: Arc<dyn OverrideSource>,
}

impl SnapshotBuilder {
    pub fn new(overrides: Arc<dyn OverrideSource>) -> Self {
        Self { overrides }
    }

    /// Fails on invalid subnets, an invalid suffix, or an unreadable override
    /// file while custom overrides are enabled. Bad override lines are only
    /// warnings.
    pub fn build(&self, config: &Config, generation: u64) -> Result<BuiltSnapshot, DomainError> {
        let subnets = SubnetMatcher::parse(&config.ipv6.subnets)?;
        if subnets.is_empty() {
            return Err(DomainError::ConfigError("No subnets configured".to_string()));
        }

        let domain_suffix = normalize_suffix(&config.dns.domain_suffix)?;

        let (overrides, warnings) = if config.overrides.use_custom {
            let source = self.overrides.read(&config.overrides.file)?;
            let load = OverrideTable::parse(&source);
            for warning in &load.warnings {
                warn!(
                    file = %config.overrides.file,
                    line = warning.line,
                    reason = %warning.reason,
                    "Skipping malformed override line"
                );
            }
            (load.table, load.warnings)
        } else {
            (OverrideTable::new(), Vec::new())
        };

        debug!(
            generation,
            subnets = subnets.len(),
            overrides = overrides.len(),
            skipped = warnings.len(),
            "Snapshot built"
        );

        let snapshot = ConfigSnapshot::new(subnets, overrides, &domain_suffix, config.dns.ttl)
            .with_transports(config.server.enable_udp, config.server.enable_tcp)
            .with_generation(generation);

        Ok(BuiltSnapshot {
            snapshot,
            warnings,
            watched_paths: Vec::new(),
        })
    }
}
