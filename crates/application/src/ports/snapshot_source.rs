use crate::services::BuiltSnapshot;
use autoptr6_domain::DomainError;

/// Produces a complete, validated snapshot from the configuration sources.
pub trait SnapshotSource: Send + Sync {
    fn build(&self, generation: u64) -> Result<BuiltSnapshot, DomainError>;

    /// Human readable origin, used in logs.
    fn describe(&self) -> String;
}
