use autoptr6_domain::ConfigSnapshot;
use std::sync::Arc;

/// Holds the active snapshot.
///
/// `current` must be lock-free for readers and `publish` must replace the
/// whole snapshot in one step.
pub trait SnapshotStore: Send + Sync {
    fn current(&self) -> Arc<ConfigSnapshot>;

    /// Installs `snapshot` and returns the one it replaced.
    fn publish(&self, snapshot: Arc<ConfigSnapshot>) -> Arc<ConfigSnapshot>;
}
