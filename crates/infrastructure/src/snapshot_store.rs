use arc_swap::ArcSwap;
use autoptr6_application::ports::SnapshotStore;
use autoptr6_domain::ConfigSnapshot;
use std::sync::Arc;

/// Lock-free holder of the active [`ConfigSnapshot`].
///
/// Readers take a full `Arc` so a snapshot stays alive for the whole query
/// even if a reload swaps it out mid-flight.
pub struct ArcSwapSnapshotStore {
    current: ArcSwap<ConfigSnapshot>,
}

impl ArcSwapSnapshotStore {
    pub fn new(initial: ConfigSnapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }
}

impl SnapshotStore for ArcSwapSnapshotStore {
    fn current(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    fn publish(&self, snapshot: Arc<ConfigSnapshot>) -> Arc<ConfigSnapshot> {
        self.current.swap(snapshot)
    }
}
