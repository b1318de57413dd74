mod override_source;
mod ptr_resolver;
mod snapshot_source;
mod snapshot_store;

pub use override_source::OverrideSource;
pub use ptr_resolver::PtrResolver;
pub use snapshot_source::SnapshotSource;
pub use snapshot_store::SnapshotStore;
