//! autoptr6 Infrastructure Layer
pub mod config;
pub mod dns;
pub mod snapshot_store;

pub use snapshot_store::ArcSwapSnapshotStore;
