mod snapshot_builder;

pub use snapshot_builder::{BuiltSnapshot, SnapshotBuilder};
