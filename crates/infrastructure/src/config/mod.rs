mod override_file;
mod snapshot_source;

pub use override_file::FileOverrideSource;
pub use snapshot_source::FileSnapshotSource;
