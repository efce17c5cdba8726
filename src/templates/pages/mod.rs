pub mod snapshot;

pub use snapshot::{snapshot_page, SnapshotRow, SnapshotVm};
