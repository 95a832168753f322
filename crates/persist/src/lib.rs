//! Persistence: bit-packed grid snapshots and a file-backed snapshot store.
//!
//! # Invariants
//! - Snapshots carry their `(columns, rows)` header and refuse to restore
//!   onto a grid of another size.
//! - Snapshots are content-hashed; the store chains file hashes and fails
//!   closed on any mismatch.

mod snapshot;
mod store;

pub use snapshot::{GridSnapshot, SnapshotError};
pub use store::{GridStore, IntegrityManifest, ManifestEntry, StoreError, StoreMeta};

pub fn crate_info() -> &'static str {
    "lifegrid-persist v0.1.0"
}
