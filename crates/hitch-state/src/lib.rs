//! File-backed record persistence for the hitch host.
//!
//! The engine returns records; this crate keeps them durable: a versioned
//! directory layout (`StateLayout`), an atomic-write record store with blake3
//! integrity checksums (`RecordStore`), and an exclusive state lock
//! (`StateLock`) so concurrent host processes serialize their cycles.

pub mod layout;
pub mod lock;
pub mod records;

pub use layout::{StateLayout, STATE_FORMAT_VERSION};
pub use lock::StateLock;
pub use records::{validate_resource_name, RecordStore};

use std::path::Path;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
///
/// On Linux with ext4 `data=ordered` (the default), renames are usually
/// durable without an explicit dir fsync, but POSIX does not guarantee this.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("state I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("record not found: {0}")]
    RecordNotFound(String),
    #[error("integrity check failed for record '{name}': expected {expected}, got {actual}")]
    IntegrityFailure {
        name: String,
        expected: String,
        actual: String,
    },
    #[error("invalid resource name: {0}")]
    InvalidName(String),
    #[error("state format version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("lock acquisition failed: {0}")]
    LockFailed(String),
}
