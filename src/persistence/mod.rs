//! Persistence Module
//!
//! Snapshot backends the store restores from and saves to.
//!
//! ## Responsibilities
//! - Restore a table exactly once, when the store opens
//! - Replace the previous snapshot on every save
//! - Accept an empty snapshot ("everything was deleted")
//!
//! ## Backends
//! - `NoopBackend`: default, keeps nothing
//! - `JsonFileBackend`: one JSON document keyed by entry key
//! - `SnapshotFileBackend`: checksummed bincode file
//! - `SqliteBackend`: one row per key, entry as JSON text

mod json;
mod noop;
mod snapshot;
mod sqlite;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::Table;

pub use json::JsonFileBackend;
pub use noop::NoopBackend;
pub use snapshot::SnapshotFileBackend;
pub use sqlite::SqliteBackend;

/// A durability backend for store snapshots
pub trait SnapshotBackend: Send + Sync {
    /// Short name for logging
    fn name(&self) -> &'static str;

    /// Populate `table` from whatever the backend holds
    fn restore_into(&self, table: &mut Table) -> Result<()>;

    /// Persist `snapshot`, replacing any prior snapshot
    fn save(&self, snapshot: &Table) -> Result<()>;
}

/// Write `bytes` to a sibling temp file, fsync it, then rename over `path`
///
/// Readers see either the old file or the new one, never a torn write.
pub(crate) fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path(path);
    {
        let mut file = File::create(&tmp_path)?;
        file.write_all(bytes)?;
        file.sync_all()?;
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
