//! JSON file backend
//!
//! The whole table as one JSON object:
//! ```text
//! {
//!   "user:1": { "value": "...", "created_at": "2024-...Z", "expires_at": null },
//!   ...
//! }
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::store::Table;

use super::{write_atomically, SnapshotBackend};

/// Stores snapshots as a JSON document on disk
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotBackend for JsonFileBackend {
    fn name(&self) -> &'static str {
        "json-file"
    }

    /// A missing file is an empty snapshot, not an error
    fn restore_into(&self, table: &mut Table) -> Result<()> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot file yet");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let restored: Table = serde_json::from_slice(&bytes)?;
        table.extend(restored);
        Ok(())
    }

    fn save(&self, snapshot: &Table) -> Result<()> {
        let bytes = serde_json::to_vec(snapshot)?;
        write_atomically(&self.path, &bytes)
    }
}
