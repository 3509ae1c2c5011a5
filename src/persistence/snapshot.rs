//! Binary snapshot backend
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │ Header (26 bytes, little endian)                           │
//! │ ┌──────────┬──────────┬─────────────┬──────────┬─────────┐ │
//! │ │Magic (4) │Version(2)│ Entries (8) │ Len (8)  │ CRC (4) │ │
//! │ └──────────┴──────────┴─────────────┴──────────┴─────────┘ │
//! ├────────────────────────────────────────────────────────────┤
//! │ Payload: bincode-encoded table (Len bytes)                 │
//! └────────────────────────────────────────────────────────────┘
//! ```
//! The CRC covers the payload only.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, TtlKvError};
use crate::store::Table;

use super::{write_atomically, SnapshotBackend};

/// Magic bytes at the start of every snapshot file
pub const MAGIC: &[u8; 4] = b"TKVS";

/// Current format version
pub const VERSION: u16 = 1;

/// Magic + version + entry count + payload length + CRC
pub const HEADER_SIZE: usize = 4 + 2 + 8 + 8 + 4;

/// Stores snapshots as a compact checksummed file
#[derive(Debug, Clone)]
pub struct SnapshotFileBackend {
    path: PathBuf,
}

impl SnapshotFileBackend {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encode a table into the on-disk format
    pub fn encode(snapshot: &Table) -> Result<Vec<u8>> {
        let payload = bincode::serialize(snapshot)?;
        let crc = crc32fast::hash(&payload);

        let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
        buf.put_slice(MAGIC);
        buf.put_u16_le(VERSION);
        buf.put_u64_le(snapshot.len() as u64);
        buf.put_u64_le(payload.len() as u64);
        buf.put_u32_le(crc);
        buf.put_slice(&payload);

        Ok(buf.to_vec())
    }

    /// Decode and verify a file produced by [`encode`](Self::encode)
    pub fn decode(bytes: &[u8]) -> Result<Table> {
        if bytes.len() < HEADER_SIZE {
            return Err(TtlKvError::Persistence(format!(
                "Snapshot too short: expected at least {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut header = &bytes[..HEADER_SIZE];

        let mut magic = [0u8; 4];
        header.copy_to_slice(&mut magic);
        if &magic != MAGIC {
            return Err(TtlKvError::Persistence(
                "Snapshot has bad magic bytes".to_string(),
            ));
        }

        let version = header.get_u16_le();
        if version != VERSION {
            return Err(TtlKvError::Persistence(format!(
                "Unsupported snapshot version {} (expected {})",
                version, VERSION
            )));
        }

        let entry_count = header.get_u64_le();
        let payload_len = header.get_u64_le() as usize;
        let expected_crc = header.get_u32_le();

        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != payload_len {
            return Err(TtlKvError::Persistence(format!(
                "Snapshot payload length mismatch: header says {}, file has {}",
                payload_len,
                payload.len()
            )));
        }

        let actual_crc = crc32fast::hash(payload);
        if actual_crc != expected_crc {
            return Err(TtlKvError::Persistence(format!(
                "Snapshot checksum mismatch: expected {:08x}, got {:08x}",
                expected_crc, actual_crc
            )));
        }

        let table: Table = bincode::deserialize(payload)?;
        if table.len() as u64 != entry_count {
            return Err(TtlKvError::Persistence(format!(
                "Snapshot entry count mismatch: header says {}, payload has {}",
                entry_count,
                table.len()
            )));
        }

        Ok(table)
    }
}

impl SnapshotBackend for SnapshotFileBackend {
    fn name(&self) -> &'static str {
        "snapshot-file"
    }

    fn restore_into(&self, table: &mut Table) -> Result<()> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no snapshot file yet");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        table.extend(Self::decode(&bytes)?);
        Ok(())
    }

    fn save(&self, snapshot: &Table) -> Result<()> {
        let bytes = Self::encode(snapshot)?;
        write_atomically(&self.path, &bytes)
    }
}
