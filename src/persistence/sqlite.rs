//! SQLite backend
//!
//! One row per key; the key is the primary key and the entry is stored as
//! JSON text. A save replaces every row inside a single transaction, so a
//! failure part way through leaves the previous snapshot intact.

use std::path::Path;

use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::error::Result;
use crate::store::{Entry, Table};

use super::SnapshotBackend;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache_snapshot (
    id         TEXT PRIMARY KEY,
    json_value TEXT NOT NULL
)";

/// Stores snapshots in a SQLite table
pub struct SqliteBackend {
    /// `Connection` is not `Sync`; saves and restores are serialized
    conn: Mutex<Connection>,
}

impl SqliteBackend {
    /// Open (or create) a database file and ensure the schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Private in-memory database, mostly for tests
    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Number of rows currently stored
    pub fn row_count(&self) -> Result<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM cache_snapshot", [], |row| {
            row.get(0)
        })?;
        Ok(count as usize)
    }
}

impl SnapshotBackend for SqliteBackend {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    /// Rows whose JSON does not parse are skipped
    fn restore_into(&self, table: &mut Table) -> Result<()> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT id, json_value FROM cache_snapshot")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        for row in rows {
            let (key, json) = row?;
            match serde_json::from_str::<Entry>(&json) {
                Ok(entry) => {
                    table.insert(key, entry);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "skipping unreadable snapshot row");
                }
            }
        }

        Ok(())
    }

    fn save(&self, snapshot: &Table) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM cache_snapshot", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO cache_snapshot (id, json_value) VALUES (?1, ?2)")?;
            for (key, entry) in snapshot {
                let json = serde_json::to_string(entry)?;
                stmt.execute(params![key, json])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}
