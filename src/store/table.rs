//! Store implementation
//!
//! HashMap-based table behind a single RwLock, plus the two background
//! loops (expiry sweep, snapshot backup) that live as long as the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::config::Config;
use crate::error::{Result, TtlKvError};
use crate::persistence::SnapshotBackend;

use super::background::BackgroundTask;
use super::Entry;

/// Key → entry mapping; also the shape of a snapshot
pub type Table = HashMap<String, Entry>;

/// Longest TTL honoured (~100 years); longer ones are capped
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// State shared between callers and the background threads
struct StoreInner {
    /// The only mutable state; readers share, writers exclude
    table: RwLock<Table>,

    /// Snapshot destination
    backend: Arc<dyn SnapshotBackend>,
}

impl StoreInner {
    /// Remove every entry whose expiry instant has passed
    fn sweep_expired(&self) -> usize {
        let now = Utc::now();

        let removed: Vec<(String, Entry)> = {
            let mut table = self.table.write();
            let expired: Vec<String> = table
                .iter()
                .filter(|(_, entry)| entry.is_expired_at(now))
                .map(|(key, _)| key.clone())
                .collect();

            expired
                .into_iter()
                .filter_map(|key| table.remove_entry(&key))
                .collect()
        };

        for (key, entry) in &removed {
            tracing::debug!(key = %key, entry = ?entry, "deleted by sweep");
        }

        removed.len()
    }

    /// Copy the table under a read lock, then save the copy with no lock held
    fn backup(&self) -> Result<usize> {
        let snapshot = self.table.read().clone();
        let count = snapshot.len();

        self.backend.save(&snapshot)?;

        tracing::debug!(backend = self.backend.name(), entries = count, "snapshot saved");
        Ok(count)
    }
}

/// Thread-safe TTL-aware key-value store
///
/// ## Concurrency Model: Single RwLock
///
/// - **Reads** (get/list_all/time_alive): shared lock, run concurrently
/// - **Writes** (insert/remove/set_ttl/sweep): exclusive lock
/// - **Backup**: shared lock for the copy only; I/O happens unlocked
///
/// No critical section performs I/O.
///
/// ## Expiry
///
/// Expiry is sweep-driven. An entry whose instant has passed stays visible
/// to `get` until the next sweep tick removes it.
pub struct Store {
    config: Config,
    inner: Arc<StoreInner>,
    sweeper: Option<BackgroundTask>,
    backup: Option<BackgroundTask>,
}

impl Store {
    /// Open a store using the backend named in `config`
    pub fn open(config: Config) -> Result<Self> {
        let backend = config.backend.build()?;
        Self::with_backend(config, backend)
    }

    /// Open a store against an already constructed backend
    ///
    /// On startup:
    /// 1. Restore the table from the backend (empty on failure)
    /// 2. Start the expiry sweep
    /// 3. Start the backup loop if `backup_interval` is non-zero
    pub fn with_backend(config: Config, backend: Arc<dyn SnapshotBackend>) -> Result<Self> {
        if config.sweep_interval.is_zero() {
            return Err(TtlKvError::Config(
                "sweep interval must be non-zero".to_string(),
            ));
        }

        // Step 1: Restore before any concurrent access exists
        let mut table = Table::new();
        match backend.restore_into(&mut table) {
            Ok(()) => {
                tracing::info!(
                    backend = backend.name(),
                    entries = table.len(),
                    "restored snapshot"
                );
            }
            Err(e) => {
                tracing::warn!(
                    backend = backend.name(),
                    error = %e,
                    "restore failed, starting with an empty table"
                );
                table.clear();
            }
        }

        let inner = Arc::new(StoreInner {
            table: RwLock::new(table),
            backend,
        });

        // Step 2: Expiry sweep
        let sweep_inner = Arc::clone(&inner);
        let sweeper = BackgroundTask::spawn("sweep", config.sweep_interval, move || {
            sweep_inner.sweep_expired();
        })?;

        // Step 3: Periodic backup
        let backup = if config.backup_enabled() {
            let backup_inner = Arc::clone(&inner);
            let task = BackgroundTask::spawn("backup", config.backup_interval, move || {
                if let Err(e) = backup_inner.backup() {
                    tracing::error!(
                        backend = backup_inner.backend.name(),
                        error = %e,
                        "scheduled backup failed"
                    );
                }
            })?;
            Some(task)
        } else {
            None
        };

        Ok(Self {
            config,
            inner,
            sweeper: Some(sweeper),
            backup,
        })
    }

    /// Insert a value with no expiry
    ///
    /// Never overwrites: an existing key yields `DuplicateKey`.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) -> Result<()> {
        self.insert_entry(key.into(), Entry::new(value))
    }

    /// Insert a value that expires `ttl` from now
    ///
    /// A zero TTL is legal and makes the entry eligible for the next sweep.
    /// TTLs longer than [`MAX_TTL`] are capped.
    pub fn insert_with_ttl(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
        ttl: Duration,
    ) -> Result<()> {
        let now = Utc::now();
        let expires_at = chrono::Duration::from_std(ttl.min(MAX_TTL))
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let entry = Entry {
            value: value.into(),
            created_at: now,
            expires_at: Some(expires_at),
        };
        self.insert_entry(key.into(), entry)
    }

    fn insert_entry(&self, key: String, entry: Entry) -> Result<()> {
        let mut table = self.inner.table.write();
        if table.contains_key(&key) {
            return Err(TtlKvError::DuplicateKey(key));
        }
        table.insert(key, entry);
        Ok(())
    }

    /// Current value, including entries past expiry that are not yet swept
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.table.read().get(key).map(|e| e.value.clone())
    }

    /// Point-in-time copy of every value, in no particular order
    pub fn list_all(&self) -> Vec<String> {
        self.inner
            .table
            .read()
            .values()
            .map(|e| e.value.clone())
            .collect()
    }

    /// Delete a key; absent keys are a no-op
    pub fn remove(&self, key: &str) {
        self.inner.table.write().remove(key);
    }

    /// How long ago the entry was inserted
    pub fn time_alive(&self, key: &str) -> Option<Duration> {
        let created_at = self.inner.table.read().get(key)?.created_at;
        Some(
            Utc::now()
                .signed_duration_since(created_at)
                .to_std()
                .unwrap_or(Duration::ZERO),
        )
    }

    /// Replace the expiry instant of an existing key
    ///
    /// An instant in the past makes the entry eligible for the next sweep.
    pub fn set_ttl(&self, key: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let mut table = self.inner.table.write();
        match table.get_mut(key) {
            Some(entry) => {
                entry.expires_at = Some(expires_at);
                Ok(())
            }
            None => Err(TtlKvError::NotFound(key.to_string())),
        }
    }

    /// Run one sweep pass now; returns the number of entries removed
    pub fn sweep_expired(&self) -> usize {
        self.inner.sweep_expired()
    }

    /// Take and save one snapshot now; returns its entry count
    pub fn backup_now(&self) -> Result<usize> {
        self.inner.backup()
    }

    /// Independent copy of the whole table
    pub fn snapshot(&self) -> Table {
        self.inner.table.read().clone()
    }

    /// Number of entries (including expired, unswept ones)
    pub fn len(&self) -> usize {
        self.inner.table.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.table.read().is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.table.read().contains_key(key)
    }

    /// Stop the background loops, then take a final snapshot if backup is on
    pub fn close(mut self) -> Result<()> {
        self.stop_background();

        if self.config.backup_enabled() {
            let count = self.inner.backup()?;
            tracing::info!(entries = count, "final snapshot saved");
        }

        Ok(())
    }

    fn stop_background(&mut self) {
        if let Some(mut sweeper) = self.sweeper.take() {
            sweeper.stop();
        }
        if let Some(mut backup) = self.backup.take() {
            backup.stop();
        }
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Name of the configured snapshot backend
    pub fn backend_name(&self) -> &'static str {
        self.inner.backend.name()
    }

    /// Whether the backup loop is running
    pub fn backup_running(&self) -> bool {
        self.backup.as_ref().map_or(false, BackgroundTask::is_running)
    }

    /// Whether the sweep loop is running
    pub fn sweep_running(&self) -> bool {
        self.sweeper.as_ref().map_or(false, BackgroundTask::is_running)
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.stop_background();
    }
}
