//! Configuration for ttlkv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::persistence::{
    JsonFileBackend, NoopBackend, SnapshotBackend, SnapshotFileBackend, SqliteBackend,
};

/// Default pause between two expiry sweeps
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Main configuration for a ttlkv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Store Configuration
    // -------------------------------------------------------------------------
    /// Interval between periodic snapshots. `Duration::ZERO` disables backup.
    pub backup_interval: Duration,

    /// Interval between expiry sweeps
    pub sweep_interval: Duration,

    /// Where snapshots are restored from and saved to
    pub backend: BackendConfig,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds, 0 = none)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = none)
    pub write_timeout_ms: u64,
}

/// Which snapshot backend the store talks to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BackendConfig {
    /// No durability at all
    #[default]
    None,

    /// One JSON document on disk
    JsonFile { path: PathBuf },

    /// Checksummed bincode snapshot on disk
    SnapshotFile { path: PathBuf },

    /// One row per key in a SQLite database
    Sqlite { path: PathBuf },
}

impl BackendConfig {
    /// Instantiate the backend this config describes
    pub fn build(&self) -> Result<Arc<dyn SnapshotBackend>> {
        let backend: Arc<dyn SnapshotBackend> = match self {
            BackendConfig::None => Arc::new(NoopBackend),
            BackendConfig::JsonFile { path } => Arc::new(JsonFileBackend::new(path)),
            BackendConfig::SnapshotFile { path } => Arc::new(SnapshotFileBackend::new(path)),
            BackendConfig::Sqlite { path } => Arc::new(SqliteBackend::open(path)?),
        };
        Ok(backend)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backup_interval: Duration::ZERO,
            sweep_interval: SWEEP_INTERVAL,
            backend: BackendConfig::None,
            listen_addr: "127.0.0.1:7070".to_string(),
            max_connections: 1024,
            read_timeout_ms: 0,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Whether the periodic backup loop should run
    pub fn backup_enabled(&self) -> bool {
        !self.backup_interval.is_zero()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the backup interval (zero disables backup)
    pub fn backup_interval(mut self, interval: Duration) -> Self {
        self.config.backup_interval = interval;
        self
    }

    /// Set the expiry sweep interval
    pub fn sweep_interval(mut self, interval: Duration) -> Self {
        self.config.sweep_interval = interval;
        self
    }

    /// Set the snapshot backend
    pub fn backend(mut self, backend: BackendConfig) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
