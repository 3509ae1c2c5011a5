//! # ttlkv
//!
//! An in-memory key-value store where every entry may carry a TTL:
//! - Single RwLock table, safe under concurrent readers and writers
//! - Sweep-driven expiry on a fixed interval
//! - Restore on open, best-effort periodic snapshots
//! - Pluggable snapshot backends (JSON file, binary file, SQLite)
//! - TCP request/response protocol with streamed listing
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    StoreService                              │
//! │          (duplicate / not_found mapping)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                       Store                                  │
//! │                 (RwLock<HashMap>)                            │
//! └─────┬──────────────────────────────────────────────┬────────┘
//!       │                                              │
//!       ▼                                              ▼
//! ┌─────────────┐                              ┌─────────────────┐
//! │ Sweep loop  │                              │  Backup loop    │
//! │ (1s tick)   │                              │ → SnapshotBackend│
//! └─────────────┘                              └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use ttlkv::{Config, Store};
//!
//! let store = Store::open(Config::default()).unwrap();
//! store.insert("user:1", "alice").unwrap();
//! store.insert_with_ttl("session:1", "token", Duration::from_secs(30)).unwrap();
//! assert_eq!(store.get("user:1").as_deref(), Some("alice"));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod network;
pub mod persistence;
pub mod protocol;
pub mod service;
pub mod store;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{BackendConfig, Config};
pub use error::{Result, TtlKvError};
pub use persistence::SnapshotBackend;
pub use store::{Entry, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ttlkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
