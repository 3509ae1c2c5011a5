//! Store Module
//!
//! The shared, TTL-aware table and everything that runs against it.
//!
//! ## Responsibilities
//! - CRUD + TTL operations, safe under concurrent callers
//! - Periodic expiry sweep (expiry is never checked at read time)
//! - Restore on open, periodic best-effort snapshot backup
//! - Stop both background loops when the store goes away
//!
//! ## Data Structure Choice
//! Using HashMap wrapped in a single RwLock:
//! - Key order is irrelevant
//! - One lock makes every operation linearizable
//! - Exclusive sections are in-memory only

mod background;
mod entry;
mod table;

pub use background::BackgroundTask;
pub use entry::Entry;
pub use table::{Store, Table, MAX_TTL};
