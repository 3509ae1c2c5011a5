//! Network Module
//!
//! TCP server, per-connection handling, and a blocking client.
//!
//! ## Architecture
//! - Single non-blocking acceptor loop
//! - One thread per connection, capped by `max_connections`
//! - Commands routed through `StoreService`

mod client;
mod connection;
mod server;

pub use client::Client;
pub use connection::Connection;
pub use server::{Server, ShutdownHandle};
