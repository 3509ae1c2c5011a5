//! Service Module
//!
//! Maps protocol commands onto store operations and store outcomes onto
//! responses. Holds no state of its own beyond the store handle.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::TtlKvError;
use crate::protocol::{Command, Response};
use crate::store::Store;

/// What a command produces on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Exactly one response frame
    Single(Response),

    /// One ITEM frame per value, then a terminating OK
    Stream(Vec<String>),
}

/// Network-facing adapter over a shared [`Store`]
#[derive(Clone)]
pub struct StoreService {
    store: Arc<Store>,
}

impl StoreService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// Execute a command
    ///
    /// Routes commands to the matching store operation
    pub fn execute(&self, command: Command) -> Reply {
        let response = match command {
            Command::Insert { key, value } => insert_reply(self.store.insert(key, value)),
            Command::InsertWithTtl { key, value, ttl_ms } => insert_reply(
                self.store
                    .insert_with_ttl(key, value, Duration::from_millis(ttl_ms)),
            ),
            Command::Get { key } => match self.store.get(&key) {
                Some(value) => Response::ok(Some(value.into_bytes())),
                None => Response::not_found(),
            },
            Command::ListAll => return Reply::Stream(self.store.list_all()),
            Command::Remove { key } => {
                self.store.remove(&key);
                Response::ok(None)
            }
            Command::TimeAlive { key } => match self.store.time_alive(&key) {
                Some(alive) => {
                    let millis = alive.as_millis().min(u64::MAX as u128) as u64;
                    Response::ok(Some(millis.to_be_bytes().to_vec()))
                }
                None => Response::not_found(),
            },
            Command::SetTtl { key, expires_at_ms } => {
                match DateTime::<Utc>::from_timestamp_millis(expires_at_ms) {
                    Some(expires_at) => match self.store.set_ttl(&key, expires_at) {
                        Ok(()) => Response::ok(None),
                        Err(TtlKvError::NotFound(_)) => Response::not_found(),
                        Err(e) => Response::error(&e.to_string()),
                    },
                    None => Response::error(&format!(
                        "invalid expiry timestamp: {} ms",
                        expires_at_ms
                    )),
                }
            }
            Command::Ping => Response::ok(Some(b"PONG".to_vec())),
        };

        Reply::Single(response)
    }
}

fn insert_reply(result: crate::error::Result<()>) -> Response {
    match result {
        Ok(()) => Response::ok(None),
        Err(TtlKvError::DuplicateKey(_)) => Response::duplicate(),
        Err(e) => Response::error(&e.to_string()),
    }
}
