//! Store entry definitions
//!
//! A value plus the instants that decide when it goes away.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque payload
    pub value: String,

    /// When the entry was inserted
    pub created_at: DateTime<Utc>,

    /// Absolute expiry instant; `None` lives until removed
    pub expires_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Entry created now, with no expiry
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    /// Entry created now, expiring at `expires_at`
    pub fn expiring(value: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            created_at: Utc::now(),
            expires_at: Some(expires_at),
        }
    }

    /// Strictly past the expiry instant at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |t| now > t)
    }
}
