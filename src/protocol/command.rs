//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandType {
    Insert = 0x01,
    InsertWithTtl = 0x02,
    Get = 0x03,
    ListAll = 0x04,
    Remove = 0x05,
    TimeAlive = 0x06,
    SetTtl = 0x07,
    Ping = 0x08,
}

impl CommandType {
    /// Map a wire tag back to a command type
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(CommandType::Insert),
            0x02 => Some(CommandType::InsertWithTtl),
            0x03 => Some(CommandType::Get),
            0x04 => Some(CommandType::ListAll),
            0x05 => Some(CommandType::Remove),
            0x06 => Some(CommandType::TimeAlive),
            0x07 => Some(CommandType::SetTtl),
            0x08 => Some(CommandType::Ping),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert a value with no expiry
    Insert { key: String, value: String },

    /// Insert a value that expires `ttl_ms` from now
    InsertWithTtl {
        key: String,
        value: String,
        ttl_ms: u64,
    },

    /// Get a value by key
    Get { key: String },

    /// Stream every value
    ListAll,

    /// Remove a key
    Remove { key: String },

    /// Time since the key was inserted
    TimeAlive { key: String },

    /// Replace the expiry instant (unix millis)
    SetTtl { key: String, expires_at_ms: i64 },

    /// Ping (health check)
    Ping,
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Insert { .. } => CommandType::Insert,
            Command::InsertWithTtl { .. } => CommandType::InsertWithTtl,
            Command::Get { .. } => CommandType::Get,
            Command::ListAll => CommandType::ListAll,
            Command::Remove { .. } => CommandType::Remove,
            Command::TimeAlive { .. } => CommandType::TimeAlive,
            Command::SetTtl { .. } => CommandType::SetTtl,
            Command::Ping => CommandType::Ping,
        }
    }
}
