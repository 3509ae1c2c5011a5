//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - INSERT:     key_len (4) + key + value
//! - INSERT_TTL: ttl_ms (8) + key_len (4) + key + value
//! - GET:        key_len (4) + key
//! - LIST_ALL:   empty
//! - REMOVE:     key_len (4) + key
//! - TIME_ALIVE: key_len (4) + key
//! - SET_TTL:    expires_at_ms (8, signed) + key_len (4) + key
//! - PING:       empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! All integers are big endian. Keys and values must be UTF-8.

use std::io::{Read, Write};

use bytes::{Buf, BufMut, BytesMut};

use super::{Command, CommandType, Response, Status};
use crate::error::{Result, TtlKvError};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let mut payload = BytesMut::new();

    match command {
        Command::Insert { key, value } => {
            put_string(&mut payload, key);
            payload.put_slice(value.as_bytes());
        }
        Command::InsertWithTtl { key, value, ttl_ms } => {
            payload.put_u64(*ttl_ms);
            put_string(&mut payload, key);
            payload.put_slice(value.as_bytes());
        }
        Command::Get { key } | Command::Remove { key } | Command::TimeAlive { key } => {
            put_string(&mut payload, key);
        }
        Command::SetTtl { key, expires_at_ms } => {
            payload.put_i64(*expires_at_ms);
            put_string(&mut payload, key);
        }
        Command::ListAll | Command::Ping => {}
    }

    frame(command.command_type() as u8, &payload)
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (tag, payload) = split_frame(bytes, "command")?;

    let cmd_type = CommandType::from_u8(tag).ok_or_else(|| {
        TtlKvError::Protocol(format!("Unknown command type: 0x{:02x}", tag))
    })?;

    let mut payload = payload;
    let command = match cmd_type {
        CommandType::Insert => {
            let key = take_string(&mut payload, "INSERT")?;
            let value = take_rest(&mut payload, "INSERT")?;
            Command::Insert { key, value }
        }
        CommandType::InsertWithTtl => {
            let ttl_ms = take_u64(&mut payload, "INSERT_TTL")?;
            let key = take_string(&mut payload, "INSERT_TTL")?;
            let value = take_rest(&mut payload, "INSERT_TTL")?;
            Command::InsertWithTtl { key, value, ttl_ms }
        }
        CommandType::Get => Command::Get {
            key: take_string(&mut payload, "GET")?,
        },
        CommandType::Remove => Command::Remove {
            key: take_string(&mut payload, "REMOVE")?,
        },
        CommandType::TimeAlive => Command::TimeAlive {
            key: take_string(&mut payload, "TIME_ALIVE")?,
        },
        CommandType::SetTtl => {
            let expires_at_ms = take_u64(&mut payload, "SET_TTL")? as i64;
            let key = take_string(&mut payload, "SET_TTL")?;
            Command::SetTtl { key, expires_at_ms }
        }
        CommandType::ListAll => Command::ListAll,
        CommandType::Ping => Command::Ping,
    };

    if payload.has_remaining() {
        return Err(TtlKvError::Protocol(format!(
            "{:?} command: unexpected trailing {} bytes",
            cmd_type,
            payload.remaining()
        )));
    }

    Ok(command)
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    frame(response.status as u8, payload)
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (status_byte, payload) = split_frame(bytes, "response")?;

    let status = Status::from_u8(status_byte).ok_or_else(|| {
        TtlKvError::Protocol(format!("Unknown response status: 0x{:02x}", status_byte))
    })?;

    let payload = if payload.is_empty() {
        None
    } else {
        Some(payload.to_vec())
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader)?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader)?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Private Helpers
// =============================================================================

fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut message = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    message.put_u8(tag);
    message.put_u32(payload.len() as u32);
    message.put_slice(payload);
    message.to_vec()
}

/// Validate header and length; returns (tag, payload)
fn split_frame<'a>(bytes: &'a [u8], what: &str) -> Result<(u8, &'a [u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(TtlKvError::Protocol(format!(
            "Incomplete {} header: expected {} bytes, got {}",
            what,
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut header = &bytes[..HEADER_SIZE];
    let tag = header.get_u8();
    let payload_len = header.get_u32() as usize;

    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(TtlKvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(TtlKvError::Protocol(format!(
            "Incomplete {} payload: expected {} bytes, got {}",
            what,
            total_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[HEADER_SIZE..total_len]))
}

fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(TtlKvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let mut message = vec![0u8; HEADER_SIZE + payload_len];
    message[..HEADER_SIZE].copy_from_slice(&header);
    if payload_len > 0 {
        reader.read_exact(&mut message[HEADER_SIZE..])?;
    }

    Ok(message)
}

fn put_string(buf: &mut BytesMut, s: &str) {
    buf.put_u32(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

fn take_u64(payload: &mut &[u8], cmd: &str) -> Result<u64> {
    if payload.remaining() < 8 {
        return Err(TtlKvError::Protocol(format!(
            "{} command: missing 8-byte integer",
            cmd
        )));
    }
    Ok(payload.get_u64())
}

fn take_string(payload: &mut &[u8], cmd: &str) -> Result<String> {
    if payload.remaining() < 4 {
        return Err(TtlKvError::Protocol(format!(
            "{} command: missing key length",
            cmd
        )));
    }

    let len = payload.get_u32() as usize;
    if payload.remaining() < len {
        return Err(TtlKvError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            cmd,
            len,
            payload.remaining()
        )));
    }

    let data: &[u8] = *payload;
    let (raw, rest) = data.split_at(len);
    *payload = rest;
    utf8(raw, cmd)
}

fn take_rest(payload: &mut &[u8], cmd: &str) -> Result<String> {
    let raw = *payload;
    *payload = &[];
    utf8(raw, cmd)
}

fn utf8(raw: &[u8], cmd: &str) -> Result<String> {
    String::from_utf8(raw.to_vec())
        .map_err(|_| TtlKvError::Protocol(format!("{} command: invalid UTF-8", cmd)))
}
