//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: INSERT      - Payload: key + value
//! - 0x02: INSERT_TTL  - Payload: ttl_ms + key + value
//! - 0x03: GET         - Payload: key
//! - 0x04: LIST_ALL    - Payload: empty
//! - 0x05: REMOVE      - Payload: key
//! - 0x06: TIME_ALIVE  - Payload: key
//! - 0x07: SET_TTL     - Payload: expires_at_ms + key
//! - 0x08: PING        - Payload: empty
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK
//! - 0x01: NOT_FOUND
//! - 0x02: DUPLICATE
//! - 0x03: ERROR
//! - 0x04: ITEM (streamed LIST_ALL element, terminated by OK)

mod codec;
mod command;
mod response;

pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response, HEADER_SIZE, MAX_PAYLOAD_SIZE,
};
pub use command::{Command, CommandType};
pub use response::{Response, Status};
