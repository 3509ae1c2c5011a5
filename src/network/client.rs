//! Blocking client
//!
//! One method per command; DUPLICATE and NOT_FOUND come back as the same
//! typed errors the store itself returns.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{Result, TtlKvError};
use crate::protocol::{read_response, write_command, Command, Response, Status};

/// Client connection to a ttlkv server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to `addr` (host:port)
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| TtlKvError::Network(format!("failed to connect to {}: {}", addr, e)))?;
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    pub fn insert(&mut self, key: &str, value: &str) -> Result<()> {
        let response = self.call(Command::Insert {
            key: key.to_string(),
            value: value.to_string(),
        })?;
        expect_inserted(response, key)
    }

    pub fn insert_with_ttl(&mut self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let response = self.call(Command::InsertWithTtl {
            key: key.to_string(),
            value: value.to_string(),
            ttl_ms: ttl.as_millis().min(u64::MAX as u128) as u64,
        })?;
        expect_inserted(response, key)
    }

    pub fn get(&mut self, key: &str) -> Result<Option<String>> {
        let response = self.call(Command::Get {
            key: key.to_string(),
        })?;
        match response.status {
            Status::Ok => Ok(Some(response.payload_str().unwrap_or_default().to_string())),
            Status::NotFound => Ok(None),
            _ => Err(unexpected(response)),
        }
    }

    /// Collect the streamed values
    pub fn list_all(&mut self) -> Result<Vec<String>> {
        write_command(&mut self.writer, &Command::ListAll)?;

        let mut values = Vec::new();
        loop {
            let response = read_response(&mut self.reader)?;
            match response.status {
                Status::Item => values.push(response.payload_str().unwrap_or_default().to_string()),
                Status::Ok => return Ok(values),
                _ => return Err(unexpected(response)),
            }
        }
    }

    pub fn remove(&mut self, key: &str) -> Result<()> {
        let response = self.call(Command::Remove {
            key: key.to_string(),
        })?;
        match response.status {
            Status::Ok => Ok(()),
            _ => Err(unexpected(response)),
        }
    }

    pub fn time_alive(&mut self, key: &str) -> Result<Option<Duration>> {
        let response = self.call(Command::TimeAlive {
            key: key.to_string(),
        })?;
        match response.status {
            Status::Ok => {
                let payload = response.payload.as_deref().unwrap_or_default();
                let millis: [u8; 8] = payload.try_into().map_err(|_| {
                    TtlKvError::Protocol(format!(
                        "TIME_ALIVE reply: expected 8 bytes, got {}",
                        payload.len()
                    ))
                })?;
                Ok(Some(Duration::from_millis(u64::from_be_bytes(millis))))
            }
            Status::NotFound => Ok(None),
            _ => Err(unexpected(response)),
        }
    }

    pub fn set_ttl(&mut self, key: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let response = self.call(Command::SetTtl {
            key: key.to_string(),
            expires_at_ms: expires_at.timestamp_millis(),
        })?;
        match response.status {
            Status::Ok => Ok(()),
            Status::NotFound => Err(TtlKvError::NotFound(key.to_string())),
            _ => Err(unexpected(response)),
        }
    }

    pub fn ping(&mut self) -> Result<()> {
        let response = self.call(Command::Ping)?;
        if response.status == Status::Ok && response.payload_str() == Some("PONG") {
            Ok(())
        } else {
            Err(unexpected(response))
        }
    }

    fn call(&mut self, command: Command) -> Result<Response> {
        write_command(&mut self.writer, &command)?;
        read_response(&mut self.reader)
    }
}

fn expect_inserted(response: Response, key: &str) -> Result<()> {
    match response.status {
        Status::Ok => Ok(()),
        Status::Duplicate => Err(TtlKvError::DuplicateKey(key.to_string())),
        _ => Err(unexpected(response)),
    }
}

fn unexpected(response: Response) -> TtlKvError {
    match response.status {
        Status::Error => TtlKvError::Network(
            response
                .payload_str()
                .unwrap_or("server error")
                .to_string(),
        ),
        status => TtlKvError::Protocol(format!("unexpected response status {:?}", status)),
    }
}
