//! Response definitions
//!
//! Represents responses to clients.

use crate::engine::{CommandOutput, EngineStats};
use crate::error::{Result, StrataError};

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GET, stats for STATS, message for ERROR)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an OK response carrying bincode-encoded stats
    pub fn stats(stats: &EngineStats) -> Result<Self> {
        Ok(Self::ok(Some(bincode::serialize(stats)?)))
    }

    /// Build the response for a command's outcome
    pub fn from_output(output: CommandOutput) -> Self {
        match output {
            CommandOutput::Done => Self::ok(None),
            CommandOutput::Value(value) => Self::ok(Some(value)),
            CommandOutput::NotFound => Self::not_found(),
            CommandOutput::Stats(stats) => {
                Self::stats(&stats).unwrap_or_else(|e| Self::error(&e.to_string()))
            }
        }
    }

    /// Decode the stats carried by a STATS response
    pub fn decode_stats(&self) -> Result<EngineStats> {
        let payload = self.payload.as_deref().ok_or_else(|| {
            StrataError::Protocol("STATS response has no payload".to_string())
        })?;
        Ok(bincode::deserialize(payload)?)
    }

    /// Error message carried by an ERROR response
    pub fn error_message(&self) -> Option<String> {
        match self.status {
            Status::Error => self
                .payload
                .as_deref()
                .map(|p| String::from_utf8_lossy(p).into_owned()),
            _ => None,
        }
    }
}
