//! Response definitions
//!
//! Replies the server sends back, and how engine results map onto them.

use crate::error::KvError;

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Full = 0x02,
    Error = 0x03,
}

impl Status {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0x00 => Some(Status::Ok),
            0x01 => Some(Status::NotFound),
            0x02 => Some(Status::Full),
            0x03 => Some(Status::Error),
            _ => None,
        }
    }
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GET, message for FULL/ERROR)
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

    /// Create a FULL response
    pub fn full(message: &str) -> Self {
        Self {
            status: Status::Full,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Create an ERROR response
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            payload: Some(message.as_bytes().to_vec()),
        }
    }

    /// Payload as text, for FULL and ERROR messages
    pub fn message(&self) -> String {
        self.payload
            .as_deref()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .unwrap_or_default()
    }
}

impl From<crate::Result<Option<Vec<u8>>>> for Response {
    fn from(result: crate::Result<Option<Vec<u8>>>) -> Self {
        match result {
            Ok(payload) => Response::ok(payload),
            Err(KvError::KeyNotFound) => Response::not_found(),
            Err(e @ KvError::Full { .. }) => Response::full(&e.to_string()),
            Err(e) => Response::error(&e.to_string()),
        }
    }
}
