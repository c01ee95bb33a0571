//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! Every message is a frame:
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Tag (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//! Tag is the command type for requests and the status for responses.
//!
//! ### Payload by Command Type
//! - GET:    key_len (4 bytes) + key
//! - PUT:    key_len (4 bytes) + key + value
//! - DELETE: key_len (4 bytes) + key
//! - PING:   empty

use std::io::{Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use super::{Command, CommandType, Response, Status};
use crate::error::{KvError, Result};

/// Header size: 1 byte tag + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Framing
// =============================================================================

/// Frame a payload; fails with `Protocol` if it exceeds `MAX_PAYLOAD_SIZE`
fn encode_frame(tag: u8, payload: &[u8]) -> Result<Bytes> {
    check_payload_len(payload.len())?;

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    buf.put_u8(tag);
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
    Ok(buf.freeze())
}

fn check_payload_len(len: usize) -> Result<()> {
    if len > MAX_PAYLOAD_SIZE as usize {
        return Err(KvError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            len, MAX_PAYLOAD_SIZE
        )));
    }
    Ok(())
}

/// Split a complete frame into its tag and payload
fn decode_frame(mut bytes: &[u8]) -> Result<(u8, &[u8])> {
    if bytes.len() < HEADER_SIZE {
        return Err(KvError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let tag = bytes.get_u8();
    let payload_len = bytes.get_u32() as usize;
    check_payload_len(payload_len)?;

    if bytes.len() < payload_len {
        return Err(KvError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            payload_len,
            bytes.len()
        )));
    }

    Ok((tag, &bytes[..payload_len]))
}

/// Read one frame off a stream, blocking until it is complete
fn read_frame<R: Read>(reader: &mut R) -> Result<(u8, Vec<u8>)> {
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    let mut head = &header[..];
    let tag = head.get_u8();
    let payload_len = head.get_u32() as usize;
    check_payload_len(payload_len)?;

    let mut payload = vec![0u8; payload_len];
    reader.read_exact(&mut payload)?;
    Ok((tag, payload))
}

fn write_frame<W: Write>(writer: &mut W, frame: &[u8]) -> Result<()> {
    writer.write_all(frame)?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Fails with `Protocol` if the payload would not fit in one frame.
pub fn encode_command(command: &Command) -> Result<Bytes> {
    let mut payload = BytesMut::new();
    match command {
        Command::Get { key } | Command::Delete { key } => {
            check_payload_len(4 + key.len())?;
            payload.put_u32(key.len() as u32);
            payload.put_slice(key);
        }
        Command::Put { key, value } => {
            check_payload_len(4 + key.len() + value.len())?;
            payload.reserve(4 + key.len() + value.len());
            payload.put_u32(key.len() as u32);
            payload.put_slice(key);
            payload.put_slice(value);
        }
        Command::Ping => {}
    }
    encode_frame(command.command_type() as u8, &payload)
}

/// Decode a command from a complete frame
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    let (tag, payload) = decode_frame(bytes)?;
    let command_type = CommandType::from_u8(tag)
        .ok_or_else(|| KvError::Protocol(format!("Unknown command type: 0x{:02x}", tag)))?;
    parse_command(command_type, payload)
}

fn parse_command(command_type: CommandType, mut payload: &[u8]) -> Result<Command> {
    match command_type {
        CommandType::Get => {
            let key = take_key(&mut payload, "GET")?;
            expect_consumed(payload, "GET")?;
            Ok(Command::Get { key })
        }
        CommandType::Put => {
            let key = take_key(&mut payload, "PUT")?;
            Ok(Command::Put {
                key,
                value: payload.to_vec(),
            })
        }
        CommandType::Delete => {
            let key = take_key(&mut payload, "DELETE")?;
            expect_consumed(payload, "DELETE")?;
            Ok(Command::Delete { key })
        }
        CommandType::Ping => {
            expect_consumed(payload, "PING")?;
            Ok(Command::Ping)
        }
    }
}

/// Consume `key_len (4) + key` from the front of a payload
fn take_key(payload: &mut &[u8], name: &str) -> Result<Vec<u8>> {
    if payload.remaining() < 4 {
        return Err(KvError::Protocol(format!(
            "{} command: missing key length",
            name
        )));
    }

    let key_len = payload.get_u32() as usize;
    if payload.remaining() < key_len {
        return Err(KvError::Protocol(format!(
            "{} command: incomplete key (expected {}, got {})",
            name,
            key_len,
            payload.remaining()
        )));
    }

    let key = payload[..key_len].to_vec();
    payload.advance(key_len);
    Ok(key)
}

fn expect_consumed(payload: &[u8], name: &str) -> Result<()> {
    if !payload.is_empty() {
        return Err(KvError::Protocol(format!(
            "{} command: unexpected {} trailing bytes",
            name,
            payload.len()
        )));
    }
    Ok(())
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
pub fn encode_response(response: &Response) -> Result<Bytes> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    encode_frame(response.status as u8, payload)
}

/// Decode a response from a complete frame
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let (tag, payload) = decode_frame(bytes)?;
    build_response(tag, payload.to_vec())
}

fn build_response(tag: u8, payload: Vec<u8>) -> Result<Response> {
    let status = Status::from_u8(tag)
        .ok_or_else(|| KvError::Protocol(format!("Unknown response status: 0x{:02x}", tag)))?;

    let payload = if payload.is_empty() { None } else { Some(payload) };
    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let (tag, payload) = read_frame(reader)?;
    let command_type = CommandType::from_u8(tag)
        .ok_or_else(|| KvError::Protocol(format!("Unknown command type: 0x{:02x}", tag)))?;
    parse_command(command_type, &payload)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    write_frame(writer, &encode_command(command)?)
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let (tag, payload) = read_frame(reader)?;
    build_response(tag, payload)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    write_frame(writer, &encode_response(response)?)
}
