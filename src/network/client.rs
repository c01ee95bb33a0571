//! Blocking client
//!
//! Sends commands to a running server and maps responses back to results.

use std::io::{BufReader, BufWriter};
use std::net::{TcpStream, ToSocketAddrs};

use crate::error::{KvError, Result};
use crate::protocol::{read_response, write_command, Command, Response, Status};

/// A single connection to an MmapKV server
pub struct Client {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;
        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
        })
    }

    /// Send one command and wait for its response
    pub fn request(&mut self, command: &Command) -> Result<Response> {
        write_command(&mut self.writer, command)?;
        read_response(&mut self.reader)
    }

    /// Get a value; `None` if the key is not found
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let response = self.request(&Command::Get { key: key.to_vec() })?;
        match response.status {
            Status::Ok => Ok(Some(response.payload.unwrap_or_default())),
            Status::NotFound => Ok(None),
            _ => Err(KvError::Server(response.message())),
        }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        let response = self.request(&Command::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        })?;
        match response.status {
            Status::Ok => Ok(()),
            _ => Err(KvError::Server(response.message())),
        }
    }

    /// Delete a key; `false` if it was not found
    pub fn delete(&mut self, key: &[u8]) -> Result<bool> {
        let response = self.request(&Command::Delete { key: key.to_vec() })?;
        match response.status {
            Status::Ok => Ok(true),
            Status::NotFound => Ok(false),
            _ => Err(KvError::Server(response.message())),
        }
    }

    pub fn ping(&mut self) -> Result<()> {
        let response = self.request(&Command::Ping)?;
        match response.status {
            Status::Ok => Ok(()),
            _ => Err(KvError::Server(response.message())),
        }
    }
}
