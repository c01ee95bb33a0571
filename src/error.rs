//! Error types for MmapKV
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using KvError
pub type Result<T> = std::result::Result<T, KvError>;

/// Unified error type for MmapKV operations
#[derive(Debug, Error)]
pub enum KvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Creating, resizing, locking or mapping the backing file failed
    #[error("Failed to open arena at {path}: {source}")]
    ArenaOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // -------------------------------------------------------------------------
    // Storage Errors
    // -------------------------------------------------------------------------
    #[error("Key not found")]
    KeyNotFound,

    #[error("Key must not be empty")]
    EmptyKey,

    /// The append would run past the end of the arena
    #[error("Store full: record needs {requested} bytes, {available} available")]
    Full { requested: usize, available: usize },

    #[error("Record too large: key {key_len} bytes, value {value_len} bytes")]
    RecordTooLarge { key_len: usize, value_len: usize },

    /// A record in the arena could not be decoded
    #[error("Malformed record at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
