//! Configuration for MmapKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// Default arena capacity: 8 MiB
pub const DEFAULT_CAPACITY: usize = 8 * 1024 * 1024;

/// Main configuration for an MmapKV instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for the store file
    /// Internal structure:
    ///   {data_dir}/
    ///     └── store.mmap       (memory-mapped record log)
    pub data_dir: PathBuf,

    /// Size of the arena in bytes. Fixed for the lifetime of the process;
    /// reopening with a different value resizes the file.
    pub capacity: usize,

    /// Append a tombstone on delete so deletions survive a restart; a delete
    /// can then fail with `Full`. When off, deletes only touch the in-memory
    /// index.
    pub durable_deletes: bool,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max connections queued for the worker pool
    pub max_connections: usize,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./mmapkv_data"),
            capacity: DEFAULT_CAPACITY,
            durable_deletes: true,
            listen_addr: "127.0.0.1:8090".to_string(),
            max_connections: 1024,
            worker_threads: 4,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the arena capacity (in bytes)
    pub fn capacity(mut self, bytes: usize) -> Self {
        self.config.capacity = bytes;
        self
    }

    /// Enable or disable tombstone records on delete
    pub fn durable_deletes(mut self, enabled: bool) -> Self {
        self.config.durable_deletes = enabled;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
