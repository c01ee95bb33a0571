//! Engine Module
//!
//! The store engine that coordinates the arena, record codec and index.
//!
//! ## Responsibilities
//! - Open the store file and run recovery before serving requests
//! - Serve get/put/delete under a single exclusive lock
//! - Make every write durable before acknowledging it

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::index::Index;
use crate::protocol::Command;
use crate::storage::{record, Arena, Recovery, RecoveryResult};

/// State guarded by the engine lock
struct Inner {
    arena: Arena,
    index: Index,
}

/// The main storage engine
///
/// ## Concurrency Model: one exclusive lock
///
/// The arena cursor, the mapped bytes and the index are one unit of state.
/// Every operation (reads included) holds `inner` for its whole duration, so
/// operations are strictly serialized and an append is never interleaved
/// with another.
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path of the memory-mapped store file
    store_path: PathBuf,

    /// Arena + index
    inner: Mutex<Inner>,
}

impl Engine {
    const STORE_FILENAME: &'static str = "store.mmap";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Create the data directory
    /// 2. Map the store file at the configured capacity
    /// 3. Replay the log to rebuild the index and cursor
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let store_path = config.data_dir.join(Self::STORE_FILENAME);

        let mut arena = Arena::open(&store_path, config.capacity)?;
        let (index, recovery) = Recovery::recover(&mut arena)?;

        tracing::info!(
            "Recovered {}: {} records, {} tombstones, {} live keys, cursor={}/{}",
            store_path.display(),
            recovery.records_scanned,
            recovery.tombstones_scanned,
            recovery.live_keys,
            arena.cursor(),
            arena.capacity()
        );

        Ok(Self {
            config,
            store_path,
            inner: Mutex::new(Inner { arena, index }),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        Self::open(Config::builder().data_dir(path).build())
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers
    pub fn execute(&self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::Get { key } => self.get(&key).map(Some),
            Command::Put { key, value } => {
                self.put(&key, &value)?;
                Ok(None)
            }
            Command::Delete { key } => {
                self.delete(&key)?;
                Ok(None)
            }
            Command::Ping => Ok(Some(b"PONG".to_vec())),
        }
    }

    /// Get the latest value for `key`
    ///
    /// Fails with `KeyNotFound` if the key is not live.
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        let inner = self.inner.lock();

        let offset = inner.index.get(key).ok_or(KvError::KeyNotFound)?;
        let (record, _) = record::decode(inner.arena.as_slice(), offset)?;
        let value = record.value().map(<[u8]>::to_vec);

        value.ok_or_else(|| KvError::Malformed {
            offset,
            reason: "index points at a tombstone".to_string(),
        })
    }

    /// Put a key-value pair
    ///
    /// Steps:
    /// 1. Encode the record
    /// 2. Append it at the cursor (fails with `Full`, changing nothing)
    /// 3. Flush the arena
    /// 4. Point the index at the new record
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::EmptyKey);
        }
        let bytes = record::encode(key, value)?;

        let mut inner = self.inner.lock();
        let offset = Self::append_durable(&mut inner.arena, &bytes)?;
        inner.index.insert(key.to_vec(), offset);

        tracing::debug!(
            "put key_len={} value_len={} offset={}",
            key.len(),
            value.len(),
            offset
        );
        Ok(())
    }

    /// Delete a key
    ///
    /// Fails with `KeyNotFound` if the key is not live. With durable deletes
    /// (the default) a tombstone is appended and flushed before the index
    /// entry goes away, so delete can also fail with `Full` or `Io`; the key
    /// then stays live. With durable deletes off, only the index entry is
    /// dropped, nothing is appended, and the key comes back after a restart.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(KvError::EmptyKey);
        }

        let mut inner = self.inner.lock();
        if !inner.index.contains(key) {
            return Err(KvError::KeyNotFound);
        }

        if self.config.durable_deletes {
            let bytes = record::encode_tombstone(key)?;
            let offset = Self::append_durable(&mut inner.arena, &bytes)?;
            tracing::debug!("tombstone key_len={} offset={}", key.len(), offset);
        }

        inner.index.remove(key);
        Ok(())
    }

    /// Append and flush, called with the lock held
    fn append_durable(arena: &mut Arena, bytes: &[u8]) -> Result<usize> {
        let offset = arena.append(bytes).map_err(|e| {
            if let KvError::Full { requested, available } = e {
                tracing::warn!(
                    "Store full: {} byte record rejected, {} bytes left",
                    requested,
                    available
                );
            }
            e
        })?;
        arena.flush()?;
        Ok(offset)
    }

    /// Re-scan the log read-only and report what it holds
    ///
    /// Fails with `Malformed` if any record between offset zero and the end
    /// of the log does not decode.
    pub fn verify(&self) -> Result<RecoveryResult> {
        let inner = self.inner.lock();
        Recovery::verify(&inner.arena)
    }

    /// Close the engine gracefully
    ///
    /// Syncs the arena to disk
    pub fn close(self) -> Result<()> {
        let inner = self.inner.into_inner();
        inner.arena.flush()
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the path of the store file
    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Arena capacity in bytes
    pub fn capacity(&self) -> usize {
        self.inner.lock().arena.capacity()
    }

    /// Offset of the next free byte in the arena
    pub fn cursor(&self) -> usize {
        self.inner.lock().arena.cursor()
    }

    /// Bytes left in the arena
    pub fn available(&self) -> usize {
        self.inner.lock().arena.available()
    }

    /// Number of live keys
    pub fn key_count(&self) -> usize {
        self.inner.lock().index.len()
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.inner.lock().index.contains(key)
    }

    /// Live keys, in no particular order
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.inner.lock().index.keys().map(<[u8]>::to_vec).collect()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}
