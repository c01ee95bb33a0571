//! Arena
//!
//! Fixed-capacity byte region backed by a file and mapped into memory.
//! Records are appended at the cursor and read back by offset.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use memmap2::{MmapMut, MmapOptions};

use crate::error::{KvError, Result};

/// A memory-mapped, append-only byte region of fixed capacity
///
/// The backing file is held under an exclusive advisory lock for as long as
/// the arena is alive, so only one process maps a given store.
pub struct Arena {
    /// Shared read/write mapping of the whole file
    mmap: MmapMut,

    /// Backing file (kept open to hold the lock)
    file: File,

    /// Path to the backing file
    path: PathBuf,

    /// Offset of the next free byte; `0 <= cursor <= capacity`
    cursor: usize,
}

impl Arena {
    /// Open or create the arena file at `path`, sized to exactly `capacity`
    ///
    /// The cursor starts at zero; recovery moves it to the end of the log.
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(KvError::Config("arena capacity must be non-zero".to_string()));
        }

        let open_err = |source: std::io::Error| KvError::ArenaOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(open_err)?;

        file.try_lock_exclusive().map_err(open_err)?;

        let existing_len = file.metadata().map_err(open_err)?.len();
        if existing_len != 0 && existing_len != capacity as u64 {
            tracing::warn!(
                "Resizing arena {} from {} to {} bytes",
                path.display(),
                existing_len,
                capacity
            );
        }
        file.set_len(capacity as u64).map_err(open_err)?;

        // SAFETY: the file is exclusively locked by this process and sized to
        // `capacity` before mapping; it is never resized while mapped.
        let mmap = unsafe { MmapOptions::new().len(capacity).map_mut(&file) }.map_err(open_err)?;

        tracing::debug!("Mapped arena {} ({} bytes)", path.display(), capacity);

        Ok(Self {
            mmap,
            file,
            path: path.to_path_buf(),
            cursor: 0,
        })
    }

    /// Borrow `length` bytes starting at `offset`
    ///
    /// # Panics
    /// If `offset + length` exceeds the capacity.
    pub fn read(&self, offset: usize, length: usize) -> &[u8] {
        &self.mmap[offset..offset + length]
    }

    /// Copy `bytes` in at the cursor and return the offset they start at
    ///
    /// Fails with `Full` without touching the arena if they don't fit.
    pub fn append(&mut self, bytes: &[u8]) -> Result<usize> {
        let available = self.available();
        if bytes.len() > available {
            return Err(KvError::Full {
                requested: bytes.len(),
                available,
            });
        }

        let offset = self.cursor;
        self.mmap[offset..offset + bytes.len()].copy_from_slice(bytes);
        self.cursor += bytes.len();
        Ok(offset)
    }

    /// Synchronously write dirty pages back to the file
    pub fn flush(&self) -> Result<()> {
        self.mmap.flush()?;
        Ok(())
    }

    /// The whole mapped region, written or not
    pub fn as_slice(&self) -> &[u8] {
        &self.mmap[..]
    }

    pub fn capacity(&self) -> usize {
        self.mmap.len()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes left between the cursor and the end of the arena
    pub fn available(&self) -> usize {
        self.capacity() - self.cursor
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Move the cursor to the end of the recovered log
    pub(crate) fn set_cursor(&mut self, cursor: usize) {
        debug_assert!(cursor <= self.capacity());
        self.cursor = cursor;
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        let _ = self.mmap.flush();
        let _ = FileExt::unlock(&self.file);
    }
}
