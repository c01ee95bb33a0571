//! Recovery
//!
//! Rebuilds the index and the append cursor by replaying the arena from
//! offset zero.

use crate::error::Result;
use crate::index::Index;

use super::record::{self, Record, RecordHeader, HEADER_SIZE};
use super::Arena;

/// Replays an arena on startup
pub struct Recovery;

/// Result of a recovery scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Number of data records replayed
    pub records_scanned: u64,

    /// Number of tombstones replayed
    pub tombstones_scanned: u64,

    /// Keys live in the index once the scan finished
    pub live_keys: usize,

    /// Offset just past the last record (the recovered cursor)
    pub end_offset: usize,
}

impl Recovery {
    /// Scan `arena`, build the index, and move the cursor to the end of the log
    ///
    /// Later records for a key win over earlier ones; a tombstone removes the
    /// key. A record that cannot be decoded aborts recovery.
    pub fn recover(arena: &mut Arena) -> Result<(Index, RecoveryResult)> {
        let (index, result) = Self::scan(arena.as_slice())?;
        arena.set_cursor(result.end_offset);
        Ok((index, result))
    }

    /// Scan `arena` without modifying it
    pub fn verify(arena: &Arena) -> Result<RecoveryResult> {
        Self::scan(arena.as_slice()).map(|(_, result)| result)
    }

    fn scan(region: &[u8]) -> Result<(Index, RecoveryResult)> {
        let mut index = Index::new();
        let mut result = RecoveryResult::default();
        let mut position = 0;

        while position + HEADER_SIZE <= region.len() {
            if RecordHeader::read(region, position)?.is_sentinel() {
                break;
            }

            let (record, record_len) = record::decode(region, position)?;
            match record {
                Record::Value { key, .. } => {
                    index.insert(key.to_vec(), position);
                    result.records_scanned += 1;
                }
                Record::Tombstone { key } => {
                    index.remove(key);
                    result.tombstones_scanned += 1;
                }
            }
            position += record_len;
        }

        result.live_keys = index.len();
        result.end_offset = position;
        Ok((index, result))
    }
}
