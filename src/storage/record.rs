//! Record codec
//!
//! Encodes key-value pairs and tombstones into the on-disk record format
//! and decodes them back out of the arena.

use crate::error::{KvError, Result};

/// Header size: KeyLen (4) + ValLen (4)
pub const HEADER_SIZE: usize = 8;

/// Value length reserved to mark a tombstone (no value bytes follow)
pub const TOMBSTONE_MARKER: u32 = u32::MAX;

/// Largest key length representable in the header
pub const MAX_KEY_LEN: usize = u32::MAX as usize;

/// Largest value length; `u32::MAX` itself is the tombstone marker
pub const MAX_VALUE_LEN: usize = (TOMBSTONE_MARKER - 1) as usize;

// =============================================================================
// Header
// =============================================================================

/// Fixed-size record header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    pub key_len: u32,
    pub val_len: u32,
}

impl RecordHeader {
    /// Parse a header from its 8 little-endian bytes
    pub fn decode(bytes: [u8; HEADER_SIZE]) -> Self {
        Self {
            key_len: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            val_len: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
        }
    }

    /// Read the header at `offset` in `region`
    pub fn read(region: &[u8], offset: usize) -> Result<Self> {
        let end = offset.checked_add(HEADER_SIZE).ok_or_else(|| KvError::Malformed {
            offset,
            reason: "header offset overflows".to_string(),
        })?;

        let slice = region.get(offset..end).ok_or_else(|| KvError::Malformed {
            offset,
            reason: format!(
                "header needs {} bytes, region ends at {}",
                HEADER_SIZE,
                region.len()
            ),
        })?;

        let mut bytes = [0u8; HEADER_SIZE];
        bytes.copy_from_slice(slice);
        Ok(Self::decode(bytes))
    }

    /// All-zero header: end of the written log
    pub fn is_sentinel(&self) -> bool {
        self.key_len == 0 && self.val_len == 0
    }

    pub fn is_tombstone(&self) -> bool {
        self.val_len == TOMBSTONE_MARKER
    }

    /// Number of value bytes following the key
    pub fn value_len(&self) -> usize {
        if self.is_tombstone() {
            0
        } else {
            self.val_len as usize
        }
    }

    /// Total on-disk size of the record, header included
    ///
    /// `None` if the lengths do not fit in `usize`.
    pub fn record_len(&self) -> Option<usize> {
        HEADER_SIZE
            .checked_add(self.key_len as usize)?
            .checked_add(self.value_len())
    }
}

// =============================================================================
// Record
// =============================================================================

/// A decoded record borrowing from the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// A live key-value pair
    Value { key: &'a [u8], value: &'a [u8] },

    /// A deletion marker for `key`
    Tombstone { key: &'a [u8] },
}

impl<'a> Record<'a> {
    pub fn key(&self) -> &'a [u8] {
        match self {
            Record::Value { key, .. } | Record::Tombstone { key } => key,
        }
    }

    /// The value, or `None` for a tombstone
    pub fn value(&self) -> Option<&'a [u8]> {
        match self {
            Record::Value { value, .. } => Some(value),
            Record::Tombstone { .. } => None,
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Encode a key-value pair
///
/// Format: key_len (4, LE) + val_len (4, LE) + key + value
pub fn encode(key: &[u8], value: &[u8]) -> Result<Vec<u8>> {
    if key.len() > MAX_KEY_LEN || value.len() > MAX_VALUE_LEN {
        return Err(KvError::RecordTooLarge {
            key_len: key.len(),
            value_len: value.len(),
        });
    }

    let mut buf = Vec::with_capacity(HEADER_SIZE + key.len() + value.len());
    buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
    buf.extend_from_slice(&(value.len() as u32).to_le_bytes());
    buf.extend_from_slice(key);
    buf.extend_from_slice(value);
    Ok(buf)
}

/// Encode a tombstone for `key`
///
/// Format: key_len (4, LE) + TOMBSTONE_MARKER (4, LE) + key
pub fn encode_tombstone(key: &[u8]) -> Result<Vec<u8>> {
    if key.len() > MAX_KEY_LEN {
        return Err(KvError::RecordTooLarge {
            key_len: key.len(),
            value_len: 0,
        });
    }

    let mut buf = Vec::with_capacity(HEADER_SIZE + key.len());
    buf.extend_from_slice(&(key.len() as u32).to_le_bytes());
    buf.extend_from_slice(&TOMBSTONE_MARKER.to_le_bytes());
    buf.extend_from_slice(key);
    Ok(buf)
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode the record starting at `offset`
///
/// Returns the record and its total length. Fails with `Malformed` if the
/// header or body would run past the end of `region`, or if the header is
/// the end-of-log sentinel or names an empty key.
pub fn decode(region: &[u8], offset: usize) -> Result<(Record<'_>, usize)> {
    let header = RecordHeader::read(region, offset)?;

    if header.key_len == 0 {
        let reason = if header.is_sentinel() {
            "end-of-log sentinel"
        } else {
            "empty key"
        };
        return Err(KvError::Malformed {
            offset,
            reason: reason.to_string(),
        });
    }

    let record_len = header.record_len().ok_or_else(|| KvError::Malformed {
        offset,
        reason: format!(
            "record lengths overflow (key_len={}, val_len={})",
            header.key_len, header.val_len
        ),
    })?;
    let end = offset
        .checked_add(record_len)
        .filter(|end| *end <= region.len())
        .ok_or_else(|| KvError::Malformed {
            offset,
            reason: format!(
                "record of {} bytes overruns region of {} bytes",
                record_len,
                region.len()
            ),
        })?;

    let key_start = offset + HEADER_SIZE;
    let key_end = key_start + header.key_len as usize;
    let key = &region[key_start..key_end];

    let record = if header.is_tombstone() {
        Record::Tombstone { key }
    } else {
        Record::Value {
            key,
            value: &region[key_end..end],
        }
    };

    Ok((record, record_len))
}
