//! Index Module
//!
//! In-memory map from key to the arena offset of its latest record.
//! Derived entirely from the arena and rebuilt on every startup.

use std::collections::HashMap;

/// Key → offset of the most recent data record for that key
#[derive(Debug, Default)]
pub struct Index {
    offsets: HashMap<Vec<u8>, usize>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offset of the latest record for `key`, if live
    pub fn get(&self, key: &[u8]) -> Option<usize> {
        self.offsets.get(key).copied()
    }

    /// Point `key` at `offset`, replacing any earlier mapping
    pub fn insert(&mut self, key: Vec<u8>, offset: usize) {
        self.offsets.insert(key, offset);
    }

    /// Drop `key`; returns whether it was present
    pub fn remove(&mut self, key: &[u8]) -> bool {
        self.offsets.remove(key).is_some()
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        self.offsets.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Live keys in no particular order
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.offsets.keys().map(|k| k.as_slice())
    }
}
