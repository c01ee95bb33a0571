//! Storage Module
//!
//! The durable record log: a fixed-capacity memory-mapped arena holding
//! length-prefixed records packed from offset zero.
//!
//! ## Responsibilities
//! - Map the store file and append records at the cursor
//! - Encode and decode records
//! - Replay the log on startup to rebuild the index and cursor
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Record 1                               │
//! │ ┌────────┬────────┬─────┬───────────┐  │
//! │ │KeyLen  │ValLen  │ Key │   Value   │  │
//! │ └────────┴────────┴─────┴───────────┘  │
//! ├────────────────────────────────────────┤
//! │ ... (packed, no gaps or padding)       │
//! ├────────────────────────────────────────┤
//! │ Zero-filled tail up to capacity        │
//! └────────────────────────────────────────┘
//! ```
//!
//! Lengths are little-endian u32. `ValLen = u32::MAX` marks a tombstone
//! (no value bytes). An all-zero header marks the end of the log.

mod arena;
pub mod record;
mod recovery;

pub use arena::Arena;
pub use record::{Record, RecordHeader, HEADER_SIZE, TOMBSTONE_MARKER};
pub use recovery::{Recovery, RecoveryResult};
