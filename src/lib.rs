//! # MmapKV
//!
//! A log-structured key-value store with:
//! - A single fixed-capacity store file, memory-mapped and append-only
//! - Synchronous durability (every write is flushed before it is acknowledged)
//! - Crash recovery by replaying the log on startup
//! - Durable deletes via tombstone records
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Worker Pool)                               │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                   Engine                                     │
//! │            (one exclusive lock: get / put / delete)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Arena    │◄─────────│    Index    │
//!   │   (mmap)    │ offsets  │  (HashMap)  │
//!   └──────┬──────┘          └─────────────┘
//!          │ replayed on startup by
//!          ▼
//!   ┌─────────────┐
//!   │  Recovery   │
//!   └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod index;
pub mod network;
pub mod protocol;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{KvError, Result};
pub use config::Config;
pub use engine::Engine;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of MmapKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
