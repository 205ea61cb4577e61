//! # averagedb
//!
//! An embeddable LSM-style key-value engine with:
//! - Write-Ahead Logging (WAL) for durability
//! - Exact byte accounting on the active memtable
//! - Memtable/WAL rotation into a flush queue
//! - Pluggable byte-stream storage backends
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Engine (put / delete / get)                 │
//! │                   RwLock<EngineState>                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  WAL (id n) │          │  MemTable   │   active pair
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │ rotation
//!          ▼                        ▼
//!   ┌─────────────┐          ┌─────────────────────────────┐
//!   │   Storage   │          │ Flush Queue (oldest first)  │
//!   │   Backend   │          │ [(MemTable, WAL) ...]       │
//!   └─────────────┘          └─────────────────────────────┘
//! ```
//!
//! Compaction of the flush queue and replay on startup are not part of this
//! crate. Data still in the queue is only durable in its WAL streams.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod wal;
pub mod memtable;
pub mod flush;
pub mod storage;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{DbError, Result};
pub use config::{Config, WalSyncStrategy};
pub use engine::{Engine, EngineStats};
pub use storage::{FileBackend, LogStream, MemoryBackend, StorageBackend};
pub use wal::{Operation, WriteOperation};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of averagedb
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
