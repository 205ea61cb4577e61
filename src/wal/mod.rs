//! Write-Ahead Log (WAL) Module
//!
//! Provides durability through append-only logging.
//!
//! ## Responsibilities
//! - Append a record before the memtable is touched
//! - One log per memtable generation, sealed on rotation
//! - Sequential replay until end of stream
//!
//! ## Stream Format
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ Record 1 (bincode WriteOperation)           │
//! │ ┌─────────┬─────────────────────┬─────────┐ │
//! │ │ Key     │ Operation           │ Ts (8)  │ │
//! │ │ len+buf │ tag (+ len+buf)     │         │ │
//! │ └─────────┴─────────────────────┴─────────┘ │
//! ├─────────────────────────────────────────────┤
//! │ Record 2 ...                                │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! No checksum or outer framing: records are read back one after another
//! using the codec's own length prefixes.

mod entry;
mod reader;
mod writer;

pub use entry::{now_nanos, Operation, WriteOperation};
pub use reader::WalReader;
pub use writer::WalWriter;
