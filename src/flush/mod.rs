//! Flush Module
//!
//! Holds retired memtables until a compactor persists them.
//!
//! ## Responsibilities
//! - Keep retired (memtable, WAL) pairs in retirement order
//! - Answer lookups newest → oldest so later writes shadow earlier ones
//!
//! Nothing drains the queue yet. A compactor would persist entries from the
//! front (oldest) and then drop them together with their WAL streams.

mod queue;

pub use queue::{FlushQueue, FlushQueueEntry};
