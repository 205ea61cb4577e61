//! MemTable Module
//!
//! In-memory buffer for recent writes.
//!
//! ## Responsibilities
//! - Latest write per key, tombstones included
//! - Exact byte accounting for the rotation threshold
//! - Ordered iteration for a future flush to sorted tables
//!
//! ## Data Structure Choice
//! BTreeMap without internal locking:
//! - Ordered keys
//! - The engine already serializes every access, so a second lock here
//!   would only add cost

mod table;

pub use table::MemTable;
