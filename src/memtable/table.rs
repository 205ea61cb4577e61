//! MemTable implementation
//!
//! BTreeMap-based memtable with a cached byte size.

use std::collections::BTreeMap;

use crate::wal::WriteOperation;

/// In-memory table for recent writes
///
/// `size` always equals the sum of `encoded_size()` over the stored
/// operations. Not synchronized; callers hold the engine lock.
#[derive(Debug, Default)]
pub struct MemTable {
    data: BTreeMap<Vec<u8>, WriteOperation>,
    size: usize,
}

impl MemTable {
    /// Create a new empty MemTable
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the table would have after applying `op`
    pub fn projected_size(&self, op: &WriteOperation) -> usize {
        let superseded = self
            .data
            .get(op.key())
            .map_or(0, WriteOperation::encoded_size);
        self.size - superseded + op.encoded_size()
    }

    /// Insert or replace the entry for `op`'s key. Returns the new size.
    pub fn put(&mut self, op: WriteOperation) -> usize {
        self.size = self.projected_size(&op);
        self.data.insert(op.key().to_vec(), op);
        self.size
    }

    /// Latest operation for `key`; callers interpret tombstones
    pub fn get(&self, key: &[u8]) -> Option<&WriteOperation> {
        self.data.get(key)
    }

    /// Bytes counted against the budget
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn entry_count(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = &WriteOperation> {
        self.data.values()
    }
}
