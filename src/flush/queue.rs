//! Flush Queue
//!
//! Append-only list of retired memtables, oldest first.

use crate::memtable::MemTable;
use crate::wal::{WalWriter, WriteOperation};

/// A retired memtable and the WAL that backed it
#[derive(Debug)]
pub struct FlushQueueEntry {
    wal_id: u64,
    memtable: MemTable,
    wal: WalWriter,
}

impl FlushQueueEntry {
    pub fn new(wal_id: u64, memtable: MemTable, wal: WalWriter) -> Self {
        Self {
            wal_id,
            memtable,
            wal,
        }
    }

    pub fn wal_id(&self) -> u64 {
        self.wal_id
    }

    /// Read-only view; a queued memtable is never written again
    pub fn memtable(&self) -> &MemTable {
        &self.memtable
    }

    /// Read-only view of the sealed WAL (for replay)
    pub fn wal(&self) -> &WalWriter {
        &self.wal
    }
}

/// Retired memtables awaiting compaction
#[derive(Debug, Default)]
pub struct FlushQueue {
    entries: Vec<FlushQueueEntry>,
}

impl FlushQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a retired pair at the back (newest)
    pub fn push(&mut self, entry: FlushQueueEntry) {
        self.entries.push(entry);
    }

    /// Latest operation for `key` across all entries, newest first
    pub fn get(&self, key: &[u8]) -> Option<&WriteOperation> {
        self.entries
            .iter()
            .rev()
            .find_map(|entry| entry.memtable.get(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries oldest → newest
    pub fn iter(&self) -> impl Iterator<Item = &FlushQueueEntry> {
        self.entries.iter()
    }

    /// Total memtable bytes held by the queue
    pub fn total_size(&self) -> usize {
        self.entries.iter().map(|e| e.memtable.size()).sum()
    }
}
