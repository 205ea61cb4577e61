//! WAL Entry definitions
//!
//! Defines the structure of individual WAL records. The same value is what
//! the memtable stores for each key.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// A single write, as logged to the WAL and held by the memtable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOperation {
    key: Vec<u8>,
    operation: Operation,
    /// Wall-clock nanoseconds since the Unix epoch
    timestamp: i64,
}

/// What a write does to its key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// Store a value (possibly empty)
    Value(Vec<u8>),

    /// Logical delete marker
    Tombstone,
}

impl Operation {
    /// Length of the carried value; 0 for a tombstone
    pub fn value_len(&self) -> usize {
        match self {
            Operation::Value(v) => v.len(),
            Operation::Tombstone => 0,
        }
    }
}

impl WriteOperation {
    pub fn new(key: Vec<u8>, operation: Operation, timestamp: i64) -> Self {
        Self {
            key,
            operation,
            timestamp,
        }
    }

    /// A put record
    pub fn put(key: Vec<u8>, value: Vec<u8>, timestamp: i64) -> Self {
        Self::new(key, Operation::Value(value), timestamp)
    }

    /// A tombstone record
    pub fn delete(key: Vec<u8>, timestamp: i64) -> Self {
        Self::new(key, Operation::Tombstone, timestamp)
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn operation(&self) -> &Operation {
        &self.operation
    }

    /// Stored value, or `None` for a tombstone
    pub fn value(&self) -> Option<&[u8]> {
        match &self.operation {
            Operation::Value(v) => Some(v),
            Operation::Tombstone => None,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self.operation, Operation::Tombstone)
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Bytes this record counts against the memtable budget.
    ///
    /// Key length plus value length; the timestamp and tombstone flag are free.
    pub fn encoded_size(&self) -> usize {
        self.key.len() + self.operation.value_len()
    }
}

/// Current wall-clock time in nanoseconds since the Unix epoch.
///
/// Clamps to 0 for clocks set before the epoch and to `i64::MAX` far in the future.
pub fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
