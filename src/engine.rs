//! Engine Module
//!
//! The core storage engine that coordinates all components.
//!
//! ## Responsibilities
//! - Validate client input
//! - Log every write before it reaches the memtable
//! - Rotate the active memtable/WAL pair into the flush queue when full
//! - Answer reads across the active memtable and the flush queue

use std::mem;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, trace, warn};

use crate::config::Config;
use crate::error::{DbError, Result};
use crate::flush::{FlushQueue, FlushQueueEntry};
use crate::memtable::MemTable;
use crate::storage::StorageBackend;
use crate::wal::{now_nanos, Operation, WalReader, WalWriter, WriteOperation};

/// The main storage engine
///
/// ## Concurrency Model
///
/// All mutable state sits behind one `RwLock`:
///
/// - **Writes** (put/delete/rotate): exclusive lock for the whole step
///   - size projection → optional rotation → WAL append → memtable apply
///   - two writers can never both see "not full" and overshoot the budget,
///     nor both decide to rotate
///   - log order == apply order == timestamp order
///
/// - **Reads** (get): shared lock for the whole lookup
///   - active memtable, then flush queue newest → oldest
///   - never observes a half-finished rotation
///
/// Rotation runs inline on the writer that crosses the threshold. There are
/// no background threads.
pub struct Engine {
    /// Engine configuration (validated)
    config: Config,

    /// Where WAL streams come from
    backend: Arc<dyn StorageBackend>,

    /// Active pair, WAL id counter and flush queue
    state: RwLock<EngineState>,
}

struct EngineState {
    /// Active memtable (receives all writes)
    memtable: MemTable,

    /// WAL backing the active memtable
    wal: WalWriter,

    /// Id of the active WAL stream. The next generation gets `wal_id + 1`.
    wal_id: u64,

    /// Retired pairs, oldest first. Never drained here.
    flush_queue: FlushQueue,

    /// Timestamp of the last write, for monotonic stamping
    last_timestamp: i64,
}

impl EngineState {
    /// Wall-clock nanoseconds, bumped past the previous write if the clock stalls or steps back
    fn next_timestamp(&mut self) -> i64 {
        let ts = now_nanos().max(self.last_timestamp.saturating_add(1));
        self.last_timestamp = ts;
        ts
    }
}

/// Point-in-time counters for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    pub active_wal_id: u64,
    pub memtable_size: usize,
    pub memtable_entries: usize,
    pub flush_queue_len: usize,
    pub flush_queue_bytes: usize,
}

impl Engine {
    /// Create an engine writing its WALs to `backend`
    ///
    /// Opens WAL stream 0 and an empty memtable. Failing to open the stream
    /// fails construction; there is no retry.
    pub fn open(backend: Arc<dyn StorageBackend>, config: Config) -> Result<Self> {
        let config = config.validate()?;
        let wal = Self::open_wal(backend.as_ref(), &config, 0)?;

        info!(
            memtable_max_bytes = config.memtable_max_bytes,
            wal_namespace = %config.wal_namespace,
            "Engine opened"
        );

        Ok(Self {
            config,
            backend,
            state: RwLock::new(EngineState {
                memtable: MemTable::new(),
                wal,
                wal_id: 0,
                flush_queue: FlushQueue::new(),
                last_timestamp: 0,
            }),
        })
    }

    /// Open with a memtable budget (convenience method)
    ///
    /// Uses default config otherwise. Zero selects the default budget.
    pub fn with_max_bytes(backend: Arc<dyn StorageBackend>, memtable_max_bytes: usize) -> Result<Self> {
        let config = Config::builder().memtable_max_bytes(memtable_max_bytes).build();
        Self::open(backend, config)
    }

    /// Get a value by key
    ///
    /// Search order:
    /// 1. Active MemTable
    /// 2. Flush queue (newest to oldest)
    ///
    /// A tombstone anywhere along the way ends the search with `None`.
    pub fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        Self::check_key(key)?;

        let state = self.state.read();
        let found = state
            .memtable
            .get(key)
            .or_else(|| state.flush_queue.get(key));

        Ok(found.and_then(WriteOperation::value).map(<[u8]>::to_vec))
    }

    /// Put a key-value pair. An empty value is stored as-is.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        Self::check_key(key)?;
        self.write(key, Operation::Value(value.to_vec()))
    }

    /// Delete a key
    ///
    /// Writes a tombstone; older values stay in the flush queue until
    /// compaction.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        Self::check_key(key)?;
        self.write(key, Operation::Tombstone)
    }

    /// Retire the active memtable now, regardless of size
    ///
    /// Returns `false` without rotating if the active memtable is empty and
    /// its WAL is still healthy.
    pub fn rotate(&self) -> Result<bool> {
        let mut state = self.state.write();
        if state.memtable.is_empty() && !state.wal.is_failed() {
            return Ok(false);
        }
        self.rotate_locked(&mut state)?;
        Ok(true)
    }

    /// Sync the active WAL to durable storage
    pub fn sync(&self) -> Result<()> {
        self.state.write().wal.sync()
    }

    /// Close the engine
    ///
    /// Syncs the active WAL. Queued memtables are dropped with the engine;
    /// their WAL streams remain in the backend.
    pub fn close(self) -> Result<()> {
        let mut state = self.state.into_inner();
        state.wal.sync()?;

        info!(
            active_wal_id = state.wal_id,
            memtable_entries = state.memtable.entry_count(),
            flush_queue_len = state.flush_queue.len(),
            "Engine closed"
        );

        Ok(())
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    fn write(&self, key: &[u8], operation: Operation) -> Result<()> {
        let max = self.config.memtable_max_bytes;
        let size = key.len() + operation.value_len();
        if size > max {
            warn!(size, max, "Rejected write larger than memtable budget");
            return Err(DbError::PayloadTooLarge { size, max });
        }

        let mut state = self.state.write();
        let op = WriteOperation::new(key.to_vec(), operation, state.next_timestamp());

        // A failed WAL may end in a torn record; nothing goes after it
        if state.wal.is_failed() || state.memtable.projected_size(&op) > max {
            self.rotate_locked(&mut state)?;
        }

        // WAL first: a failed append leaves the memtable untouched.
        // A failed sync means the record is already logged, so it is applied
        // and the sync error is reported after.
        let mut sync_error = None;
        match state.wal.append(&op) {
            Ok(()) => {}
            Err(e @ DbError::SyncFailed(_)) => {
                warn!(wal_id = state.wal_id, error = %e, "WAL sync failed after append");
                sync_error = Some(e);
            }
            Err(e) => {
                warn!(wal_id = state.wal_id, error = %e, "WAL append failed");
                return Err(e);
            }
        }

        trace!(
            wal_id = state.wal_id,
            size = op.encoded_size(),
            tombstone = op.is_delete(),
            "Write applied"
        );
        state.memtable.put(op);

        match sync_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Swap in a fresh memtable/WAL pair and queue the old one
    ///
    /// Either everything changes or nothing does: the retired WAL is synced
    /// and the new stream opened before any field is touched. A WAL that
    /// already failed is retired without the sync.
    fn rotate_locked(&self, state: &mut EngineState) -> Result<()> {
        let new_id = state.wal_id + 1;

        let synced = if state.wal.is_failed() {
            Ok(())
        } else {
            state.wal.sync()
        };
        let opened = synced.and_then(|()| Self::open_wal(self.backend.as_ref(), &self.config, new_id));
        let wal = match opened {
            Ok(wal) => wal,
            Err(e) => {
                warn!(wal_id = state.wal_id, new_wal_id = new_id, error = %e, "Rotation failed");
                return Err(e);
            }
        };

        let memtable = mem::take(&mut state.memtable);
        let retired_wal = mem::replace(&mut state.wal, wal);
        let retired_id = mem::replace(&mut state.wal_id, new_id);

        debug!(
            retired_wal_id = retired_id,
            new_wal_id = new_id,
            retired_bytes = memtable.size(),
            retired_entries = memtable.entry_count(),
            queue_len = state.flush_queue.len() + 1,
            "Rotated memtable"
        );

        state
            .flush_queue
            .push(FlushQueueEntry::new(retired_id, memtable, retired_wal));

        Ok(())
    }

    fn open_wal(backend: &dyn StorageBackend, config: &Config, wal_id: u64) -> Result<WalWriter> {
        let stream = backend.open_stream(&config.wal_namespace, &wal_id.to_string())?;
        Ok(WalWriter::new(stream, config.wal_sync_strategy))
    }

    fn check_key(key: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(DbError::InvalidArgument("key must not be empty".to_string()));
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the active memtable size
    pub fn memtable_size(&self) -> usize {
        self.state.read().memtable.size()
    }

    /// Get the active memtable entry count
    pub fn memtable_entry_count(&self) -> usize {
        self.state.read().memtable.entry_count()
    }

    /// Id of the active WAL stream
    pub fn active_wal_id(&self) -> u64 {
        self.state.read().wal_id
    }

    /// Number of retired memtables waiting in the flush queue
    pub fn flush_queue_len(&self) -> usize {
        self.state.read().flush_queue.len()
    }

    /// WAL ids of queued memtables, oldest first
    pub fn flush_queue_wal_ids(&self) -> Vec<u64> {
        self.state
            .read()
            .flush_queue
            .iter()
            .map(FlushQueueEntry::wal_id)
            .collect()
    }

    /// Replay reader over a WAL still held by the engine
    ///
    /// Covers the active WAL and every queued one. Any other id is an
    /// `InvalidArgument`.
    pub fn wal_reader(&self, wal_id: u64) -> Result<WalReader> {
        let state = self.state.read();
        if wal_id == state.wal_id {
            return state.wal.reader();
        }
        let reader = state
            .flush_queue
            .iter()
            .find(|entry| entry.wal_id() == wal_id)
            .ok_or_else(|| DbError::InvalidArgument(format!("WAL {} is not held by this engine", wal_id)))?
            .wal()
            .reader();
        reader
    }

    /// True if the active WAL failed and the next write will rotate past it
    pub fn active_wal_failed(&self) -> bool {
        self.state.read().wal.is_failed()
    }

    /// Snapshot of engine counters
    pub fn stats(&self) -> EngineStats {
        let state = self.state.read();
        EngineStats {
            active_wal_id: state.wal_id,
            memtable_size: state.memtable.size(),
            memtable_entries: state.memtable.entry_count(),
            flush_queue_len: state.flush_queue.len(),
            flush_queue_bytes: state.flush_queue.total_size(),
        }
    }

    /// Check the active memtable's cached size against its entries
    pub fn verify_size_invariant(&self) -> bool {
        let state = self.state.read();
        let actual: usize = state.memtable.iter().map(WriteOperation::encoded_size).sum();
        actual == state.memtable.size()
    }
}
