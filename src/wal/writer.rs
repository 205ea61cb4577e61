//! WAL Writer
//!
//! Handles appending records to a backend stream.

use crate::config::WalSyncStrategy;
use crate::error::{DbError, Result};
use crate::storage::LogStream;

use super::{WalReader, WriteOperation};

/// Appends records to one WAL stream
///
/// Each `append` encodes the whole record first and hands it to the stream
/// in a single `write_all`, so a successful call leaves exactly one complete
/// record behind. A failed call may leave a torn tail, after which the
/// writer refuses further records.
pub struct WalWriter {
    stream: Box<dyn LogStream>,
    sync_strategy: WalSyncStrategy,

    /// Records appended since the last sync
    unsynced: usize,

    /// Set by the first failed append or sync
    failed: bool,

    records_written: u64,
    bytes_written: u64,
}

impl WalWriter {
    /// Wrap a freshly opened stream
    pub fn new(stream: Box<dyn LogStream>, sync_strategy: WalSyncStrategy) -> Self {
        Self {
            stream,
            sync_strategy,
            unsynced: 0,
            failed: false,
            records_written: 0,
            bytes_written: 0,
        }
    }

    /// Append one record
    ///
    /// Any stream error fails the writer: the stream may now end in a torn
    /// record, so later appends are refused with [`DbError::WalFailed`].
    /// [`DbError::SyncFailed`] means the record is in the log but may not be
    /// durable.
    pub fn append(&mut self, op: &WriteOperation) -> Result<()> {
        self.check_usable()?;
        let encoded = bincode::serialize(op)?;

        if let Err(e) = self
            .stream
            .write_all(&encoded)
            .and_then(|()| self.stream.flush())
        {
            self.failed = true;
            return Err(e.into());
        }

        self.records_written += 1;
        self.bytes_written += encoded.len() as u64;
        self.unsynced += 1;

        let sync_due = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced >= count,
        };
        if sync_due {
            self.sync_stream()?;
        }

        Ok(())
    }

    /// Force sync to durable storage
    pub fn sync(&mut self) -> Result<()> {
        self.check_usable()?;
        self.sync_stream()
    }

    fn sync_stream(&mut self) -> Result<()> {
        if let Err(e) = self.stream.flush().and_then(|()| self.stream.sync()) {
            self.failed = true;
            return Err(DbError::SyncFailed(e));
        }
        self.unsynced = 0;
        Ok(())
    }

    fn check_usable(&self) -> Result<()> {
        if self.failed {
            return Err(DbError::WalFailed(
                "earlier append or sync did not complete".to_string(),
            ));
        }
        Ok(())
    }

    /// True once an append or sync has failed
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Open a sequential reader over this log from its first record
    pub fn reader(&self) -> Result<WalReader> {
        Ok(WalReader::new(self.stream.reader()?))
    }

    /// Number of records appended
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Number of encoded bytes appended
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

impl std::fmt::Debug for WalWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalWriter")
            .field("sync_strategy", &self.sync_strategy)
            .field("records_written", &self.records_written)
            .field("bytes_written", &self.bytes_written)
            .field("failed", &self.failed)
            .finish()
    }
}
