//! WAL Reader
//!
//! Replays records from a WAL stream in write order.

use std::io::{BufRead, BufReader, Read};

use crate::error::{DbError, Result};

use super::WriteOperation;

/// Reads records sequentially from a WAL stream
///
/// `read` returns [`DbError::EndOfStream`] once every record has been
/// consumed. A record that is cut short is reported as
/// [`DbError::Serialization`] instead, so replay callers can tell a clean end
/// from a torn write.
pub struct WalReader {
    reader: BufReader<Box<dyn Read + Send>>,
    records_read: u64,
    failed: bool,
}

impl WalReader {
    pub fn new(reader: Box<dyn Read + Send>) -> Self {
        Self {
            reader: BufReader::new(reader),
            records_read: 0,
            failed: false,
        }
    }

    /// Read the next record
    pub fn read(&mut self) -> Result<WriteOperation> {
        if self.reader.fill_buf()?.is_empty() {
            return Err(DbError::EndOfStream);
        }

        let op: WriteOperation = bincode::deserialize_from(&mut self.reader)?;
        self.records_read += 1;
        Ok(op)
    }

    /// Number of records returned so far
    pub fn records_read(&self) -> u64 {
        self.records_read
    }
}

/// Yields records until end of stream. After a genuine error the error is
/// yielded once and iteration stops.
impl Iterator for WalReader {
    type Item = Result<WriteOperation>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.read() {
            Ok(op) => Some(Ok(op)),
            Err(DbError::EndOfStream) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
