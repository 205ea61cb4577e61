//! Error types for averagedb
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using DbError
pub type Result<T> = std::result::Result<T, DbError>;

/// Unified error type for averagedb operations
#[derive(Debug, Error)]
pub enum DbError {
    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Payload too large: {size} bytes exceeds memtable limit of {max} bytes")]
    PayloadTooLarge { size: usize, max: usize },

    // -------------------------------------------------------------------------
    // Backend Errors
    // -------------------------------------------------------------------------
    /// Stream open/append/read failure, passed through untouched
    #[error("Backend error: {0}")]
    Backend(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The record reached the log but could not be made durable
    #[error("WAL sync failed: {0}")]
    SyncFailed(#[source] std::io::Error),

    /// An earlier append or sync failed; the log takes no more records
    #[error("WAL is sealed: {0}")]
    WalFailed(String),

    /// No more records in the log. Replay callers stop here.
    #[error("End of WAL stream")]
    EndOfStream,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DbError {
    /// True if this is the normal end-of-replay signal rather than a fault
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, DbError::EndOfStream)
    }
}

impl From<bincode::Error> for DbError {
    fn from(err: bincode::Error) -> Self {
        match *err {
            bincode::ErrorKind::Io(io_err) => {
                if io_err.kind() == std::io::ErrorKind::UnexpectedEof {
                    DbError::Serialization(format!("truncated record: {}", io_err))
                } else {
                    DbError::Backend(io_err)
                }
            }
            other => DbError::Serialization(other.to_string()),
        }
    }
}
