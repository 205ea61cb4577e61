//! Configuration for averagedb
//!
//! Centralized configuration with sensible defaults.

use crate::error::{DbError, Result};

/// Default memtable budget when none (or zero) is given
pub const DEFAULT_MEMTABLE_MAX_BYTES: usize = 1024 * 1024; // 1 MiB

/// Namespace under which WAL streams are opened
pub const DEFAULT_WAL_NAMESPACE: &str = "wal";

/// Main configuration for an engine instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // MemTable Configuration
    // -------------------------------------------------------------------------
    /// Max size of the active memtable before rotation (in bytes).
    /// Counts key + value bytes only.
    pub memtable_max_bytes: usize,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Backend namespace for WAL streams
    pub wal_namespace: String,

    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            memtable_max_bytes: DEFAULT_MEMTABLE_MAX_BYTES,
            wal_namespace: DEFAULT_WAL_NAMESPACE.to_string(),
            wal_sync_strategy: WalSyncStrategy::EveryNEntries { count: 100 },
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Normalize and check the config before an engine uses it.
    ///
    /// A zero memtable budget falls back to [`DEFAULT_MEMTABLE_MAX_BYTES`].
    pub fn validate(mut self) -> Result<Self> {
        if self.memtable_max_bytes == 0 {
            self.memtable_max_bytes = DEFAULT_MEMTABLE_MAX_BYTES;
        }
        if self.wal_namespace.is_empty() {
            return Err(DbError::Config("WAL namespace must not be empty".to_string()));
        }
        if let WalSyncStrategy::EveryNEntries { count: 0 } = self.wal_sync_strategy {
            return Err(DbError::Config(
                "EveryNEntries sync count must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the memtable size limit (in bytes). Zero means "use the default".
    pub fn memtable_max_bytes(mut self, size: usize) -> Self {
        self.config.memtable_max_bytes = size;
        self
    }

    /// Set the backend namespace for WAL streams
    pub fn wal_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.config.wal_namespace = namespace.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
