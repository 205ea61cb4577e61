//! Storage Module
//!
//! The byte-stream backend the engine writes its logs to.
//!
//! ## Responsibilities
//! - Hand out fresh read/write streams keyed by (namespace, id)
//! - Enumerate existing stream ids in a namespace
//! - Make written bytes durable on request
//!
//! ## Layout (FileBackend)
//! ```text
//! {root}/
//!   └── wal/
//!       ├── 0.log
//!       ├── 1.log
//!       └── ...
//! ```
//!
//! The engine only ever opens increasing ids in its WAL namespace.
//! `list_stream_ids` is part of the contract for a recovery component; the
//! engine itself does not call it.

mod file;
mod memory;

use std::collections::BTreeSet;
use std::io::{self, Read, Write};

pub use file::FileBackend;
pub use memory::MemoryBackend;

/// A writable, readable byte channel handed out by a backend
pub trait LogStream: Write + Send + Sync {
    /// Open an independent reader positioned at the start of the stream.
    ///
    /// The reader sees bytes appended after it was opened.
    fn reader(&self) -> io::Result<Box<dyn Read + Send>>;

    /// Make everything written so far durable
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Capability the engine needs from its storage
pub trait StorageBackend: Send + Sync {
    /// Open a fresh stream identified by (namespace, id)
    ///
    /// What happens to an existing stream with the same id is up to the
    /// backend: `MemoryBackend` replaces it, `FileBackend` refuses.
    fn open_stream(&self, namespace: &str, id: &str) -> io::Result<Box<dyn LogStream>>;

    /// List the ids of existing streams in a namespace
    fn list_stream_ids(&self, namespace: &str) -> io::Result<BTreeSet<String>>;
}
