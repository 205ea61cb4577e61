//! In-memory backend
//!
//! Streams are shared byte buffers. Useful for tests and for embedding
//! without durability.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{LogStream, StorageBackend};

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// Backend keeping every stream in memory
///
/// Cloning shares the same streams. Reopening an existing (namespace, id)
/// replaces it with an empty buffer.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    /// namespace → id → buffer
    streams: Mutex<BTreeMap<String, BTreeMap<String, SharedBuffer>>>,

    /// Fault injection: fail every `open_stream`
    fail_opens: AtomicBool,

    /// Stream-level faults, shared with every open stream
    faults: Arc<Faults>,
}

#[derive(Default)]
struct Faults {
    /// Fail every write on every stream
    fail_writes: AtomicBool,

    /// Fail every sync on every stream
    fail_syncs: AtomicBool,

    /// Byte budget for the next write; the stream that hits it breaks
    partial_write: Mutex<Option<usize>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams opened in a namespace
    pub fn stream_count(&self, namespace: &str) -> usize {
        self.inner
            .streams
            .lock()
            .get(namespace)
            .map_or(0, BTreeMap::len)
    }

    /// Byte length of a stream, if it exists
    pub fn stream_len(&self, namespace: &str, id: &str) -> Option<usize> {
        self.buffer(namespace, id).map(|buf| buf.lock().len())
    }

    /// Copy of a stream's contents, if it exists
    pub fn stream_bytes(&self, namespace: &str, id: &str) -> Option<Vec<u8>> {
        self.buffer(namespace, id).map(|buf| buf.lock().clone())
    }

    /// Make subsequent `open_stream` calls fail
    pub fn set_fail_opens(&self, fail: bool) {
        self.inner.fail_opens.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent writes on all streams fail
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.faults.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make subsequent syncs on all streams fail. Writes still land.
    pub fn set_fail_syncs(&self, fail: bool) {
        self.inner.faults.fail_syncs.store(fail, Ordering::SeqCst);
    }

    /// Let the next write on any stream store at most `bytes` bytes
    ///
    /// The stream that takes the short write is broken afterwards: every
    /// later write on it fails, leaving a torn tail. Other streams are
    /// unaffected.
    pub fn set_partial_write(&self, bytes: usize) {
        *self.inner.faults.partial_write.lock() = Some(bytes);
    }

    fn buffer(&self, namespace: &str, id: &str) -> Option<SharedBuffer> {
        self.inner
            .streams
            .lock()
            .get(namespace)
            .and_then(|ids| ids.get(id))
            .cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn open_stream(&self, namespace: &str, id: &str) -> io::Result<Box<dyn LogStream>> {
        if self.inner.fail_opens.load(Ordering::SeqCst) {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                format!("injected open failure for {}/{}", namespace, id),
            ));
        }

        let buffer: SharedBuffer = Arc::new(Mutex::new(Vec::new()));
        self.inner
            .streams
            .lock()
            .entry(namespace.to_string())
            .or_default()
            .insert(id.to_string(), Arc::clone(&buffer));

        Ok(Box::new(MemoryStream {
            buffer,
            faults: Arc::clone(&self.inner.faults),
            broken: false,
        }))
    }

    fn list_stream_ids(&self, namespace: &str) -> io::Result<BTreeSet<String>> {
        Ok(self
            .inner
            .streams
            .lock()
            .get(namespace)
            .map(|ids| ids.keys().cloned().collect())
            .unwrap_or_default())
    }
}

struct MemoryStream {
    buffer: SharedBuffer,
    faults: Arc<Faults>,

    /// Set after a short write; this stream takes no more bytes
    broken: bool,
}

impl Write for MemoryStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.broken || self.faults.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }

        let mut accepted = buf.len();
        if let Some(budget) = self.faults.partial_write.lock().take() {
            if budget < buf.len() {
                self.broken = true;
                accepted = budget;
            }
        }
        if accepted == 0 && !buf.is_empty() {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }

        self.buffer.lock().extend_from_slice(&buf[..accepted]);
        Ok(accepted)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl LogStream for MemoryStream {
    fn reader(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(MemoryReader {
            buffer: Arc::clone(&self.buffer),
            position: 0,
        }))
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.faults.fail_syncs.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected sync failure"));
        }
        Ok(())
    }
}

/// Reads a shared buffer from the start, seeing later appends
struct MemoryReader {
    buffer: SharedBuffer,
    position: usize,
}

impl Read for MemoryReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let data = self.buffer.lock();
        let remaining = data.get(self.position..).unwrap_or(&[]);
        let n = remaining.len().min(out.len());
        out[..n].copy_from_slice(&remaining[..n]);
        self.position += n;
        Ok(n)
    }
}
