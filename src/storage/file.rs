//! On-disk backend
//!
//! Each stream is a file `{root}/{namespace}/{id}.log`. Opening a stream
//! whose file already exists fails with `AlreadyExists`.

use std::collections::BTreeSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use super::{LogStream, StorageBackend};

const STREAM_EXTENSION: &str = "log";

/// Backend storing streams as files under a root directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open or create a backend rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing (namespace, id)
    pub fn stream_path(&self, namespace: &str, id: &str) -> PathBuf {
        self.root
            .join(namespace)
            .join(format!("{}.{}", id, STREAM_EXTENSION))
    }

    /// Reject components that would escape the root directory
    fn check_component(kind: &str, value: &str) -> io::Result<()> {
        if value.is_empty()
            || value == "."
            || value == ".."
            || value.contains(|c: char| c == '/' || c == '\\')
        {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid stream {}: {:?}", kind, value),
            ));
        }
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn open_stream(&self, namespace: &str, id: &str) -> io::Result<Box<dyn LogStream>> {
        Self::check_component("namespace", namespace)?;
        Self::check_component("id", id)?;

        fs::create_dir_all(self.root.join(namespace))?;
        let path = self.stream_path(namespace, id);

        // Never reuse an existing log: it may hold a previous run's records
        let file = OpenOptions::new().write(true).create_new(true).open(&path)?;

        Ok(Box::new(FileStream { file, path }))
    }

    fn list_stream_ids(&self, namespace: &str) -> io::Result<BTreeSet<String>> {
        Self::check_component("namespace", namespace)?;

        let dir = self.root.join(namespace);
        let mut ids = BTreeSet::new();
        if !dir.exists() {
            return Ok(ids);
        }

        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().map_or(false, |ext| ext == STREAM_EXTENSION) {
                if let Some(stem) = path.file_stem() {
                    ids.insert(stem.to_string_lossy().into_owned());
                }
            }
        }

        Ok(ids)
    }
}

struct FileStream {
    file: File,
    path: PathBuf,
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

impl LogStream for FileStream {
    fn reader(&self) -> io::Result<Box<dyn Read + Send>> {
        let file = File::open(&self.path)?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn sync(&mut self) -> io::Result<()> {
        self.file.sync_data()
    }
}
