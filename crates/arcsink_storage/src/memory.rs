//! In-memory backing store for testing.

use crate::error::{StoreError, StoreResult};
use crate::store::{BackingStore, SegmentSink};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

type SharedBuf = Arc<Mutex<Vec<u8>>>;

/// An in-memory backing store.
///
/// Each created path maps to a shared byte buffer. Buffers stay
/// inspectable after their sink is dropped, so tests can read back
/// exactly what a writer produced without touching the filesystem.
///
/// # Thread Safety
///
/// The store is thread-safe; many sinks may be created and written
/// concurrently.
///
/// # Example
///
/// ```rust
/// use arcsink_storage::{BackingStore, MemoryStore};
/// use std::io::Write;
/// use std::path::Path;
///
/// let store = MemoryStore::new();
/// let mut sink = store.create(Path::new("seg.zip")).unwrap();
/// sink.write_all(b"bytes").unwrap();
/// drop(sink);
/// assert_eq!(store.contents(Path::new("seg.zip")).unwrap(), b"bytes");
/// ```
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: Arc<Mutex<BTreeMap<PathBuf, SharedBuf>>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the bytes written to `path`, if it was created.
    #[must_use]
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.files
            .lock()
            .get(path)
            .map(|buf| buf.lock().clone())
    }

    /// Returns all created paths in lexicographic order.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().keys().cloned().collect()
    }

    /// Returns the number of created files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.lock().len()
    }

    /// Returns `true` if no file has been created.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.lock().is_empty()
    }
}

impl BackingStore for MemoryStore {
    fn create(&self, path: &Path) -> StoreResult<Box<dyn SegmentSink>> {
        let mut files = self.files.lock();
        if files.contains_key(path) {
            return Err(StoreError::AlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let buf: SharedBuf = Arc::new(Mutex::new(Vec::new()));
        files.insert(path.to_path_buf(), Arc::clone(&buf));

        Ok(Box::new(MemorySink { buf }))
    }
}

struct MemorySink {
    buf: SharedBuf,
}

impl Write for MemorySink {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.lock().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
