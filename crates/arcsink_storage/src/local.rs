//! Filesystem-backed store for persistent segments.

use crate::error::{StoreError, StoreResult};
use crate::store::{BackingStore, SegmentSink};
use std::fs::OpenOptions;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// A backing store over the OS filesystem.
///
/// Segment files are created relative to a root directory with
/// exclusive-create semantics: an existing file at the destination path
/// is never overwritten.
///
/// # Example
///
/// ```no_run
/// use arcsink_storage::{BackingStore, LocalStore};
/// use std::io::Write;
/// use std::path::Path;
///
/// let store = LocalStore::new("/data/export");
/// let mut sink = store.create(Path::new("batch-000000.zip")).unwrap();
/// sink.write_all(b"segment bytes").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Creates a store rooted at the given directory.
    ///
    /// The directory itself is created lazily, on the first `create`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

impl BackingStore for LocalStore {
    fn create(&self, path: &Path) -> StoreResult<Box<dyn SegmentSink>> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&full)
            .map_err(|e| {
                if e.kind() == io::ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists { path: full.clone() }
                } else {
                    StoreError::Io(e)
                }
            })?;

        Ok(Box::new(BufWriter::new(file)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn create_writes_file() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let mut sink = store.create(Path::new("seg-000000.zip")).unwrap();
        sink.write_all(b"hello").unwrap();
        sink.flush().unwrap();
        drop(sink);

        let data = std::fs::read(dir.path().join("seg-000000.zip")).unwrap();
        assert_eq!(&data, b"hello");
    }

    #[test]
    fn create_refuses_existing_path() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());
        assert_eq!(store.root(), dir.path());

        store.create(Path::new("seg.zip")).unwrap();
        let err = store.create(Path::new("seg.zip")).err().unwrap();
        assert!(err.is_already_exists());
    }

    #[test]
    fn create_makes_parent_dirs() {
        let dir = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let mut sink = store.create(Path::new("nested/run/seg.zip")).unwrap();
        sink.write_all(b"x").unwrap();
        sink.flush().unwrap();
        drop(sink);

        assert!(dir.path().join("nested/run/seg.zip").exists());
    }

    #[test]
    fn absolute_paths_bypass_root() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let store = LocalStore::new(dir.path());

        let target = other.path().join("seg.zip");
        let mut sink = store.create(&target).unwrap();
        sink.write_all(b"x").unwrap();
        sink.flush().unwrap();
        drop(sink);

        assert!(target.exists());
    }
}
