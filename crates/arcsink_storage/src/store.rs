//! Backing store trait definition.

use crate::error::StoreResult;
use std::io::Write;
use std::path::Path;

/// A writable sink for one segment file.
///
/// Sinks are plain byte streams; dropping a sink releases the underlying
/// resource without any implicit durability guarantee, so callers flush
/// before letting go of one.
pub trait SegmentSink: Write + Send {}

impl<W: Write + Send> SegmentSink for W {}

/// A low-level backing store for archive segments.
///
/// Backing stores are **opaque byte sinks**. They create a file at a path
/// and hand back a streaming writer for it. arcsink owns all container
/// format interpretation - stores do not understand ZIP headers, entries,
/// or rotation.
///
/// # Invariants
///
/// - `create` has exclusive-create semantics: it fails with
///   [`StoreError::AlreadyExists`](crate::StoreError::AlreadyExists) when
///   the path already exists, and never overwrites.
/// - Stores must be `Send + Sync`; many writers may create segments
///   through one store concurrently.
///
/// # Implementors
///
/// - [`super::MemoryStore`] - For testing
/// - [`super::LocalStore`] - For the OS filesystem
pub trait BackingStore: Send + Sync {
    /// Creates the file at `path` and returns a streaming writer for it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `path` already exists (no overwrite is attempted)
    /// - An I/O error occurs
    fn create(&self, path: &Path) -> StoreResult<Box<dyn SegmentSink>>;
}
