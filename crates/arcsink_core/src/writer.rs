//! Rotating archive writer.

use crate::counter::RotationCounter;
use crate::error::{CoreError, CoreResult};
use crate::naming::{self, ORDINAL_WIDTH};
use arcsink_codec::{CodecError, ZipEncoder};
use arcsink_storage::{BackingStore, SegmentSink};
use std::sync::Arc;
use tracing::{debug, warn};

/// The most entries a segment may hold.
///
/// The ZIP end-of-central-directory record counts entries in a 16-bit
/// field (65535 ceiling); one slot is reserved so a metadata entry can
/// always be appended when a segment is finalized downstream.
pub const MAX_ENTRIES: u32 = 65_534;

/// The most payload bytes a segment may accumulate.
///
/// The container format addresses entry data with 32-bit signed
/// arithmetic in the readers this output must stay compatible with.
pub const MAX_SEGMENT_BYTES: u64 = i32::MAX as u64;

/// Rotation thresholds for one writer.
///
/// The defaults are the container format's ceilings; tests and embedders
/// that want smaller segments may lower them, never raise them past
/// [`FORMAT`](RotationLimits::FORMAT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationLimits {
    /// Rotate before a segment would exceed this many payload bytes.
    pub max_segment_bytes: u64,
    /// Rotate before a segment would hold this many entries
    /// (less the two-entry metadata headroom).
    pub max_entries: u32,
}

impl RotationLimits {
    /// The container format's native ceilings.
    pub const FORMAT: Self = Self {
        max_segment_bytes: MAX_SEGMENT_BYTES,
        max_entries: MAX_ENTRIES,
    };
}

impl Default for RotationLimits {
    fn default() -> Self {
        Self::FORMAT
    }
}

/// A streaming packer that splits named byte payloads across
/// bounded-size ZIP segments.
///
/// Callers hand the writer `(name, bytes)` pairs; it lazily opens the
/// first segment on the backing store, tracks per-segment byte and
/// entry counts, rotates to a freshly named segment when a format limit
/// would be exceeded, and finalizes the last open segment on
/// [`close`](ArchiveWriter::close).
///
/// # Ownership & concurrency
///
/// A writer is single-owner: `write` and `close` take `&mut self` and
/// must not be invoked concurrently on one instance without external
/// synchronization. The one piece of cross-instance state is the
/// injected [`RotationCounter`], which hands out process-unique segment
/// ordinals so concurrent writers never collide on file names.
///
/// # Blocking & failure
///
/// Segment creation and entry writes are synchronous, potentially
/// blocking calls into the backing store; there is no internal timeout,
/// cancellation, or retry. Every failure except a duplicate entry name
/// is surfaced to the caller unchanged.
///
/// # Example
///
/// ```rust
/// use arcsink_core::{ArchiveWriter, RotationCounter};
/// use arcsink_storage::MemoryStore;
/// use std::sync::Arc;
///
/// let store = MemoryStore::new();
/// let counter = Arc::new(RotationCounter::new());
/// let mut writer = ArchiveWriter::with_counter("out", Arc::new(store.clone()), counter);
///
/// assert_eq!(writer.write("doc.xml", b"<doc/>").unwrap(), 6);
/// writer.close().unwrap();
/// assert!(store.contents("out-000000.zip".as_ref()).is_some());
/// ```
pub struct ArchiveWriter {
    base_path: String,
    store: Arc<dyn BackingStore>,
    counter: Arc<RotationCounter>,
    limits: RotationLimits,
    active: Option<ZipEncoder<Box<dyn SegmentSink>>>,
    segment_bytes: u64,
    segment_entries: u32,
}

impl ArchiveWriter {
    /// Creates a writer for `base_path` drawing ordinals from the
    /// process-wide [`RotationCounter::global`] counter.
    ///
    /// `.zip` is appended to `base_path` if absent (case-insensitive).
    pub fn new(base_path: impl Into<String>, store: Arc<dyn BackingStore>) -> Self {
        Self::with_counter(base_path, store, RotationCounter::global())
    }

    /// Creates a writer drawing ordinals from an injected counter.
    ///
    /// Writers that must not collide on segment names have to share one
    /// counter.
    pub fn with_counter(
        base_path: impl Into<String>,
        store: Arc<dyn BackingStore>,
        counter: Arc<RotationCounter>,
    ) -> Self {
        Self::with_limits(base_path, store, counter, RotationLimits::FORMAT)
    }

    /// Creates a writer with explicit rotation thresholds.
    pub fn with_limits(
        base_path: impl Into<String>,
        store: Arc<dyn BackingStore>,
        counter: Arc<RotationCounter>,
        limits: RotationLimits,
    ) -> Self {
        Self {
            base_path: naming::normalize_base_path(&base_path.into()),
            store,
            counter,
            limits,
            active: None,
            segment_bytes: 0,
            segment_entries: 0,
        }
    }

    /// Returns the normalized base path segments are derived from.
    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Returns the payload bytes accumulated in the open segment.
    #[must_use]
    pub fn segment_byte_count(&self) -> u64 {
        self.segment_bytes
    }

    /// Returns the entries recorded in the open segment.
    #[must_use]
    pub fn segment_entry_count(&self) -> u32 {
        self.segment_entries
    }

    /// Writes one named payload, rotating segments as needed.
    ///
    /// Returns the number of payload bytes recorded. A name that
    /// already exists in the open segment is the sole recoverable
    /// outcome: it is logged and the call returns `Ok(0)` with the
    /// writer's state untouched.
    ///
    /// # Errors
    ///
    /// - [`CoreError::EmptyEntryName`] for an empty `name`; nothing is
    ///   mutated
    /// - [`StoreError::AlreadyExists`] if a rotation target path exists
    /// - any other store or codec failure, propagated unchanged
    ///
    /// [`StoreError::AlreadyExists`]: arcsink_storage::StoreError::AlreadyExists
    pub fn write(&mut self, name: &str, payload: &[u8]) -> CoreResult<u64> {
        if name.is_empty() {
            return Err(CoreError::EmptyEntryName);
        }

        let total = payload.len() as u64;

        if self.active.is_none() {
            debug!(base = %self.base_path, "opening first segment");
            self.open_segment()?;
        }

        // Both checks run before the entry is added. The byte check is
        // gated on a non-empty segment so a single payload larger than
        // the ceiling is attempted once instead of rotating forever.
        if self.segment_bytes > 0 && self.segment_bytes + total > self.limits.max_segment_bytes {
            warn!(
                segment_bytes = self.segment_bytes,
                incoming = total,
                "segment byte limit reached, rotating"
            );
            self.open_segment()?;
        }

        // Headroom of two keeps room for the metadata entries a closed
        // segment gains downstream.
        if self.segment_entries > 0 && self.segment_entries + 2 >= self.limits.max_entries {
            warn!(
                segment_entries = self.segment_entries,
                "segment entry limit reached, rotating"
            );
            self.open_segment()?;
        }

        let encoder = self.active.as_mut().ok_or(CodecError::InvalidState {
            message: "no open segment",
        })?;

        match encoder.begin_entry(name) {
            Err(err) if err.is_duplicate_entry() => {
                warn!(name, "skipping duplicate entry");
                return Ok(0);
            }
            result => result?,
        }
        encoder.write(payload)?;
        encoder.end_entry()?;

        self.segment_bytes += total;
        self.segment_entries += 1;
        Ok(total)
    }

    /// Finalizes and releases the open segment, if any.
    ///
    /// Idempotent: closing an already-closed writer is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if finalizing the container or flushing the
    /// backing store fails.
    pub fn close(&mut self) -> CoreResult<()> {
        if let Some(encoder) = self.active.take() {
            debug!(base = %self.base_path, "closing segment");
            encoder.finish()?;
        }
        Ok(())
    }

    /// Finalizes any open segment, allocates the next ordinal, and
    /// creates the new segment with exclusive-create semantics.
    fn open_segment(&mut self) -> CoreResult<()> {
        if let Some(encoder) = self.active.take() {
            encoder.finish()?;
        }

        let ordinal = self.counter.next();
        let path = naming::segment_path(&self.base_path, ordinal, ORDINAL_WIDTH);
        debug!(path = %path.display(), ordinal, "opening segment");

        self.segment_bytes = 0;
        self.segment_entries = 0;

        let sink = self.store.create(&path)?;
        self.active = Some(ZipEncoder::new(sink));
        Ok(())
    }
}

impl std::fmt::Debug for ArchiveWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveWriter")
            .field("base_path", &self.base_path)
            .field("segment_open", &self.active.is_some())
            .field("segment_bytes", &self.segment_bytes)
            .field("segment_entries", &self.segment_entries)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcsink_storage::{MemoryStore, StoreError, StoreResult};
    use std::io::{self, Write};
    use std::path::Path;

    /// A store whose sinks accept a fixed byte budget, then fail.
    struct FailingStore {
        budget: usize,
    }

    impl BackingStore for FailingStore {
        fn create(&self, _path: &Path) -> StoreResult<Box<dyn SegmentSink>> {
            Ok(Box::new(FailingSink {
                remaining: self.budget,
            }))
        }
    }

    struct FailingSink {
        remaining: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.len() > self.remaining {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink failed"));
            }
            self.remaining -= buf.len();
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn create_writer(store: &MemoryStore) -> ArchiveWriter {
        ArchiveWriter::with_counter(
            "out",
            Arc::new(store.clone()),
            Arc::new(RotationCounter::new()),
        )
    }

    #[test]
    fn base_path_gains_extension() {
        let store = MemoryStore::new();
        let writer = create_writer(&store);
        assert_eq!(writer.base_path(), "out.zip");
    }

    #[test]
    fn first_segment_named_from_ordinal_zero() {
        let store = MemoryStore::new();
        let mut writer = create_writer(&store);

        writer.write("doc.xml", b"<doc/>").unwrap();
        writer.close().unwrap();

        assert_eq!(store.paths(), vec![Path::new("out-000000.zip").to_path_buf()]);
    }

    #[test]
    fn no_segment_created_before_first_write() {
        let store = MemoryStore::new();
        let _writer = create_writer(&store);
        assert!(store.is_empty());
    }

    #[test]
    fn write_returns_payload_length_and_counts() {
        let store = MemoryStore::new();
        let mut writer = create_writer(&store);

        assert_eq!(writer.write("a", b"12345").unwrap(), 5);
        assert_eq!(writer.write("b", b"").unwrap(), 0);
        assert_eq!(writer.segment_byte_count(), 5);
        assert_eq!(writer.segment_entry_count(), 2);
    }

    #[test]
    fn duplicate_entry_returns_zero_without_mutation() {
        let store = MemoryStore::new();
        let mut writer = create_writer(&store);

        assert_eq!(writer.write("same", b"abc").unwrap(), 3);
        assert_eq!(writer.write("same", b"xyz").unwrap(), 0);
        assert_eq!(writer.segment_byte_count(), 3);
        assert_eq!(writer.segment_entry_count(), 1);

        // Still usable for fresh names.
        assert_eq!(writer.write("other", b"q").unwrap(), 1);
        writer.close().unwrap();
    }

    #[test]
    fn empty_name_rejected_before_any_state_change() {
        let store = MemoryStore::new();
        let mut writer = create_writer(&store);

        assert!(matches!(
            writer.write("", b"abc"),
            Err(CoreError::EmptyEntryName)
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn close_is_idempotent() {
        let store = MemoryStore::new();
        let mut writer = create_writer(&store);

        writer.write("a", b"1").unwrap();
        writer.close().unwrap();
        writer.close().unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn close_without_writes_is_noop() {
        let store = MemoryStore::new();
        let mut writer = create_writer(&store);
        writer.close().unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn existing_segment_path_fails_without_overwrite() {
        let store = MemoryStore::new();
        store.create(Path::new("out-000000.zip")).unwrap();

        let mut writer = create_writer(&store);
        let err = writer.write("a", b"1").unwrap_err();
        assert!(matches!(
            err,
            CoreError::Store(StoreError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn sink_failure_propagates_without_mutation() {
        // Budget fits the first entry (53 bytes) plus the second entry's
        // local header (36 bytes), so the failure lands mid-payload.
        let mut writer = ArchiveWriter::with_counter(
            "out",
            Arc::new(FailingStore { budget: 100 }),
            Arc::new(RotationCounter::new()),
        );

        assert_eq!(writer.write("first", b"ok").unwrap(), 2);
        let bytes_before = writer.segment_byte_count();
        let entries_before = writer.segment_entry_count();

        let err = writer.write("second", &[b'x'; 128]).unwrap_err();
        assert!(matches!(err, CoreError::Codec(CodecError::Io(_))));
        // No retry, no partial accounting: observable state is exactly
        // as before the failed call.
        assert_eq!(writer.segment_byte_count(), bytes_before);
        assert_eq!(writer.segment_entry_count(), entries_before);
    }

    #[test]
    fn byte_limit_triggers_rotation_before_entry() {
        let store = MemoryStore::new();
        let mut writer = ArchiveWriter::with_limits(
            "out",
            Arc::new(store.clone()),
            Arc::new(RotationCounter::new()),
            RotationLimits {
                max_segment_bytes: 10,
                max_entries: MAX_ENTRIES,
            },
        );

        writer.write("a", b"123456").unwrap();
        // 6 + 6 > 10: rotate, then record in the fresh segment.
        writer.write("b", b"654321").unwrap();
        assert_eq!(writer.segment_byte_count(), 6);
        assert_eq!(writer.segment_entry_count(), 1);
        writer.close().unwrap();

        assert_eq!(
            store.paths(),
            vec![
                Path::new("out-000000.zip").to_path_buf(),
                Path::new("out-000001.zip").to_path_buf(),
            ]
        );
    }

    #[test]
    fn oversized_payload_into_fresh_segment_not_rotated() {
        let store = MemoryStore::new();
        let mut writer = ArchiveWriter::with_limits(
            "out",
            Arc::new(store.clone()),
            Arc::new(RotationCounter::new()),
            RotationLimits {
                max_segment_bytes: 4,
                max_entries: MAX_ENTRIES,
            },
        );

        // Larger than the ceiling, but the segment is empty: attempted
        // in place rather than rotating forever.
        assert_eq!(writer.write("big", b"123456789").unwrap(), 9);
        writer.close().unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn entry_limit_triggers_rotation_with_headroom() {
        let store = MemoryStore::new();
        let mut writer = ArchiveWriter::with_limits(
            "out",
            Arc::new(store.clone()),
            Arc::new(RotationCounter::new()),
            RotationLimits {
                max_segment_bytes: MAX_SEGMENT_BYTES,
                max_entries: 10,
            },
        );

        // 8 entries fit; the 9th trips `8 + 2 >= 10` and rotates first.
        for i in 0..9 {
            writer.write(&format!("e{i}"), b"x").unwrap();
        }
        assert_eq!(writer.segment_entry_count(), 1);
        writer.close().unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn writers_sharing_counter_never_collide() {
        let store = MemoryStore::new();
        let counter = Arc::new(RotationCounter::new());

        let mut handles = Vec::new();
        for base in ["a", "b"] {
            let store = store.clone();
            let counter = Arc::clone(&counter);
            handles.push(std::thread::spawn(move || {
                let mut writer =
                    ArchiveWriter::with_counter(base, Arc::new(store), counter);
                writer.write("doc", b"payload").unwrap();
                writer.close().unwrap();
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let paths = store.paths();
        assert_eq!(paths.len(), 2);
        // Consecutive ordinals, assignment order unspecified.
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.to_str().unwrap().to_string())
            .collect();
        let ordinals: Vec<u32> = names
            .iter()
            .map(|n| n[2..8].parse().unwrap())
            .collect();
        let mut sorted = ordinals.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1]);
        assert!(names.iter().any(|n| n.starts_with("a-")));
        assert!(names.iter().any(|n| n.starts_with("b-")));
    }
}
