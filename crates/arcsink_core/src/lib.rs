//! # arcsink core
//!
//! Rotating archive writer: the final sink stage of a bulk-ingestion
//! pipeline.
//!
//! Callers stream `(name, bytes)` pairs into an [`ArchiveWriter`]; it
//! packs them into ZIP segments on a [`BackingStore`], rotating to a
//! deterministically named new segment whenever a container format
//! limit would be exceeded. Segment ordinals come from a shared
//! [`RotationCounter`], so any number of writers in one process produce
//! collision-free file names.
//!
//! ## Example
//!
//! ```rust
//! use arcsink_core::{ArchiveWriter, RotationCounter};
//! use arcsink_storage::MemoryStore;
//! use std::sync::Arc;
//!
//! let store = MemoryStore::new();
//! let counter = Arc::new(RotationCounter::new());
//! let mut writer = ArchiveWriter::with_counter("export", Arc::new(store.clone()), counter);
//!
//! writer.write("a.xml", b"<a/>").unwrap();
//! writer.write("b.xml", b"<b/>").unwrap();
//! writer.close().unwrap();
//!
//! assert_eq!(store.len(), 1); // both entries fit one segment
//! ```
//!
//! [`BackingStore`]: arcsink_storage::BackingStore

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod counter;
mod error;
mod naming;
mod writer;

pub use counter::RotationCounter;
pub use error::{CoreError, CoreResult};
pub use naming::{normalize_base_path, segment_path, EXTENSION, ORDINAL_WIDTH};
pub use writer::{ArchiveWriter, RotationLimits, MAX_ENTRIES, MAX_SEGMENT_BYTES};
