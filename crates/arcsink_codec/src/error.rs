//! Error types for the ZIP container encoder.

use std::io;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding a ZIP container.
#[derive(Debug, Error)]
pub enum CodecError {
    /// An I/O error from the underlying sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An entry with this name already exists in the open container.
    ///
    /// This is the one condition callers are expected to recover from.
    #[error("duplicate entry: {name}")]
    DuplicateEntry {
        /// The colliding entry name.
        name: String,
    },

    /// The container is at the format's native 16-bit entry ceiling.
    #[error("container is full: {count} entries")]
    TooManyEntries {
        /// The number of entries already in the container.
        count: u32,
    },

    /// The entry name does not fit the format's 16-bit name-length field.
    #[error("entry name too long: {len} bytes")]
    NameTooLong {
        /// Byte length of the offending name.
        len: usize,
    },

    /// A single entry grew past the format's 32-bit size fields.
    #[error("entry too large for container format: {size} bytes")]
    EntryTooLarge {
        /// Accumulated entry size in bytes.
        size: u64,
    },

    /// The container grew past the format's 32-bit offset fields.
    #[error("container too large for format: {size} bytes")]
    ContainerTooLarge {
        /// Container size in bytes at the point of failure.
        size: u64,
    },

    /// An entry operation was called in the wrong state.
    #[error("invalid encoder state: {message}")]
    InvalidState {
        /// Description of the misuse.
        message: &'static str,
    },
}

impl CodecError {
    /// Returns `true` if this is a recoverable duplicate-name collision.
    #[must_use]
    pub fn is_duplicate_entry(&self) -> bool {
        matches!(self, CodecError::DuplicateEntry { .. })
    }
}
