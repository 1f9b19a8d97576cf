//! Error types for the archive writer.

use thiserror::Error;

/// Result type for archive writer operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in archive writer operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Backing store error.
    #[error("store error: {0}")]
    Store(#[from] arcsink_storage::StoreError),

    /// ZIP container codec error.
    #[error("codec error: {0}")]
    Codec(#[from] arcsink_codec::CodecError),

    /// An entry name must be non-empty.
    #[error("entry name is empty")]
    EmptyEntryName,
}
