//! Error types for backing store operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for backing store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during backing store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The destination path already exists.
    ///
    /// `create` never overwrites; a colliding path is always an error.
    #[error("path already exists: {path}")]
    AlreadyExists {
        /// The path that was refused.
        path: PathBuf,
    },
}

impl StoreError {
    /// Returns `true` if this is an exclusive-create collision.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, StoreError::AlreadyExists { .. })
    }
}
