//! # arcsink storage
//!
//! Backing store trait and implementations for arcsink.
//!
//! This crate provides the lowest-level storage abstraction for arcsink.
//! Backing stores are **opaque byte sinks** - they create a file and
//! stream bytes into it, and do not interpret the data they hold.
//!
//! ## Design Principles
//!
//! - Stores create files with exclusive-create semantics; nothing is
//!   ever overwritten
//! - No knowledge of the ZIP container format or segment rotation
//! - Must be `Send + Sync`; many writers share one store
//!
//! ## Available Stores
//!
//! - [`MemoryStore`] - For testing and ephemeral use
//! - [`LocalStore`] - For the OS filesystem
//!
//! ## Example
//!
//! ```rust
//! use arcsink_storage::{BackingStore, MemoryStore};
//! use std::io::Write;
//! use std::path::Path;
//!
//! let store = MemoryStore::new();
//! let mut sink = store.create(Path::new("seg-000000.zip")).unwrap();
//! sink.write_all(b"container bytes").unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod local;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use local::LocalStore;
pub use memory::MemoryStore;
pub use store::{BackingStore, SegmentSink};
