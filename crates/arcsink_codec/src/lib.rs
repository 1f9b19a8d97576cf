//! # arcsink codec
//!
//! Streaming ZIP container encoder for arcsink.
//!
//! This crate writes the ZIP32 container format over any
//! [`std::io::Write`] sink. Entries are stored uncompressed with their
//! checksum and sizes in a trailing data descriptor, so encoding never
//! seeks - the sink can be a remote or append-only stream.
//!
//! The encoder enforces the format's structural limits: a 16-bit entry
//! count per container, 16-bit name lengths, and 32-bit entry sizes and
//! header offsets. Segmenting output *below* those limits is the
//! caller's concern (see `arcsink_core`).
//!
//! ## Example
//!
//! ```rust
//! use arcsink_codec::ZipEncoder;
//!
//! let mut enc = ZipEncoder::new(Vec::new());
//! enc.begin_entry("hello.txt").unwrap();
//! enc.write(b"hello").unwrap();
//! enc.end_entry().unwrap();
//! let container = enc.finish().unwrap();
//! assert!(!container.is_empty());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod encoder;
mod error;

pub use encoder::{ZipEncoder, CONTAINER_ENTRY_CEILING};
pub use error::{CodecError, CodecResult};
