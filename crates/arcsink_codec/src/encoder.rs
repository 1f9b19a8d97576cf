//! Streaming ZIP container encoder.

use crate::error::{CodecError, CodecResult};
use std::collections::HashSet;
use std::io::Write;

/// Local file header signature.
const LOCAL_HEADER_SIG: u32 = 0x0403_4B50;
/// Data descriptor signature.
const DESCRIPTOR_SIG: u32 = 0x0807_4B50;
/// Central directory file header signature.
const CENTRAL_HEADER_SIG: u32 = 0x0201_4B50;
/// End of central directory signature.
const EOCD_SIG: u32 = 0x0605_4B50;

/// Version needed to extract (2.0 - data descriptors).
const VERSION_NEEDED: u16 = 20;
/// General purpose flags: bit 3 (sizes in data descriptor) and
/// bit 11 (names are UTF-8).
const FLAGS: u16 = 0x0808;
/// Compression method 0: stored.
const METHOD_STORED: u16 = 0;

/// Fixed DOS timestamp (1980-01-01 00:00:00) so that identical inputs
/// produce bit-identical containers.
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = 0x0021;

/// The largest entry count a single container can hold.
///
/// The end-of-central-directory record carries the count in a 16-bit
/// field; [`ZipEncoder::begin_entry`] rejects entries at this ceiling.
pub const CONTAINER_ENTRY_CEILING: u32 = u16::MAX as u32;

/// One finished entry, retained for the central directory.
struct CentralRecord {
    name: String,
    crc: u32,
    size: u32,
    header_offset: u32,
}

/// The entry currently being streamed.
struct OpenEntry {
    name: String,
    hasher: crc32fast::Hasher,
    size: u64,
    header_offset: u32,
}

/// A streaming ZIP container encoder.
///
/// Writes stored (uncompressed) entries over any [`Write`] sink. Sizes
/// and checksums follow each entry in a data descriptor, so the encoder
/// never seeks - remote and append-only sinks work unmodified. The
/// central directory is buffered in memory and written by [`finish`].
///
/// Entry lifecycle: [`begin_entry`], any number of [`write`] calls,
/// [`end_entry`]. Interleaving entries is rejected as
/// [`CodecError::InvalidState`].
///
/// [`begin_entry`]: ZipEncoder::begin_entry
/// [`write`]: ZipEncoder::write
/// [`end_entry`]: ZipEncoder::end_entry
/// [`finish`]: ZipEncoder::finish
pub struct ZipEncoder<W: Write> {
    sink: W,
    /// Bytes emitted so far; the next local header's offset.
    offset: u64,
    names: HashSet<String>,
    records: Vec<CentralRecord>,
    current: Option<OpenEntry>,
}

impl<W: Write> ZipEncoder<W> {
    /// Creates an encoder over the given sink.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            offset: 0,
            names: HashSet::new(),
            records: Vec::new(),
            current: None,
        }
    }

    /// Returns the number of finished entries in the container.
    #[must_use]
    pub fn entry_count(&self) -> u32 {
        self.records.len() as u32
    }

    /// Returns the number of bytes emitted to the sink so far.
    #[must_use]
    pub fn bytes_emitted(&self) -> u64 {
        self.offset
    }

    /// Returns `true` if the container already holds an entry named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Opens a new entry named `name`.
    ///
    /// # Errors
    ///
    /// - [`CodecError::DuplicateEntry`] if `name` is already present
    /// - [`CodecError::TooManyEntries`] at the format's 16-bit ceiling
    /// - [`CodecError::NameTooLong`] if `name` exceeds 65535 bytes
    /// - [`CodecError::InvalidState`] if an entry is still open
    /// - [`CodecError::ContainerTooLarge`] if the header offset no longer
    ///   fits the format's 32-bit offset field
    pub fn begin_entry(&mut self, name: &str) -> CodecResult<()> {
        if self.current.is_some() {
            return Err(CodecError::InvalidState {
                message: "begin_entry while another entry is open",
            });
        }
        if self.names.contains(name) {
            return Err(CodecError::DuplicateEntry {
                name: name.to_string(),
            });
        }
        if self.entry_count() >= CONTAINER_ENTRY_CEILING {
            return Err(CodecError::TooManyEntries {
                count: self.entry_count(),
            });
        }
        let name_len = u16::try_from(name.len())
            .map_err(|_| CodecError::NameTooLong { len: name.len() })?;
        let header_offset = u32::try_from(self.offset)
            .map_err(|_| CodecError::ContainerTooLarge { size: self.offset })?;

        // Local file header. CRC and sizes are zero here; the real
        // values follow the payload in the data descriptor (flag bit 3).
        let mut header = Vec::with_capacity(30 + name.len());
        header.extend_from_slice(&LOCAL_HEADER_SIG.to_le_bytes());
        header.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        header.extend_from_slice(&FLAGS.to_le_bytes());
        header.extend_from_slice(&METHOD_STORED.to_le_bytes());
        header.extend_from_slice(&DOS_TIME.to_le_bytes());
        header.extend_from_slice(&DOS_DATE.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes()); // crc-32
        header.extend_from_slice(&0u32.to_le_bytes()); // compressed size
        header.extend_from_slice(&0u32.to_le_bytes()); // uncompressed size
        header.extend_from_slice(&name_len.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes()); // extra field length
        header.extend_from_slice(name.as_bytes());
        self.emit(&header)?;

        self.current = Some(OpenEntry {
            name: name.to_string(),
            hasher: crc32fast::Hasher::new(),
            size: 0,
            header_offset,
        });
        Ok(())
    }

    /// Streams payload bytes into the open entry.
    ///
    /// # Errors
    ///
    /// - [`CodecError::InvalidState`] if no entry is open
    /// - [`CodecError::EntryTooLarge`] past the 32-bit size fields
    pub fn write(&mut self, buf: &[u8]) -> CodecResult<()> {
        let entry = self.current.as_mut().ok_or(CodecError::InvalidState {
            message: "write with no open entry",
        })?;

        let new_size = entry.size + buf.len() as u64;
        if new_size > u64::from(u32::MAX) {
            return Err(CodecError::EntryTooLarge { size: new_size });
        }
        entry.hasher.update(buf);
        entry.size = new_size;

        self.sink.write_all(buf)?;
        self.offset += buf.len() as u64;
        Ok(())
    }

    /// Closes the open entry, emitting its data descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidState`] if no entry is open.
    pub fn end_entry(&mut self) -> CodecResult<()> {
        let entry = self.current.take().ok_or(CodecError::InvalidState {
            message: "end_entry with no open entry",
        })?;

        let crc = entry.hasher.finalize();
        // Size already validated against u32::MAX by `write`.
        let size = entry.size as u32;

        let mut descriptor = Vec::with_capacity(16);
        descriptor.extend_from_slice(&DESCRIPTOR_SIG.to_le_bytes());
        descriptor.extend_from_slice(&crc.to_le_bytes());
        descriptor.extend_from_slice(&size.to_le_bytes()); // compressed
        descriptor.extend_from_slice(&size.to_le_bytes()); // uncompressed
        self.emit(&descriptor)?;

        self.names.insert(entry.name.clone());
        self.records.push(CentralRecord {
            name: entry.name,
            crc,
            size,
            header_offset: entry.header_offset,
        });
        Ok(())
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> CodecResult<()> {
        self.sink.flush()?;
        Ok(())
    }

    /// Writes the central directory and end-of-central-directory record,
    /// flushes, and returns the sink.
    ///
    /// An entry left open is closed first.
    pub fn finish(mut self) -> CodecResult<W> {
        if self.current.is_some() {
            self.end_entry()?;
        }

        let cd_offset = u32::try_from(self.offset)
            .map_err(|_| CodecError::ContainerTooLarge { size: self.offset })?;

        let mut cd = Vec::new();
        for record in &self.records {
            cd.extend_from_slice(&CENTRAL_HEADER_SIG.to_le_bytes());
            cd.extend_from_slice(&VERSION_NEEDED.to_le_bytes()); // made by
            cd.extend_from_slice(&VERSION_NEEDED.to_le_bytes()); // needed
            cd.extend_from_slice(&FLAGS.to_le_bytes());
            cd.extend_from_slice(&METHOD_STORED.to_le_bytes());
            cd.extend_from_slice(&DOS_TIME.to_le_bytes());
            cd.extend_from_slice(&DOS_DATE.to_le_bytes());
            cd.extend_from_slice(&record.crc.to_le_bytes());
            cd.extend_from_slice(&record.size.to_le_bytes()); // compressed
            cd.extend_from_slice(&record.size.to_le_bytes()); // uncompressed
            cd.extend_from_slice(&(record.name.len() as u16).to_le_bytes());
            cd.extend_from_slice(&0u16.to_le_bytes()); // extra field length
            cd.extend_from_slice(&0u16.to_le_bytes()); // comment length
            cd.extend_from_slice(&0u16.to_le_bytes()); // disk number start
            cd.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
            cd.extend_from_slice(&0u32.to_le_bytes()); // external attributes
            cd.extend_from_slice(&record.header_offset.to_le_bytes());
            cd.extend_from_slice(record.name.as_bytes());
        }
        let cd_size = u32::try_from(cd.len()).map_err(|_| CodecError::ContainerTooLarge {
            size: self.offset + cd.len() as u64,
        })?;
        self.emit(&cd)?;

        let entry_count = self.records.len() as u16;
        let mut eocd = Vec::with_capacity(22);
        eocd.extend_from_slice(&EOCD_SIG.to_le_bytes());
        eocd.extend_from_slice(&0u16.to_le_bytes()); // this disk
        eocd.extend_from_slice(&0u16.to_le_bytes()); // central dir disk
        eocd.extend_from_slice(&entry_count.to_le_bytes()); // entries, this disk
        eocd.extend_from_slice(&entry_count.to_le_bytes()); // entries, total
        eocd.extend_from_slice(&cd_size.to_le_bytes());
        eocd.extend_from_slice(&cd_offset.to_le_bytes());
        eocd.extend_from_slice(&0u16.to_le_bytes()); // comment length
        self.emit(&eocd)?;

        self.sink.flush()?;
        Ok(self.sink)
    }

    fn emit(&mut self, bytes: &[u8]) -> CodecResult<()> {
        self.sink.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }
}

impl<W: Write> std::fmt::Debug for ZipEncoder<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipEncoder")
            .field("entries", &self.records.len())
            .field("offset", &self.offset)
            .field("entry_open", &self.current.is_some())
            .finish_non_exhaustive()
    }
}
