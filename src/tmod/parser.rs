//! Low-level TMOD archive parser.
//!
//! This module handles the binary parsing of TMOD structures, reading from
//! any source that implements [`Read`] + [`Seek`].
//!
//! ## Parsing Strategy
//!
//! TMOD files are read front to back in a single pass at open time:
//! 1. Validate the `TMOD` magic and decode the header fields
//! 2. Decode the file table, accumulating each entry's relative offset
//!    from the compressed lengths seen so far
//! 3. Capture the stream position after the table as the base offset and
//!    rebuild every entry with its absolute payload offset
//!
//! Extraction then seeks directly to an entry's payload block, so listing
//! never touches payload bytes and payloads are only read on demand.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{ErrorKind, Read, Seek, SeekFrom};

use flate2::read::DeflateDecoder;

use crate::error::{Error, Result};

use super::structures::*;

/// Shift at which the fifth and last length-prefix byte lands.
///
/// The prefix is a little-endian base-128 varint carrying a 32-bit value,
/// which never needs more than five bytes; the fifth contributes only
/// four payload bits.
const LAST_PREFIX_SHIFT: u32 = 28;

/// Low-level TMOD parser.
///
/// This struct decodes the header, the file table and individual payload
/// blocks from a seekable source. It's generic over the reader type so
/// archives can be parsed from files or in-memory buffers alike.
///
/// ## Usage
///
/// Typically used through [`TmodArchive`](super::TmodArchive) rather than
/// directly.
///
/// ## Example
///
/// ```ignore
/// let mut parser = TmodParser::new(reader);
/// let header = parser.read_header()?;
/// let entries = parser.read_file_table()?;
/// for entry in &entries {
///     let payload = parser.read_payload(entry)?;
///     // Use the decompressed payload...
/// }
/// ```
pub struct TmodParser<R: Read + Seek> {
    /// The underlying data source
    reader: R,
}

impl<R: Read + Seek> TmodParser<R> {
    /// Create a new parser over the given source.
    ///
    /// The source is expected to be positioned at the start of the archive.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Parse the archive header.
    ///
    /// Consumes, in order: the 4-byte `TMOD` magic, the tool version
    /// string, 20 hash bytes, 256 signature bytes, a legacy length field
    /// that is read and discarded, the mod name and the mod version.
    ///
    /// # Returns
    ///
    /// The parsed [`ArchiveHeader`] with the source positioned at the
    /// start of the file table.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMagic`] if the file does not start with `TMOD`,
    /// [`Error::Truncated`] if the source ends inside any field, and
    /// [`Error::InvalidVersion`] if the version text does not parse.
    pub fn read_header(&mut self) -> Result<ArchiveHeader> {
        let mut magic = [0u8; 4];
        self.read_exact_field(&mut magic, "magic")?;
        if &magic != TMOD_MAGIC {
            return Err(Error::InvalidMagic(magic));
        }

        let tool_version = self.read_string("tool version")?;

        let mut hash = [0u8; HASH_SIZE];
        self.read_exact_field(&mut hash, "hash")?;

        let mut signature = vec![0u8; SIGNATURE_SIZE];
        self.read_exact_field(&mut signature, "signature")?;

        // Legacy data-length field, present in the layout but unused
        let _data_length = self.read_i32_field("data length")?;

        let name = self.read_string("mod name")?;
        let version = self.read_string("mod version")?.parse()?;

        Ok(ArchiveHeader {
            tool_version,
            hash,
            signature,
            name,
            version,
        })
    }

    /// Parse the file table.
    ///
    /// Reads the entry count followed by one record per entry (name,
    /// uncompressed length, compressed length). Payload offsets are not
    /// stored in the records; the first pass accumulates each entry's
    /// offset relative to the end of the table, and a second pass rebuilds
    /// the entries with `base + relative` absolute offsets once the base
    /// position is known.
    ///
    /// # Returns
    ///
    /// Entries in table order, each with its final absolute offset.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidField`] for a negative count or length, and
    /// [`Error::Truncated`] for any short read. No partial table is ever
    /// returned.
    pub fn read_file_table(&mut self) -> Result<Vec<FileEntry>> {
        let file_count = self.read_i32_field("file count")?;
        if file_count < 0 {
            return Err(Error::InvalidField {
                field: "file count",
                value: file_count as i64,
            });
        }

        let mut records = Vec::with_capacity(file_count as usize);
        let mut relative_offset = 0u64;

        for _ in 0..file_count {
            let name = self.read_string("entry name")?;
            let length = self.read_entry_length("uncompressed length")?;
            let compressed_length = self.read_entry_length("compressed length")?;

            records.push((name, length, compressed_length, relative_offset));
            relative_offset += compressed_length as u64;
        }

        // Payload blocks start right after the table, so the base offset
        // is only known once every record has been consumed.
        let base = self.reader.stream_position()?;

        let entries = records
            .into_iter()
            .map(|(name, length, compressed_length, relative)| FileEntry {
                name,
                length,
                compressed_length,
                offset: base + relative,
            })
            .collect();

        Ok(entries)
    }

    /// Read and decompress one entry's payload.
    ///
    /// Seeks to the entry's offset and reads exactly its compressed length.
    /// Stored entries (compressed length equal to length) are returned
    /// verbatim; anything else is treated as a raw deflate stream and
    /// inflated into a buffer of the declared uncompressed length.
    ///
    /// # Arguments
    ///
    /// * `entry` - An entry from [`read_file_table()`](Self::read_file_table)
    ///
    /// # Returns
    ///
    /// The entry's uncompressed bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Truncated`] if the source holds fewer bytes than the
    /// entry declares, [`Error::Decompression`] if the deflate stream is
    /// corrupt or ends early, and [`Error::LengthMismatch`] if the
    /// inflated size differs from the declared length.
    pub fn read_payload(&mut self, entry: &FileEntry) -> Result<Vec<u8>> {
        self.reader.seek(SeekFrom::Start(entry.offset))?;

        let mut raw = vec![0u8; entry.compressed_length as usize];
        self.read_exact_field(&mut raw, "entry payload")?;

        if !entry.is_compressed() {
            return Ok(raw);
        }

        // Bounding the decoder to the raw span keeps it from consuming
        // bytes that belong to the next entry.
        let mut decoder = DeflateDecoder::new(raw.as_slice());
        let mut inflated = Vec::with_capacity(entry.length as usize);
        decoder
            .read_to_end(&mut inflated)
            .map_err(|e| Error::Decompression {
                name: entry.name.clone(),
                reason: e.to_string(),
            })?;

        if inflated.len() as u64 != entry.length as u64 {
            return Err(Error::LengthMismatch {
                name: entry.name.clone(),
                expected: entry.length as u64,
                actual: inflated.len() as u64,
            });
        }

        Ok(inflated)
    }

    /// Read exactly `buf.len()` bytes, reporting a short read as a
    /// truncation of the named field.
    fn read_exact_field(&mut self, buf: &mut [u8], field: &'static str) -> Result<()> {
        self.reader.read_exact(buf).map_err(|e| match e.kind() {
            ErrorKind::UnexpectedEof => Error::Truncated(field),
            _ => Error::Io(e),
        })
    }

    /// Read a little-endian signed 32-bit field.
    fn read_i32_field(&mut self, field: &'static str) -> Result<i32> {
        self.reader
            .read_i32::<LittleEndian>()
            .map_err(|e| match e.kind() {
                ErrorKind::UnexpectedEof => Error::Truncated(field),
                _ => Error::Io(e),
            })
    }

    /// Read a 32-bit entry length, rejecting negative values.
    fn read_entry_length(&mut self, field: &'static str) -> Result<u32> {
        let value = self.read_i32_field(field)?;
        if value < 0 {
            return Err(Error::InvalidField {
                field,
                value: value as i64,
            });
        }
        Ok(value as u32)
    }

    /// Decode a base-128 varint length prefix.
    ///
    /// Seven payload bits per byte, least significant group first; the
    /// high bit marks continuation.
    fn read_length_prefix(&mut self) -> Result<u32> {
        let mut value = 0u32;
        let mut shift = 0;

        loop {
            let byte = self
                .reader
                .read_u8()
                .map_err(|e| match e.kind() {
                    ErrorKind::UnexpectedEof => Error::Truncated("length prefix"),
                    _ => Error::Io(e),
                })?;

            // The fifth byte must terminate the prefix and fit in the
            // four bits of a 32-bit value that remain
            if shift == LAST_PREFIX_SHIFT && byte & 0xF0 != 0 {
                return Err(Error::InvalidField {
                    field: "length prefix",
                    value: byte as i64,
                });
            }

            value |= ((byte & 0x7F) as u32) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }

            shift += 7;
        }
    }

    /// Read a length-prefixed UTF-8 string field.
    fn read_string(&mut self, field: &'static str) -> Result<String> {
        let length = self.read_length_prefix()?;
        let mut bytes = vec![0u8; length as usize];
        self.read_exact_field(&mut bytes, field)?;
        // Lossy conversion keeps malformed names readable instead of
        // failing the whole archive
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}
