use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::{Error, Result};

use super::parser::TmodParser;
use super::structures::{ArchiveHeader, FileEntry};

/// Open TMOD archive handle.
///
/// Owns the underlying source and the decoded header and file table.
/// Opening fully validates the header and table; a handle is only ever
/// returned for a structurally valid archive. Extraction seeks the source,
/// so it takes `&mut self` and calls must be serialized by the caller.
pub struct TmodArchive<R: Read + Seek> {
    /// `None` once the handle has been closed
    parser: Option<TmodParser<R>>,
    header: ArchiveHeader,
    entries: Vec<FileEntry>,
    /// Name to position in `entries`; duplicate names resolve last-wins
    index: HashMap<String, usize>,
}

impl TmodArchive<File> {
    /// Open a TMOD archive from the filesystem.
    ///
    /// # Errors
    ///
    /// [`Error::ArchiveNotFound`] if no file exists at `path`; otherwise
    /// any header or table error from parsing. On failure the file handle
    /// is released before the error reaches the caller.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::ArchiveNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> TmodArchive<R> {
    /// Open a TMOD archive from any seekable source.
    ///
    /// Parses the header and the complete file table. The source is
    /// dropped on any parse failure; no partially-open handle exists.
    pub fn from_reader(reader: R) -> Result<Self> {
        let mut parser = TmodParser::new(reader);
        let header = parser.read_header()?;
        let entries = parser.read_file_table()?;

        // Later table rows with a repeated name replace the earlier entry
        // in place, so enumeration and lookup stay consistent.
        let mut resolved: Vec<FileEntry> = Vec::with_capacity(entries.len());
        let mut index = HashMap::with_capacity(entries.len());
        for entry in entries {
            match index.get(&entry.name) {
                Some(&position) => resolved[position] = entry,
                None => {
                    index.insert(entry.name.clone(), resolved.len());
                    resolved.push(entry);
                }
            }
        }

        Ok(Self {
            parser: Some(parser),
            header,
            entries: resolved,
            index,
        })
    }

    /// The decoded archive header.
    pub fn header(&self) -> &ArchiveHeader {
        &self.header
    }

    /// All registered entries in table order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// The registered entry names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// Look up an entry by name.
    pub fn entry(&self, name: &str) -> Option<&FileEntry> {
        self.index.get(name).map(|&position| &self.entries[position])
    }

    /// Extract one entry's uncompressed payload by name.
    ///
    /// Each call seeks and reads independently; a failure for one entry
    /// leaves the handle usable for the others.
    ///
    /// # Errors
    ///
    /// [`Error::EntryNotFound`] for an unregistered name and
    /// [`Error::Closed`] after [`close()`](Self::close); otherwise any
    /// payload read or decompression error.
    pub fn extract(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = self
            .entry(name)
            .ok_or_else(|| Error::EntryNotFound(name.to_string()))?
            .clone();
        let parser = self.parser.as_mut().ok_or(Error::Closed)?;
        parser.read_payload(&entry)
    }

    /// Extract the mod's main assembly, by convention the entry named
    /// `{mod name}.dll`.
    ///
    /// # Errors
    ///
    /// [`Error::EntryNotFound`] if the archive does not follow the naming
    /// convention.
    pub fn extract_main_assembly(&mut self) -> Result<Vec<u8>> {
        let name = self.header.main_assembly_name();
        self.extract(&name)
    }

    /// Release the underlying source.
    ///
    /// Idempotent; calling it again is a no-op. The entry list and header
    /// stay readable, but extraction fails with [`Error::Closed`].
    pub fn close(&mut self) {
        self.parser = None;
    }

    /// Whether the handle has been closed.
    pub fn is_closed(&self) -> bool {
        self.parser.is_none()
    }
}
