use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Magic literal at offset 0 of every TMOD archive
pub const TMOD_MAGIC: &[u8; 4] = b"TMOD";

/// Size of the embedded hash field (opaque, never verified here)
pub const HASH_SIZE: usize = 20;

/// Size of the embedded signature field (opaque, never verified here)
pub const SIGNATURE_SIZE: usize = 256;

/// Extension appended to the mod name to derive the main assembly entry.
///
/// A naming convention followed by real-world archives, not a guarantee
/// of the format itself.
pub const MAIN_ASSEMBLY_SUFFIX: &str = ".dll";

/// Dotted numeric mod version, e.g. `1.0.0.0`.
///
/// Two to four numeric components, matching what archive producers emit.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModVersion {
    components: Vec<u32>,
}

impl ModVersion {
    pub fn components(&self) -> &[u32] {
        &self.components
    }
}

impl FromStr for ModVersion {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let components: Vec<u32> = text
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| Error::InvalidVersion(text.to_string()))?;

        if !(2..=4).contains(&components.len()) {
            return Err(Error::InvalidVersion(text.to_string()));
        }

        Ok(Self { components })
    }
}

impl fmt::Display for ModVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.components {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}

/// Parsed TMOD archive header.
///
/// Built once when the archive is opened and never mutated. The hash and
/// signature are read verbatim and kept opaque.
#[derive(Debug, Clone)]
pub struct ArchiveHeader {
    /// Version of the tool that produced the archive
    pub tool_version: String,
    /// Raw hash bytes, unverified
    pub hash: [u8; HASH_SIZE],
    /// Raw signature bytes, unverified
    pub signature: Vec<u8>,
    /// Declared mod name
    pub name: String,
    /// Declared mod version
    pub version: ModVersion,
}

impl ArchiveHeader {
    /// Name of the entry holding the mod's main assembly, by convention
    /// `{mod name}.dll`.
    pub fn main_assembly_name(&self) -> String {
        format!("{}{}", self.name, MAIN_ASSEMBLY_SUFFIX)
    }
}

/// Parsed TMOD file table entry.
///
/// The serialized record carries only name and lengths; `offset` is derived
/// while loading the table and points at the payload block in the source.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Entry name, the unique key within the archive
    pub name: String,
    /// Uncompressed payload length in bytes
    pub length: u32,
    /// Stored payload length in bytes; equal to `length` for stored entries
    pub compressed_length: u32,
    /// Absolute byte offset of the payload block in the source
    pub offset: u64,
}

impl FileEntry {
    /// Whether the payload is a raw deflate stream rather than stored bytes.
    pub fn is_compressed(&self) -> bool {
        self.compressed_length != self.length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_parses_dotted_components() {
        let version: ModVersion = "1.4.0.5".parse().unwrap();
        assert_eq!(version.components(), &[1, 4, 0, 5]);
        assert_eq!(version.to_string(), "1.4.0.5");

        let short: ModVersion = "0.9".parse().unwrap();
        assert_eq!(short.components(), &[0, 9]);
    }

    #[test]
    fn version_rejects_non_numeric_and_bad_arity() {
        for text in ["", "1", "1.2.3.4.5", "1.x", "1..2", "one.two"] {
            assert!(
                matches!(text.parse::<ModVersion>(), Err(Error::InvalidVersion(_))),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn version_ordering_is_componentwise() {
        let older: ModVersion = "1.3.9".parse().unwrap();
        let newer: ModVersion = "1.4.0".parse().unwrap();
        assert!(older < newer);
    }

    #[test]
    fn stored_entries_are_not_compressed() {
        let entry = FileEntry {
            name: "info.json".to_string(),
            length: 13,
            compressed_length: 13,
            offset: 0,
        };
        assert!(!entry.is_compressed());
    }
}
