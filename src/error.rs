//! Error types for TMOD parsing and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for TMOD operations
pub type Result<T> = std::result::Result<T, Error>;

/// TMOD error types.
///
/// Every failure the library reports is a distinct variant so callers can
/// match on the kind instead of inspecting message text. Truncation,
/// magic mismatch and invalid numeric fields are all format-level errors;
/// they are kept separate because they point at different corruptions.
#[derive(Error, Debug)]
pub enum Error {
    /// No archive exists at the given path
    #[error("archive not found: {}", .0.display())]
    ArchiveNotFound(PathBuf),

    /// The archive contains no entry with the requested name
    #[error("no entry named {0:?} in the archive")]
    EntryNotFound(String),

    /// The first four bytes are not the TMOD magic
    #[error("invalid magic: expected \"TMOD\", got {0:?}")]
    InvalidMagic([u8; 4]),

    /// The source ended before a declared field was fully read
    #[error("truncated archive while reading {0}")]
    Truncated(&'static str),

    /// A count or length field holds a value the format cannot mean
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: i64 },

    /// The version text is not a dotted numeric version
    #[error("invalid version string: {0:?}")]
    InvalidVersion(String),

    /// The compressed payload could not be inflated
    #[error("failed to inflate {name:?}: {reason}")]
    Decompression { name: String, reason: String },

    /// The payload inflated to a size other than the declared length
    #[error("{name:?} inflated to {actual} bytes, expected {expected}")]
    LengthMismatch {
        name: String,
        expected: u64,
        actual: u64,
    },

    /// The archive handle was already closed
    #[error("archive is closed")]
    Closed,

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
