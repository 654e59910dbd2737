//! # untmod
//!
//! A Rust utility for listing and extracting TMOD mod-package archives.
//!
//! This library provides functionality to read TMOD archives: validating
//! the header, decoding the file table, and extracting individual file
//! payloads on demand. Payloads are either stored verbatim or compressed
//! as raw deflate streams, and offsets into the archive are reconstructed
//! from the table since the format never stores them explicitly.
//!
//! ## Features
//!
//! - Open TMOD archives from the filesystem or any seekable source
//! - List contained entries with their sizes without touching payloads
//! - Extract entries by name, with lazy per-entry decompression
//! - Extract the mod's main assembly via the `{mod name}.dll` convention
//! - Distinct, matchable error kinds for every failure mode
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use untmod::TmodArchive;
//!
//! fn main() -> untmod::Result<()> {
//!     // Open and validate an archive
//!     let mut archive = TmodArchive::open(Path::new("ExampleMod.tmod"))?;
//!
//!     // List all entries in the archive
//!     for entry in archive.entries() {
//!         println!("{} ({} bytes)", entry.name, entry.length);
//!     }
//!
//!     // Extract one entry's uncompressed payload
//!     let info = archive.extract("Info")?;
//!     println!("Info is {} bytes", info.len());
//!
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod tmod;

pub use cli::Cli;
pub use error::{Error, Result};
pub use tmod::{ArchiveHeader, FileEntry, ModVersion, TmodArchive, TmodParser};
