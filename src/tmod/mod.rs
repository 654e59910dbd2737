//! TMOD archive parsing and extraction.
//!
//! This module provides functionality for reading and extracting TMOD
//! mod-package archives.
//!
//! ## Architecture
//!
//! The module is organized into three main components:
//!
//! - [`structures`]: Data structures representing TMOD format elements
//!   (header, file entries, mod version)
//! - [`parser`]: Low-level parsing of TMOD structures from a seekable source
//! - [`archive`]: High-level archive handle for end users
//!
//! ## TMOD Format Overview
//!
//! A TMOD file consists of:
//! 1. A fixed header: `TMOD` magic, tool version, hash, signature,
//!    mod name and mod version
//! 2. A file table with per-entry name and length metadata
//! 3. Contiguous payload blocks in table order, immediately after the table
//!
//! Payload positions are not stored in the table. They are implied by the
//! concatenation of the blocks, so each entry's absolute offset is derived
//! from the cumulative compressed lengths plus the table's end position.
//!
//! ## Supported Features
//!
//! - Stored (uncompressed) entry payloads
//! - Raw deflate compressed entry payloads (no zlib or gzip framing)
//! - Name-based extraction, including the `{mod name}.dll` main assembly
//!
//! ## Limitations
//!
//! - Read-only: no archive creation or modification
//! - The embedded hash and signature are retained but not verified
//! - No forward-compatibility with unknown header variants

mod archive;
mod parser;
mod structures;

pub use archive::TmodArchive;
pub use parser::TmodParser;
pub use structures::*;
