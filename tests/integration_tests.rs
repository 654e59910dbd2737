//! End-to-end tests over synthetic in-memory TMOD archives.

use std::io::{Cursor, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::DeflateEncoder;

use untmod::{Error, TmodArchive};

/// Append a base-128 varint length prefix.
fn write_length_prefix(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Append a length-prefixed UTF-8 string.
fn write_string(buf: &mut Vec<u8>, text: &str) {
    write_length_prefix(buf, text.len() as u32);
    buf.extend_from_slice(text.as_bytes());
}

/// Compress bytes as a raw deflate stream (no zlib or gzip framing).
fn deflate(payload: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload).unwrap();
    encoder.finish().unwrap()
}

/// Build a complete archive from raw table rows.
///
/// Each row is `(name, declared uncompressed length, payload block)`; the
/// compressed length is the block's size, so a row is "stored" exactly
/// when the block length equals the declared length. Rows are written in
/// order, blocks contiguously after the table.
fn build_raw(name: &str, version: &str, rows: &[(&str, u32, Vec<u8>)]) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"TMOD");
    write_string(&mut buf, "1.4.4");
    buf.extend_from_slice(&[0u8; 20]);
    buf.extend_from_slice(&[0u8; 256]);
    buf.write_i32::<LittleEndian>(0).unwrap();
    write_string(&mut buf, name);
    write_string(&mut buf, version);

    buf.write_i32::<LittleEndian>(rows.len() as i32).unwrap();
    for (entry_name, length, block) in rows {
        write_string(&mut buf, entry_name);
        buf.write_i32::<LittleEndian>(*length as i32).unwrap();
        buf.write_i32::<LittleEndian>(block.len() as i32).unwrap();
    }
    for (_, _, block) in rows {
        buf.extend_from_slice(block);
    }
    buf
}

/// The 50-byte assembly payload used by the reference scenario.
fn assembly_payload() -> Vec<u8> {
    b"MZ".iter().copied().cycle().take(50).collect()
}

/// The reference scenario: `TestMod` with a stored info.json and a
/// deflate-compressed TestMod.dll.
fn test_mod_archive() -> Vec<u8> {
    let info = b"hello, world!".to_vec();
    let assembly = assembly_payload();
    let compressed = deflate(&assembly);
    assert_ne!(compressed.len(), assembly.len());
    build_raw(
        "TestMod",
        "1.0.0.0",
        &[
            ("info.json", info.len() as u32, info),
            ("TestMod.dll", assembly.len() as u32, compressed),
        ],
    )
}

fn open(bytes: Vec<u8>) -> TmodArchive<Cursor<Vec<u8>>> {
    TmodArchive::from_reader(Cursor::new(bytes)).unwrap()
}

#[test]
fn parses_header_and_lists_entries() {
    let archive = open(test_mod_archive());

    let header = archive.header();
    assert_eq!(header.name, "TestMod");
    assert_eq!(header.version.to_string(), "1.0.0.0");
    assert_eq!(header.tool_version, "1.4.4");
    assert_eq!(header.hash, [0u8; 20]);
    assert_eq!(header.signature, vec![0u8; 256]);

    let names: Vec<&str> = archive.names().collect();
    assert_eq!(names, ["info.json", "TestMod.dll"]);
    assert_eq!(archive.entries().len(), 2);
}

#[test]
fn extracts_stored_entry_verbatim() {
    let bytes = test_mod_archive();
    let mut archive = open(bytes.clone());

    let payload = archive.extract("info.json").unwrap();
    assert_eq!(payload, b"hello, world!");

    // The stored payload is byte-identical to the source at the derived
    // offset
    let entry = archive.entry("info.json").unwrap();
    let start = entry.offset as usize;
    assert_eq!(&bytes[start..start + 13], b"hello, world!");
}

#[test]
fn extracts_compressed_entry_through_deflate() {
    let mut archive = open(test_mod_archive());
    let payload = archive.extract("TestMod.dll").unwrap();
    assert_eq!(payload, assembly_payload());
}

#[test]
fn extracts_main_assembly_by_naming_convention() {
    let mut archive = open(test_mod_archive());
    assert_eq!(archive.header().main_assembly_name(), "TestMod.dll");
    let payload = archive.extract_main_assembly().unwrap();
    assert_eq!(payload.len(), 50);
    assert_eq!(payload, assembly_payload());
}

#[test]
fn missing_archive_path_is_not_found() {
    let result = TmodArchive::open(Path::new("/nonexistent/Example.tmod"));
    assert!(matches!(result, Err(Error::ArchiveNotFound(_))));
}

#[test]
fn wrong_magic_is_rejected() {
    let mut bytes = test_mod_archive();
    bytes[..4].copy_from_slice(b"PK\x03\x04");
    let result = TmodArchive::from_reader(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::InvalidMagic(_))));
}

#[test]
fn garbage_version_text_is_rejected() {
    let bytes = build_raw("Broken", "not-a-version", &[]);
    let result = TmodArchive::from_reader(Cursor::new(bytes));
    assert!(matches!(result, Err(Error::InvalidVersion(text)) if text == "not-a-version"));
}

#[test]
fn unknown_entry_does_not_poison_the_handle() {
    let mut archive = open(test_mod_archive());

    assert!(matches!(
        archive.extract("no-such-entry"),
        Err(Error::EntryNotFound(name)) if name == "no-such-entry"
    ));

    // The handle stays fully usable afterwards
    assert_eq!(archive.extract("info.json").unwrap(), b"hello, world!");
}

#[test]
fn duplicate_names_resolve_last_wins() {
    let bytes = build_raw(
        "Dup",
        "1.0",
        &[
            ("data", 5, b"first".to_vec()),
            ("other", 2, b"ok".to_vec()),
            ("data", 6, b"second".to_vec()),
        ],
    );
    let mut archive = open(bytes);

    // Three table rows, two registered entries; the repeated name keeps
    // its original position but the later row's metadata
    let names: Vec<&str> = archive.names().collect();
    assert_eq!(names, ["data", "other"]);
    assert_eq!(archive.extract("data").unwrap(), b"second");
    assert_eq!(archive.extract("other").unwrap(), b"ok");
}

#[test]
fn truncated_payload_fails_without_invalidating_other_entries() {
    let mut bytes = test_mod_archive();
    // Chop the tail off the last payload block
    bytes.truncate(bytes.len() - 4);
    let mut archive = open(bytes);

    assert!(matches!(
        archive.extract("TestMod.dll"),
        Err(Error::Truncated("entry payload"))
    ));
    assert_eq!(archive.extract("info.json").unwrap(), b"hello, world!");
}

#[test]
fn corrupt_deflate_stream_is_a_decompression_error() {
    // compressed length differs from the declared length, so the block is
    // treated as deflate even though it is garbage
    let bytes = build_raw("Corrupt", "1.0", &[("blob", 20, vec![0xFF; 8])]);
    let mut archive = open(bytes);

    assert!(matches!(
        archive.extract("blob"),
        Err(Error::Decompression { name, .. }) if name == "blob"
    ));
}

#[test]
fn inflated_size_must_match_declared_length() {
    // Declares one byte more than the stream actually inflates to
    let compressed = deflate(&[b'A'; 100]);
    assert_ne!(compressed.len(), 101);
    let bytes = build_raw("Mismatch", "1.0", &[("blob", 101, compressed)]);
    let mut archive = open(bytes);

    assert!(matches!(
        archive.extract("blob"),
        Err(Error::LengthMismatch {
            expected: 101,
            actual: 100,
            ..
        })
    ));
}

#[test]
fn empty_archive_lists_nothing() {
    let mut archive = open(build_raw("Empty", "0.1", &[]));
    assert_eq!(archive.entries().len(), 0);
    assert_eq!(archive.names().count(), 0);
    assert!(matches!(
        archive.extract("anything"),
        Err(Error::EntryNotFound(_))
    ));
}

#[test]
fn close_is_idempotent_and_blocks_extraction() {
    let mut archive = open(test_mod_archive());
    assert!(!archive.is_closed());

    archive.close();
    archive.close();
    assert!(archive.is_closed());

    // Metadata survives the close; payload access does not
    assert_eq!(archive.names().count(), 2);
    assert!(matches!(archive.extract("info.json"), Err(Error::Closed)));
}
