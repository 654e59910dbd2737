//! Main entry point for the untmod CLI application.
//!
//! This binary provides a command-line interface for listing and extracting
//! TMOD mod-package archives from the local filesystem.

use anyhow::Result;
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use untmod::{Cli, FileEntry, TmodArchive};

/// Application entry point.
///
/// Parses command-line arguments, opens the archive and dispatches to
/// listing or extraction.
fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut archive = TmodArchive::open(Path::new(&cli.file))?;
    process_archive(&mut archive, &cli)?;
    archive.close();

    Ok(())
}

/// Process a TMOD archive based on CLI options.
///
/// This function handles both listing and extraction modes:
/// - List mode (`-l` or `-v`): Display archive contents
/// - Main assembly mode (`--main`): Extract the `{mod name}.dll` entry
/// - Extract mode: Extract entries matching the specified filters
fn process_archive<R: std::io::Read + std::io::Seek>(
    archive: &mut TmodArchive<R>,
    cli: &Cli,
) -> Result<()> {
    // List mode: display archive contents and exit
    if cli.list || cli.verbose {
        return list_entries(archive, cli.verbose);
    }

    // Main assembly mode: a single derived entry name
    if cli.main_assembly {
        let name = archive.header().main_assembly_name();
        let entry = archive
            .entry(&name)
            .cloned()
            .ok_or_else(|| untmod::Error::EntryNotFound(name))?;
        return extract_entry(archive, &entry, cli, false);
    }

    // Extract mode: select entries matching the positional filters.
    // Entries are cloned up front because extraction needs the handle
    // mutably.
    let selected: Vec<FileEntry> = archive
        .entries()
        .iter()
        .filter(|e| {
            if cli.entries.is_empty() {
                return true;
            }
            cli.entries.iter().any(|pattern| {
                if has_glob_chars(pattern) {
                    // Pattern contains wildcards: use glob matching
                    glob_match(pattern, &e.name)
                } else {
                    // No wildcards: exact match on entry name or basename
                    let basename = Path::new(&e.name)
                        .file_name()
                        .map(|s| s.to_string_lossy())
                        .unwrap_or_default();
                    e.name == *pattern || basename == *pattern
                }
            })
        })
        .cloned()
        .collect();

    let multiple_entries = cli.pipe && selected.len() > 1;
    for entry in &selected {
        extract_entry(archive, entry, cli, multiple_entries)?;
    }

    Ok(())
}

/// List entries in the TMOD archive.
///
/// Supports two output formats:
/// - Simple format (`-l`): Just entry names, one per line
/// - Verbose format (`-v`): Mod info plus a table with sizes and
///   compression ratios
fn list_entries<R: std::io::Read + std::io::Seek>(
    archive: &TmodArchive<R>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        let header = archive.header();
        println!(
            "Mod: {} v{} (built with tools {})",
            header.name, header.version, header.tool_version
        );
        println!("{:>10}  {:>10}  {:>5}  Name", "Length", "Size", "Cmpr");
        println!("{}", "-".repeat(50));
    }

    // Track totals for summary line
    let mut total_uncompressed = 0u64;
    let mut total_compressed = 0u64;

    for entry in archive.entries() {
        if verbose {
            let ratio = ratio_percent(entry.length as u64, entry.compressed_length as u64);

            println!(
                "{:>10}  {:>10}  {}  {}",
                entry.length, entry.compressed_length, ratio, entry.name
            );

            total_uncompressed += entry.length as u64;
            total_compressed += entry.compressed_length as u64;
        } else {
            // Simple format: just the entry name
            println!("{}", entry.name);
        }
    }

    // Print summary line in verbose mode
    if verbose {
        println!("{}", "-".repeat(50));
        let total_ratio = ratio_percent(total_uncompressed, total_compressed);
        println!(
            "{:>10}  {:>10}  {}  {} entries",
            total_uncompressed,
            total_compressed,
            total_ratio,
            archive.entries().len()
        );
    }

    Ok(())
}

/// Extract a single entry from the archive.
///
/// Handles the extraction options:
/// - Pipe mode (`-p`): Write to stdout instead of a file
/// - Custom output directory (`-d`): Extract into the given directory
/// - Overwrite control (`-n`, `-o`): Handle existing files
fn extract_entry<R: std::io::Read + std::io::Seek>(
    archive: &mut TmodArchive<R>,
    entry: &FileEntry,
    cli: &Cli,
    show_name: bool,
) -> Result<()> {
    // Pipe mode: write payload directly to stdout
    if cli.pipe {
        let payload = archive.extract(&entry.name)?;
        let mut stdout = std::io::stdout().lock();
        if show_name {
            writeln!(stdout, "--- {} ---", entry.name)?;
        }
        stdout.write_all(&payload)?;
        return Ok(());
    }

    // Entry names may carry archive-internal path separators
    let output_path = match &cli.extract_dir {
        Some(dir) => PathBuf::from(dir).join(&entry.name),
        None => PathBuf::from(&entry.name),
    };

    // Handle existing files based on overwrite options
    if output_path.exists() {
        if cli.never_overwrite || !cli.overwrite {
            if !cli.is_quiet() {
                let hint = if cli.never_overwrite {
                    "file exists"
                } else {
                    "use -o to overwrite"
                };
                eprintln!("Skipping: {} ({hint})", entry.name);
            }
            return Ok(());
        }
    }

    if !cli.is_quiet() {
        println!("  extracting: {}", entry.name);
    }

    let payload = archive.extract(&entry.name)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output_path, payload)?;

    Ok(())
}

/// Percentage of space saved by compression.
///
/// Clamped at 0%: deflate can expand incompressible payloads, giving a
/// compressed length larger than the uncompressed one.
fn ratio_percent(length: u64, compressed: u64) -> String {
    let saved = if length > 0 {
        100u64.saturating_sub(compressed * 100 / length)
    } else {
        0
    };
    format!("{saved:>4}%")
}

/// Check if a pattern contains glob wildcard characters (`*` or `?`).
fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Simple glob pattern matching supporting `*` and `?` wildcards.
///
/// - `*` matches zero or more characters
/// - `?` matches exactly one character
fn glob_match(pattern: &str, text: &str) -> bool {
    let pattern_chars: Vec<char> = pattern.chars().collect();
    let text_chars: Vec<char> = text.chars().collect();

    // Backtracking matcher; the star branch tries consuming zero characters
    // first, then one more at a time.
    fn do_match(pattern: &[char], text: &[char]) -> bool {
        match (pattern.first(), text.first()) {
            (None, None) => true,
            (Some('*'), _) => {
                do_match(&pattern[1..], text) || (!text.is_empty() && do_match(pattern, &text[1..]))
            }
            (Some('?'), Some(_)) => do_match(&pattern[1..], &text[1..]),
            (Some(p), Some(t)) if *p == *t => do_match(&pattern[1..], &text[1..]),
            _ => false,
        }
    }

    do_match(&pattern_chars, &text_chars)
}

#[cfg(test)]
mod tests {
    use super::{glob_match, ratio_percent};

    #[test]
    fn ratio_clamps_when_compression_expanded_the_payload() {
        assert_eq!(ratio_percent(10, 20), "   0%");
        assert_eq!(ratio_percent(100, 25), "  75%");
        assert_eq!(ratio_percent(13, 13), "   0%");
        assert_eq!(ratio_percent(0, 0), "   0%");
    }

    #[test]
    fn glob_matches_wildcards() {
        assert!(glob_match("*.json", "info.json"));
        assert!(glob_match("Content/*", "Content/Items/Sword.png"));
        assert!(glob_match("file?.dat", "file1.dat"));
        assert!(!glob_match("*.json", "TestMod.dll"));
    }
}
