// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! blocktrie CLI: build, inspect and query `.btrie` blobs.

use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fs;
use std::io::Read;

use clap::Parser;
use serde::Serialize;

use blocktrie::binary::{BlobFooter, BlobHeader, VERSION};
use blocktrie::cli::display::{print_banner, print_metadata, print_sections, SectionInfo};
use blocktrie::cli::{Cli, Commands};
use blocktrie::{
    decode_blockstamp, decode_tags, encode_blockstamp, encode_tags, intersect, normalize_domain,
    read_blob, reverse_key, write_blob, FrozenTrie, NormalizeIssue, StampFormat, TagTable,
    TrieBuilder,
};

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Build { input, output, tags, report } => {
            run_build(&input, &output, tags, report.as_deref())
        }
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Query { file, domain, stamp } => run_query(&file, &domain, stamp.as_deref()),
        Commands::Stamp { file, decode, tags, base32 } => {
            run_stamp(&file, decode.as_deref(), &tags, base32)
        }
    };
    if let Err(e) = result {
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// BUILD
// ============================================================================

/// Build report emitted alongside the blob with `--report`.
#[derive(Serialize)]
struct BuildReport {
    domains: usize,
    logical_nodes: usize,
    label_symbols: usize,
    flagged_domains: usize,
    flag_bytes: usize,
    packed_nodes: usize,
    tags: Vec<String>,
    blob_bytes: usize,
}

/// Parse "domain tag1,tag2" lines into a normalized, duplicate-merged map.
fn parse_source(raw: &str) -> Result<BTreeMap<String, BTreeSet<String>>, Box<dyn Error>> {
    let mut entries: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (lineno, line) in raw.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let domain = parts.next().unwrap_or_default();
        let normalized = normalize_domain(domain).map_err(|issue| match issue {
            NormalizeIssue::Empty => format!("line {}: empty domain", lineno + 1),
            NormalizeIssue::NonAscii { byte_position } => format!(
                "line {}: non-ASCII byte at position {} in {:?} (IDNA-encode first)",
                lineno + 1,
                byte_position,
                domain
            ),
        })?;
        let tags = entries.entry(normalized).or_default();
        if let Some(list) = parts.next() {
            tags.extend(list.split(',').filter(|t| !t.is_empty()).map(str::to_string));
        }
        if let Some(extra) = parts.next() {
            return Err(format!("line {}: unexpected trailing field {:?}", lineno + 1, extra).into());
        }
    }
    Ok(entries)
}

fn run_build(
    input: &str,
    output: &str,
    tags: Vec<String>,
    report: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let raw = if input == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        fs::read_to_string(input)?
    };
    let entries = parse_source(&raw)?;
    if entries.is_empty() {
        return Err("no domains in input".into());
    }

    let table = if tags.is_empty() {
        let seen: BTreeSet<String> =
            entries.values().flat_map(|tags| tags.iter().cloned()).collect();
        TagTable::new(seen.into_iter().collect())?
    } else {
        TagTable::new(tags)?
    };

    let mut sorted: Vec<&String> = entries.keys().collect();
    sorted.sort_by_key(|domain| reverse_key(domain));

    let mut builder = TrieBuilder::new(table);
    for domain in sorted {
        let tags: Vec<&String> = entries[domain].iter().collect();
        builder.insert(domain, &tags)?;
    }
    let stats = builder.stats();
    let trie = builder.freeze()?;
    let bytes = write_blob(&trie)?;
    fs::write(output, &bytes)?;
    eprintln!(
        "✓ {} domains packed into {} ({} nodes)",
        stats.domains,
        output,
        trie.node_count()
    );

    if let Some(path) = report {
        let report = BuildReport {
            domains: stats.domains,
            logical_nodes: stats.nodes,
            label_symbols: stats.symbols,
            flagged_domains: stats.flagged,
            flag_bytes: stats.flag_bytes,
            packed_nodes: trie.node_count(),
            tags: trie.tag_table().names().to_vec(),
            blob_bytes: bytes.len(),
        };
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        eprintln!("✓ build report written to {}", path);
    }
    Ok(())
}

// ============================================================================
// INSPECT
// ============================================================================

fn run_inspect(path: &str) -> Result<(), Box<dyn Error>> {
    let bytes = fs::read(path)?;
    let total_size = bytes.len();

    let footer = BlobFooter::read(&bytes)?;
    let content = &bytes[..bytes.len() - BlobFooter::SIZE];
    let crc_valid = BlobFooter::compute_crc32(content) == footer.crc32;

    let mut reader = bytes.as_slice();
    let header = BlobHeader::read(&mut reader)?;
    let offsets = header.section_offsets();

    print_banner(path, total_size, header.version, VERSION);
    print_metadata(&[
        ("Nodes", header.node_count.to_string()),
        ("Shape bits", header.shape_len.to_string()),
        ("Tags", header.tag_count.to_string()),
        ("Dir width", format!("{} bits/entry", header.dir_width)),
        (
            "CRC32",
            format!(
                "{:#010x} {}",
                footer.crc32,
                if crc_valid { "✓ valid" } else { "✗ BAD" }
            ),
        ),
    ]);

    let sections = [
        SectionInfo { name: "HEADER", offset: 0, size: BlobHeader::SIZE },
        SectionInfo {
            name: "TRIE",
            offset: offsets.trie.0,
            size: offsets.trie.1 - offsets.trie.0,
        },
        SectionInfo {
            name: "DIRECTORY",
            offset: offsets.directory.0,
            size: offsets.directory.1 - offsets.directory.0,
        },
        SectionInfo {
            name: "TAGS",
            offset: offsets.tags.0,
            size: offsets.tags.1 - offsets.tags.0,
        },
        SectionInfo {
            name: "FOOTER",
            offset: offsets.footer.0,
            size: BlobFooter::SIZE,
        },
    ];
    print_sections(&sections, total_size);
    Ok(())
}

// ============================================================================
// QUERY
// ============================================================================

fn load(path: &str) -> Result<FrozenTrie, Box<dyn Error>> {
    let bytes = fs::read(path)?;
    Ok(read_blob(&bytes)?)
}

fn run_query(file: &str, domain: &str, stamp: Option<&str>) -> Result<(), Box<dyn Error>> {
    let trie = load(file)?;
    let matches = trie.lookup(domain)?;
    let enabled = stamp.map(decode_blockstamp).transpose()?;

    let mut reported = 0usize;
    for (suffix, bitmap) in &matches {
        // With a user stamp, a match only counts if the user actually has
        // one of its lists enabled.
        let shown = match &enabled {
            Some(user) => match intersect(bitmap, user) {
                Some(hit) => hit,
                None => continue,
            },
            None => bitmap.clone(),
        };
        let names = decode_tags(trie.tag_table(), &shown)?;
        println!("{}  [{}]", suffix, names.join(", "));
        reported += 1;
    }
    if reported == 0 {
        println!("{}: no match", domain);
    }
    Ok(())
}

// ============================================================================
// STAMP
// ============================================================================

fn run_stamp(
    file: &str,
    decode: Option<&str>,
    tags: &[String],
    base32: bool,
) -> Result<(), Box<dyn Error>> {
    let trie = load(file)?;
    match decode {
        Some(stamp) => {
            let bitmap = decode_blockstamp(stamp)?;
            let names = decode_tags(trie.tag_table(), &bitmap)?;
            println!("{}", names.join(","));
        }
        None => {
            if tags.is_empty() {
                return Err("nothing to encode: pass --tags or --decode".into());
            }
            let bitmap = encode_tags(trie.tag_table(), tags)?;
            let format = if base32 { StampFormat::Base32 } else { StampFormat::Base64Url };
            println!("{}", encode_blockstamp(&bitmap, format));
        }
    }
    Ok(())
}
