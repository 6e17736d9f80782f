// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Binary container for frozen tries.
//!
//! A `.btrie` blob carries everything a consumer needs, in one file whose
//! pieces cannot be mixed across builds:
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ HEADER (32 bytes)                                         │
//! │   magic "BTRI", version, node_count, shape_len,           │
//! │   section lengths, directory entry width, tag count       │
//! ├───────────────────────────────────────────────────────────┤
//! │ 1. TRIE       packed bit stream (magic, shape, records)   │
//! ├───────────────────────────────────────────────────────────┤
//! │ 2. DIRECTORY  rank directory entries                      │
//! ├───────────────────────────────────────────────────────────┤
//! │ 3. TAGS       varint-prefixed tag names, bit-index order  │
//! ├───────────────────────────────────────────────────────────┤
//! │ FOOTER (8 bytes): crc32 + magic "IRTB"                    │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! This format is designed to be safely parsed from untrusted sources:
//! every length is validated against the header (which is itself
//! internally consistent by construction), the CRC32 footer detects
//! corruption and truncation, and allocation is bounded by MAX_* limits
//! before any section is materialized.

// Submodules
mod encoding;
mod header;

// Re-export from submodules for public API
pub use encoding::{decode_tag_table, decode_varint, encode_tag_table, encode_varint};
pub use header::{
    BlobFooter, BlobHeader, SectionOffsets, FOOTER_MAGIC, MAGIC, MAX_FILE_SIZE, MAX_NODE_COUNT,
    MAX_TAG_COUNT, MAX_VARINT_BYTES, VERSION,
};

use std::io;

use crate::bits::BitString;
use crate::encode::{PackedTrie, RECORD_WIDTH};
use crate::frozen::FrozenTrie;
use crate::rank::{width_for, RankDirectory, L2_BLOCK};

/// Serialize a frozen trie into a self-contained, checksummed blob.
pub fn write_blob(trie: &FrozenTrie) -> io::Result<Vec<u8>> {
    let packed = trie.packed();
    let directory = trie.directory();

    let trie_bytes = packed.bits().as_bytes();
    let dir_bytes = directory.entries().as_bytes();
    let mut tag_bytes = Vec::new();
    encode_tag_table(trie.tag_table(), &mut tag_bytes);

    let header = BlobHeader {
        version: VERSION,
        flags: 0,
        node_count: packed.node_count() as u32,
        shape_len: packed.shape_len() as u32,
        trie_len: trie_bytes.len() as u32,
        dir_len: dir_bytes.len() as u32,
        dir_width: directory.entry_width() as u8,
        tag_count: trie.tag_table().len() as u16,
        tag_len: tag_bytes.len() as u32,
    };

    let offsets = header.section_offsets();
    let mut buf = Vec::with_capacity(offsets.total_size());
    header.write(&mut buf)?;
    buf.extend_from_slice(trie_bytes);
    buf.extend_from_slice(dir_bytes);
    buf.extend_from_slice(&tag_bytes);
    debug_assert_eq!(buf.len(), offsets.content_size());

    let footer = BlobFooter { crc32: BlobFooter::compute_crc32(&buf) };
    footer.write(&mut buf)?;
    Ok(buf)
}

/// Parse a blob back into a frozen trie.
///
/// Validates, in order: size limit, footer magic + CRC, header
/// consistency, per-section lengths. Any failure is an `InvalidData` /
/// `UnexpectedEof` error; no partially-initialized trie ever escapes.
pub fn read_blob(bytes: &[u8]) -> io::Result<FrozenTrie> {
    if bytes.len() > MAX_FILE_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Blob size {} exceeds limit {}", bytes.len(), MAX_FILE_SIZE),
        ));
    }

    let footer = BlobFooter::read(bytes)?;
    let content = &bytes[..bytes.len() - BlobFooter::SIZE];
    let actual_crc = BlobFooter::compute_crc32(content);
    if actual_crc != footer.crc32 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("CRC mismatch: stored {:08x}, computed {:08x}", footer.crc32, actual_crc),
        ));
    }

    let mut reader = bytes;
    let header = BlobHeader::read(&mut reader)?;
    let offsets = header.section_offsets();
    if offsets.total_size() != bytes.len() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("Blob is {} bytes, header implies {}", bytes.len(), offsets.total_size()),
        ));
    }

    let node_count = header.node_count as usize;
    let shape_len = header.shape_len as usize;
    let zero_count = node_count + 1;

    // Trie section: the bit stream's exact length is derivable.
    let total_bits = shape_len + node_count * RECORD_WIDTH;
    let trie_section = offsets
        .slice(bytes, offsets.trie)
        .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "Truncated trie section"))?;
    let trie_bits = BitString::from_bytes(trie_section.to_vec(), total_bits).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "Trie section shorter than its bit length")
    })?;
    let packed = PackedTrie::from_parts(trie_bits, node_count, shape_len);

    // Directory section: entry width and count are derivable too.
    let expected_width = width_for(shape_len);
    if usize::from(header.dir_width) != expected_width {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Directory entry width {} != expected {}",
                header.dir_width, expected_width
            ),
        ));
    }
    let entry_count = zero_count / L2_BLOCK;
    let dir_bits = entry_count * expected_width;
    if header.dir_len as usize != dir_bits.div_ceil(8) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Directory section length {} inconsistent", header.dir_len),
        ));
    }
    let dir_section = offsets.slice(bytes, offsets.directory).ok_or_else(|| {
        io::Error::new(io::ErrorKind::UnexpectedEof, "Truncated directory section")
    })?;
    let dir_entries = BitString::from_bytes(dir_section.to_vec(), dir_bits).ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "Directory section shorter than its bit length")
    })?;
    let directory = RankDirectory::from_parts(dir_entries, expected_width, zero_count, shape_len);

    // Tag table section.
    let tag_section = offsets
        .slice(bytes, offsets.tags)
        .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "Truncated tag section"))?;
    let (tags, consumed) = decode_tag_table(tag_section)?;
    if consumed != tag_section.len() || tags.len() != usize::from(header.tag_count) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Tag table section disagrees with header",
        ));
    }

    Ok(FrozenTrie::assemble(packed, directory, tags))
}

impl FrozenTrie {
    /// Serialize to a blob (with CRC32 footer). See [`write_blob`].
    pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
        write_blob(self)
    }

    /// Deserialize a blob produced by [`write_blob`].
    pub fn from_bytes(bytes: &[u8]) -> io::Result<Self> {
        read_blob(bytes)
    }
}
