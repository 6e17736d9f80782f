// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Container header and footer for the `.btrie` blob.
//!
//! The packed trie, its rank directory and the tag table are only valid
//! as a set from one build, so they ship as one blob: a fixed-size header
//! with section lengths, the three sections, and an 8-byte footer with a
//! CRC32 over everything before it. If the footer is wrong, something got
//! corrupted or truncated — don't trust the data.
//!
//! `SectionOffsets` is the single source of truth for the layout. Every
//! piece of code that reads or writes sections MUST use it.

use std::io::{self, Read, Write};

use crc32fast::Hasher as Crc32Hasher;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes: "BTRI" in ASCII (header)
pub const MAGIC: [u8; 4] = [0x42, 0x54, 0x52, 0x49];

/// Footer magic: "IRTB" (reversed, marks valid file end)
pub const FOOTER_MAGIC: [u8; 4] = [0x49, 0x52, 0x54, 0x42];

/// Current container format version.
pub const VERSION: u8 = 1;

// ============================================================================
// SECURITY LIMITS (prevent resource exhaustion from malicious input)
// ============================================================================

/// Maximum blob size: 1 GiB. A trie over tens of millions of names packs
/// into tens of megabytes; anything near this limit is not a real blob.
pub const MAX_FILE_SIZE: usize = 1024 * 1024 * 1024;

/// Maximum expanded node count.
pub const MAX_NODE_COUNT: u32 = 1_000_000_000;

/// Maximum tag table entries (flag bitmap address space).
pub const MAX_TAG_COUNT: u16 = 256;

/// Maximum varint bytes (u64 needs at most 10 bytes)
pub const MAX_VARINT_BYTES: usize = 10;

// ============================================================================
// HEADER
// ============================================================================

/// Container header (32 bytes fixed size).
#[derive(Debug, Clone)]
pub struct BlobHeader {
    pub version: u8,
    /// Reserved; always zero in v1.
    pub flags: u8,
    /// Expanded node count (chain + flag pseudo-nodes included).
    pub node_count: u32,
    /// Bits of magic + shape code inside the trie section.
    pub shape_len: u32,
    /// Trie bit-stream section length in bytes.
    pub trie_len: u32,
    /// Rank directory section length in bytes.
    pub dir_len: u32,
    /// Directory entry width in bits.
    pub dir_width: u8,
    /// Tag table entry count.
    pub tag_count: u16,
    /// Tag table section length in bytes.
    pub tag_len: u32,
}

impl BlobHeader {
    // 4 (magic) + 1 (version) + 1 (flags) + 4*4 (u32s) + 1 (dir_width)
    // + 2 (tag_count) + 4 (tag_len) + 3 (reserved) = 32
    pub const SIZE: usize = 32;

    pub fn section_offsets(&self) -> SectionOffsets {
        SectionOffsets::from_header(self)
    }

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&MAGIC)?;
        w.write_all(&[self.version])?;
        w.write_all(&[self.flags])?;
        w.write_all(&self.node_count.to_le_bytes())?;
        w.write_all(&self.shape_len.to_le_bytes())?;
        w.write_all(&self.trie_len.to_le_bytes())?;
        w.write_all(&self.dir_len.to_le_bytes())?;
        w.write_all(&[self.dir_width])?;
        w.write_all(&self.tag_count.to_le_bytes())?;
        w.write_all(&self.tag_len.to_le_bytes())?;
        w.write_all(&[0u8; 3])?; // reserved
        Ok(())
    }

    pub fn read<R: Read>(r: &mut R) -> io::Result<Self> {
        let mut magic = [0u8; 4];
        r.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid magic: expected BTRI, got {:?}", magic),
            ));
        }

        let mut buf = [0u8; 28]; // 32 - 4 (magic)
        r.read_exact(&mut buf)?;

        let header = Self {
            version: buf[0],
            flags: buf[1],
            node_count: u32::from_le_bytes([buf[2], buf[3], buf[4], buf[5]]),
            shape_len: u32::from_le_bytes([buf[6], buf[7], buf[8], buf[9]]),
            trie_len: u32::from_le_bytes([buf[10], buf[11], buf[12], buf[13]]),
            dir_len: u32::from_le_bytes([buf[14], buf[15], buf[16], buf[17]]),
            dir_width: buf[18],
            tag_count: u16::from_le_bytes([buf[19], buf[20]]),
            tag_len: u32::from_le_bytes([buf[21], buf[22], buf[23], buf[24]]),
            // buf[25..28] is reserved
        };
        header.validate()?;
        Ok(header)
    }

    /// Structural validation before any section is touched. The section
    /// lengths are all derivable from `node_count`, so a header that
    /// disagrees with itself is corrupt, not merely unusual.
    pub fn validate(&self) -> io::Result<()> {
        if self.version != VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Unsupported container version {}", self.version),
            ));
        }
        if self.node_count == 0 || self.node_count > MAX_NODE_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Node count {} outside [1, {}]", self.node_count, MAX_NODE_COUNT),
            ));
        }
        if self.tag_count > MAX_TAG_COUNT {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Tag count {} exceeds {}", self.tag_count, MAX_TAG_COUNT),
            ));
        }

        let n = self.node_count as u64;
        let expected_shape = 2 * n + 1;
        if u64::from(self.shape_len) != expected_shape {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Shape length {} != 2*{}+1", self.shape_len, n),
            ));
        }
        let total_bits = expected_shape + n * crate::encode::RECORD_WIDTH as u64;
        if u64::from(self.trie_len) != total_bits.div_ceil(8) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Trie section length {} inconsistent with {} nodes", self.trie_len, n),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION OFFSETS (SINGLE SOURCE OF TRUTH for the blob layout)
// ============================================================================

/// Byte offsets of every section in the blob.
#[derive(Debug, Clone, Copy)]
pub struct SectionOffsets {
    pub trie: (usize, usize),
    pub directory: (usize, usize),
    pub tags: (usize, usize),
    pub footer: (usize, usize),
}

impl SectionOffsets {
    /// Layout order: HEADER, TRIE, DIRECTORY, TAGS, FOOTER. The trie
    /// section goes first because lookups only need it and the directory;
    /// the tag table is decoded once at load.
    pub fn from_header(h: &BlobHeader) -> Self {
        let mut pos = BlobHeader::SIZE;

        let trie_start = pos;
        pos += h.trie_len as usize;
        let trie_end = pos;

        let dir_start = pos;
        pos += h.dir_len as usize;
        let dir_end = pos;

        let tags_start = pos;
        pos += h.tag_len as usize;
        let tags_end = pos;

        Self {
            trie: (trie_start, trie_end),
            directory: (dir_start, dir_end),
            tags: (tags_start, tags_end),
            footer: (pos, pos + BlobFooter::SIZE),
        }
    }

    /// Expected content size (everything before footer)
    pub fn content_size(&self) -> usize {
        self.footer.0
    }

    /// Total blob size including footer
    pub fn total_size(&self) -> usize {
        self.footer.1
    }

    /// Get a slice for a section from the bytes
    #[inline]
    pub fn slice<'a>(&self, bytes: &'a [u8], section: (usize, usize)) -> Option<&'a [u8]> {
        bytes.get(section.0..section.1)
    }
}

// ============================================================================
// FOOTER (8 bytes)
// ============================================================================

/// Footer with CRC32 checksum and magic number
#[derive(Debug, Clone)]
pub struct BlobFooter {
    /// CRC32 of header + all sections (everything before the footer).
    pub crc32: u32,
}

impl BlobFooter {
    pub const SIZE: usize = 8; // 4 bytes CRC32 + 4 bytes magic

    pub fn write<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_all(&self.crc32.to_le_bytes())?;
        w.write_all(&FOOTER_MAGIC)?;
        Ok(())
    }

    pub fn read(bytes: &[u8]) -> io::Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "Blob too short for footer",
            ));
        }

        let footer_start = bytes.len() - Self::SIZE;
        let magic = &bytes[footer_start + 4..];
        if magic != FOOTER_MAGIC {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid footer magic: expected IRTB, got {:?}", magic),
            ));
        }

        let crc32 = u32::from_le_bytes([
            bytes[footer_start],
            bytes[footer_start + 1],
            bytes[footer_start + 2],
            bytes[footer_start + 3],
        ]);

        Ok(Self { crc32 })
    }

    /// Compute CRC32 over the given bytes
    pub fn compute_crc32(data: &[u8]) -> u32 {
        let mut hasher = Crc32Hasher::new();
        hasher.update(data);
        hasher.finalize()
    }
}
