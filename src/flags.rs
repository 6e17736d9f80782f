// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Two-level sparse bitset over a fixed tag table.
//!
//! A blocklist ("tag") is identified by its position in the [`TagTable`]:
//! up to 16 groups of 16 tags each, 256 tags total. A [`FlagBitmap`] stores
//! a subset of those positions in two levels — a 16-bit header with one
//! presence bit per group, then one dense 16-bit word per present group.
//! An empty set is 2 bytes; all 256 tags are 34. The same bitmap shape is
//! stored inside the trie (as flag-sentinel child nodes) and carried over
//! the wire as a blockstamp, so the tag table ordering is load-bearing and
//! must be versioned together with any shipped trie blob.
//!
//! All bit numbering is MSB-first to match the packed trie stream: group 0
//! is the header's most significant bit, tag offset 0 is a group word's
//! most significant bit.

use serde::{Deserialize, Serialize};

use crate::errors::FlagError;

/// Tags per group and groups per header word.
const GROUP_BITS: usize = 16;

/// Maximum number of tags addressable by the bitmap.
pub const MAX_TAGS: usize = GROUP_BITS * GROUP_BITS;

// ============================================================================
// TAG TABLE
// ============================================================================

/// Ordered list of tag names; position in the list is the tag's global bit
/// index. The ordering is the contract between the build pipeline and every
/// consumer of a trie blob or blockstamp, so the table travels inside the
/// binary container and is compared by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagTable {
    names: Vec<String>,
}

impl TagTable {
    /// Build a table from ordered names. Rejects duplicates and more than
    /// [`MAX_TAGS`] entries.
    pub fn new(names: Vec<String>) -> Result<Self, FlagError> {
        if names.len() > MAX_TAGS {
            return Err(FlagError::TableOverflow { len: names.len() });
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(FlagError::DuplicateTag { name: name.clone() });
            }
        }
        Ok(Self { names })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Global bit index of a tag name. Linear scan; the table is small and
    /// name resolution only happens at build/stamp time, never per lookup.
    pub fn bit_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Tag name at a global bit index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

// ============================================================================
// FLAG BITMAP
// ============================================================================

/// Compact set of tag bit indices.
///
/// Invariant: `body.len() == header.count_ones()`, body words in header-bit
/// (MSB-first) order. Construction enforces it; [`FlagBitmap::from_bytes`]
/// treats a violation as corrupt data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlagBitmap {
    header: u16,
    body: Vec<u16>,
}

impl FlagBitmap {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.header == 0
    }

    pub fn header(&self) -> u16 {
        self.header
    }

    pub fn body(&self) -> &[u16] {
        &self.body
    }

    /// Encoded size in bytes: 2 for the header plus 2 per present group.
    pub fn byte_len(&self) -> usize {
        2 + 2 * self.body.len()
    }

    /// Body slot for group `g`: number of present groups before it.
    fn body_pos(&self, group: usize) -> usize {
        ((u32::from(self.header)) >> (GROUP_BITS - group)).count_ones() as usize
    }

    fn group_mask(group: usize) -> u16 {
        1 << (GROUP_BITS - 1 - group)
    }

    fn offset_mask(offset: usize) -> u16 {
        1 << (GROUP_BITS - 1 - offset)
    }

    /// Set a global bit index.
    ///
    /// Inserting a previously-absent group shifts the later body words by
    /// one slot — O(present groups), not O(1).
    pub fn set(&mut self, index: usize) -> Result<(), FlagError> {
        if index >= MAX_TAGS {
            return Err(FlagError::TagIndexOverflow { index });
        }
        let group = index / GROUP_BITS;
        let offset = index % GROUP_BITS;
        let pos = self.body_pos(group);
        if self.header & Self::group_mask(group) == 0 {
            self.header |= Self::group_mask(group);
            self.body.insert(pos, 0);
        }
        self.body[pos] |= Self::offset_mask(offset);
        Ok(())
    }

    /// Membership test for a global bit index.
    pub fn contains(&self, index: usize) -> bool {
        if index >= MAX_TAGS {
            return false;
        }
        let group = index / GROUP_BITS;
        if self.header & Self::group_mask(group) == 0 {
            return false;
        }
        self.body[self.body_pos(group)] & Self::offset_mask(index % GROUP_BITS) != 0
    }

    /// All set bit indices, ascending.
    pub fn indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = 0;
        for group in 0..GROUP_BITS {
            if self.header & Self::group_mask(group) == 0 {
                continue;
            }
            let word = self.body[cursor];
            cursor += 1;
            for offset in 0..GROUP_BITS {
                if word & Self::offset_mask(offset) != 0 {
                    out.push(group * GROUP_BITS + offset);
                }
            }
        }
        out
    }

    /// Serialize: header then body words, big-endian (MSB-first, matching
    /// the bit stream the trie encoder embeds these bytes into).
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.byte_len());
        out.extend_from_slice(&self.header.to_be_bytes());
        for word in &self.body {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Deserialize, enforcing the header/body invariant.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FlagError> {
        if bytes.len() < 2 || bytes.len() % 2 != 0 {
            return Err(FlagError::TruncatedBytes { len: bytes.len() });
        }
        let header = u16::from_be_bytes([bytes[0], bytes[1]]);
        let expected = header.count_ones() as usize;
        let actual = (bytes.len() - 2) / 2;
        if expected != actual {
            return Err(FlagError::HeaderMismatch { expected, actual });
        }
        let mut body = Vec::with_capacity(actual);
        for chunk in bytes[2..].chunks_exact(2) {
            body.push(u16::from_be_bytes([chunk[0], chunk[1]]));
        }
        // A present group with no members is unreachable via set(); treat
        // it as corrupt rather than letting it round-trip asymmetrically.
        if body.contains(&0) {
            return Err(FlagError::HeaderMismatch { expected, actual });
        }
        Ok(Self { header, body })
    }
}

// ============================================================================
// TAG NAME CODEC
// ============================================================================

/// Encode a set of tag names into a bitmap via the table.
pub fn encode_tags<S: AsRef<str>>(table: &TagTable, tags: &[S]) -> Result<FlagBitmap, FlagError> {
    let mut bitmap = FlagBitmap::new();
    for tag in tags {
        let name = tag.as_ref();
        let index = table
            .bit_index(name)
            .ok_or_else(|| FlagError::UnknownTag { name: name.to_string() })?;
        bitmap.set(index)?;
    }
    Ok(bitmap)
}

/// Decode a bitmap back to tag names, in ascending bit-index order.
pub fn decode_tags(table: &TagTable, bitmap: &FlagBitmap) -> Result<Vec<String>, FlagError> {
    let indices = bitmap.indices();
    let mut out = Vec::with_capacity(indices.len());
    for index in indices {
        let name = table.name(index).ok_or(FlagError::UnknownTagIndex {
            index,
            table_len: table.len(),
        })?;
        out.push(name.to_string());
    }
    Ok(out)
}

// ============================================================================
// INTERSECTION
// ============================================================================

/// Intersect two bitmaps directly on the compressed form.
///
/// Header AND gives a fast reject; for surviving groups each operand's
/// body cursor advances independently (a body slot is indexed by its own
/// header's set-bit order, not the intersection's). Groups whose AND is
/// zero are dropped from the result header. Returns `None` when the
/// intersection is empty.
pub fn intersect(a: &FlagBitmap, b: &FlagBitmap) -> Option<FlagBitmap> {
    let common = a.header & b.header;
    if common == 0 {
        return None;
    }

    let mut header = common;
    let mut body = Vec::with_capacity(common.count_ones() as usize);
    let mut a_cursor = 0;
    let mut b_cursor = 0;
    for group in 0..GROUP_BITS {
        let mask = FlagBitmap::group_mask(group);
        let in_a = a.header & mask != 0;
        let in_b = b.header & mask != 0;
        if in_a && in_b {
            let word = a.body[a_cursor] & b.body[b_cursor];
            if word == 0 {
                header &= !mask;
            } else {
                body.push(word);
            }
        }
        a_cursor += usize::from(in_a);
        b_cursor += usize::from(in_b);
    }

    if header == 0 {
        return None;
    }
    Some(FlagBitmap { header, body })
}
