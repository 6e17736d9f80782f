// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Rank directory: O(1)-ish `select0` over the shape code.
//!
//! `select0(y)` — the bit position of the y-th zero — is the single
//! primitive the frozen trie needs: it turns a node ordinal into its
//! children's index range without any pointers. The directory stores one
//! fixed-width entry per 32 consumed zero bits (the absolute offset of
//! that block's last zero), so a query is one directory read plus a
//! bounded forward scan.
//!
//! Entries are `ceil(log2(shape_len))` bits wide, packed with the same
//! MSB-first writer as the trie stream. The directory is only meaningful
//! for the exact shape code it was built from; [`crate::FrozenTrie`] is
//! the one place the two are paired, and the binary container ships them
//! as a single checksummed blob so they cannot be mixed across builds.
//!
//! `rank` is derivable from a linear zero count and needed only by tests,
//! so there is no standalone rank path.

use crate::bits::{BitString, BitWriter, MAX_FIELD_WIDTH};
use crate::errors::TrieError;

/// Zero bits per directory entry.
pub const L2_BLOCK: usize = 32;

/// Select index over a fixed shape code.
#[derive(Debug, Clone)]
pub struct RankDirectory {
    entries: BitString,
    entry_width: usize,
    zero_count: usize,
    /// Bits of shape code covered; scans never run past this.
    shape_len: usize,
}

impl RankDirectory {
    /// Scan `shape[..shape_len]` and record the offset of every 32nd zero.
    pub fn build(shape: &BitString, shape_len: usize) -> Result<Self, TrieError> {
        let entry_width = width_for(shape_len);
        let mut writer = BitWriter::with_capacity((shape_len / L2_BLOCK + 1) * entry_width);
        let mut zeros = 0usize;
        let mut pos = 0usize;
        while pos < shape_len {
            let take = (shape_len - pos).min(MAX_FIELD_WIDTH);
            let word = shape.get(pos, take)?;
            for i in 0..take {
                if word & (1 << (take - 1 - i)) == 0 {
                    zeros += 1;
                    if zeros % L2_BLOCK == 0 {
                        writer.push((pos + i) as u64, entry_width);
                    }
                }
            }
            pos += take;
        }
        Ok(Self {
            entries: writer.freeze(),
            entry_width,
            zero_count: zeros,
            shape_len,
        })
    }

    /// Reassemble a directory decoded from the binary container.
    pub(crate) fn from_parts(
        entries: BitString,
        entry_width: usize,
        zero_count: usize,
        shape_len: usize,
    ) -> Self {
        Self { entries, entry_width, zero_count, shape_len }
    }

    pub fn zero_count(&self) -> usize {
        self.zero_count
    }

    pub fn entry_width(&self) -> usize {
        self.entry_width
    }

    pub fn entry_count(&self) -> usize {
        self.zero_count / L2_BLOCK
    }

    pub(crate) fn entries(&self) -> &BitString {
        &self.entries
    }

    /// Bit position of the y-th zero (1-indexed) in `bits`, which must be
    /// the shape code this directory was built from.
    ///
    /// `y` outside `[1, zero_count]` is an explicit error, never garbage.
    pub fn select0(&self, bits: &BitString, y: usize) -> Result<usize, TrieError> {
        if y == 0 || y > self.zero_count {
            return Err(TrieError::SelectOutOfRange { y, zero_count: self.zero_count });
        }

        let block = (y - 1) / L2_BLOCK;
        let (mut pos, mut zeros) = if block == 0 {
            (0, 0)
        } else {
            let entry = self.entries.get((block - 1) * self.entry_width, self.entry_width)?;
            (entry as usize + 1, block * L2_BLOCK)
        };

        while pos < self.shape_len {
            let take = (self.shape_len - pos).min(MAX_FIELD_WIDTH);
            let word = bits.get(pos, take)?;
            let chunk_zeros = take - word.count_ones() as usize;
            if zeros + chunk_zeros < y {
                zeros += chunk_zeros;
                pos += take;
                continue;
            }
            for i in 0..take {
                if word & (1 << (take - 1 - i)) == 0 {
                    zeros += 1;
                    if zeros == y {
                        return Ok(pos + i);
                    }
                }
            }
            pos += take;
        }

        // zero_count said y exists but the scan ran out: the directory and
        // the bit string are not from the same build.
        Err(TrieError::SelectOutOfRange { y, zero_count: self.zero_count })
    }
}

/// Bits needed to store any offset below `shape_len`.
pub(crate) fn width_for(shape_len: usize) -> usize {
    let max_offset = shape_len.saturating_sub(1).max(1);
    (usize::BITS - max_offset.leading_zeros()) as usize
}
