// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fixed-width, MSB-first bit I/O over byte buffers.
//!
//! Everything above this module — the shape code, the node records, the
//! rank directory — is defined in terms of bit offsets into one contiguous
//! stream, so the bit order here is load-bearing: the first bit written
//! lands in the most significant bit of byte 0. A `BitWriter` is growable
//! while the encoder runs and freezes into an immutable [`BitString`];
//! after that every access is a bounds-checked read.

use crate::errors::TrieError;

/// Widest single read/write supported, the full accumulator width.
pub const MAX_FIELD_WIDTH: usize = 64;

// ============================================================================
// WRITER
// ============================================================================

/// Growable MSB-first bit buffer.
///
/// Used by the level-order encoder and the rank directory builder. Call
/// [`BitWriter::freeze`] when done; the writer never shrinks and never
/// re-orders bits.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Capacity hint in bits. The encoder knows its output size up front,
    /// so the byte buffer should never reallocate mid-encode.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bits.div_ceil(8)),
            bit_len: 0,
        }
    }

    /// Number of bits written so far.
    pub fn bit_len(&self) -> usize {
        self.bit_len
    }

    /// Append the low `width` bits of `value`, most significant first.
    ///
    /// `width == 0` is a no-op. Widths above [`MAX_FIELD_WIDTH`] are a
    /// programming error and panic in debug builds; the encoder only ever
    /// writes fields of 1..=57 bits.
    pub fn push(&mut self, value: u64, width: usize) {
        debug_assert!(width <= MAX_FIELD_WIDTH, "field width {} > 64", width);
        let mut remaining = width;
        while remaining > 0 {
            let byte_idx = self.bit_len / 8;
            if byte_idx == self.bytes.len() {
                self.bytes.push(0);
            }
            let used = self.bit_len % 8;
            let free = 8 - used;
            let take = free.min(remaining);
            // High `take` bits of the remaining value, placed against the
            // current byte's free region.
            let chunk = ((value >> (remaining - take)) & ((1u64 << take) - 1)) as u8;
            self.bytes[byte_idx] |= chunk << (free - take);
            self.bit_len += take;
            remaining -= take;
        }
    }

    /// Append a single bit.
    pub fn push_bit(&mut self, bit: bool) {
        self.push(u64::from(bit), 1);
    }

    /// Append `count` one-bits followed by a single zero-bit: the unary
    /// run-length code used by the LOUDS shape stream.
    pub fn push_unary(&mut self, count: usize) {
        let mut left = count;
        while left >= MAX_FIELD_WIDTH {
            self.push(u64::MAX, MAX_FIELD_WIDTH);
            left -= MAX_FIELD_WIDTH;
        }
        if left > 0 {
            self.push((1u64 << left) - 1, left);
        }
        self.push(0, 1);
    }

    /// Finalize into an immutable bit string.
    pub fn freeze(self) -> BitString {
        BitString {
            bytes: self.bytes,
            bit_len: self.bit_len,
        }
    }
}

// ============================================================================
// READER
// ============================================================================

/// Immutable MSB-first bit string.
///
/// This is the storage type for the packed trie buffer and the rank
/// directory. All reads are bounds-checked; a read past the end returns
/// [`TrieError::OutOfBounds`] rather than garbage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitString {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitString {
    /// Wrap raw bytes carrying `bit_len` valid bits.
    ///
    /// Returns `None` if `bit_len` does not fit in `bytes` — the container
    /// decoder uses this to reject truncated sections before any read.
    pub fn from_bytes(bytes: Vec<u8>, bit_len: usize) -> Option<Self> {
        if bit_len > bytes.len() * 8 {
            return None;
        }
        Some(Self { bytes, bit_len })
    }

    /// Number of valid bits.
    pub fn len_bits(&self) -> usize {
        self.bit_len
    }

    pub fn is_empty(&self) -> bool {
        self.bit_len == 0
    }

    /// Underlying bytes (trailing bits of the last byte are zero).
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read `width` bits starting at `offset`, MSB-first.
    pub fn get(&self, offset: usize, width: usize) -> Result<u64, TrieError> {
        debug_assert!(width <= MAX_FIELD_WIDTH, "field width {} > 64", width);
        let end = offset.checked_add(width).ok_or(TrieError::OutOfBounds {
            offset,
            width,
            len: self.bit_len,
        })?;
        if end > self.bit_len {
            return Err(TrieError::OutOfBounds {
                offset,
                width,
                len: self.bit_len,
            });
        }

        let mut result: u64 = 0;
        let mut pos = offset;
        let mut remaining = width;
        while remaining > 0 {
            let byte = self.bytes[pos / 8];
            let used = pos % 8;
            let avail = 8 - used;
            let take = avail.min(remaining);
            let chunk = (byte >> (avail - take)) & ((1u16 << take) - 1) as u8;
            result = (result << take) | u64::from(chunk);
            pos += take;
            remaining -= take;
        }
        Ok(result)
    }

    /// Read a single bit.
    pub fn bit(&self, offset: usize) -> Result<bool, TrieError> {
        Ok(self.get(offset, 1)? == 1)
    }

    /// Count zero bits in `[0, end)`. Linear scan; used only by directory
    /// construction and tests, never on the lookup path.
    pub fn count_zeros(&self, end: usize) -> Result<usize, TrieError> {
        if end > self.bit_len {
            return Err(TrieError::OutOfBounds {
                offset: end,
                width: 0,
                len: self.bit_len,
            });
        }
        let mut zeros = 0;
        let mut pos = 0;
        while pos < end {
            let take = (end - pos).min(MAX_FIELD_WIDTH);
            let word = self.get(pos, take)?;
            zeros += take - word.count_ones() as usize;
            pos += take;
        }
        Ok(zeros)
    }
}

// ============================================================================
// TESTS
// ============================================================================


// ============================================================================
// KANI MODEL CHECKING PROOFS
// ============================================================================
//
// Run with: cargo kani
//
// Verified properties:
// 1. push/get roundtrip preserves values for all widths 0..=16
// 2. get never panics on any (offset, width) pair

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn verify_push_get_roundtrip() {
        let width: usize = kani::any_where(|&w| w >= 1 && w <= 16);
        let value: u64 = kani::any();
        let masked = value & ((1u64 << width) - 1);

        let mut w = BitWriter::new();
        w.push(0b1, 1); // non-zero leading offset
        w.push(masked, width);
        let bits = w.freeze();

        let read = bits.get(1, width);
        kani::assert(read.is_ok(), "in-bounds read must succeed");
        kani::assert(read.unwrap() == masked, "roundtrip must preserve value");
    }

    #[kani::proof]
    fn verify_get_never_panics() {
        let mut w = BitWriter::new();
        w.push(kani::any::<u64>() & 0xFFFF, 16);
        let bits = w.freeze();

        let offset: usize = kani::any_where(|&o| o <= 32);
        let width: usize = kani::any_where(|&x| x <= 32);
        // May return Err, must never panic.
        let _ = bits.get(offset, width);
    }
}
