// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Varint and tag-table section codecs.
//!
//! The tag table is tiny (≤ 256 short strings) but its ordering is the
//! contract that gives every flag bit its meaning, so it travels inside
//! the blob rather than as a sidecar that could drift. Varint (LEB128)
//! for the counts and lengths; the decoder carries maximum-iteration and
//! bounds limits so malformed input errors out instead of allocating.

use std::io;

use super::header::{MAX_TAG_COUNT, MAX_VARINT_BYTES};
use crate::flags::TagTable;

// ============================================================================
// VARINT ENCODING
// ============================================================================

/// Encode a varint to bytes
pub fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            break;
        } else {
            buf.push(byte | 0x80);
        }
    }
}

/// Decode a varint from bytes, returning (value, bytes_consumed)
///
/// Returns an error if:
/// - Buffer is empty
/// - Varint exceeds MAX_VARINT_BYTES (malformed/malicious input)
pub fn decode_varint(bytes: &[u8]) -> io::Result<(u64, usize)> {
    if bytes.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Empty buffer for varint",
        ));
    }

    let mut result: u64 = 0;
    let mut shift = 0;
    let mut i = 0;

    while i < bytes.len() && i < MAX_VARINT_BYTES {
        let byte = bytes[i];
        result |= ((byte & 0x7F) as u64) << shift;
        i += 1;
        if byte & 0x80 == 0 {
            return Ok((result, i));
        }
        shift += 7;
    }

    if i >= MAX_VARINT_BYTES {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "Varint exceeds maximum length (possible corruption)",
        ))
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Incomplete varint",
        ))
    }
}

// ============================================================================
// TAG TABLE SECTION
// ============================================================================

/// Encode the tag table (count, then length-prefixed names in bit order).
pub fn encode_tag_table(table: &TagTable, buf: &mut Vec<u8>) {
    encode_varint(table.len() as u64, buf);
    for name in table.names() {
        let bytes = name.as_bytes();
        encode_varint(bytes.len() as u64, buf);
        buf.extend_from_slice(bytes);
    }
}

/// Decode the tag table section, returning the table and bytes consumed.
pub fn decode_tag_table(bytes: &[u8]) -> io::Result<(TagTable, usize)> {
    let (count, mut pos) = decode_varint(bytes)?;
    if count > u64::from(MAX_TAG_COUNT) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Tag table count {} exceeds {}", count, MAX_TAG_COUNT),
        ));
    }
    let count = count as usize;

    let mut names = Vec::with_capacity(count);
    for i in 0..count {
        if pos >= bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Truncated tag table at entry {}", i),
            ));
        }
        let (len, consumed) = decode_varint(&bytes[pos..])?;
        pos += consumed;

        let len = len as usize;
        let end_pos = pos.checked_add(len).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Tag {} length {} causes overflow", i, len),
            )
        })?;
        if end_pos > bytes.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("Truncated tag {} (expected {} bytes)", i, len),
            ));
        }

        let name = String::from_utf8(bytes[pos..end_pos].to_vec()).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Invalid UTF-8 in tag {}: {}", i, e),
            )
        })?;
        names.push(name);
        pos = end_pos;
    }

    let table = TagTable::new(names)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    Ok((table, pos))
}


// ============================================================================
// KANI MODEL CHECKING PROOFS
// ============================================================================
//
// Run with: cargo kani
//
// Verified properties:
// 1. encode/decode roundtrip preserves every u64 value
// 2. decode never panics on arbitrary byte prefixes

#[cfg(kani)]
mod kani_proofs {
    use super::*;

    #[kani::proof]
    fn verify_varint_roundtrip() {
        let value: u64 = kani::any();
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        kani::assert(buf.len() <= MAX_VARINT_BYTES, "encoding is bounded");
        let decoded = decode_varint(&buf);
        kani::assert(decoded.is_ok(), "own encoding must decode");
        let (got, consumed) = decoded.unwrap();
        kani::assert(got == value, "roundtrip must preserve value");
        kani::assert(consumed == buf.len(), "decode must consume the whole encoding");
    }

    #[kani::proof]
    fn verify_decode_never_panics() {
        let bytes: [u8; 4] = kani::any();
        let len: usize = kani::any_where(|&l| l <= 4);
        // May return Err, must never panic.
        let _ = decode_varint(&bytes[..len]);
    }
}
