// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Domain name normalization shared by the builder, the lookup path and
//! the CLI.

/// Normalize a domain name to the form stored in the trie: trimmed,
/// ASCII-lowercased, trailing root dot stripped.
///
/// Names must be IDNA-encoded upstream; this crate operates on the 8-bit
/// ASCII alphabet only.
pub fn normalize_domain(domain: &str) -> Result<String, NormalizeIssue> {
    let trimmed = domain.trim();
    if let Some(pos) = trimmed.bytes().position(|b| !b.is_ascii()) {
        return Err(NormalizeIssue::NonAscii { byte_position: pos });
    }
    let stripped = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if stripped.is_empty() {
        return Err(NormalizeIssue::Empty);
    }
    Ok(stripped.to_ascii_lowercase())
}

/// Why normalization failed; callers map this onto their own error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeIssue {
    Empty,
    NonAscii { byte_position: usize },
}

/// Reverse a normalized domain into trie key order, so traversal proceeds
/// from the rightmost label inward ("test.example.com" -> "moc.elpmaxe.tset").
pub fn reverse_key(domain: &str) -> Vec<u8> {
    let mut bytes = domain.as_bytes().to_vec();
    bytes.reverse();
    bytes
}
