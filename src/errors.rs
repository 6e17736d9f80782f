// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Error types for building, navigating and decoding the packed trie.
//!
//! Every failure is reported to the immediate caller and is fatal to that
//! single call only. There are no retries and no silent recovery anywhere
//! in this crate: a bounds violation aborts one lookup, a sort violation
//! aborts one build, a corrupt bitmap aborts one decode.

use std::fmt;

/// Errors raised while navigating the frozen, packed trie.
///
/// The packed buffer and its rank directory are immutable once built, so
/// any of these on well-formed input indicates corrupt data or a blob/
/// directory pair assembled from different builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrieError {
    /// A bit read would run past the end of the packed buffer.
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },
    /// `select0(y)` called with `y` outside `[1, zero_count]`.
    SelectOutOfRange { y: usize, zero_count: usize },
    /// A node index does not exist in this trie.
    BadNodeIndex { index: usize, node_count: usize },
    /// A flag-sentinel walk produced a corrupt bitmap.
    Flag(FlagError),
    /// The looked-up word contains a byte outside the trie alphabet.
    NonAsciiInput { byte_position: usize },
}

impl fmt::Display for TrieError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrieError::OutOfBounds { offset, width, len } => {
                write!(f, "bit read [{}, {}) past buffer end {}", offset, offset + width, len)
            }
            TrieError::SelectOutOfRange { y, zero_count } => {
                write!(f, "select0({}) outside [1, {}]", y, zero_count)
            }
            TrieError::BadNodeIndex { index, node_count } => {
                write!(f, "node index {} >= node count {}", index, node_count)
            }
            TrieError::Flag(e) => write!(f, "flag value decode failed: {}", e),
            TrieError::NonAsciiInput { byte_position } => {
                write!(f, "non-ASCII byte at position {} in lookup word", byte_position)
            }
        }
    }
}

impl std::error::Error for TrieError {}

impl From<FlagError> for TrieError {
    fn from(e: FlagError) -> Self {
        TrieError::Flag(e)
    }
}

/// Errors raised while inserting into or freezing the mutable builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// Words must arrive strictly ascending in reversed-byte order.
    /// Duplicates count as a violation; merge their tag sets first.
    UnsortedInsert { previous: String, word: String },
    /// Domain names are ASCII after IDNA encoding; anything else is a
    /// pipeline bug upstream of the builder.
    NonAsciiDomain { domain: String, byte_position: usize },
    /// The empty string is not a valid domain.
    EmptyDomain,
    /// Flag encoding failed (unknown tag, table overflow).
    Flag(FlagError),
    /// Packing or directory construction failed while freezing. Indicates
    /// a bug in the encoder rather than bad input.
    Encode(TrieError),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::UnsortedInsert { previous, word } => {
                write!(
                    f,
                    "insert out of sorted order: {:?} after {:?} (reversed-byte order, strictly ascending)",
                    word, previous
                )
            }
            BuildError::NonAsciiDomain { domain, byte_position } => {
                write!(f, "non-ASCII byte at position {} in domain {:?}", byte_position, domain)
            }
            BuildError::EmptyDomain => write!(f, "empty domain"),
            BuildError::Flag(e) => write!(f, "flag encode failed: {}", e),
            BuildError::Encode(e) => write!(f, "freeze failed: {}", e),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<FlagError> for BuildError {
    fn from(e: FlagError) -> Self {
        BuildError::Flag(e)
    }
}

/// Errors raised by the two-level flag bitmap codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagError {
    /// `popcount(header) != body.len()` — corrupt bitmap.
    HeaderMismatch { expected: usize, actual: usize },
    /// Serialized bitmap bytes have an odd length or are too short for
    /// the header word.
    TruncatedBytes { len: usize },
    /// A tag's bit index falls outside the 256-tag space.
    TagIndexOverflow { index: usize },
    /// A decoded bit index has no entry in the tag table.
    UnknownTagIndex { index: usize, table_len: usize },
    /// A tag name has no bit position in the tag table.
    UnknownTag { name: String },
    /// The tag table contains the same name twice.
    DuplicateTag { name: String },
    /// The tag table holds more than 256 names.
    TableOverflow { len: usize },
}

impl fmt::Display for FlagError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlagError::HeaderMismatch { expected, actual } => {
                write!(f, "header popcount {} != body length {}", expected, actual)
            }
            FlagError::TruncatedBytes { len } => {
                write!(f, "bitmap needs 2 + 2*popcount bytes, got {}", len)
            }
            FlagError::TagIndexOverflow { index } => {
                write!(f, "tag bit index {} >= 256", index)
            }
            FlagError::UnknownTagIndex { index, table_len } => {
                write!(f, "tag bit index {} has no name in table of {}", index, table_len)
            }
            FlagError::UnknownTag { name } => write!(f, "tag {:?} not in tag table", name),
            FlagError::DuplicateTag { name } => write!(f, "tag {:?} appears twice in tag table", name),
            FlagError::TableOverflow { len } => {
                write!(f, "tag table has {} names, maximum is 256", len)
            }
        }
    }
}

impl std::error::Error for FlagError {}

/// Errors raised while parsing a blockstamp wire string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampError {
    /// Missing version delimiter (`:` or `-`).
    MissingDelimiter,
    /// Version prefix is not `"1"`. Version `"0"` is a legacy layout this
    /// crate does not produce or accept.
    UnsupportedVersion { version: String },
    /// The payload is not valid base64url / base32.
    InvalidPayload,
    /// The decoded payload is not a valid flag bitmap.
    Flag(FlagError),
}

impl fmt::Display for StampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StampError::MissingDelimiter => write!(f, "blockstamp has no ':' or '-' delimiter"),
            StampError::UnsupportedVersion { version } => {
                write!(f, "unsupported blockstamp version {:?}", version)
            }
            StampError::InvalidPayload => write!(f, "blockstamp payload is not valid base64url/base32"),
            StampError::Flag(e) => write!(f, "blockstamp bitmap invalid: {}", e),
        }
    }
}

impl std::error::Error for StampError {}

impl From<FlagError> for StampError {
    fn from(e: FlagError) -> Self {
        StampError::Flag(e)
    }
}
