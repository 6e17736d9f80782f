// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Succinct domain trie for multi-blocklist membership lookups.
//!
//! Domains from up to 256 blocklists are packed into one pointer-free
//! bit stream (a LOUDS-shaped trie with edge compression); a single
//! lookup walks a reversed domain name and reports, for the name and
//! every ancestor suffix, which blocklists flag it. The packed buffer is
//! immutable after a build, so any number of lookups run concurrently
//! with no locking.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  builder.rs │────▶│  encode.rs  │────▶│   rank.rs   │
//! │ (sorted     │     │ (LOUDS bit  │     │ (select0    │
//! │  inserts)   │     │  stream)    │     │  directory) │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │                   │                    │
//!        ▼                   ▼                    ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                     frozen.rs                       │
//! │   (FrozenTrie — read-only lookup over the packed    │
//! │    buffer + directory + tag table as one unit)      │
//! └─────────────────────────────────────────────────────┘
//!        │                                        │
//!        ▼                                        ▼
//! ┌─────────────┐                         ┌─────────────┐
//! │  binary/    │                         │  stamp.rs   │
//! │ (.btrie     │                         │ (blockstamp │
//! │  container) │                         │  wire form) │
//! └─────────────┘                         └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use blocktrie::{TagTable, TrieBuilder};
//!
//! let tags = TagTable::new(vec!["ads".into(), "tracking".into()])?;
//! let mut builder = TrieBuilder::new(tags);
//! // Inserts arrive sorted by reversed-byte order.
//! builder.insert("example.com", &["ads"])?;
//! builder.insert("test.example.com", &["ads", "tracking"])?;
//! let trie = builder.freeze()?;
//!
//! let matches = trie.lookup("deep.test.example.com")?;
//! assert!(matches.contains_key("example.com"));
//! assert!(matches.contains_key("test.example.com"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Module declarations
pub mod binary;
mod bits;
mod builder;
mod cache;
pub mod cli;
mod encode;
mod errors;
mod flags;
mod frozen;
mod rank;
mod stamp;
mod utils;

// Re-exports for public API
pub use binary::{read_blob, write_blob};
pub use bits::{BitString, BitWriter};
pub use builder::{BuildStats, TrieBuilder};
pub use encode::PackedTrie;
pub use errors::{BuildError, FlagError, StampError, TrieError};
pub use flags::{decode_tags, encode_tags, intersect, FlagBitmap, TagTable, MAX_TAGS};
pub use frozen::{FrozenTrie, SuffixMatches};
pub use rank::RankDirectory;
pub use stamp::{decode_blockstamp, encode_blockstamp, StampFormat, STAMP_VERSION};
pub use utils::{normalize_domain, reverse_key, NormalizeIssue};
