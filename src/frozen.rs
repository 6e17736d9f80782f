// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Read-only lookup engine over the packed buffer + rank directory pair.
//!
//! A [`FrozenTrie`] owns the only valid pairing of a packed trie stream
//! with its rank directory and tag table; the three are produced by one
//! build (via [`crate::TrieBuilder::freeze`]) or decoded together from one
//! checksummed container, never assembled ad hoc. Everything here is
//! `&self`: any number of concurrent lookups may run in parallel, each
//! allocating only its own result map. Replacing a blocklist build is an
//! `Arc<FrozenTrie>` pointer swap by the caller; buffers are never mutated
//! in place.
//!
//! A node's BFS ordinal is its whole identity. The three navigation
//! formulas come straight from the LOUDS shape code:
//!
//! ```text
//! first_child(i)       = select0(i + 1) - i
//! child_of_next(i)     = select0(i + 2) - i - 1
//! child_count(i)       = child_of_next(i) - first_child(i)
//! ```

use std::collections::BTreeMap;

use crate::cache::ValueCache;
use crate::encode::{PackedTrie, RECORD_WIDTH};
use crate::errors::TrieError;
use crate::flags::{FlagBitmap, TagTable};
use crate::rank::RankDirectory;
use crate::utils::{normalize_domain, NormalizeIssue};

/// Label separator symbol inside trie keys.
const SEPARATOR: u8 = b'.';

/// Frozen, shareable lookup engine.
pub struct FrozenTrie {
    packed: PackedTrie,
    directory: RankDirectory,
    tags: TagTable,
    cache: Option<ValueCache>,
}

/// Lookup result: matched ancestor suffixes (ascending) with their flag
/// bitmaps. Unflagged terminal nodes produce no entry.
pub type SuffixMatches = BTreeMap<String, FlagBitmap>;

impl FrozenTrie {
    pub(crate) fn assemble(packed: PackedTrie, directory: RankDirectory, tags: TagTable) -> Self {
        debug_assert_eq!(directory.zero_count(), packed.zero_count());
        Self { packed, directory, tags, cache: None }
    }

    /// Enable the bounded flag-decode cache (see [`crate::cache`]). Off by
    /// default; a pure memoization layer, never required for correctness.
    pub fn with_value_cache(mut self, capacity: usize) -> Self {
        self.cache = Some(ValueCache::new(capacity));
        self
    }

    /// The tag table this trie was built against.
    pub fn tag_table(&self) -> &TagTable {
        &self.tags
    }

    /// Expanded node count (chain and flag pseudo-nodes included).
    pub fn node_count(&self) -> usize {
        self.packed.node_count()
    }

    pub(crate) fn packed(&self) -> &PackedTrie {
        &self.packed
    }

    pub(crate) fn directory(&self) -> &RankDirectory {
        &self.directory
    }

    // ------------------------------------------------------------------
    // Node addressing (pure reads; no mutable state)
    // ------------------------------------------------------------------

    fn record(&self, index: usize) -> Result<u64, TrieError> {
        if index >= self.packed.node_count() {
            return Err(TrieError::BadNodeIndex { index, node_count: self.packed.node_count() });
        }
        self.packed.bits().get(self.packed.record_offset(index), RECORD_WIDTH)
    }

    fn compressed(&self, index: usize) -> Result<bool, TrieError> {
        Ok(self.record(index)? >> 9 & 1 == 1)
    }

    fn terminal(&self, index: usize) -> Result<bool, TrieError> {
        Ok(self.record(index)? >> 8 & 1 == 1)
    }

    fn symbol(&self, index: usize) -> Result<u8, TrieError> {
        Ok((self.record(index)? & 0xFF) as u8)
    }

    /// Flag sentinel: the `compressed && terminal` combination, which real
    /// nodes can never carry.
    fn is_flag_node(&self, index: usize) -> Result<bool, TrieError> {
        Ok(self.record(index)? >> 8 == 0b11)
    }

    fn first_child(&self, index: usize) -> Result<usize, TrieError> {
        Ok(self.directory.select0(self.packed.bits(), index + 1)? - index)
    }

    fn child_count(&self, index: usize) -> Result<usize, TrieError> {
        let first = self.first_child(index)?;
        let next = self.directory.select0(self.packed.bits(), index + 2)? - index - 1;
        Ok(next - first)
    }

    /// Decode the flag bitmap stored as this node's leading flag-sentinel
    /// children. `None` when the node carries no value.
    fn value(&self, index: usize) -> Result<Option<FlagBitmap>, TrieError> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(index) {
                return Ok(Some(hit));
            }
        }

        let first = self.first_child(index)?;
        let count = self.child_count(index)?;
        let mut bytes = Vec::new();
        for child in first..first + count {
            if !self.is_flag_node(child)? {
                break;
            }
            bytes.push(self.symbol(child)?);
        }
        if bytes.is_empty() {
            return Ok(None);
        }
        let bitmap = FlagBitmap::from_bytes(&bytes).map_err(TrieError::Flag)?;
        if let Some(cache) = &self.cache {
            cache.insert(index, bitmap.clone());
        }
        Ok(Some(bitmap))
    }

    /// Index of the first non-sentinel child slot, relative to
    /// `first_child`.
    fn real_child_start(&self, first: usize, count: usize) -> Result<usize, TrieError> {
        let mut offset = 0;
        while offset < count && self.is_flag_node(first + offset)? {
            offset += 1;
        }
        Ok(offset)
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Which blocklists flag this name or any ancestor suffix?
    ///
    /// Normalizes the domain, walks it from the rightmost label inward and
    /// collects a match at every label boundary where a flagged name ends,
    /// so one pass yields hits for "com", "example.com" and
    /// "test.example.com" in ascending-suffix order. A name that matches
    /// nothing returns an empty map. Bounds violations and corrupt flag
    /// data abort this single call with an error.
    pub fn lookup(&self, domain: &str) -> Result<SuffixMatches, TrieError> {
        let normalized = match normalize_domain(domain) {
            Ok(n) => n,
            Err(NormalizeIssue::Empty) => return Ok(SuffixMatches::new()),
            Err(NormalizeIssue::NonAscii { byte_position }) => {
                return Err(TrieError::NonAsciiInput { byte_position })
            }
        };
        let word = crate::utils::reverse_key(&normalized);

        let mut matches = SuffixMatches::new();
        let mut node = 0usize;
        let mut i = 0usize;
        while i < word.len() {
            if word[i] == SEPARATOR && self.terminal(node)? {
                if let Some(bitmap) = self.value(node)? {
                    matches.insert(suffix_at(&word, i), bitmap);
                }
            }
            match self.descend(node, &word, i)? {
                Some((next, advance)) => {
                    node = next;
                    i += advance;
                }
                None => return Ok(matches),
            }
        }
        if self.terminal(node)? {
            if let Some(bitmap) = self.value(node)? {
                matches.insert(normalized, bitmap);
            }
        }
        Ok(matches)
    }

    /// Binary-search `node`'s children for the edge matching `word[i..]`.
    ///
    /// Children with multi-symbol edges occupy consecutive sibling slots
    /// (the compressed run); the probe resolves whichever slot it lands on
    /// to the whole run, decides direction by the run's boundary symbol,
    /// and on a boundary hit requires the entire run to match — a partial
    /// run match is a clean miss, not an error.
    fn descend(
        &self,
        node: usize,
        word: &[u8],
        i: usize,
    ) -> Result<Option<(usize, usize)>, TrieError> {
        let first = self.first_child(node)?;
        let count = self.child_count(node)?;
        let start = self.real_child_start(first, count)?;
        if start >= count {
            return Ok(None);
        }

        let target = word[i];
        let mut low = start;
        let mut high = count - 1;
        while low <= high {
            let mid = low + (high - low) / 2;

            // Resolve the probe slot to its full run: back to the first
            // compressed slot, forward to the carrier.
            let mut run_start = mid;
            while run_start > start && self.compressed(first + run_start - 1)? {
                run_start -= 1;
            }
            let mut run_end = mid;
            while self.compressed(first + run_end)? {
                run_end += 1;
            }

            let head = self.symbol(first + run_start)?;
            if target < head {
                if run_start == start {
                    return Ok(None);
                }
                high = run_start - 1;
            } else if target > head {
                if run_end + 1 > high {
                    return Ok(None);
                }
                low = run_end + 1;
            } else {
                // Unique first symbols: this run is the only candidate.
                let run_len = run_end - run_start + 1;
                if word.len() - i < run_len {
                    return Ok(None);
                }
                for k in 0..run_len {
                    if self.symbol(first + run_start + k)? != word[i + k] {
                        return Ok(None);
                    }
                }
                return Ok(Some((first + run_end, run_len)));
            }
        }
        Ok(None)
    }
}

/// The suffix consumed through position `i` of the reversed key, restored
/// to normal orientation ("moc" consumed -> "com").
fn suffix_at(word: &[u8], i: usize) -> String {
    let mut consumed = word[..i].to_vec();
    consumed.reverse();
    String::from_utf8_lossy(&consumed).into_owned()
}
