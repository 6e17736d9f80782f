// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Mutable, insertion-ordered trie builder.
//!
//! The builder exists only for the duration of one batch build, off the
//! request path. It consumes domains in strictly ascending reversed-byte
//! order and produces an edge-compressed tree in a flat arena; the
//! level-order encoder then flattens the arena into the packed bit stream
//! and the arena is dropped.
//!
//! The sorted-input precondition is what makes the build cheap: instead of
//! a root-to-leaf scan per word, the builder keeps the path to the
//! previously inserted word as a stack and compares the new word against
//! that path only. Out-of-order input would silently corrupt prefix
//! sharing, so it is validated and fails the whole build.

use crate::errors::BuildError;
use crate::flags::{encode_tags, FlagBitmap, TagTable};
use crate::frozen::FrozenTrie;
use crate::rank::RankDirectory;
use crate::utils::{normalize_domain, reverse_key, NormalizeIssue};

/// One node of the build-time tree.
///
/// `label` holds 1+ symbols (a compressed edge spans several); `flags` is
/// the node's blocklist-membership value, expanded into flag-sentinel
/// pseudo-children by the encoder. Children are indices into the builder's
/// arena, ordered by first label byte.
#[derive(Debug)]
pub(crate) struct BuildNode {
    pub(crate) label: Vec<u8>,
    pub(crate) terminal: bool,
    pub(crate) flags: Option<FlagBitmap>,
    pub(crate) children: Vec<usize>,
}

/// Path entry: a node on the previous word's root-to-leaf path and the
/// number of key bytes consumed through the end of its label.
struct PathEntry {
    node: usize,
    end_depth: usize,
}

/// Counters accumulated during a build. Owned by the builder; there is no
/// module-level state.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
    /// Domains successfully inserted.
    pub domains: usize,
    /// Logical nodes in the tree (before level-order expansion).
    pub nodes: usize,
    /// Total label symbols across all nodes.
    pub symbols: usize,
    /// Nodes carrying a non-empty flag value.
    pub flagged: usize,
    /// Total encoded flag bytes; each becomes one pseudo-node when packed.
    pub flag_bytes: usize,
}

/// Mutable trie builder. See the module docs for the input contract.
pub struct TrieBuilder {
    nodes: Vec<BuildNode>,
    tags: TagTable,
    path: Vec<PathEntry>,
    previous: Vec<u8>,
    previous_domain: String,
    stats: BuildStats,
}

impl TrieBuilder {
    /// Create a builder over a fixed tag table. The table is frozen into
    /// the trie so lookup-side decoding can never drift from it.
    pub fn new(tags: TagTable) -> Self {
        let root = BuildNode {
            label: Vec::new(),
            terminal: false,
            flags: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            tags,
            path: vec![PathEntry { node: 0, end_depth: 0 }],
            previous: Vec::new(),
            previous_domain: String::new(),
            stats: BuildStats { nodes: 1, ..BuildStats::default() },
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    pub fn tag_table(&self) -> &TagTable {
        &self.tags
    }

    /// Insert a domain with its blocklist tags.
    ///
    /// Domains must arrive strictly ascending when compared as reversed
    /// byte strings; duplicates are a violation (merge tag sets upstream).
    /// An empty tag set marks the node terminal but attaches no value, so
    /// the domain never surfaces in lookup results.
    pub fn insert<S: AsRef<str>>(&mut self, domain: &str, tags: &[S]) -> Result<(), BuildError> {
        let normalized = normalize_domain(domain).map_err(|issue| match issue {
            NormalizeIssue::Empty => BuildError::EmptyDomain,
            NormalizeIssue::NonAscii { byte_position } => BuildError::NonAsciiDomain {
                domain: domain.to_string(),
                byte_position,
            },
        })?;
        let word = reverse_key(&normalized);

        if self.stats.domains > 0 && word <= self.previous {
            return Err(BuildError::UnsortedInsert {
                previous: self.previous_domain.clone(),
                word: normalized,
            });
        }

        let flags = if tags.is_empty() {
            None
        } else {
            Some(encode_tags(&self.tags, tags)?)
        };

        let prefix_len = common_prefix_len(&self.previous, &word);
        self.rewind_to(prefix_len);

        let top = self.path.last().expect("path always holds the root");
        let top_node = top.node;
        let top_depth = top.end_depth;
        debug_assert!(top_depth == prefix_len, "rewind must land on the prefix boundary");

        let suffix = &word[prefix_len..];
        if suffix.is_empty() {
            // Unreachable under the strictly-ascending contract (a prefix
            // always sorts before its extensions), but the operation is
            // well defined: the word ends exactly at an existing node.
            self.mark_terminal(top_node, flags);
        } else {
            let child = self.alloc_node(suffix.to_vec(), flags);
            self.nodes[top_node].children.push(child);
            self.path.push(PathEntry { node: child, end_depth: word.len() });
        }

        self.previous = word;
        self.previous_domain = normalized;
        self.stats.domains += 1;
        Ok(())
    }

    /// Pop the cached path back to depth `prefix_len`, splitting an edge
    /// when the boundary falls strictly inside one.
    fn rewind_to(&mut self, prefix_len: usize) {
        let mut last_popped: Option<PathEntry> = None;
        while self.path.last().map_or(false, |e| e.end_depth > prefix_len) {
            last_popped = self.path.pop();
        }
        let top_depth = self.path.last().map_or(0, |e| e.end_depth);
        if top_depth == prefix_len {
            return;
        }

        // The shared prefix ends inside the label of the deepest popped
        // node: split it. The new child inherits terminal/flags/children,
        // the original keeps the head of the label and becomes a pure
        // interior node.
        let entry = last_popped.expect("depth gap implies a popped entry");
        let split_at = prefix_len - top_depth;
        debug_assert!(split_at > 0 && split_at < self.nodes[entry.node].label.len());

        let tail = self.nodes[entry.node].label.split_off(split_at);
        let terminal = self.nodes[entry.node].terminal;
        let flags = self.nodes[entry.node].flags.take();
        let children = std::mem::take(&mut self.nodes[entry.node].children);

        if let Some(bitmap) = &flags {
            // Ownership of the value moves to the tail node; the counters
            // follow it (net zero, but keeps flagged/flag_bytes honest).
            self.stats.flagged -= 1;
            self.stats.flag_bytes -= bitmap.byte_len();
        }
        let tail_node = self.alloc_node_raw(tail, terminal, flags, children);
        self.nodes[entry.node].terminal = false;
        self.nodes[entry.node].children.push(tail_node);
        self.path.push(PathEntry { node: entry.node, end_depth: prefix_len });
    }

    fn mark_terminal(&mut self, node: usize, flags: Option<FlagBitmap>) {
        self.nodes[node].terminal = true;
        if let Some(bitmap) = flags {
            self.stats.flagged += 1;
            self.stats.flag_bytes += bitmap.byte_len();
            self.nodes[node].flags = Some(bitmap);
        }
    }

    fn alloc_node(&mut self, label: Vec<u8>, flags: Option<FlagBitmap>) -> usize {
        self.alloc_node_raw(label, true, flags, Vec::new())
    }

    fn alloc_node_raw(
        &mut self,
        label: Vec<u8>,
        terminal: bool,
        flags: Option<FlagBitmap>,
        children: Vec<usize>,
    ) -> usize {
        self.stats.nodes += 1;
        self.stats.symbols += label.len();
        if let Some(bitmap) = &flags {
            self.stats.flagged += 1;
            self.stats.flag_bytes += bitmap.byte_len();
        }
        self.nodes.push(BuildNode { label, terminal, flags, children });
        self.nodes.len() - 1
    }

    /// Encode, build the rank directory and hand back the read-only
    /// lookup engine. Consumes the builder; the arena is dropped here.
    pub fn freeze(self) -> Result<FrozenTrie, BuildError> {
        let (nodes, tags, _stats) = self.into_parts();
        let packed = crate::encode::encode(&nodes);
        drop(nodes);
        let directory =
            RankDirectory::build(packed.bits(), packed.shape_len()).map_err(BuildError::Encode)?;
        Ok(FrozenTrie::assemble(packed, directory, tags))
    }

    pub(crate) fn arena(&self) -> &[BuildNode] {
        &self.nodes
    }

    pub(crate) fn into_parts(self) -> (Vec<BuildNode>, TagTable, BuildStats) {
        (self.nodes, self.tags, self.stats)
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}
