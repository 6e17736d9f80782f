// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Level-order (LOUDS) encoder: builder tree in, one packed bit stream out.
//!
//! Pass 1 expands the logical tree into single-symbol nodes: a compressed
//! edge of k symbols becomes k consecutive sibling slots under the same
//! parent (all but the last marked `compressed`, only the last carries
//! terminal state and children), and a node's flag value becomes one
//! pseudo-node per encoded bitmap byte, inserted before the real children
//! and tagged with the sentinel combination `compressed && terminal` —
//! unreachable for real nodes, since an interior chain slot is never
//! terminal.
//!
//! Pass 2 emits the stream, bit-exact:
//!
//! ```text
//! [magic 0b10]
//! [shape: childCount ones + one zero per node, BFS order]
//! [records: compressed | terminal | symbol(8), 10 bits per node, BFS order]
//! ```
//!
//! The 2-bit magic doubles as the unary code of a virtual super-root with
//! exactly one child, which makes `firstChild(i) = select0(i+1) - i` hold
//! for the real root at index 0 with no special cases.

use std::collections::VecDeque;

use crate::bits::{BitString, BitWriter};
use crate::builder::BuildNode;

/// Stream magic: unary "one child" for the virtual super-root.
pub const MAGIC: u64 = 0b10;

/// Bits of magic at the head of the stream.
pub const MAGIC_WIDTH: usize = 2;

/// Fixed per-node record width: compressed, terminal, 8-bit symbol.
pub const RECORD_WIDTH: usize = 10;

/// The packed, frozen trie buffer. Node ordinal (BFS position) is the sole
/// node identity; there are no pointers anywhere in the stream.
#[derive(Debug, Clone)]
pub struct PackedTrie {
    bits: BitString,
    node_count: usize,
    shape_len: usize,
}

impl PackedTrie {
    pub(crate) fn from_parts(bits: BitString, node_count: usize, shape_len: usize) -> Self {
        Self { bits, node_count, shape_len }
    }

    pub fn bits(&self) -> &BitString {
        &self.bits
    }

    /// Expanded node count (includes chain and flag pseudo-nodes).
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Length in bits of magic + shape code; records start here.
    pub fn shape_len(&self) -> usize {
        self.shape_len
    }

    /// Zero bits in the shape code: one per node plus the magic's.
    pub fn zero_count(&self) -> usize {
        self.node_count + 1
    }

    pub(crate) fn record_offset(&self, index: usize) -> usize {
        self.shape_len + index * RECORD_WIDTH
    }
}

/// One expanded (single-symbol) node awaiting emission.
struct EncNode {
    symbol: u8,
    compressed: bool,
    terminal: bool,
    child_count: usize,
}

/// Expanded child slots of a carrier node: flag bytes first, then every
/// logical child's full chain length.
fn expanded_child_count(node: &BuildNode, arena: &[BuildNode]) -> usize {
    let flag_bytes = node.flags.as_ref().map_or(0, |f| f.byte_len());
    let chain_slots: usize = node.children.iter().map(|&c| arena[c].label.len()).sum();
    flag_bytes + chain_slots
}

/// Pass 1: expand the logical tree into BFS order over single-symbol nodes.
fn level_order(arena: &[BuildNode]) -> Vec<EncNode> {
    let mut out = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    let root = &arena[0];
    out.push(EncNode {
        symbol: 0,
        compressed: false,
        terminal: root.terminal,
        child_count: expanded_child_count(root, arena),
    });
    queue.push_back(0);

    while let Some(logical) = queue.pop_front() {
        let node = &arena[logical];
        if let Some(flags) = &node.flags {
            for byte in flags.to_bytes() {
                out.push(EncNode {
                    symbol: byte,
                    compressed: true,
                    terminal: true,
                    child_count: 0,
                });
            }
        }
        for &child_idx in &node.children {
            let child = &arena[child_idx];
            let label = &child.label;
            for (k, &symbol) in label.iter().enumerate() {
                if k + 1 == label.len() {
                    out.push(EncNode {
                        symbol,
                        compressed: false,
                        terminal: child.terminal,
                        child_count: expanded_child_count(child, arena),
                    });
                    queue.push_back(child_idx);
                } else {
                    out.push(EncNode {
                        symbol,
                        compressed: true,
                        terminal: false,
                        child_count: 0,
                    });
                }
            }
        }
    }
    out
}

/// Pass 2: emit shape then records into one contiguous buffer.
pub(crate) fn encode(arena: &[BuildNode]) -> PackedTrie {
    let nodes = level_order(arena);
    let node_count = nodes.len();
    // Every node is exactly one child slot except the root, so the shape
    // code is (node_count - 1) ones and node_count zeros after the magic.
    let shape_len = MAGIC_WIDTH + 2 * node_count - 1;
    let total_bits = shape_len + node_count * RECORD_WIDTH;

    let mut writer = BitWriter::with_capacity(total_bits);
    writer.push(MAGIC, MAGIC_WIDTH);
    for node in &nodes {
        writer.push_unary(node.child_count);
    }
    debug_assert_eq!(writer.bit_len(), shape_len);
    for node in &nodes {
        let record = (u64::from(node.compressed) << 9)
            | (u64::from(node.terminal) << 8)
            | u64::from(node.symbol);
        writer.push(record, RECORD_WIDTH);
    }
    debug_assert_eq!(writer.bit_len(), total_bits);

    PackedTrie::from_parts(writer.freeze(), node_count, shape_len)
}
