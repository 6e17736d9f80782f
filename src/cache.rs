// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Optional bounded memoization of decoded flag values.
//!
//! Reconstructing a [`FlagBitmap`](crate::FlagBitmap) from flag-sentinel
//! children costs a handful of bit reads per byte; for hot suffixes
//! (think "com") the same node index decodes over and over. This cache is
//! pure memoization keyed by node index with CLOCK eviction — correctness
//! never depends on it, and it is disabled unless the caller opts in via
//! [`crate::FrozenTrie::with_value_cache`].
//!
//! Concurrent lookups share the cache behind a single `parking_lot`
//! mutex; the critical section is a map probe, never a decode.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::flags::FlagBitmap;

struct Slot {
    node: usize,
    value: FlagBitmap,
    referenced: bool,
}

struct Inner {
    slots: Vec<Slot>,
    by_node: HashMap<usize, usize>,
    hand: usize,
}

/// Bounded node-index → decoded-bitmap cache with CLOCK eviction.
pub(crate) struct ValueCache {
    capacity: usize,
    inner: Mutex<Inner>,
}

impl ValueCache {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: Mutex::new(Inner {
                slots: Vec::with_capacity(capacity),
                by_node: HashMap::with_capacity(capacity),
                hand: 0,
            }),
        }
    }

    pub(crate) fn get(&self, node: usize) -> Option<FlagBitmap> {
        let mut inner = self.inner.lock();
        let slot_idx = *inner.by_node.get(&node)?;
        inner.slots[slot_idx].referenced = true;
        Some(inner.slots[slot_idx].value.clone())
    }

    pub(crate) fn insert(&self, node: usize, value: FlagBitmap) {
        let mut inner = self.inner.lock();
        if inner.by_node.contains_key(&node) {
            return;
        }
        if inner.slots.len() < self.capacity {
            inner.slots.push(Slot { node, value, referenced: true });
            let idx = inner.slots.len() - 1;
            inner.by_node.insert(node, idx);
            return;
        }
        // CLOCK: sweep until a slot with a clear reference bit turns up,
        // clearing bits as we pass.
        loop {
            let idx = inner.hand;
            inner.hand = (inner.hand + 1) % self.capacity;
            if inner.slots[idx].referenced {
                inner.slots[idx].referenced = false;
                continue;
            }
            let old = inner.slots[idx].node;
            inner.by_node.remove(&old);
            inner.by_node.insert(node, idx);
            inner.slots[idx] = Slot { node, value, referenced: true };
            return;
        }
    }
}
