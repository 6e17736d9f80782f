// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for the lookup path over a fixed trie.
//!
//! Arbitrary query strings must never panic the walker: either a result
//! map or a typed error, and reported matches are always suffixes of the
//! normalized query.

#![no_main]

use std::sync::OnceLock;

use blocktrie::{normalize_domain, FrozenTrie, TagTable, TrieBuilder};
use libfuzzer_sys::fuzz_target;

fn fixture() -> &'static FrozenTrie {
    static TRIE: OnceLock<FrozenTrie> = OnceLock::new();
    TRIE.get_or_init(|| {
        let table = TagTable::new(vec!["ads".into(), "tracking".into()])
            .expect("fixture table");
        let mut builder = TrieBuilder::new(table);
        // Insertion order is ascending by reversed key.
        for (domain, tags) in [
            ("tracker.example.org", ["tracking"].as_slice()),
            ("example.com", ["ads"].as_slice()),
            ("a.example.com", ["tracking"].as_slice()),
            ("doubleclick.net", ["ads", "tracking"].as_slice()),
        ] {
            builder.insert(domain, tags).expect("fixture insert");
        }
        builder.freeze().expect("fixture freeze")
    })
}

fuzz_target!(|data: &[u8]| {
    let Ok(query) = std::str::from_utf8(data) else {
        return;
    };
    let trie = fixture();
    let Ok(matches) = trie.lookup(query) else {
        return;
    };
    if matches.is_empty() {
        return;
    }
    let normalized = normalize_domain(query).expect("a non-empty result implies a valid name");
    for suffix in matches.keys() {
        assert!(
            normalized == *suffix || normalized.ends_with(&format!(".{}", suffix)),
            "{:?} is not an ancestor suffix of {:?}",
            suffix,
            normalized
        );
    }
});
