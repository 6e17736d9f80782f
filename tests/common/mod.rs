//! Shared test utilities and fixtures.

#![allow(dead_code)]

use blocktrie::{
    decode_tags, normalize_domain, reverse_key, FlagBitmap, FrozenTrie, TagTable, TrieBuilder,
};

// ============================================================================
// TAG TABLES
// ============================================================================

/// The tag table most tests build against.
pub fn tag_table() -> TagTable {
    TagTable::new(vec![
        "ads".to_string(),
        "tracking".to_string(),
        "malware".to_string(),
        "phishing".to_string(),
    ])
    .expect("fixture tag table is valid")
}

// ============================================================================
// TRIE BUILDERS
// ============================================================================

/// Build a frozen trie from (domain, tags) pairs in any order, sorting by
/// reversed key the way the build pipeline does.
pub fn build_trie(entries: &[(&str, &[&str])]) -> FrozenTrie {
    let mut sorted: Vec<_> = entries.to_vec();
    sorted.sort_by_key(|(domain, _)| {
        reverse_key(&normalize_domain(domain).expect("fixture domain is valid"))
    });
    let mut builder = TrieBuilder::new(tag_table());
    for (domain, tags) in sorted {
        builder
            .insert(domain, tags)
            .unwrap_or_else(|e| panic!("fixture insert {:?} failed: {}", domain, e));
    }
    builder.freeze().expect("fixture freeze failed")
}

/// Decode a match's bitmap to tag names against the fixture table.
pub fn tag_names(trie: &FrozenTrie, bitmap: &FlagBitmap) -> Vec<String> {
    decode_tags(trie.tag_table(), bitmap).expect("fixture bitmap decodes")
}

// ============================================================================
// SAMPLE CORPUS
// ============================================================================

/// A small but realistic blocklist slice: shared suffixes, siblings,
/// flagged ancestors with flagged descendants, and unflagged separators.
pub fn sample_corpus() -> Vec<(&'static str, &'static [&'static str])> {
    vec![
        ("adservice.google.com", &["ads"]),
        ("analytics.example.net", &["tracking"]),
        ("cdn.example.net", &[]),
        ("doubleclick.net", &["ads", "tracking"]),
        ("evil.example.org", &["malware", "phishing"]),
        ("example.org", &["tracking"]),
        ("login.evil.example.org", &["phishing"]),
        ("metrics.app.example.com", &["tracking"]),
        ("pixel.example.com", &["ads", "tracking"]),
        ("static.doubleclick.net", &["ads"]),
        ("telemetry.example.com", &["tracking"]),
        ("www.example.com", &[]),
    ]
}

/// The sample corpus packed into a frozen trie.
pub fn sample_trie() -> FrozenTrie {
    build_trie(&sample_corpus())
}
