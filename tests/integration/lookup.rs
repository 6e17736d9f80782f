//! Lookup semantics against the sample corpus: ancestor-suffix matching,
//! label boundaries, normalization and blockstamp interop.

use blocktrie::{
    decode_blockstamp, encode_blockstamp, encode_tags, intersect, StampFormat, TrieError,
};

use crate::common::{build_trie, sample_trie, tag_names};

#[test]
fn deep_subdomain_collects_all_flagged_suffixes() {
    let trie = sample_trie();
    let matches = trie.lookup("a.b.c.login.evil.example.org").unwrap();
    let suffixes: Vec<&str> = matches.keys().map(String::as_str).collect();
    assert_eq!(
        suffixes,
        vec!["evil.example.org", "example.org", "login.evil.example.org"]
    );
}

#[test]
fn match_requires_a_label_boundary_not_a_string_suffix() {
    let trie = build_trie(&[("example.com", &["ads"])]);
    // String-suffix but not domain-suffix: no '.' boundary before it.
    assert!(trie.lookup("notexample.com").unwrap().is_empty());
    assert!(trie.lookup("ample.com").unwrap().is_empty());
    assert_eq!(trie.lookup("sub.example.com").unwrap().len(), 1);
}

#[test]
fn sibling_labels_never_cross_match() {
    let trie = sample_trie();
    // cdn.example.net is in the corpus unflagged; analytics.example.net is
    // flagged. Neither example.net itself nor cdn may match anything.
    assert!(trie.lookup("cdn.example.net").unwrap().is_empty());
    assert!(trie.lookup("example.net").unwrap().is_empty());
    assert_eq!(trie.lookup("analytics.example.net").unwrap().len(), 1);
}

#[test]
fn normalization_applies_before_the_walk() {
    let trie = sample_trie();
    let canonical = trie.lookup("pixel.example.com").unwrap();
    assert_eq!(trie.lookup("PIXEL.Example.COM").unwrap(), canonical);
    assert_eq!(trie.lookup("pixel.example.com.").unwrap(), canonical);
    assert_eq!(trie.lookup("  pixel.example.com ").unwrap(), canonical);
}

#[test]
fn empty_is_ok_non_ascii_is_an_error() {
    let trie = sample_trie();
    assert!(trie.lookup("").unwrap().is_empty());
    assert!(trie.lookup(".").unwrap().is_empty());
    assert!(matches!(
        trie.lookup("пиксель.example.com"),
        Err(TrieError::NonAsciiInput { .. })
    ));
}

#[test]
fn lookup_result_filters_through_a_user_stamp() {
    // A resolver carries the user's enabled lists as a blockstamp; a
    // domain is blocked when the intersection is non-empty.
    let trie = sample_trie();
    let enabled = encode_tags(trie.tag_table(), &["ads", "phishing"]).unwrap();
    let stamp = encode_blockstamp(&enabled, StampFormat::Base32);
    let enabled = decode_blockstamp(&stamp.to_uppercase()).unwrap();

    // telemetry.example.com is tracking-only: not blocked for this user.
    let matches = trie.lookup("telemetry.example.com").unwrap();
    assert!(matches.values().all(|bm| intersect(bm, &enabled).is_none()));

    // pixel.example.com carries ads: blocked.
    let matches = trie.lookup("pixel.example.com").unwrap();
    let blocked: Vec<_> = matches
        .iter()
        .filter_map(|(suffix, bm)| intersect(bm, &enabled).map(|hit| (suffix.clone(), hit)))
        .collect();
    assert_eq!(blocked.len(), 1);
    assert_eq!(blocked[0].0, "pixel.example.com");
    assert_eq!(tag_names(&trie, &blocked[0].1), vec!["ads"]);
}

#[test]
fn value_cache_is_transparent_under_repetition() {
    let cached = build_trie(&[
        ("doubleclick.net", &["ads", "tracking"]),
        ("static.doubleclick.net", &["ads"]),
    ])
    .with_value_cache(2);
    let expected = cached.lookup("static.doubleclick.net").unwrap();
    for _ in 0..50 {
        assert_eq!(cached.lookup("static.doubleclick.net").unwrap(), expected);
        assert!(cached.lookup("never.seen.example").unwrap().is_empty());
    }
}
