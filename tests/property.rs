//! Property-based tests using proptest.
//!
//! These pin the low-level invariants the packed format depends on:
//! select0 correctness over arbitrary bit patterns, the flag bitmap as a
//! faithful set, varint bit layout, and container determinism.

mod common;

use std::collections::BTreeSet;

use blocktrie::binary::{decode_varint, encode_varint, MAX_VARINT_BYTES};
use blocktrie::{
    normalize_domain, reverse_key, write_blob, BitString, BitWriter, FlagBitmap, RankDirectory,
};
use proptest::prelude::*;

// ============================================================================
// STRATEGIES
// ============================================================================

/// Arbitrary bit patterns with at least one zero, so select0 has work.
fn bit_pattern_strategy() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), 1..400)
        .prop_map(|mut bits| {
            if bits.iter().all(|&b| b) {
                bits.push(false);
            }
            bits
        })
}

fn bit_string(bits: &[bool]) -> BitString {
    let mut writer = BitWriter::new();
    for &bit in bits {
        writer.push_bit(bit);
    }
    writer.freeze()
}

fn domain_strategy() -> impl Strategy<Value = String> {
    let label = prop::string::string_regex("[a-z0-9]{1,10}").unwrap();
    prop::collection::vec(label, 1..5).prop_map(|labels| labels.join("."))
}

// ============================================================================
// SELECT0 PROPERTIES
// ============================================================================

proptest! {
    /// Property: select0 agrees with a linear scan for every valid y.
    #[test]
    fn prop_select0_matches_linear_scan(bits in bit_pattern_strategy()) {
        let bs = bit_string(&bits);
        let dir = RankDirectory::build(&bs, bits.len()).unwrap();

        let zero_positions: Vec<usize> = bits
            .iter()
            .enumerate()
            .filter(|(_, &b)| !b)
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(dir.zero_count(), zero_positions.len());

        for (y, &expected) in zero_positions.iter().enumerate() {
            prop_assert_eq!(dir.select0(&bs, y + 1).unwrap(), expected);
        }
    }

    /// Property: out-of-range y is always an explicit error.
    #[test]
    fn prop_select0_rejects_out_of_range(bits in bit_pattern_strategy()) {
        let bs = bit_string(&bits);
        let dir = RankDirectory::build(&bs, bits.len()).unwrap();
        prop_assert!(dir.select0(&bs, 0).is_err());
        prop_assert!(dir.select0(&bs, dir.zero_count() + 1).is_err());
    }
}

// ============================================================================
// FLAG BITMAP PROPERTIES
// ============================================================================

proptest! {
    /// Property: the bitmap behaves exactly like a set of indices.
    #[test]
    fn prop_bitmap_matches_set_model(indices in prop::collection::btree_set(0usize..256, 0..40)) {
        let mut bitmap = FlagBitmap::new();
        for &i in &indices {
            bitmap.set(i).unwrap();
        }

        let model: Vec<usize> = indices.iter().copied().collect();
        prop_assert_eq!(bitmap.indices(), model);
        for i in 0..256 {
            prop_assert_eq!(bitmap.contains(i), indices.contains(&i), "index {}", i);
        }

        // Size law: 2 header bytes + 2 per distinct group.
        let groups: BTreeSet<usize> = indices.iter().map(|i| i / 16).collect();
        prop_assert_eq!(bitmap.byte_len(), 2 + 2 * groups.len());

        // Serialized form round-trips exactly.
        let back = FlagBitmap::from_bytes(&bitmap.to_bytes()).unwrap();
        prop_assert_eq!(back, bitmap);
    }

    /// Property: insertion order never changes the bitmap.
    #[test]
    fn prop_bitmap_is_order_independent(mut indices in prop::collection::vec(0usize..256, 1..30)) {
        let mut forward = FlagBitmap::new();
        for &i in &indices {
            forward.set(i).unwrap();
        }
        indices.reverse();
        let mut backward = FlagBitmap::new();
        for &i in &indices {
            backward.set(i).unwrap();
        }
        prop_assert_eq!(forward, backward);
    }
}

// ============================================================================
// VARINT PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Property: varint encoding is reversible for all u64 values.
    #[test]
    fn prop_varint_roundtrip(value: u64) {
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        let (decoded, consumed) = decode_varint(&buf).unwrap();
        prop_assert_eq!(decoded, value);
        prop_assert_eq!(consumed, buf.len());
        prop_assert!(buf.len() <= MAX_VARINT_BYTES);
    }

    /// Property: continuation bit is set on every byte but the last.
    #[test]
    fn prop_varint_continuation_bit(value in 128u64..u64::MAX) {
        let mut buf = Vec::new();
        encode_varint(value, &mut buf);
        prop_assert!(buf.len() > 1);
        for (i, &byte) in buf.iter().enumerate() {
            if i < buf.len() - 1 {
                prop_assert!(byte & 0x80 != 0, "byte {} missing continuation bit", i);
            } else {
                prop_assert!(byte & 0x80 == 0, "last byte has continuation bit");
            }
        }
    }
}

// ============================================================================
// CONTAINER PROPERTIES
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: building the same corpus twice yields identical blobs,
    /// and lookups agree before and after serialization.
    #[test]
    fn prop_container_is_deterministic(domains in prop::collection::btree_set(domain_strategy(), 1..20)) {
        let entries: Vec<(&str, &[&str])> = domains
            .iter()
            .map(|d| (d.as_str(), ["ads"].as_slice()))
            .collect();
        let first = common::build_trie(&entries);
        let second = common::build_trie(&entries);

        let blob_a = write_blob(&first).unwrap();
        let blob_b = write_blob(&second).unwrap();
        prop_assert_eq!(&blob_a, &blob_b);

        let reloaded = blocktrie::read_blob(&blob_a).unwrap();
        for domain in &domains {
            prop_assert_eq!(
                first.lookup(domain).unwrap(),
                reloaded.lookup(domain).unwrap()
            );
        }
    }

    /// Property: normalization is idempotent and reversal is an involution.
    #[test]
    fn prop_normalize_and_reverse_laws(domain in domain_strategy()) {
        let once = normalize_domain(&domain).unwrap();
        prop_assert_eq!(normalize_domain(&once).unwrap(), once.clone());

        let mut twice = reverse_key(&once);
        twice.reverse();
        prop_assert_eq!(twice, once.into_bytes());
    }
}
