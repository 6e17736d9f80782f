//! Binary container tests: disk round-trips, header introspection and
//! corruption handling.

use std::fs;

use blocktrie::binary::{BlobFooter, BlobHeader, FOOTER_MAGIC, MAGIC, VERSION};
use blocktrie::{read_blob, write_blob, FrozenTrie};

use crate::common::{sample_corpus, sample_trie, tag_names};

#[test]
fn blob_survives_a_disk_round_trip() {
    let trie = sample_trie();
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("sample.btrie");

    fs::write(&path, write_blob(&trie).unwrap()).unwrap();
    let back = read_blob(&fs::read(&path).unwrap()).unwrap();

    assert_eq!(back.node_count(), trie.node_count());
    assert_eq!(back.tag_table(), trie.tag_table());
    for (domain, _) in sample_corpus() {
        assert_eq!(
            trie.lookup(domain).unwrap(),
            back.lookup(domain).unwrap(),
            "lookup diverged after round trip for {}",
            domain
        );
    }
}

#[test]
fn header_describes_the_blob() {
    let trie = sample_trie();
    let bytes = write_blob(&trie).unwrap();

    assert_eq!(&bytes[..4], &MAGIC);
    assert_eq!(&bytes[bytes.len() - 4..], &FOOTER_MAGIC);

    let header = BlobHeader::read(&mut bytes.as_slice()).unwrap();
    assert_eq!(header.version, VERSION);
    assert_eq!(header.node_count as usize, trie.node_count());
    assert_eq!(header.shape_len as u64, 2 * header.node_count as u64 + 1);
    assert_eq!(usize::from(header.tag_count), trie.tag_table().len());
    assert_eq!(header.section_offsets().total_size(), bytes.len());
}

#[test]
fn every_single_byte_flip_in_content_is_detected() {
    let trie = sample_trie();
    let bytes = write_blob(&trie).unwrap();
    // Flip one byte at a spread of positions across header and sections;
    // the CRC (or the magic/header validation before it) must catch each.
    let content_len = bytes.len() - BlobFooter::SIZE;
    for pos in (0..content_len).step_by(7) {
        let mut corrupt = bytes.clone();
        corrupt[pos] ^= 0x01;
        assert!(
            read_blob(&corrupt).is_err(),
            "flip at byte {} went undetected",
            pos
        );
    }
}

#[test]
fn truncated_blob_is_rejected_at_every_length() {
    let bytes = write_blob(&sample_trie()).unwrap();
    for len in [0, 3, BlobHeader::SIZE - 1, BlobHeader::SIZE, bytes.len() - 1] {
        assert!(read_blob(&bytes[..len]).is_err(), "truncation to {} accepted", len);
    }
}

#[test]
fn crc_tamper_in_footer_is_rejected() {
    let mut bytes = write_blob(&sample_trie()).unwrap();
    let crc_pos = bytes.len() - BlobFooter::SIZE;
    bytes[crc_pos] ^= 0xFF;
    assert!(read_blob(&bytes).is_err());
}

#[test]
fn foreign_magic_is_rejected_before_anything_else() {
    let mut bytes = write_blob(&sample_trie()).unwrap();
    bytes[0] = b'X';
    assert!(read_blob(&bytes).is_err());
}

#[test]
fn convenience_methods_match_free_functions() {
    let trie = sample_trie();
    let via_method = trie.to_bytes().unwrap();
    let via_fn = write_blob(&trie).unwrap();
    assert_eq!(via_method, via_fn);
    let back = FrozenTrie::from_bytes(&via_method).unwrap();
    assert_eq!(
        tag_names(&back, &back.lookup("doubleclick.net").unwrap()["doubleclick.net"]),
        vec!["ads", "tracking"]
    );
}
