// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for the two-level flag bitmap codec and intersection.

#![no_main]

use blocktrie::{intersect, FlagBitmap};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // from_bytes must reject malformed input without panicking; accepted
    // bitmaps must round-trip and obey the set laws.
    let Ok(bitmap) = FlagBitmap::from_bytes(data) else {
        return;
    };
    assert_eq!(bitmap.to_bytes(), data, "accepted bitmap bytes are not canonical");

    let indices = bitmap.indices();
    for &i in &indices {
        assert!(bitmap.contains(i));
    }
    assert!(indices.windows(2).all(|w| w[0] < w[1]), "indices not strictly ascending");
    assert_eq!(indices.is_empty(), bitmap.is_empty());

    // Intersection laws against itself and the empty set.
    match intersect(&bitmap, &bitmap) {
        Some(same) => assert_eq!(same, bitmap),
        None => assert!(bitmap.is_empty()),
    }
    assert!(intersect(&bitmap, &FlagBitmap::new()).is_none());
});
