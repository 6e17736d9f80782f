// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for blockstamp parsing.
//!
//! Stamps arrive in URLs and DNS-over-HTTPS paths, so the decoder faces
//! adversarial strings constantly. It must return Err on garbage and
//! round-trip cleanly on anything it accepts.

#![no_main]

use blocktrie::{decode_blockstamp, encode_blockstamp, StampFormat};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(stamp) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(bitmap) = decode_blockstamp(stamp) {
        // An accepted stamp encodes a well-formed bitmap; both wire forms
        // of it must decode back to the same bitmap.
        for format in [StampFormat::Base64Url, StampFormat::Base32] {
            let reencoded = encode_blockstamp(&bitmap, format);
            let redecoded = decode_blockstamp(&reencoded)
                .expect("re-encoded stamp of an accepted bitmap must decode");
            assert_eq!(redecoded, bitmap);
        }
    }
});
