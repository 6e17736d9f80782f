// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Blockstamp wire format: the only representation of a [`FlagBitmap`]
//! that crosses a process or network boundary.
//!
//! A stamp is a version prefix, a delimiter that picks the byte encoding,
//! and the bitmap bytes:
//!
//! ```text
//! "1:" + base64url(bytes)   (no padding)
//! "1-" + base32(bytes)      (no padding, case-insensitive on decode)
//! ```
//!
//! The base32 variant exists for carriers that downcase URLs. Version "0"
//! is a legacy layout that predates the two-level bitmap; this crate
//! neither produces nor accepts it.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use data_encoding::BASE32_NOPAD;

use crate::errors::StampError;
use crate::flags::FlagBitmap;

/// Stamp version this crate speaks.
pub const STAMP_VERSION: &str = "1";

/// Which byte encoding a stamp uses, selected by its delimiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StampFormat {
    /// `"1:" + base64url` — compact, case-sensitive.
    Base64Url,
    /// `"1-" + base32` — survives case-folding intermediaries.
    Base32,
}

/// Serialize a bitmap into its wire form.
pub fn encode_blockstamp(bitmap: &FlagBitmap, format: StampFormat) -> String {
    let bytes = bitmap.to_bytes();
    match format {
        StampFormat::Base64Url => format!("{}:{}", STAMP_VERSION, URL_SAFE_NO_PAD.encode(&bytes)),
        StampFormat::Base32 => format!("{}-{}", STAMP_VERSION, BASE32_NOPAD.encode(&bytes)),
    }
}

/// Parse a wire stamp back into a bitmap.
///
/// The delimiter position decides the payload encoding; everything before
/// it is the version. Corrupt payloads and header/body mismatches surface
/// as typed errors — never a partial bitmap.
pub fn decode_blockstamp(stamp: &str) -> Result<FlagBitmap, StampError> {
    let (version, format, payload) = split_stamp(stamp)?;
    if version != STAMP_VERSION {
        return Err(StampError::UnsupportedVersion { version: version.to_string() });
    }
    let bytes = match format {
        StampFormat::Base64Url => URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| StampError::InvalidPayload)?,
        StampFormat::Base32 => BASE32_NOPAD
            .decode(payload.to_ascii_uppercase().as_bytes())
            .map_err(|_| StampError::InvalidPayload)?,
    };
    Ok(FlagBitmap::from_bytes(&bytes)?)
}

fn split_stamp(stamp: &str) -> Result<(&str, StampFormat, &str), StampError> {
    // The version never contains ':' or '-', so the first occurrence of
    // either is the delimiter.
    let delim = stamp
        .find([':', '-'])
        .ok_or(StampError::MissingDelimiter)?;
    let format = if stamp.as_bytes()[delim] == b':' {
        StampFormat::Base64Url
    } else {
        StampFormat::Base32
    };
    Ok((&stamp[..delim], format, &stamp[delim + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FlagError;

    fn bitmap(indices: &[usize]) -> FlagBitmap {
        let mut b = FlagBitmap::new();
        for &i in indices {
            b.set(i).unwrap();
        }
        b
    }

    #[test]
    fn base64_roundtrip() {
        let bm = bitmap(&[0, 21, 255]);
        let stamp = encode_blockstamp(&bm, StampFormat::Base64Url);
        assert!(stamp.starts_with("1:"));
        assert_eq!(decode_blockstamp(&stamp).unwrap(), bm);
    }

    #[test]
    fn base32_roundtrip_survives_case_folding() {
        let bm = bitmap(&[7, 130]);
        let stamp = encode_blockstamp(&bm, StampFormat::Base32);
        assert!(stamp.starts_with("1-"));
        assert_eq!(decode_blockstamp(&stamp.to_lowercase()).unwrap(), bm);
    }

    #[test]
    fn empty_set_is_a_valid_stamp() {
        let stamp = encode_blockstamp(&FlagBitmap::new(), StampFormat::Base64Url);
        assert_eq!(decode_blockstamp(&stamp).unwrap(), FlagBitmap::new());
    }

    #[test]
    fn legacy_version_zero_is_rejected() {
        let err = decode_blockstamp("0:AAAA").unwrap_err();
        assert_eq!(err, StampError::UnsupportedVersion { version: "0".to_string() });
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert_eq!(decode_blockstamp("1:!!!").unwrap_err(), StampError::InvalidPayload);
        assert_eq!(decode_blockstamp("nodelimiter").unwrap_err(), StampError::MissingDelimiter);
    }

    #[test]
    fn corrupt_bitmap_inside_valid_encoding_is_rejected() {
        // Header claims one group, no body word follows.
        let payload = URL_SAFE_NO_PAD.encode([0x80u8, 0x00]);
        let err = decode_blockstamp(&format!("1:{}", payload)).unwrap_err();
        assert!(matches!(err, StampError::Flag(FlagError::HeaderMismatch { .. })));
    }
}
