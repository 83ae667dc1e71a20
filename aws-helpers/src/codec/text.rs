/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use bytes::Bytes;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};

use crate::error::{self, Error};

pub(crate) const DEFAULT_ENCODING: &str = "utf-8";

fn lookup(label: &str) -> Result<&'static Encoding, Error> {
    Encoding::for_label(label.as_bytes())
        .ok_or_else(|| error::invalid_input(format!("unknown character encoding `{label}`")))
}

/// Encode text with the character encoding named by `label`.
///
/// Labels resolve as in the WHATWG Encoding Standard, so `latin1` and `iso-8859-1` both name
/// windows-1252, which differs from ISO-8859-1 in the 0x80-0x9F range.
pub(crate) fn encode(text: &str, label: &str) -> Result<Bytes, Error> {
    let encoding = lookup(label)?;
    // encoding_rs only decodes UTF-16; its encoder would emit UTF-8.
    if encoding == UTF_16LE {
        return Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == UTF_16BE {
        return Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }
    let (encoded, _, had_errors) = encoding.encode(text);
    if had_errors {
        return Err(error::serialization(format!(
            "text cannot be represented in `{}`",
            encoding.name()
        )));
    }
    Ok(Bytes::copy_from_slice(&encoded))
}

/// Decode bytes with the character encoding named by `label`.
pub(crate) fn decode(bytes: &[u8], label: &str) -> Result<String, Error> {
    let encoding = lookup(label)?;
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(error::serialization(format!(
            "object is not valid `{}` text",
            encoding.name()
        )));
    }
    Ok(decoded.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_utf8_round_trip() {
        let bytes = encode("héllo", DEFAULT_ENCODING).unwrap();
        assert_eq!("héllo".as_bytes(), &bytes[..]);
        assert_eq!("héllo", decode(&bytes, "UTF-8").unwrap());
    }

    #[test]
    fn test_latin1() {
        let bytes = encode("café", "latin1").unwrap();
        assert_eq!(&[b'c', b'a', b'f', 0xe9], &bytes[..]);
        assert_eq!("café", decode(&bytes, "iso-8859-1").unwrap());
    }

    #[test]
    fn test_latin1_label_is_windows_1252() {
        let bytes = encode("€", "latin1").unwrap();
        assert_eq!(&[0x80], &bytes[..]);
    }

    #[test]
    fn test_utf16_round_trip() {
        assert_eq!(&[104, 0, 105, 0], &encode("hi", "utf-16le").unwrap()[..]);
        assert_eq!(&[0, 104, 0, 105], &encode("hi", "UTF-16BE").unwrap()[..]);

        let bytes = encode("añb\u{1F600}", "utf-16le").unwrap();
        assert_eq!(10, bytes.len());
        assert_eq!("añb\u{1F600}", decode(&bytes, "utf-16le").unwrap());
    }

    #[test]
    fn test_invalid_utf8_is_an_error() {
        let err = decode(&[0xff, 0xfe, 0xfd], DEFAULT_ENCODING).unwrap_err();
        assert_eq!(&ErrorKind::Serialization, err.kind());
    }

    #[test]
    fn test_unknown_label() {
        let err = encode("x", "klingon").unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }
}
