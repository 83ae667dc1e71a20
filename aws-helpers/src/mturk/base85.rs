/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Base85 using the RFC 1924 alphabet, without padding.

use crate::error::{self, Error};

const ALPHABET: &[u8; 85] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!#$%&()*+-;<=>?@^_`{|}~";

fn digit(ch: u8) -> Option<u32> {
    ALPHABET.iter().position(|&c| c == ch).map(|pos| pos as u32)
}

pub(crate) fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len().div_ceil(4) * 5);
    for chunk in data.chunks(4) {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        let mut value = u32::from_be_bytes(word);
        let mut group = [0u8; 5];
        for slot in group.iter_mut().rev() {
            *slot = ALPHABET[(value % 85) as usize];
            value /= 85;
        }
        // a partial chunk of n bytes needs n + 1 characters
        out.extend(group[..chunk.len() + 1].iter().map(|&b| char::from(b)));
    }
    out
}

pub(crate) fn decode(text: &str) -> Result<Vec<u8>, Error> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len().div_ceil(5) * 4);
    for chunk in bytes.chunks(5) {
        if chunk.len() == 1 {
            return Err(error::serialization("truncated base85 input"));
        }
        let mut value: u64 = 0;
        for i in 0..5 {
            let d = match chunk.get(i) {
                Some(&ch) => digit(ch).ok_or_else(|| {
                    error::serialization(format!("invalid base85 character `{}`", ch as char))
                })?,
                None => 84,
            };
            value = value * 85 + u64::from(d);
        }
        let value = u32::try_from(value)
            .map_err(|_| error::serialization("base85 group out of range"))?;
        out.extend_from_slice(&value.to_be_bytes()[..chunk.len() - 1]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!("Xk~0{Zv", encode(b"hello"));
        assert_eq!("|NsC0", encode(&[0xff; 4]));
        assert_eq!("", encode(b""));
        assert_eq!(b"hello".to_vec(), decode("Xk~0{Zv").unwrap());
        assert_eq!(vec![0xff; 4], decode("|NsC0").unwrap());
    }

    #[test]
    fn test_partial_groups() {
        for len in 0..9 {
            let data: Vec<u8> = (0..len).map(|i| (i * 37 + 11) as u8).collect();
            assert_eq!(data, decode(&encode(&data)).unwrap());
        }
    }

    #[test]
    fn test_invalid_input() {
        assert!(decode("ab\"cd").is_err());
        assert!(decode("|NsC0X").is_err());
        assert!(decode("~~~~~").is_err());
    }
}
