/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{self, Error};

const WIDTH: usize = std::mem::size_of::<f64>();

/// Lay out `values` as consecutive little-endian `f64`s.
pub(crate) fn encode(values: &[f64]) -> Bytes {
    let mut buf = BytesMut::with_capacity(values.len() * WIDTH);
    for value in values {
        buf.put_f64_le(*value);
    }
    buf.freeze()
}

pub(crate) fn decode(bytes: &[u8]) -> Result<Vec<f64>, Error> {
    if bytes.len() % WIDTH != 0 {
        return Err(error::serialization(format!(
            "object length {} is not a multiple of {WIDTH}",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(WIDTH)
        .map(|chunk| {
            let mut raw = [0u8; WIDTH];
            raw.copy_from_slice(chunk);
            f64::from_le_bytes(raw)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let bytes = encode(&[1.0, -2.5]);
        assert_eq!(16, bytes.len());
        assert_eq!(&1.0f64.to_le_bytes(), &bytes[..8]);
        assert_eq!(vec![1.0, -2.5], decode(&bytes).unwrap());
    }

    #[test]
    fn test_truncated() {
        assert!(decode(&[0u8; 12]).is_err());
    }
}
