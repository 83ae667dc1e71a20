/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Conversion between in-memory [`Value`]s and object bytes.

use bytes::Bytes;

use crate::error::{self, Error};
use crate::types::ValueKind;
use crate::value::Value;

pub(crate) mod array;
pub mod content_type;
pub mod delimited;
#[cfg(feature = "image")]
pub(crate) mod image;
pub mod json_lines;
pub(crate) mod text;

pub use delimited::DelimitedOptions;
pub use json_lines::JsonLinesIter;

/// Object bytes plus the content type inferred for them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Encoded {
    pub(crate) body: Bytes,
    pub(crate) content_type: Option<String>,
}

/// Text options shared by encode and decode.
#[derive(Debug, Clone)]
pub(crate) struct TextOptions {
    pub(crate) encoding: String,
    pub(crate) newline: String,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            encoding: text::DEFAULT_ENCODING.to_owned(),
            newline: "\n".to_owned(),
        }
    }
}

impl TextOptions {
    /// Rejects options that cannot split text back into lines.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.newline.is_empty() {
            return Err(error::invalid_input("the line separator must not be empty"));
        }
        Ok(())
    }
}

fn extension_or(key: &str, fallback: &str) -> Option<String> {
    Some(content_type::for_key(key).unwrap_or(fallback).to_owned())
}

/// Encode `value` for upload to `key`.
///
/// The content type is inferred from the key extension and the value kind; callers apply
/// their own override on top.
pub(crate) fn encode(
    value: &Value,
    key: &str,
    text_opts: &TextOptions,
    delimited: &DelimitedOptions,
) -> Result<Encoded, Error> {
    let encoded = match value {
        Value::Text(t) => Encoded {
            body: text::encode(t, &text_opts.encoding)?,
            content_type: extension_or(key, content_type::TEXT_PLAIN),
        },
        Value::Mapping(map) => Encoded {
            body: Bytes::from(serde_json::to_vec(map)?),
            content_type: Some(content_type::APPLICATION_JSON.to_owned()),
        },
        Value::JsonLines(records) => Encoded {
            body: text::encode(
                &json_lines::encode(records, &text_opts.newline)?,
                &text_opts.encoding,
            )?,
            content_type: extension_or(key, content_type::TEXT_PLAIN),
        },
        Value::Lines(lines) => Encoded {
            body: text::encode(
                &json_lines::encode_lines(lines, &text_opts.newline),
                &text_opts.encoding,
            )?,
            content_type: extension_or(key, content_type::TEXT_PLAIN),
        },
        Value::Delimited(rows) => Encoded {
            body: text::encode(&delimited::encode_rows(rows, delimited)?, &text_opts.encoding)?,
            content_type: extension_or(key, content_type::TEXT_PLAIN),
        },
        #[cfg(feature = "image")]
        Value::Image(img) => Encoded {
            body: image::encode(img)?,
            content_type: extension_or(
                key,
                img.mime_type().unwrap_or(content_type::IMAGE_ANY),
            ),
        },
        Value::Bytes(bytes) => Encoded {
            body: bytes.clone(),
            content_type: content_type::for_key(key).map(str::to_owned),
        },
        Value::Array(values) => Encoded {
            body: array::encode(values),
            content_type: content_type::for_key(key).map(str::to_owned),
        },
        Value::Empty => Encoded {
            body: Bytes::new(),
            content_type: content_type::for_key(key).map(str::to_owned),
        },
    };
    Ok(encoded)
}

/// Decode downloaded bytes as `kind`.
pub(crate) fn decode(bytes: Bytes, kind: ValueKind, text_opts: &TextOptions) -> Result<Value, Error> {
    match kind {
        ValueKind::Text => Ok(Value::Text(text::decode(&bytes, &text_opts.encoding)?)),
        ValueKind::Mapping => {
            let text = text::decode(&bytes, &text_opts.encoding)?;
            Ok(Value::Mapping(serde_json::from_str(&text)?))
        }
        ValueKind::JsonLines => {
            let text = text::decode(&bytes, &text_opts.encoding)?;
            Ok(Value::JsonLines(json_lines::decode(&text, &text_opts.newline)?))
        }
        ValueKind::Lines => {
            let text = text::decode(&bytes, &text_opts.encoding)?;
            Ok(Value::Lines(
                json_lines::split_lines(&text, &text_opts.newline)
                    .map(str::to_owned)
                    .collect(),
            ))
        }
        ValueKind::Delimited => Err(error::type_unsupported(
            "delimited objects cannot be decoded; read them as text or lines",
        )),
        #[cfg(feature = "image")]
        ValueKind::Image => Ok(Value::Image(image::decode(&bytes)?)),
        #[cfg(not(feature = "image"))]
        ValueKind::Image => Err(error::missing_capability("image")),
        ValueKind::Bytes => Ok(Value::Bytes(bytes)),
        ValueKind::Array => Ok(Value::Array(array::decode(&bytes)?)),
    }
}
