/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Packing payloads into the 255 character `RequesterAnnotation` field of a HIT.
//!
//! A payload is stored inline when it fits, zlib compressed and base85 encoded when that fits,
//! and otherwise written to a temp object whose URI is stored instead.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use serde_json::{json, Value as Json};

use super::base85;
use crate::error::{self, Error};

/// Payloads shorter than this (in characters) are stored as `{"payload": ...}`
const INLINE_LIMIT: usize = 243;

/// Compressed payloads shorter than this are stored as `{"payloadBytes": ...}`
const COMPRESSED_LIMIT: usize = 238;

/// Key prefix of temp objects holding payloads too large for the field
const TEMP_PREFIX: &str = "mturk_requester_annotation/";

const PAYLOAD: &str = "payload";
const PAYLOAD_BYTES: &str = "payloadBytes";
const PAYLOAD_URI: &str = "payloadURI";

fn payload_text(payload: &Json) -> String {
    match payload {
        Json::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn compress(text: &str) -> Result<String, Error> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(text.as_bytes())?;
    Ok(base85::encode(&encoder.finish()?))
}

fn decompress(encoded: &str) -> Result<Vec<u8>, Error> {
    let compressed = base85::decode(encoded)?;
    let mut decoded = Vec::new();
    ZlibDecoder::new(compressed.as_slice())
        .read_to_end(&mut decoded)
        .map_err(error::serialization)?;
    Ok(decoded)
}

/// JSON if `bytes` parse as JSON, else the UTF-8 text.
fn json_or_text(bytes: &[u8]) -> Result<Json, Error> {
    match serde_json::from_slice(bytes) {
        Ok(value) => Ok(value),
        Err(_) => String::from_utf8(bytes.to_vec())
            .map(Json::String)
            .map_err(error::serialization),
    }
}

/// Encode `payload` for the `RequesterAnnotation` field of a new HIT.
///
/// Large payloads are written with [`write_temp`](crate::Client::write_temp), which may create
/// the account's temp bucket.
pub async fn prepare_requester_annotation(
    s3: &crate::Client,
    payload: &Json,
) -> Result<String, Error> {
    let text = payload_text(payload);
    if text.chars().count() < INLINE_LIMIT {
        return Ok(json!({ PAYLOAD: payload }).to_string());
    }

    let compressed = compress(&text)?;
    if compressed.len() < COMPRESSED_LIMIT {
        return Ok(json!({ PAYLOAD_BYTES: compressed }).to_string());
    }

    let uri = s3
        .write_temp(payload.to_string())
        .prefix(TEMP_PREFIX)
        .content_type("application/json")
        .send()
        .await?;
    tracing::debug!(%uri, "stored requester annotation out of line");
    Ok(json!({ PAYLOAD_URI: uri }).to_string())
}

/// Decode a `RequesterAnnotation` written by [`prepare_requester_annotation`].
///
/// Annotations that are not JSON, or JSON without one of the payload keys, are returned
/// unchanged. With `delete_temp_object` set, an out-of-line payload object is deleted once read.
pub async fn retrieve_requester_annotation(
    s3: &crate::Client,
    content: &str,
    delete_temp_object: bool,
) -> Result<Json, Error> {
    if content.is_empty() {
        return Ok(Json::String(String::new()));
    }
    let parsed: Json = match serde_json::from_str(content) {
        Ok(parsed) => parsed,
        Err(_) => return Ok(Json::String(content.to_owned())),
    };
    let Some(fields) = parsed.as_object() else {
        return Ok(parsed);
    };

    if let Some(payload) = fields.get(PAYLOAD) {
        Ok(payload.clone())
    } else if let Some(Json::String(encoded)) = fields.get(PAYLOAD_BYTES) {
        json_or_text(&decompress(encoded)?)
    } else if let Some(Json::String(uri)) = fields.get(PAYLOAD_URI) {
        let body = s3.read_bytes(uri.as_str()).await?;
        let payload = json_or_text(&body)?;
        if delete_temp_object {
            s3.delete(uri.as_str()).await?;
        }
        Ok(payload)
    } else {
        Ok(parsed)
    }
}
