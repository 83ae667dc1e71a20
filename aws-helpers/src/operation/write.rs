/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_sdk_s3::operation::put_object::PutObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use serde_json::Value as Json;

use crate::client::Handle;
use crate::codec::{self, DelimitedOptions, Encoded, TextOptions};
use crate::error::{self, Error};
use crate::location::{compose_uri, resolve_location, LocationArgs, LocationPolicy};
use crate::operation::PutOptions;
use crate::types::{Column, ValueKind};
use crate::value::Value;

/// What the caller handed over to be written
#[derive(Debug, Clone)]
pub(crate) enum WriteBody {
    Value(Value),
    Json(Json),
}

impl WriteBody {
    /// Settle on a concrete value; an explicit kind wins over shape detection.
    pub(crate) fn into_value(self, kind: Option<ValueKind>) -> Result<Value, Error> {
        match (self, kind) {
            (WriteBody::Json(json), Some(kind)) => Value::from_json_as(kind, json),
            (WriteBody::Json(json), None) => Ok(Value::detect(json)),
            (WriteBody::Value(value), Some(kind))
                if value.kind().is_some_and(|actual| actual != kind) =>
            {
                Err(error::type_unsupported(format!(
                    "a {:?} value cannot be written as {kind:?}",
                    value.kind()
                )))
            }
            (WriteBody::Value(value), _) => Ok(value),
        }
    }
}

/// Fluent builder for writing a value to a single object
#[derive(Debug)]
pub struct WriteFluentBuilder {
    handle: Arc<Handle>,
    location: LocationArgs,
    body: WriteBody,
    kind: Option<ValueKind>,
    text: TextOptions,
    delimited: DelimitedOptions,
    options: PutOptions,
}

impl WriteFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, location: LocationArgs, body: WriteBody) -> Self {
        Self {
            handle,
            location,
            body,
            kind: None,
            text: TextOptions::default(),
            delimited: DelimitedOptions::default(),
            options: PutOptions::default(),
        }
    }

    /// Write the value as `kind` instead of inferring it from the value's shape.
    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Character encoding used for text output, `utf-8` by default.
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.text.encoding = encoding.into();
        self
    }

    /// Line separator, `\n` by default. Must not be empty.
    pub fn newline(mut self, newline: impl Into<String>) -> Self {
        let newline = newline.into();
        self.delimited = self.delimited.newline(newline.clone());
        self.text.newline = newline;
        self
    }

    /// Column delimiter for delimited rows, `,` by default.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimited = self.delimited.delimiter(delimiter);
        self
    }

    /// Columns to project out of delimited rows.
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.delimited = self.delimited.columns(columns);
        self
    }

    /// Header line written ahead of delimited rows.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delimited = self.delimited.headers(headers);
        self
    }

    put_option_setters!();

    /// Encode and upload the value, returning the `s3://` URI of the object.
    pub async fn send(self) -> Result<String, Error> {
        let (bucket, key) =
            resolve_location(&self.location, &LocationPolicy::OBJECT)?.into_object()?;
        self.text.validate()?;
        let value = self.body.into_value(self.kind)?;
        let encoded = codec::encode(&value, &key, &self.text, &self.delimited)?;
        let spool = matches!(value, Value::Array(_));
        put_encoded(&self.handle, &bucket, &key, encoded, self.options, spool).await?;
        Ok(compose_uri(&bucket, Some(&key)))
    }
}

/// Upload encoded bytes, optionally staging them through a temp file first.
pub(crate) async fn put_encoded(
    handle: &Handle,
    bucket: &str,
    key: &str,
    encoded: Encoded,
    options: PutOptions,
    spool: bool,
) -> Result<PutObjectOutput, Error> {
    let Encoded { body, content_type } = encoded;
    tracing::debug!(%bucket, %key, len = body.len(), ?content_type, "writing object");

    // the staged file must outlive the request
    let (stream, _staged) = if spool {
        let file = tempfile::NamedTempFile::new()?;
        tokio::fs::write(file.path(), &body).await?;
        (ByteStream::from_path(file.path()).await?, Some(file))
    } else {
        (ByteStream::from(body), None)
    };

    let request = handle
        .s3()
        .put_object()
        .bucket(bucket)
        .key(key)
        .body(stream);
    Ok(options.apply(request, content_type).send().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_explicit_kind_converts_json() {
        let value = WriteBody::Json(json!(["a", "b"]))
            .into_value(Some(ValueKind::Lines))
            .unwrap();
        assert!(matches!(value, Value::Lines(_)));
    }

    #[test]
    fn test_detected_kind() {
        let value = WriteBody::Json(json!([{"a": 1}])).into_value(None).unwrap();
        assert!(matches!(value, Value::JsonLines(_)));
    }

    #[test]
    fn test_mismatched_kind_is_rejected() {
        let err = WriteBody::Value(Value::from("text"))
            .into_value(Some(ValueKind::Mapping))
            .unwrap_err();
        assert_eq!(&ErrorKind::TypeUnsupported, err.kind());
    }

    #[tokio::test]
    async fn test_empty_newline_is_rejected() {
        use aws_smithy_mocks_experimental::{mock_client, RuleMode};

        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[]);
        let client = crate::Client::new(crate::Config::builder().client(s3).build());
        let err = client
            .write("s3://test-bucket/lines.txt", json!(["a", "b"]))
            .newline("")
            .send()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }
}
