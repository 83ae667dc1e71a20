/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::client::Handle;
use crate::codec::{self, json_lines, text, JsonLinesIter, TextOptions};
use crate::error::Error;
use crate::location::{resolve_location, LocationArgs, LocationPolicy};
use crate::types::ValueKind;
use crate::value::Value;

/// Fluent builder for reading a single object
#[derive(Debug)]
pub struct ReadFluentBuilder {
    handle: Arc<Handle>,
    location: LocationArgs,
    byte_count: Option<u64>,
    text: TextOptions,
}

impl ReadFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, location: LocationArgs) -> Self {
        Self {
            handle,
            location,
            byte_count: None,
            text: TextOptions::default(),
        }
    }

    /// Only read the first `byte_count` bytes of the object.
    pub fn byte_count(mut self, byte_count: u64) -> Self {
        self.byte_count = Some(byte_count);
        self
    }

    /// Character encoding used to decode text, `utf-8` by default.
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.text.encoding = encoding.into();
        self
    }

    /// Line separator used to split lines, `\n` by default.
    ///
    /// An empty separator fails the read with
    /// [`ErrorKind::InputInvalid`](crate::error::ErrorKind::InputInvalid).
    pub fn newline(mut self, newline: impl Into<String>) -> Self {
        self.text.newline = newline.into();
        self
    }

    /// Download the object bytes.
    pub async fn send(self) -> Result<Bytes, Error> {
        self.fetch().await.map(|(body, _)| body)
    }

    async fn fetch(self) -> Result<(Bytes, TextOptions), Error> {
        let (bucket, key) =
            resolve_location(&self.location, &LocationPolicy::OBJECT)?.into_object()?;
        self.text.validate()?;
        if self.byte_count == Some(0) {
            return Ok((Bytes::new(), self.text));
        }

        let range = self.byte_count.map(|count| format!("bytes=0-{}", count - 1));
        tracing::debug!(%bucket, %key, ?range, "reading object");
        let output = self
            .handle
            .s3()
            .get_object()
            .bucket(bucket)
            .key(key)
            .set_range(range)
            .send()
            .await?;
        let body = output.body.collect().await?.into_bytes();
        tracing::trace!(len = body.len(), "read object body");
        Ok((body, self.text))
    }

    /// Download the object and decode it as `kind`.
    pub async fn value(self, kind: ValueKind) -> Result<Value, Error> {
        let (body, opts) = self.fetch().await?;
        codec::decode(body, kind, &opts)
    }

    /// Download the object as text.
    pub async fn text(self) -> Result<String, Error> {
        let (body, opts) = self.fetch().await?;
        text::decode(&body, &opts.encoding)
    }

    /// Download the object and deserialize it from JSON.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, Error> {
        let (body, opts) = self.fetch().await?;
        Ok(serde_json::from_str(&text::decode(&body, &opts.encoding)?)?)
    }

    /// Download the object as a JSON object.
    pub async fn mapping(self) -> Result<Map<String, Json>, Error> {
        self.json().await
    }

    /// Download the object as its non-empty lines.
    pub async fn lines(self) -> Result<Vec<String>, Error> {
        let (body, opts) = self.fetch().await?;
        let text = text::decode(&body, &opts.encoding)?;
        Ok(json_lines::split_lines(&text, &opts.newline)
            .map(str::to_owned)
            .collect())
    }

    /// Download the object and deserialize every non-empty line from JSON.
    pub async fn json_lines<T: DeserializeOwned>(self) -> Result<Vec<T>, Error> {
        let (body, opts) = self.fetch().await?;
        json_lines::decode(&text::decode(&body, &opts.encoding)?, &opts.newline)
    }

    /// Download the object and return an iterator deserializing one line at a time.
    pub async fn iter<T: DeserializeOwned>(self) -> Result<JsonLinesIter<T>, Error> {
        let (body, opts) = self.fetch().await?;
        Ok(JsonLinesIter::new(
            text::decode(&body, &opts.encoding)?,
            opts.newline,
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::types::ValueKind;
    use crate::Config;
    use aws_sdk_s3::operation::get_object::GetObjectOutput;
    use aws_sdk_s3::primitives::ByteStream;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use serde_json::json;

    fn client_returning(body: &'static str) -> crate::Client {
        let get_object = mock!(aws_sdk_s3::Client::get_object)
            .match_requests(|r| r.bucket() == Some("test-bucket") && r.key() == Some("data.txt"))
            .then_output(move || {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(body.as_bytes()))
                    .build()
            });
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&get_object]);
        crate::Client::new(Config::builder().client(s3).build())
    }

    #[tokio::test]
    async fn test_ranged_read() {
        let get_object = mock!(aws_sdk_s3::Client::get_object)
            .match_requests(|r| r.range() == Some("bytes=0-3"))
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"abcd"))
                    .build()
            });
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&get_object]);
        let client = crate::Client::new(Config::builder().client(s3).build());

        let body = client
            .read("s3://test-bucket/data.txt")
            .byte_count(4)
            .send()
            .await
            .unwrap();
        assert_eq!(&b"abcd"[..], &body[..]);
    }

    #[tokio::test]
    async fn test_zero_byte_count_skips_request() {
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[]);
        let client = crate::Client::new(Config::builder().client(s3).build());
        let body = client
            .read(("test-bucket", "data.txt"))
            .byte_count(0)
            .send()
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_read_lines() {
        let client = client_returning("one\n\ntwo\n");
        let lines = client.read_lines(("test-bucket", "data.txt")).await.unwrap();
        assert_eq!(vec!["one", "two"], lines);
    }

    #[tokio::test]
    async fn test_read_iter() {
        let client = client_returning("{\"n\":1}\n{\"n\":2}\n");
        let values: Vec<serde_json::Value> = client
            .read_iter(("test-bucket", "data.txt"))
            .await
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(vec![json!({"n": 1}), json!({"n": 2})], values);
    }

    #[tokio::test]
    async fn test_read_as_text() {
        let client = client_returning("hello");
        let value = client
            .read_as(("test-bucket", "data.txt"), ValueKind::Text)
            .await
            .unwrap();
        assert_eq!(Some("hello"), value.as_text());
    }

    #[tokio::test]
    async fn test_invalid_location_fails_before_request() {
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[]);
        let client = crate::Client::new(Config::builder().client(s3).build());
        let err = client.read_str("just-a-bucket").await.unwrap_err();
        assert_eq!(&crate::error::ErrorKind::InputInvalid, err.kind());
    }

    #[tokio::test]
    async fn test_empty_newline_fails_before_request() {
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[]);
        let client = crate::Client::new(Config::builder().client(s3).build());
        let err = client
            .read(("test-bucket", "data.txt"))
            .newline("")
            .lines()
            .await
            .unwrap_err();
        assert_eq!(&crate::error::ErrorKind::InputInvalid, err.kind());
    }
}
