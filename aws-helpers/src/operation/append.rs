/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::AccessControlPolicy;
use bytes::{Bytes, BytesMut};

use crate::client::Handle;
use crate::codec::{self, text, DelimitedOptions, TextOptions};
use crate::error::{Error, ErrorCode};
use crate::location::{compose_uri, resolve_location, LocationArgs, LocationPolicy};
use crate::operation::write::WriteBody;
use crate::types::{Tags, ValueKind};
use crate::value::Value;

/// Fluent builder for appending a value to the end of an existing object
///
/// The object is downloaded, extended and uploaded again with its content headers, user
/// metadata, encryption, storage class, tags and ACL grants reapplied. Nothing guards
/// against concurrent writers; an update made between the read and the write is lost.
#[derive(Debug)]
pub struct AppendFluentBuilder {
    handle: Arc<Handle>,
    location: LocationArgs,
    body: WriteBody,
    kind: Option<ValueKind>,
    text: TextOptions,
    delimited: DelimitedOptions,
    incl_newline: bool,
}

impl AppendFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, location: LocationArgs, body: WriteBody) -> Self {
        Self {
            handle,
            location,
            body,
            kind: None,
            text: TextOptions::default(),
            delimited: DelimitedOptions::default().header(false),
            incl_newline: true,
        }
    }

    /// Encode the appended value as `kind` instead of inferring it from its shape.
    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Character encoding of the appended text, `utf-8` by default.
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

    /// Follow an appended text or mapping value with the line separator, `true` by default.
    ///
    /// JSON Lines, lines and delimited rows always end with a separator.
    pub fn incl_newline(mut self, incl_newline: bool) -> Self {
        self.incl_newline = incl_newline;
        self
    }

    /// Column delimiter for appended delimited rows, `,` by default.
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimited = self.delimited.delimiter(delimiter);
        self
    }

    /// Keys projected out of appended mapping rows, in order. No header line is written.
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delimited = self.delimited.headers(headers);
        self
    }

    /// Append the value, returning the `s3://` URI of the object.
    ///
    /// Fails with [`ErrorCode::NoSuchKey`] when the object does not exist.
    pub async fn send(self) -> Result<String, Error> {
        let (bucket, key) =
            resolve_location(&self.location, &LocationPolicy::OBJECT)?.into_object()?;
        self.text.validate()?;
        let value = self.body.into_value(self.kind)?;
        let client = self.handle.s3();

        tracing::debug!(%bucket, %key, "appending to object");
        let existing = client
            .get_object()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await
            .map_err(|err| {
                let no_such_key = err
                    .as_service_error()
                    .is_some_and(GetObjectError::is_no_such_key);
                let err = Error::from(err);
                if no_such_key {
                    err.with_code(ErrorCode::NoSuchKey)
                } else {
                    err
                }
            })?;
        let tagging = client
            .get_object_tagging()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await?;
        let acl = client
            .get_object_acl()
            .bucket(&bucket)
            .key(&key)
            .send()
            .await?;

        let addition = codec::encode(&value, &key, &self.text, &self.delimited)?;
        let separator = if self.incl_newline {
            trailing_newline(&value, &self.text)?
        } else {
            Bytes::new()
        };
        let content_type = existing
            .content_type()
            .map(str::to_owned)
            .or(addition.content_type);
        let content_encoding = existing.content_encoding().map(str::to_owned);
        let content_language = existing.content_language().map(str::to_owned);
        let metadata = existing.metadata().cloned();
        let sse = existing.server_side_encryption().cloned();
        let sse_kms_key_id = existing.ssekms_key_id().map(str::to_owned);
        let storage_class = existing.storage_class().cloned();

        let previous = existing.body.collect().await?.into_bytes();
        tracing::trace!(
            previous = previous.len(),
            appended = addition.body.len(),
            "concatenating object body"
        );
        let mut body =
            BytesMut::with_capacity(previous.len() + addition.body.len() + separator.len());
        body.extend_from_slice(&previous);
        body.extend_from_slice(&addition.body);
        body.extend_from_slice(&separator);

        let tags: Tags = tagging
            .tag_set()
            .iter()
            .map(|tag| (tag.key(), tag.value()))
            .collect();

        client
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(ByteStream::from(body.freeze()))
            .set_content_type(content_type)
            .set_content_encoding(content_encoding)
            .set_content_language(content_language)
            .set_metadata(metadata)
            .set_server_side_encryption(sse)
            .set_ssekms_key_id(sse_kms_key_id)
            .set_storage_class(storage_class)
            .set_tagging((!tags.is_empty()).then(|| tags.to_header()))
            .send()
            .await?;

        let policy = AccessControlPolicy::builder()
            .set_grants(Some(acl.grants().to_vec()))
            .set_owner(acl.owner().cloned())
            .build();
        client
            .put_object_acl()
            .bucket(&bucket)
            .key(&key)
            .access_control_policy(policy)
            .send()
            .await?;

        Ok(compose_uri(&bucket, Some(&key)))
    }
}

/// The separator written after values whose encoding does not end in one.
fn trailing_newline(value: &Value, opts: &TextOptions) -> Result<Bytes, Error> {
    match value {
        Value::Text(_) => text::encode(&opts.newline, &opts.encoding),
        Value::Mapping(_) => Ok(Bytes::from(opts.newline.clone().into_bytes())),
        _ => Ok(Bytes::new()),
    }
}
