/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Mocked S3 buckets for exercising `aws-helpers` without a network.

use std::sync::Arc;

use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
use aws_sdk_s3::operation::head_object::{HeadObjectError, HeadObjectOutput};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::error::{NoSuchKey, NotFound};
use aws_smithy_http_client::test_util::infallible_client_fn;
use aws_smithy_mocks_experimental::{mock, Rule};
use aws_smithy_runtime_api::client::http::SharedHttpClient;
use aws_smithy_types::body::SdkBody;
use aws_smithy_types::error::ErrorMetadata;
use bytes::Bytes;

/// An HTTP client answering every request with an empty `200 OK`.
///
/// Mocked clients built without an HTTP client fail before a response exists, and modeled errors
/// (`then_error`) can only be reported once a response has been received. Pair this with
/// [`mock_client_with_stubbed_http_client!`] whenever a rule returns an error.
pub fn stubbed_http_client() -> SharedHttpClient {
    infallible_client_fn(|_request| {
        http::Response::builder()
            .status(200)
            .body(SdkBody::empty())
            .unwrap()
    })
}

/// Like `aws_smithy_mocks_experimental::mock_client!`, but the client sends requests to
/// [`stubbed_http_client`] so that error rules reach the operation's caller.
#[macro_export]
macro_rules! mock_client_with_stubbed_http_client {
    ($aws_crate: ident, $rules: expr) => {
        $crate::mock_client_with_stubbed_http_client!(
            $aws_crate,
            aws_smithy_mocks_experimental::RuleMode::Sequential,
            $rules
        )
    };
    ($aws_crate: ident, $rule_mode: expr, $rules: expr) => {{
        aws_smithy_mocks_experimental::mock_client!($aws_crate, $rule_mode, $rules, |conf| {
            conf.http_client($crate::stubbed_http_client())
        })
    }};
}

/// An object stored in a [`MockBucket`]
#[derive(Debug, Clone)]
pub struct MockObject {
    object: aws_sdk_s3::types::Object,
    contents: Bytes,
    content_type: Option<String>,
}

impl MockObject {
    /// Create a new mock object with the given key and contents
    pub fn new(key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let contents: Bytes = data.into();
        let object = aws_sdk_s3::types::Object::builder()
            .key(key.into())
            .size(contents.len() as i64)
            .build();
        Self {
            object,
            contents,
            content_type: None,
        }
    }

    /// The object key
    pub fn key(&self) -> &str {
        self.object.key().unwrap_or_default()
    }

    /// Output for `GetObject` on this key
    pub fn get_object_output(&self) -> GetObjectOutput {
        GetObjectOutput::builder()
            .body(ByteStream::from(self.contents.clone()))
            .content_length(self.contents.len() as i64)
            .set_content_type(self.content_type.clone())
            .build()
    }

    /// Output for `HeadObject` on this key
    pub fn head_object_output(&self) -> HeadObjectOutput {
        HeadObjectOutput::builder()
            .content_length(self.contents.len() as i64)
            .set_content_type(self.content_type.clone())
            .build()
    }
}

/// A `NoSuchKey` error as S3 returns it
pub fn no_such_key() -> GetObjectError {
    GetObjectError::NoSuchKey(
        NoSuchKey::builder()
            .message("The specified key does not exist.")
            .meta(ErrorMetadata::builder().code("NoSuchKey").build())
            .build(),
    )
}

/// A `NotFound` error as S3 returns it for `HeadObject`
pub fn head_not_found() -> HeadObjectError {
    HeadObjectError::NotFound(
        NotFound::builder()
            .meta(ErrorMetadata::builder().code("NotFound").build())
            .build(),
    )
}

/// Mock bucket with a fixed set of objects.
///
/// NOTE: [`rules`](Self::rules) lists every object in a single page whatever prefix is
/// requested; use [`rules_for_prefix`](Self::rules_for_prefix) when the prefix matters. Keys
/// not in the bucket fail `GetObject` with `NoSuchKey` and `HeadObject` with `NotFound`, so
/// use [`RuleMode::MatchAny`](aws_smithy_mocks_experimental::RuleMode::MatchAny) and build the
/// client with [`mock_client_with_stubbed_http_client!`].
#[derive(Debug)]
pub struct MockBucket {
    name: String,
    objects: Vec<MockObject>,
}

impl MockBucket {
    /// Create a builder for a bucket named `name`
    pub fn builder(name: impl Into<String>) -> MockBucketBuilder {
        MockBucketBuilder {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    /// The rules answering `ListObjectsV2`, `GetObject` and `HeadObject` for this bucket.
    pub fn rules(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = Vec::new();

        for mobj in self.objects.iter() {
            let key = mobj.key().to_owned();
            let (get, head) = (Arc::new(mobj.clone()), Arc::new(mobj.clone()));
            let (get_key, head_key) = (key.clone(), key);
            rules.push(
                mock!(aws_sdk_s3::Client::get_object)
                    .match_requests(move |r| r.key() == Some(get_key.as_str()))
                    .then_output(move || get.get_object_output()),
            );
            rules.push(
                mock!(aws_sdk_s3::Client::head_object)
                    .match_requests(move |r| r.key() == Some(head_key.as_str()))
                    .then_output(move || head.head_object_output()),
            );
        }

        let bucket = self.name.clone();
        let listed = Arc::new(self.objects.clone());
        rules.push(
            mock!(aws_sdk_s3::Client::list_objects_v2)
                .match_requests(move |r| r.bucket() == Some(bucket.as_str()))
                .then_output(move || {
                    ListObjectsV2Output::builder()
                        .set_contents(Some(listed.iter().map(|m| m.object.clone()).collect()))
                        .build()
                }),
        );
        rules.push(mock!(aws_sdk_s3::Client::get_object).then_error(no_such_key));
        rules.push(mock!(aws_sdk_s3::Client::head_object).then_error(head_not_found));
        rules
    }

    /// Rules like [`rules`](Self::rules), but listing only the keys under `prefix`, and only for
    /// requests that ask for exactly that prefix.
    pub fn rules_for_prefix(&self, prefix: &str) -> Vec<Rule> {
        let listed: Vec<_> = self
            .objects
            .iter()
            .filter(|m| m.key().starts_with(prefix))
            .map(|m| m.object.clone())
            .collect();
        let expected = prefix.to_owned();
        let mut rules = vec![mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(move |r| r.prefix() == Some(expected.as_str()))
            .then_output(move || {
                ListObjectsV2Output::builder()
                    .set_contents(Some(listed.clone()))
                    .build()
            })];
        rules.extend(self.rules());
        rules
    }
}

/// Builder for [`MockBucket`]
#[derive(Debug)]
pub struct MockBucketBuilder {
    name: String,
    objects: Vec<MockObject>,
}

impl MockBucketBuilder {
    /// Add an object with the given contents
    pub fn object(mut self, key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects.push(MockObject::new(key, data));
        self
    }

    /// Add an object with the given contents and stored content type
    pub fn object_with_content_type(
        mut self,
        key: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: impl Into<String>,
    ) -> Self {
        let mut object = MockObject::new(key, data);
        object.content_type = Some(content_type.into());
        self.objects.push(object);
        self
    }

    /// Add a zero-length object, like a folder marker
    pub fn empty_object(self, key: impl Into<String>) -> Self {
        self.object(key, Bytes::new())
    }

    /// Consume the builder and build a `MockBucket`
    pub fn build(self) -> MockBucket {
        MockBucket {
            name: self.name,
            objects: self.objects,
        }
    }
}
