/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashSet;
use std::sync::Arc;

use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::client::Handle;
use crate::error::{self, Error};
use crate::location::{decompose_uri, resolve_location, LocationArgs, LocationPolicy};

/// Fluent builder for listing the keys under a bucket or prefix
#[derive(Debug)]
pub struct ListObjectsFluentBuilder {
    handle: Arc<Handle>,
    location: LocationArgs,
    include_empty_objects: bool,
}

impl ListObjectsFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, location: LocationArgs) -> Self {
        Self {
            handle,
            location,
            include_empty_objects: false,
        }
    }

    /// Also yield zero-length objects (e.g. folder markers), skipped by default.
    pub fn include_empty_objects(mut self, include: bool) -> Self {
        self.include_empty_objects = include;
        self
    }

    /// Stream keys page by page.
    pub fn into_stream(self) -> BoxStream<'static, Result<String, Error>> {
        let resolved = match resolve_location(&self.location, &LocationPolicy::PREFIX) {
            Ok(resolved) => resolved,
            Err(err) => return stream::once(async move { Err(err) }).boxed(),
        };
        let bucket = resolved.bucket().unwrap_or_default().to_owned();
        let prefix = resolved.key().map(str::to_owned);
        let paginator = KeyPaginator {
            handle: self.handle,
            bucket,
            prefix,
            include_empty_objects: self.include_empty_objects,
            state: State::Paginating { next_token: None },
        };

        stream::try_unfold(paginator, |mut paginator| async move {
            Ok::<_, Error>(paginator.next_page().await?.map(|keys| (keys, paginator)))
        })
        .map_ok(|keys| stream::iter(keys.into_iter().map(Ok::<_, Error>)))
        .try_flatten()
        .boxed()
    }

    /// Collect all keys.
    pub async fn send(self) -> Result<Vec<String>, Error> {
        self.into_stream().try_collect().await
    }
}

#[derive(Debug, PartialEq)]
enum State {
    Paginating { next_token: Option<String> },
    Done,
}

impl State {
    fn next_state(&self, output: &ListObjectsV2Output) -> State {
        let is_truncated =
            output.is_truncated().unwrap_or(false) && output.next_continuation_token().is_some();
        match self {
            State::Paginating { .. } if is_truncated => State::Paginating {
                next_token: output.next_continuation_token().map(str::to_owned),
            },
            _ => State::Done,
        }
    }
}

#[derive(Debug)]
struct KeyPaginator {
    handle: Arc<Handle>,
    bucket: String,
    prefix: Option<String>,
    include_empty_objects: bool,
    state: State,
}

impl KeyPaginator {
    async fn next_page(&mut self) -> Result<Option<Vec<String>>, Error> {
        let next_token = match &self.state {
            State::Done => return Ok(None),
            State::Paginating { next_token } => next_token.clone(),
        };
        tracing::trace!(bucket = %self.bucket, prefix = ?self.prefix, ?next_token, "listing objects");
        let output = self
            .handle
            .s3()
            .list_objects_v2()
            .bucket(&self.bucket)
            .set_prefix(self.prefix.clone())
            .set_continuation_token(next_token)
            .send()
            .await?;
        self.state = self.state.next_state(&output);

        let include_empty = self.include_empty_objects;
        let keys = output
            .contents()
            .iter()
            .filter(|object| include_empty || object.size().unwrap_or_default() > 0)
            .filter_map(|object| object.key().map(str::to_owned))
            .collect();
        Ok(Some(keys))
    }
}

/// A key checked by [`find_keys_not_present`](crate::Client::find_keys_not_present), along
/// with the caller's payload for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate<T> {
    key: String,
    payload: T,
}

impl<T> Candidate<T> {
    /// The object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The caller's payload
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consume the candidate, returning its key and payload
    pub fn into_parts(self) -> (String, T) {
        (self.key, self.payload)
    }
}

/// Fluent builder for finding which candidate keys are absent from a bucket
#[derive(Debug)]
pub struct FindKeysNotPresentFluentBuilder<T> {
    handle: Arc<Handle>,
    bucket: Option<String>,
    candidates: Vec<(String, T)>,
}

impl<T> FindKeysNotPresentFluentBuilder<T> {
    pub(crate) fn new(handle: Arc<Handle>) -> Self {
        Self {
            handle,
            bucket: None,
            candidates: Vec::new(),
        }
    }

    /// The bucket to look in; optional when every candidate is an `s3://` URI.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Add a key (or `s3://` URI) together with a payload returned alongside it.
    pub fn candidate(mut self, key: impl Into<String>, payload: T) -> Self {
        self.candidates.push((key.into(), payload));
        self
    }

    /// Add several keys (or URIs) with their payloads.
    pub fn candidates<I, K>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = (K, T)>,
        K: Into<String>,
    {
        self.candidates
            .extend(candidates.into_iter().map(|(k, p)| (k.into(), p)));
        self
    }

    /// List the bucket under the candidates' longest common prefix and return the candidates
    /// that were not listed, in their original order.
    pub async fn send(self) -> Result<Vec<Candidate<T>>, Error> {
        let mut bucket = self.bucket;
        let mut candidates = Vec::with_capacity(self.candidates.len());
        for (key, payload) in self.candidates {
            let key = if key.starts_with("s3:") {
                let (uri_bucket, uri_key) = decompose_uri(&key);
                let uri_bucket = uri_bucket
                    .ok_or_else(|| error::invalid_input(format!("invalid S3 URI `{key}`")))?;
                if bucket.as_ref().is_some_and(|b| *b != uri_bucket) {
                    return Err(error::invalid_input(
                        "all candidate keys must be in the same bucket",
                    ));
                }
                bucket.get_or_insert(uri_bucket);
                uri_key.unwrap_or_default()
            } else {
                key
            };
            candidates.push(Candidate { key, payload });
        }

        if candidates.is_empty() {
            return Ok(candidates);
        }
        let bucket = bucket
            .filter(|b| !b.is_empty())
            .ok_or_else(|| error::invalid_input("a bucket must be provided"))?;

        let prefix = common_prefix(candidates.iter().map(|c| c.key.as_str()));
        tracing::debug!(%bucket, %prefix, candidates = candidates.len(), "finding keys not present");
        let location = LocationArgs::new().bucket(&bucket).prefix(&prefix);
        let present: HashSet<String> = ListObjectsFluentBuilder::new(self.handle, location)
            .include_empty_objects(true)
            .into_stream()
            .try_collect()
            .await?;

        Ok(candidates
            .into_iter()
            .filter(|c| !present.contains(&c.key))
            .collect())
    }
}

impl FindKeysNotPresentFluentBuilder<()> {
    /// Add a key (or `s3://` URI).
    pub fn key(self, key: impl Into<String>) -> Self {
        self.candidate(key, ())
    }

    /// Add several keys (or URIs).
    pub fn keys<I, K>(self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.candidates(keys.into_iter().map(|k| (k, ())))
    }
}

/// The longest string every key starts with.
pub fn common_prefix<'a>(keys: impl IntoIterator<Item = &'a str>) -> String {
    let mut keys = keys.into_iter();
    let Some(mut prefix) = keys.next() else {
        return String::new();
    };
    for key in keys {
        let end = prefix
            .char_indices()
            .zip(key.chars())
            .find(|((_, a), b)| a != b)
            .map(|((idx, _), _)| idx)
            .unwrap_or_else(|| prefix.len().min(key.len()));
        prefix = &prefix[..end];
    }
    prefix.to_owned()
}
