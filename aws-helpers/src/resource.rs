/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Handles for a single object or bucket.
//!
//! An [`Object`] issues `HeadObject` the first time its metadata is needed and caches the
//! response until [`Object::refresh`] is called.

use std::collections::HashMap;
use std::sync::Arc;

use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_smithy_types::DateTime;
use tokio::sync::OnceCell;

use crate::client::Handle;
use crate::error::{Error, ErrorCode, ErrorKind};
use crate::location::{
    bucket_url, compose_uri, object_url, resolve_location, LocationArgs, LocationPolicy,
};
use crate::operation::bucket::{self, CreateBucketFluentBuilder};
use crate::operation::list::ListObjectsFluentBuilder;
use crate::operation::object;
use crate::operation::read::ReadFluentBuilder;

/// A lazily loaded S3 object
#[derive(Debug)]
pub struct Object {
    handle: Arc<Handle>,
    bucket: String,
    key: String,
    head: OnceCell<Option<HeadObjectOutput>>,
}

impl Object {
    pub(crate) fn new(handle: Arc<Handle>, location: LocationArgs) -> Result<Object, Error> {
        let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
        Ok(Object {
            handle,
            bucket,
            key,
            head: OnceCell::new(),
        })
    }

    /// The bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The object key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The `s3://` URI of the object
    pub fn uri(&self) -> String {
        compose_uri(&self.bucket, Some(&self.key))
    }

    /// The public HTTPS URL of the object
    pub fn public_url(&self) -> String {
        object_url(&self.bucket, &self.key)
    }

    async fn head(&self) -> Result<Option<&HeadObjectOutput>, Error> {
        let head = self
            .head
            .get_or_try_init(|| object::head(&self.handle, &self.bucket, &self.key))
            .await?;
        Ok(head.as_ref())
    }

    async fn require_head(&self) -> Result<&HeadObjectOutput, Error> {
        self.head().await?.ok_or_else(|| {
            Error::new(
                ErrorKind::NotFound,
                format!("{} does not exist", self.uri()),
            )
            .with_code(ErrorCode::NotFound)
        })
    }

    /// Whether the object exists.
    pub async fn exists(&self) -> Result<bool, Error> {
        Ok(self.head().await?.is_some())
    }

    /// Size of the object in bytes.
    pub async fn size(&self) -> Result<u64, Error> {
        let length = self.require_head().await?.content_length().unwrap_or_default();
        Ok(length.max(0) as u64)
    }

    /// The stored `Content-Type`, if any.
    pub async fn content_type(&self) -> Result<Option<&str>, Error> {
        Ok(self.require_head().await?.content_type())
    }

    /// The user-defined metadata of the object.
    pub async fn metadata(&self) -> Result<Option<&HashMap<String, String>>, Error> {
        Ok(self.require_head().await?.metadata())
    }

    /// When the object was last modified.
    pub async fn last_modified(&self) -> Result<Option<&DateTime>, Error> {
        Ok(self.require_head().await?.last_modified())
    }

    /// The entity tag of the object.
    pub async fn e_tag(&self) -> Result<Option<&str>, Error> {
        Ok(self.require_head().await?.e_tag())
    }

    /// Drop the cached metadata and load it again.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        self.head = OnceCell::new();
        self.head().await.map(|_| ())
    }

    /// Read the object.
    pub fn read(&self) -> ReadFluentBuilder {
        ReadFluentBuilder::new(
            self.handle.clone(),
            LocationArgs::new().bucket(&self.bucket).key(&self.key),
        )
    }

    /// Delete the object.
    pub async fn delete(&self) -> Result<(), Error> {
        object::delete(
            &self.handle,
            LocationArgs::new().bucket(&self.bucket).key(&self.key),
        )
        .await
    }
}

/// An S3 bucket
#[derive(Debug, Clone)]
pub struct Bucket {
    handle: Arc<Handle>,
    name: String,
}

impl Bucket {
    pub(crate) fn new(handle: Arc<Handle>, name: String) -> Self {
        Self { handle, name }
    }

    /// The bucket name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The public HTTPS URL of the bucket
    pub fn url(&self) -> String {
        bucket_url(&self.name)
    }

    /// Whether the bucket exists.
    pub async fn exists(&self) -> Result<bool, Error> {
        bucket::bucket_exists(&self.handle, &self.name).await
    }

    /// Create the bucket.
    pub fn create(&self) -> CreateBucketFluentBuilder {
        CreateBucketFluentBuilder::new(self.handle.clone(), self.name.clone())
    }

    /// Delete the bucket and wait until it is gone.
    pub async fn delete(&self) -> Result<(), Error> {
        bucket::delete_bucket(&self.handle, &self.name).await
    }

    /// List the keys in the bucket, optionally under `prefix`.
    pub fn objects(&self, prefix: Option<&str>) -> ListObjectsFluentBuilder {
        let mut location = LocationArgs::new().bucket(&self.name);
        if let Some(prefix) = prefix {
            location = location.prefix(prefix);
        }
        ListObjectsFluentBuilder::new(self.handle.clone(), location)
    }

    /// A handle for the object at `key` in this bucket.
    pub fn object(&self, key: impl Into<String>) -> Result<Object, Error> {
        Object::new(
            self.handle.clone(),
            LocationArgs::new().bucket(&self.name).key(key),
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::Config;
    use aws_sdk_s3::operation::head_object::{HeadObjectError, HeadObjectOutput};
    use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
    use aws_sdk_s3::types::error::NotFound;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use test_common::mock_client_with_stubbed_http_client;

    #[tokio::test]
    async fn test_head_is_loaded_once() {
        let head = mock!(aws_sdk_s3::Client::head_object)
            .match_requests(|r| r.bucket() == Some("test-bucket") && r.key() == Some("a.json"))
            .then_output(|| {
                HeadObjectOutput::builder()
                    .content_length(7)
                    .content_type("application/json")
                    .metadata("origin", "unit-test")
                    .build()
            });
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&head]);
        let client = crate::Client::new(Config::builder().client(s3).build());

        let object = client.object("s3://test-bucket/a.json").unwrap();
        assert!(object.exists().await.unwrap());
        assert_eq!(7, object.size().await.unwrap());
        assert_eq!(
            Some("application/json"),
            object.content_type().await.unwrap()
        );
        assert_eq!(
            Some(&"unit-test".to_owned()),
            object.metadata().await.unwrap().and_then(|m| m.get("origin"))
        );
        assert_eq!(1, head.num_calls());
    }

    #[tokio::test]
    async fn test_refresh_reloads_head() {
        let missing = mock!(aws_sdk_s3::Client::head_object)
            .then_error(|| HeadObjectError::NotFound(NotFound::builder().build()));
        let present = mock!(aws_sdk_s3::Client::head_object)
            .then_output(|| HeadObjectOutput::builder().content_length(3).build());
        let s3 = mock_client_with_stubbed_http_client!(
            aws_sdk_s3,
            RuleMode::Sequential,
            &[&missing, &present]
        );
        let client = crate::Client::new(Config::builder().client(s3).build());

        let mut object = client.object(("test-bucket", "later.txt")).unwrap();
        assert!(!object.exists().await.unwrap());
        assert!(object.size().await.unwrap_err().is_not_found());
        object.refresh().await.unwrap();
        assert_eq!(3, object.size().await.unwrap());
    }

    #[tokio::test]
    async fn test_bucket_objects_under_prefix() {
        let list = mock!(aws_sdk_s3::Client::list_objects_v2)
            .match_requests(|r| r.bucket() == Some("test-bucket") && r.prefix() == Some("logs/"))
            .then_output(|| {
                ListObjectsV2Output::builder()
                    .contents(
                        aws_sdk_s3::types::Object::builder()
                            .key("logs/a.txt")
                            .size(1)
                            .build(),
                    )
                    .build()
            });
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&list]);
        let client = crate::Client::new(Config::builder().client(s3).build());

        let bucket = client.bucket("test-bucket");
        assert_eq!("https://test-bucket.s3.amazonaws.com", bucket.url());
        let keys = bucket.objects(Some("logs/")).send().await.unwrap();
        assert_eq!(vec!["logs/a.txt".to_owned()], keys);
    }
}
