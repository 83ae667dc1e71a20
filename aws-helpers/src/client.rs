/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as Json};

use crate::codec::JsonLinesIter;
use crate::error::{self, Error};
use crate::location::LocationArgs;
use crate::operation::append::AppendFluentBuilder;
use crate::operation::bucket::CreateBucketFluentBuilder;
use crate::operation::copy::{CopyFluentBuilder, WriteTempFluentBuilder};
use crate::operation::list::{FindKeysNotPresentFluentBuilder, ListObjectsFluentBuilder};
use crate::operation::read::ReadFluentBuilder;
use crate::operation::transfer::{DownloadFluentBuilder, FetchFluentBuilder, UploadFluentBuilder};
use crate::operation::write::{WriteBody, WriteFluentBuilder};
use crate::types::{CannedAcl, Tags, ValueKind};
use crate::value::{Row, Value};
use crate::Config;

/// Convenience client for Amazon Simple Storage Service.
///
/// Cloning is cheap; clones share the same configuration.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) handle: Arc<Handle>,
}

/// Whatever is needed to carry out operations
#[derive(Debug)]
pub(crate) struct Handle {
    pub(crate) config: crate::Config,
}

impl Handle {
    pub(crate) fn s3(&self) -> &aws_sdk_s3::Client {
        self.config.client()
    }
}

impl Client {
    /// Creates a new client from a config.
    pub fn new(config: Config) -> Client {
        let handle = Arc::new(Handle { config });
        Client { handle }
    }

    /// Returns the client's configuration
    pub fn config(&self) -> &Config {
        &self.handle.config
    }

    /// Read an object.
    ///
    /// Constructs a fluent builder for the
    /// [`Read`](crate::operation::read::ReadFluentBuilder) operation. The builder decodes the
    /// object on demand (`text()`, `mapping()`, `json_lines()`, ...).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// async fn first_kilobyte(client: &aws_helpers::Client) -> Result<(), aws_helpers::error::Error> {
    ///     let head = client
    ///         .read("s3://my-bucket/logs/app.log")
    ///         .byte_count(1024)
    ///         .send()
    ///         .await?;
    ///     println!("{} bytes", head.len());
    ///     Ok(())
    /// }
    /// ```
    pub fn read(&self, location: impl Into<LocationArgs>) -> ReadFluentBuilder {
        ReadFluentBuilder::new(self.handle.clone(), location.into())
    }

    /// Read an object and decode it as `kind`.
    pub async fn read_as(
        &self,
        location: impl Into<LocationArgs>,
        kind: ValueKind,
    ) -> Result<Value, Error> {
        self.read(location).value(kind).await
    }

    /// Read an object as UTF-8 text.
    pub async fn read_str(&self, location: impl Into<LocationArgs>) -> Result<String, Error> {
        self.read(location).text().await
    }

    /// Read an object as a JSON document.
    pub async fn read_json<T: DeserializeOwned>(
        &self,
        location: impl Into<LocationArgs>,
    ) -> Result<T, Error> {
        self.read(location).json().await
    }

    /// Read an object as a JSON object.
    pub async fn read_mapping(
        &self,
        location: impl Into<LocationArgs>,
    ) -> Result<Map<String, Json>, Error> {
        self.read(location).mapping().await
    }

    /// Read an object as its non-empty text lines.
    pub async fn read_lines(&self, location: impl Into<LocationArgs>) -> Result<Vec<String>, Error> {
        self.read(location).lines().await
    }

    /// Read an object as JSON Lines.
    pub async fn read_json_lines<T: DeserializeOwned>(
        &self,
        location: impl Into<LocationArgs>,
    ) -> Result<Vec<T>, Error> {
        self.read(location).json_lines().await
    }

    /// Read an object as lazily decoded JSON Lines.
    ///
    /// Every call downloads the object again.
    pub async fn read_iter<T: DeserializeOwned>(
        &self,
        location: impl Into<LocationArgs>,
    ) -> Result<JsonLinesIter<T>, Error> {
        self.read(location).iter().await
    }

    /// Write a value to an object.
    ///
    /// Constructs a fluent builder for the
    /// [`Write`](crate::operation::write::WriteFluentBuilder) operation. The returned URI
    /// addresses the written object.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use serde_json::json;
    ///
    /// async fn save(client: &aws_helpers::Client) -> Result<(), aws_helpers::error::Error> {
    ///     let uri = client
    ///         .write(("my-bucket", "state/run.json"), json!({"step": 3}))
    ///         .send()
    ///         .await?;
    ///     assert_eq!("s3://my-bucket/state/run.json", uri);
    ///     Ok(())
    /// }
    /// ```
    pub fn write(
        &self,
        location: impl Into<LocationArgs>,
        value: impl Into<Value>,
    ) -> WriteFluentBuilder {
        WriteFluentBuilder::new(
            self.handle.clone(),
            location.into(),
            WriteBody::Value(value.into()),
        )
    }

    /// Write a JSON value to an object, converting it to the value kind given.
    pub fn write_as(
        &self,
        location: impl Into<LocationArgs>,
        kind: ValueKind,
        value: Json,
    ) -> WriteFluentBuilder {
        WriteFluentBuilder::new(self.handle.clone(), location.into(), WriteBody::Json(value))
            .kind(kind)
    }

    /// Write rows as delimited text.
    pub fn write_delimited<I, R>(&self, location: impl Into<LocationArgs>, rows: I) -> WriteFluentBuilder
    where
        I: IntoIterator<Item = R>,
        R: Into<Row>,
    {
        let rows = rows.into_iter().map(Into::into).collect();
        WriteFluentBuilder::new(
            self.handle.clone(),
            location.into(),
            WriteBody::Value(Value::Delimited(rows)),
        )
    }

    /// Append a value to the end of an existing object.
    ///
    /// Constructs a fluent builder for the
    /// [`Append`](crate::operation::append::AppendFluentBuilder) operation.
    pub fn append(
        &self,
        location: impl Into<LocationArgs>,
        value: impl Into<Value>,
    ) -> AppendFluentBuilder {
        AppendFluentBuilder::new(
            self.handle.clone(),
            location.into(),
            WriteBody::Value(value.into()),
        )
    }

    /// Append a JSON value converted to the value kind given.
    pub fn append_as(
        &self,
        location: impl Into<LocationArgs>,
        kind: ValueKind,
        value: Json,
    ) -> AppendFluentBuilder {
        AppendFluentBuilder::new(self.handle.clone(), location.into(), WriteBody::Json(value))
            .kind(kind)
    }

    /// Delete one object, or several objects in the same bucket.
    pub async fn delete(&self, location: impl Into<LocationArgs>) -> Result<(), Error> {
        crate::operation::object::delete(&self.handle, location.into()).await
    }

    /// Whether the object exists.
    pub async fn exists(&self, location: impl Into<LocationArgs>) -> Result<bool, Error> {
        crate::operation::object::exists(&self.handle, location.into()).await
    }

    /// The size of the object in bytes.
    pub async fn size(&self, location: impl Into<LocationArgs>) -> Result<u64, Error> {
        crate::operation::object::size(&self.handle, location.into()).await
    }

    /// The tag-set of the object.
    pub async fn tags(
        &self,
        location: impl Into<LocationArgs>,
    ) -> Result<BTreeMap<String, String>, Error> {
        crate::operation::object::tags(&self.handle, location.into()).await
    }

    /// Replace the tag-set of the object.
    pub async fn set_tags(
        &self,
        location: impl Into<LocationArgs>,
        tags: impl Into<Tags>,
    ) -> Result<(), Error> {
        crate::operation::object::set_tags(&self.handle, location.into(), tags.into()).await
    }

    /// Apply a canned ACL to the object.
    pub async fn set_acl(
        &self,
        location: impl Into<LocationArgs>,
        acl: CannedAcl,
    ) -> Result<(), Error> {
        crate::operation::object::set_acl(&self.handle, location.into(), acl).await
    }

    /// Make the object publicly readable and return its public URL.
    pub async fn make_public(&self, location: impl Into<LocationArgs>) -> Result<String, Error> {
        crate::operation::object::make_public(&self.handle, location.into()).await
    }

    /// The public URL of an object or bucket.
    pub fn public_url(&self, location: impl Into<LocationArgs>) -> Result<String, Error> {
        crate::operation::object::public_url(location.into())
    }

    /// List the keys under a bucket or prefix.
    ///
    /// Constructs a fluent builder for the
    /// [`ListObjects`](crate::operation::list::ListObjectsFluentBuilder) operation.
    pub fn list_objects(&self, location: impl Into<LocationArgs>) -> ListObjectsFluentBuilder {
        ListObjectsFluentBuilder::new(self.handle.clone(), location.into())
    }

    /// Find which of a set of keys do not exist in a bucket.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// async fn missing(client: &aws_helpers::Client) -> Result<(), aws_helpers::error::Error> {
    ///     let missing = client
    ///         .find_keys_not_present()
    ///         .bucket("my-bucket")
    ///         .keys(["logs/2020/a.txt", "logs/2020/b.txt"])
    ///         .send()
    ///         .await?;
    ///     for candidate in missing {
    ///         println!("{}", candidate.key());
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn find_keys_not_present(&self) -> FindKeysNotPresentFluentBuilder<()> {
        FindKeysNotPresentFluentBuilder::new(self.handle.clone())
    }

    /// Find which of a set of keys do not exist in a bucket, carrying a payload per key.
    pub fn find_keys_not_present_with<T>(&self) -> FindKeysNotPresentFluentBuilder<T> {
        FindKeysNotPresentFluentBuilder::new(self.handle.clone())
    }

    /// Download an object to a local file.
    pub fn download(&self, location: impl Into<LocationArgs>) -> DownloadFluentBuilder {
        DownloadFluentBuilder::new(self.handle.clone(), location.into())
    }

    /// Download an object into an anonymous temp file, rewound to the start.
    pub async fn download_to_temp(
        &self,
        location: impl Into<LocationArgs>,
    ) -> Result<tokio::fs::File, Error> {
        crate::operation::transfer::download_to_temp(&self.handle, location.into()).await
    }

    /// Upload a local file to an object.
    pub fn upload(
        &self,
        location: impl Into<LocationArgs>,
        path: impl Into<PathBuf>,
    ) -> UploadFluentBuilder {
        UploadFluentBuilder::new(self.handle.clone(), location.into(), path.into())
    }

    /// Download a URL over HTTP and store it in an object.
    pub fn fetch(
        &self,
        url: impl Into<String>,
        location: impl Into<LocationArgs>,
    ) -> FetchFluentBuilder {
        FetchFluentBuilder::new(self.handle.clone(), url.into(), location.into())
    }

    /// Copy an object.
    pub fn copy(
        &self,
        source: impl Into<LocationArgs>,
        destination: impl Into<LocationArgs>,
    ) -> CopyFluentBuilder {
        CopyFluentBuilder::new(self.handle.clone(), source.into(), destination.into())
    }

    /// Move an object by copying it and deleting the source.
    pub async fn rename(
        &self,
        source: impl Into<LocationArgs>,
        destination: impl Into<LocationArgs>,
    ) -> Result<String, Error> {
        crate::operation::copy::rename(&self.handle, source.into(), destination.into()).await
    }

    /// Write a value under a random key, by default in this account's temp bucket.
    pub fn write_temp(&self, value: impl Into<Value>) -> WriteTempFluentBuilder {
        WriteTempFluentBuilder::new(self.handle.clone(), value.into())
    }

    /// Create a bucket and wait until it exists.
    pub fn create_bucket(&self, bucket: impl Into<String>) -> CreateBucketFluentBuilder {
        CreateBucketFluentBuilder::new(self.handle.clone(), bucket.into())
    }

    /// Delete an (empty) bucket and wait until it is gone.
    pub async fn delete_bucket(&self, bucket: impl Into<String>) -> Result<(), Error> {
        crate::operation::bucket::delete_bucket(&self.handle, &bucket.into()).await
    }

    /// Whether the bucket exists.
    pub async fn bucket_exists(&self, bucket: impl Into<String>) -> Result<bool, Error> {
        crate::operation::bucket::bucket_exists(&self.handle, &bucket.into()).await
    }

    /// The name of this account's temp bucket in the client's region, creating it if needed.
    pub async fn temp_bucket(&self) -> Result<String, Error> {
        crate::operation::bucket::temp_bucket(&self.handle).await
    }

    /// A lazily loaded handle for an object.
    pub fn object(&self, location: impl Into<LocationArgs>) -> Result<crate::resource::Object, Error> {
        crate::resource::Object::new(self.handle.clone(), location.into())
    }

    /// A handle for a bucket.
    pub fn bucket(&self, bucket: impl Into<String>) -> crate::resource::Bucket {
        crate::resource::Bucket::new(self.handle.clone(), bucket.into())
    }

    /// An MTurk client sharing this client's AWS session.
    pub fn mturk(
        &self,
        environment: crate::mturk::Environment,
    ) -> Result<crate::mturk::Client, Error> {
        let sdk_config = self.config().sdk_config().ok_or_else(|| {
            error::invalid_input("the client was not configured from a shared AWS config")
        })?;
        Ok(crate::mturk::Client::new(sdk_config, environment))
    }

    /// Read raw bytes; shorthand for `read(location).send()`.
    pub async fn read_bytes(&self, location: impl Into<LocationArgs>) -> Result<Bytes, Error> {
        self.read(location).send().await
    }
}
