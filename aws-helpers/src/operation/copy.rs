/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;

use percent_encoding::utf8_percent_encode;

use crate::client::Handle;
use crate::codec::{self, DelimitedOptions, TextOptions};
use crate::error::Error;
use crate::location::{
    compose_uri, resolve_location, LocationArgs, LocationPolicy, KEY_QUOTE_SET,
};
use crate::operation::write::{put_encoded, WriteBody};
use crate::operation::PutOptions;
use crate::types::{CannedAcl, StorageClass, ValueKind};
use crate::value::Value;

/// Fluent builder for copying an object
#[derive(Debug)]
pub struct CopyFluentBuilder {
    handle: Arc<Handle>,
    source: LocationArgs,
    destination: LocationArgs,
    acl: Option<CannedAcl>,
    storage_class: Option<StorageClass>,
}

impl CopyFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, source: LocationArgs, destination: LocationArgs) -> Self {
        Self {
            handle,
            source,
            destination,
            acl: None,
            storage_class: None,
        }
    }

    /// Canned ACL to apply to the copy.
    pub fn acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Storage class of the copy.
    pub fn storage_class(mut self, storage_class: StorageClass) -> Self {
        self.storage_class = Some(storage_class);
        self
    }

    /// Copy the object, returning the `s3://` URI of the copy.
    ///
    /// When the destination names only a bucket the source key is reused.
    pub async fn send(self) -> Result<String, Error> {
        let source = resolve_location(&self.source, &LocationPolicy::OBJECT)?;
        let destination = resolve_location(&self.destination, &LocationPolicy::PREFIX)?;
        let (src_bucket, src_key) = source.into_object()?;
        let dst_bucket = destination.bucket().unwrap_or_default().to_owned();
        let dst_key = destination
            .key()
            .filter(|key| !key.is_empty())
            .unwrap_or(&src_key)
            .to_owned();

        let copy_source = format!(
            "{src_bucket}/{}",
            utf8_percent_encode(&src_key, KEY_QUOTE_SET)
        );
        tracing::debug!(%copy_source, %dst_bucket, %dst_key, "copying object");
        self.handle
            .s3()
            .copy_object()
            .copy_source(copy_source)
            .bucket(&dst_bucket)
            .key(&dst_key)
            .set_acl(self.acl.map(Into::into))
            .set_storage_class(self.storage_class.map(Into::into))
            .send()
            .await?;
        Ok(compose_uri(&dst_bucket, Some(&dst_key)))
    }
}

pub(crate) async fn rename(
    handle: &Arc<Handle>,
    source: LocationArgs,
    destination: LocationArgs,
) -> Result<String, Error> {
    let (src_bucket, src_key) = resolve_location(&source, &LocationPolicy::OBJECT)?.into_object()?;
    let uri = CopyFluentBuilder::new(
        handle.clone(),
        LocationArgs::new().bucket(&src_bucket).key(&src_key),
        destination,
    )
    .send()
    .await?;
    if uri != compose_uri(&src_bucket, Some(&src_key)) {
        handle
            .s3()
            .delete_object()
            .bucket(src_bucket)
            .key(src_key)
            .send()
            .await?;
    }
    Ok(uri)
}

/// Fluent builder for writing a value under a random key in a temp bucket
#[derive(Debug)]
pub struct WriteTempFluentBuilder {
    handle: Arc<Handle>,
    body: WriteBody,
    kind: Option<ValueKind>,
    bucket: Option<String>,
    prefix: String,
    options: PutOptions,
}

impl WriteTempFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, value: Value) -> Self {
        Self {
            handle,
            body: WriteBody::Value(value),
            kind: None,
            bucket: None,
            prefix: String::new(),
            options: PutOptions::default(),
        }
    }

    /// Bucket to write to instead of the account's temp bucket.
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Prefix prepended to the random key.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Require the value to be of `kind`.
    pub fn kind(mut self, kind: ValueKind) -> Self {
        self.kind = Some(kind);
        self
    }

    put_option_setters!();

    /// Write the value, returning the `s3://` URI of the temp object.
    pub async fn send(self) -> Result<String, Error> {
        let bucket = match self.bucket {
            Some(bucket) => bucket,
            None => crate::operation::bucket::temp_bucket(&self.handle).await?,
        };
        let key = format!("{}{}", self.prefix, uuid::Uuid::new_v4());
        let value = self.body.into_value(self.kind)?;
        let encoded = codec::encode(
            &value,
            &key,
            &TextOptions::default(),
            &DelimitedOptions::default(),
        )?;
        let spool = matches!(value, Value::Array(_));
        put_encoded(&self.handle, &bucket, &key, encoded, self.options, spool).await?;
        Ok(compose_uri(&bucket, Some(&key)))
    }
}

#[cfg(test)]
mod tests {
    use crate::location::decompose_uri;
    use crate::Config;
    use aws_sdk_s3::operation::copy_object::CopyObjectOutput;
    use aws_sdk_s3::operation::delete_object::DeleteObjectOutput;
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};

    #[tokio::test]
    async fn test_rename_copies_then_deletes() {
        let copy = mock!(aws_sdk_s3::Client::copy_object)
            .match_requests(|r| {
                r.copy_source() == Some("src-bucket/a%20b.txt")
                    && r.bucket() == Some("dst-bucket")
                    && r.key() == Some("a b.txt")
            })
            .then_output(|| CopyObjectOutput::builder().build());
        let delete = mock!(aws_sdk_s3::Client::delete_object)
            .match_requests(|r| r.bucket() == Some("src-bucket") && r.key() == Some("a b.txt"))
            .then_output(|| DeleteObjectOutput::builder().build());
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&copy, &delete]);
        let client = crate::Client::new(Config::builder().client(s3).build());

        let uri = client
            .rename("s3://src-bucket/a b.txt", "dst-bucket")
            .await
            .unwrap();
        assert_eq!("s3://dst-bucket/a b.txt", uri);
    }

    #[tokio::test]
    async fn test_write_temp_uses_prefix_and_random_key() {
        let put = mock!(aws_sdk_s3::Client::put_object)
            .match_requests(|r| {
                r.bucket() == Some("scratch")
                    && r.key().is_some_and(|k| k.starts_with("annotations/"))
                    && r.content_type() == Some("application/json")
            })
            .then_output(|| PutObjectOutput::builder().build());
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&put]);
        let client = crate::Client::new(Config::builder().client(s3).build());

        let uri = client
            .write_temp(serde_json::json!({"a": 1}))
            .bucket("scratch")
            .prefix("annotations/")
            .send()
            .await
            .unwrap();
        let (bucket, key) = decompose_uri(&uri);
        assert_eq!(Some("scratch".to_owned()), bucket);
        let key = key.unwrap();
        let id = key.strip_prefix("annotations/").unwrap();
        assert!(uuid::Uuid::parse_str(id).is_ok());
    }
}
