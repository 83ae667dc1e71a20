/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::BTreeMap;

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::types::{Delete, ObjectIdentifier, Tag, Tagging};

use crate::client::Handle;
use crate::error::{self, Error, ErrorCode};
use crate::location::{
    bucket_url, object_url, resolve_location, Keys, LocationArgs, LocationPolicy,
};
use crate::types::{CannedAcl, Tags};

/// Maximum number of keys a single `DeleteObjects` request accepts
const MAX_DELETE_BATCH: usize = 1000;

pub(crate) async fn delete(handle: &Handle, location: LocationArgs) -> Result<(), Error> {
    let (bucket, keys) = resolve_location(&location, &LocationPolicy::OBJECTS)?.into_parts();
    let bucket = bucket.unwrap_or_default();
    match keys {
        Keys::One(key) => {
            tracing::debug!(%bucket, %key, "deleting object");
            handle
                .s3()
                .delete_object()
                .bucket(&bucket)
                .key(key)
                .send()
                .await?;
        }
        Keys::Many(keys) => {
            for batch in keys.chunks(MAX_DELETE_BATCH) {
                tracing::debug!(%bucket, count = batch.len(), "deleting objects");
                let objects = batch
                    .iter()
                    .map(|key| ObjectIdentifier::builder().key(key).build())
                    .collect::<Result<Vec<_>, _>>()?;
                let delete = Delete::builder()
                    .set_objects(Some(objects))
                    .quiet(true)
                    .build()?;
                let output = handle
                    .s3()
                    .delete_objects()
                    .bucket(&bucket)
                    .delete(delete)
                    .send()
                    .await?;
                if let Some(failed) = output.errors().first() {
                    let code = ErrorCode::from(failed.code().unwrap_or_default());
                    let message = format!(
                        "failed to delete `{}`: {}",
                        failed.key().unwrap_or_default(),
                        failed.message().unwrap_or_default()
                    );
                    return Err(Error::new(error::ErrorKind::ServiceError, message).with_code(code));
                }
            }
        }
        Keys::None => return Err(error::invalid_input("a key must be provided")),
    }
    Ok(())
}

/// `HeadObject`, mapping a missing object to `None`.
pub(crate) async fn head(
    handle: &Handle,
    bucket: &str,
    key: &str,
) -> Result<Option<HeadObjectOutput>, Error> {
    match handle.s3().head_object().bucket(bucket).key(key).send().await {
        Ok(output) => Ok(Some(output)),
        Err(SdkError::ServiceError(err)) if err.err().is_not_found() => Ok(None),
        Err(err) => {
            let err = Error::from(err);
            if err.is_not_found() {
                Ok(None)
            } else {
                Err(err)
            }
        }
    }
}

fn not_found(bucket: &str, key: &str) -> Error {
    Error::new(
        error::ErrorKind::NotFound,
        format!("s3://{bucket}/{key} does not exist"),
    )
    .with_code(ErrorCode::NotFound)
}

pub(crate) async fn exists(handle: &Handle, location: LocationArgs) -> Result<bool, Error> {
    let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
    Ok(head(handle, &bucket, &key).await?.is_some())
}

pub(crate) async fn size(handle: &Handle, location: LocationArgs) -> Result<u64, Error> {
    let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
    let output = head(handle, &bucket, &key)
        .await?
        .ok_or_else(|| not_found(&bucket, &key))?;
    Ok(output.content_length().unwrap_or_default().max(0) as u64)
}

pub(crate) async fn tags(
    handle: &Handle,
    location: LocationArgs,
) -> Result<BTreeMap<String, String>, Error> {
    let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
    let output = handle
        .s3()
        .get_object_tagging()
        .bucket(bucket)
        .key(key)
        .send()
        .await?;
    Ok(output
        .tag_set()
        .iter()
        .map(|tag| (tag.key().to_owned(), tag.value().to_owned()))
        .collect())
}

pub(crate) async fn set_tags(
    handle: &Handle,
    location: LocationArgs,
    tags: Tags,
) -> Result<(), Error> {
    let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
    let pairs: Vec<(String, String)> = match tags {
        Tags::Map(map) => map.into_iter().collect(),
        Tags::Encoded(encoded) => url::form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect(),
    };
    let tag_set = pairs
        .into_iter()
        .map(|(k, v)| Tag::builder().key(k).value(v).build())
        .collect::<Result<Vec<_>, _>>()?;
    let tagging = Tagging::builder().set_tag_set(Some(tag_set)).build()?;
    handle
        .s3()
        .put_object_tagging()
        .bucket(bucket)
        .key(key)
        .tagging(tagging)
        .send()
        .await?;
    Ok(())
}

pub(crate) async fn set_acl(
    handle: &Handle,
    location: LocationArgs,
    acl: CannedAcl,
) -> Result<(), Error> {
    let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
    tracing::debug!(%bucket, %key, acl = acl.as_str(), "setting object ACL");
    handle
        .s3()
        .put_object_acl()
        .bucket(bucket)
        .key(key)
        .acl(acl.into())
        .send()
        .await?;
    Ok(())
}

pub(crate) async fn make_public(handle: &Handle, location: LocationArgs) -> Result<String, Error> {
    let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
    set_acl(
        handle,
        LocationArgs::new().bucket(&bucket).key(&key),
        CannedAcl::PublicRead,
    )
    .await?;
    Ok(object_url(&bucket, &key))
}

pub(crate) fn public_url(location: LocationArgs) -> Result<String, Error> {
    let resolved = resolve_location(&location, &LocationPolicy::ANY)?;
    match (resolved.bucket(), resolved.key()) {
        (Some(bucket), Some(key)) if !key.is_empty() => Ok(object_url(bucket, key)),
        (Some(bucket), _) => Ok(bucket_url(bucket)),
        (None, _) => Err(error::invalid_input("a bucket must be provided")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use aws_sdk_s3::operation::delete_objects::DeleteObjectsOutput;
    use aws_sdk_s3::operation::head_object::{HeadObjectError, HeadObjectOutput};
    use aws_sdk_s3::types::error::NotFound;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use test_common::mock_client_with_stubbed_http_client;

    #[tokio::test]
    async fn test_exists_maps_not_found_to_false() {
        let head = mock!(aws_sdk_s3::Client::head_object)
            .then_error(|| HeadObjectError::NotFound(NotFound::builder().build()));
        let s3 =
            mock_client_with_stubbed_http_client!(aws_sdk_s3, RuleMode::MatchAny, &[&head]);
        let client = crate::Client::new(Config::builder().client(s3).build());
        assert!(!client.exists("s3://test-bucket/missing").await.unwrap());
        assert!(client
            .size("s3://test-bucket/missing")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn test_exists_and_size() {
        let head = mock!(aws_sdk_s3::Client::head_object)
            .match_requests(|r| r.key() == Some("present"))
            .then_output(|| HeadObjectOutput::builder().content_length(42).build());
        let s3 = mock_client!(aws_sdk_s3, RuleMode::MatchAny, &[&head]);
        let client = crate::Client::new(Config::builder().client(s3).build());
        assert!(client.exists(("test-bucket", "present")).await.unwrap());
        assert_eq!(42, client.size(("test-bucket", "present")).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_many_in_one_batch() {
        let delete = mock!(aws_sdk_s3::Client::delete_objects)
            .match_requests(|r| {
                r.bucket() == Some("test-bucket")
                    && r.delete().map(|d| d.objects().len()) == Some(2)
                    && r.delete().and_then(|d| d.quiet()) == Some(true)
            })
            .then_output(|| DeleteObjectsOutput::builder().build());
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[&delete]);
        let client = crate::Client::new(Config::builder().client(s3).build());

        let uris = vec![
            "s3://test-bucket/a".to_owned(),
            "s3://test-bucket/b".to_owned(),
        ];
        client.delete(uris).await.unwrap();
    }

    #[test]
    fn test_public_url() {
        assert_eq!(
            "https://test-bucket.s3.amazonaws.com/a%20b/c.txt",
            public_url(LocationArgs::from("s3://test-bucket/a b/c.txt")).unwrap()
        );
        assert_eq!(
            "https://test-bucket.s3.amazonaws.com",
            public_url(LocationArgs::from("test-bucket")).unwrap()
        );
        assert!(public_url(LocationArgs::new()).is_err());
    }
}
