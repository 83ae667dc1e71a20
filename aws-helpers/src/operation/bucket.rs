/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::sync::Arc;
use std::time::Duration;

use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};

use crate::client::Handle;
use crate::error::{self, Error, ErrorKind};

/// Region where buckets must be created without a location constraint
const DEFAULT_REGION: &str = "us-east-1";

const WAIT_ATTEMPTS: u32 = 20;
const WAIT_INTERVAL: Duration = Duration::from_secs(5);

/// Fluent builder for creating a bucket
#[derive(Debug)]
pub struct CreateBucketFluentBuilder {
    handle: Arc<Handle>,
    bucket: String,
    region: Option<String>,
}

impl CreateBucketFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, bucket: String) -> Self {
        Self {
            handle,
            bucket,
            region: None,
        }
    }

    /// Region to create the bucket in, the client's region by default.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Create the bucket and wait until it exists, returning its name.
    pub async fn send(self) -> Result<String, Error> {
        create_bucket(&self.handle, &self.bucket, self.region).await?;
        Ok(self.bucket)
    }
}

async fn create_bucket(handle: &Handle, bucket: &str, region: Option<String>) -> Result<(), Error> {
    if bucket.is_empty() {
        return Err(error::invalid_input("a bucket must be provided"));
    }
    let region = region.or_else(|| handle.config.region().map(|r| r.to_string()));
    tracing::debug!(%bucket, ?region, "creating bucket");

    let mut request = handle.s3().create_bucket().bucket(bucket);
    if let Some(region) = region.filter(|r| r != DEFAULT_REGION) {
        request = request.create_bucket_configuration(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region.as_str()))
                .build(),
        );
    }
    request.send().await?;
    wait_until(handle, bucket, true).await
}

pub(crate) async fn delete_bucket(handle: &Handle, bucket: &str) -> Result<(), Error> {
    tracing::debug!(%bucket, "deleting bucket");
    handle.s3().delete_bucket().bucket(bucket).send().await?;
    wait_until(handle, bucket, false).await
}

pub(crate) async fn bucket_exists(handle: &Handle, bucket: &str) -> Result<bool, Error> {
    match handle.s3().head_bucket().bucket(bucket).send().await {
        Ok(_) => Ok(true),
        Err(SdkError::ServiceError(err)) if err.err().is_not_found() => Ok(false),
        Err(err) => {
            let err = Error::from(err);
            if err.is_not_found() {
                Ok(false)
            } else {
                Err(err)
            }
        }
    }
}

/// Poll `HeadBucket` until the bucket's existence matches `exists`.
async fn wait_until(handle: &Handle, bucket: &str, exists: bool) -> Result<(), Error> {
    for attempt in 0..WAIT_ATTEMPTS {
        if bucket_exists(handle, bucket).await? == exists {
            return Ok(());
        }
        tracing::trace!(%bucket, attempt, exists, "waiting for bucket");
        tokio::time::sleep(WAIT_INTERVAL).await;
    }
    Err(Error::new(
        ErrorKind::ServiceError,
        format!("timed out waiting for bucket `{bucket}`"),
    ))
}

/// The per-account, per-region scratch bucket name.
pub(crate) fn temp_bucket_name(identifier: &str, region: &str) -> String {
    format!("{identifier}-tmp-{region}")
}

pub(crate) async fn temp_bucket(handle: &Handle) -> Result<String, Error> {
    let config = &handle.config;
    let identifier = match config.temp_bucket_identifier() {
        Some(identifier) => identifier.to_owned(),
        None => {
            let sts = config.sts_client().ok_or_else(|| {
                error::invalid_input(
                    "a temp bucket identifier or an STS client must be configured",
                )
            })?;
            sts.get_caller_identity()
                .send()
                .await?
                .account()
                .map(str::to_owned)
                .ok_or_else(|| {
                    Error::new(ErrorKind::ServiceError, "caller identity has no account")
                })?
        }
    };
    let region = config
        .region()
        .map(|r| r.to_string())
        .unwrap_or_else(|| DEFAULT_REGION.to_owned());
    let bucket = temp_bucket_name(&identifier, &region);

    if !bucket_exists(handle, &bucket).await? {
        create_bucket(handle, &bucket, Some(region)).await?;
    }
    Ok(bucket)
}

#[cfg(test)]
mod tests {
    use crate::Config;
    use aws_sdk_s3::config::Region;
    use aws_sdk_s3::operation::create_bucket::CreateBucketOutput;
    use aws_sdk_s3::operation::head_bucket::{HeadBucketError, HeadBucketOutput};
    use aws_sdk_s3::types::error::NotFound;
    use aws_sdk_s3::types::BucketLocationConstraint;
    use aws_smithy_mocks_experimental::{mock, RuleMode};
    use test_common::mock_client_with_stubbed_http_client;

    fn client_in(
        region: &'static str,
        rules: &[&aws_smithy_mocks_experimental::Rule],
    ) -> crate::Client {
        let s3 = mock_client_with_stubbed_http_client!(aws_sdk_s3, RuleMode::Sequential, rules);
        let s3 = aws_sdk_s3::Client::from_conf(
            s3.config()
                .to_builder()
                .region(Region::new(region))
                .build(),
        );
        crate::Client::new(
            Config::builder()
                .client(s3)
                .temp_bucket_identifier("123456789012")
                .build(),
        )
    }

    #[tokio::test]
    async fn test_bucket_exists_not_found() {
        let head = mock!(aws_sdk_s3::Client::head_bucket)
            .then_error(|| HeadBucketError::NotFound(NotFound::builder().build()));
        let client = client_in("us-east-1", &[&head]);
        assert!(!client.bucket_exists("missing-bucket").await.unwrap());
    }

    #[tokio::test]
    async fn test_temp_bucket_created_with_location_constraint() {
        let missing = mock!(aws_sdk_s3::Client::head_bucket)
            .match_requests(|r| r.bucket() == Some("123456789012-tmp-eu-west-1"))
            .then_error(|| HeadBucketError::NotFound(NotFound::builder().build()));
        let create = mock!(aws_sdk_s3::Client::create_bucket)
            .match_requests(|r| {
                r.bucket() == Some("123456789012-tmp-eu-west-1")
                    && r
                        .create_bucket_configuration()
                        .and_then(|c| c.location_constraint())
                        == Some(&BucketLocationConstraint::EuWest1)
            })
            .then_output(|| CreateBucketOutput::builder().build());
        let present = mock!(aws_sdk_s3::Client::head_bucket)
            .then_output(|| HeadBucketOutput::builder().build());
        let client = client_in("eu-west-1", &[&missing, &create, &present]);

        assert_eq!(
            "123456789012-tmp-eu-west-1",
            client.temp_bucket().await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_existing_temp_bucket_is_reused() {
        let present = mock!(aws_sdk_s3::Client::head_bucket)
            .then_output(|| HeadBucketOutput::builder().build());
        let client = client_in("us-east-1", &[&present]);
        assert_eq!(
            "123456789012-tmp-us-east-1",
            client.temp_bucket().await.unwrap()
        );
    }
}
