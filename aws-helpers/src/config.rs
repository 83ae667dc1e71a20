/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_types::region::Region;
use aws_types::SdkConfig;

pub(crate) mod loader;

/// Configuration for a [`Client`](crate::client::Client)
#[derive(Debug, Clone)]
pub struct Config {
    client: aws_sdk_s3::Client,
    sts_client: Option<aws_sdk_sts::Client>,
    temp_bucket_identifier: Option<String>,
    sdk_config: Option<SdkConfig>,
}

impl Config {
    /// Create a new `Config` builder
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// The Amazon S3 client instance that will be used to send requests to S3.
    pub fn client(&self) -> &aws_sdk_s3::Client {
        &self.client
    }

    /// The AWS STS client used to look up the caller's account, if configured.
    pub fn sts_client(&self) -> Option<&aws_sdk_sts::Client> {
        self.sts_client.as_ref()
    }

    /// The region requests are sent to.
    pub fn region(&self) -> Option<&Region> {
        self.client.config().region()
    }

    /// The identifier temp bucket names are derived from, when set explicitly.
    pub fn temp_bucket_identifier(&self) -> Option<&str> {
        self.temp_bucket_identifier.as_deref()
    }

    /// The shared SDK configuration the clients were created from, if known.
    pub fn sdk_config(&self) -> Option<&SdkConfig> {
        self.sdk_config.as_ref()
    }
}

/// Fluent style builder for [Config]
#[derive(Debug, Clone, Default)]
pub struct Builder {
    client: Option<aws_sdk_s3::Client>,
    sts_client: Option<aws_sdk_sts::Client>,
    temp_bucket_identifier: Option<String>,
    sdk_config: Option<SdkConfig>,
}

impl Builder {
    /// Set an explicit S3 client to use.
    pub fn client(mut self, client: aws_sdk_s3::Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the STS client used to resolve the account id for temp bucket names.
    pub fn sts_client(mut self, client: aws_sdk_sts::Client) -> Self {
        self.sts_client = Some(client);
        self
    }

    /// Set the identifier temp bucket names are derived from.
    ///
    /// Defaults to the caller's AWS account id (requires an STS client).
    pub fn temp_bucket_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.temp_bucket_identifier = Some(identifier.into());
        self
    }

    /// Keep the shared SDK configuration, so other service clients can reuse the session.
    pub fn sdk_config(mut self, sdk_config: SdkConfig) -> Self {
        self.sdk_config = Some(sdk_config);
        self
    }

    /// Consumes the builder and constructs a [`Config`]
    ///
    /// # Panics
    ///
    /// Panics if no S3 client was set.
    pub fn build(self) -> Config {
        Config {
            client: self.client.expect("client set"),
            sts_client: self.sts_client,
            temp_bucket_identifier: self.temp_bucket_identifier,
            sdk_config: self.sdk_config,
        }
    }
}
