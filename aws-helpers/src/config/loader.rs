/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_s3::config::{Credentials, Region};
use aws_types::SdkConfig;

use crate::config::Builder;
use crate::Config;

const CREDENTIALS_PROVIDER_NAME: &str = "aws-helpers";

/// Load [`Config`] from the environment.
///
/// Explicit credentials, region or profile override whatever the default AWS provider
/// chain would resolve. Loading again yields an independent configuration; clients built
/// from an earlier one are unaffected.
#[derive(Default, Debug)]
pub struct ConfigLoader {
    builder: Builder,
    access_key_id: Option<String>,
    secret_access_key: Option<String>,
    session_token: Option<String>,
    region: Option<String>,
    profile_name: Option<String>,
    sdk_config: Option<SdkConfig>,
}

impl ConfigLoader {
    /// Use a static access key id (requires [`secret_access_key`](Self::secret_access_key)).
    pub fn access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    /// The secret key paired with [`access_key_id`](Self::access_key_id).
    pub fn secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// A session token for temporary credentials.
    pub fn session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// The region to send requests to.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// The named profile to load from the shared AWS config files.
    pub fn profile_name(mut self, profile_name: impl Into<String>) -> Self {
        self.profile_name = Some(profile_name.into());
        self
    }

    /// Reuse an already loaded SDK configuration instead of resolving a new one.
    ///
    /// Credential, region and profile overrides are ignored when this is set.
    pub fn sdk_config(mut self, sdk_config: SdkConfig) -> Self {
        self.sdk_config = Some(sdk_config);
        self
    }

    /// Set the identifier temp bucket names are derived from.
    pub fn temp_bucket_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.builder = self.builder.temp_bucket_identifier(identifier);
        self
    }

    /// Load the default configuration
    ///
    /// If fields have been overridden during builder construction, the override values will be
    /// used. Otherwise, the default AWS provider chain is used.
    pub async fn load(self) -> Config {
        let sdk_config = match self.sdk_config {
            Some(sdk_config) => sdk_config,
            None => {
                let mut loader = aws_config::from_env();
                if let Some(profile_name) = self.profile_name.as_deref() {
                    loader = loader.profile_name(profile_name);
                }
                if let Some(region) = self.region {
                    loader = loader.region(Region::new(region));
                }
                if let (Some(access_key_id), Some(secret_access_key)) =
                    (self.access_key_id, self.secret_access_key)
                {
                    loader = loader.credentials_provider(Credentials::new(
                        access_key_id,
                        secret_access_key,
                        self.session_token,
                        None,
                        CREDENTIALS_PROVIDER_NAME,
                    ));
                }
                loader.load().await
            }
        };
        tracing::debug!(region = ?sdk_config.region(), "loaded shared AWS config");

        self.builder
            .client(aws_sdk_s3::Client::new(&sdk_config))
            .sts_client(aws_sdk_sts::Client::new(&sdk_config))
            .sdk_config(sdk_config)
            .build()
    }
}
