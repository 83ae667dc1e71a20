/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::HashMap;

use aws_sdk_s3::operation::put_object::builders::PutObjectFluentBuilder;
use aws_sdk_s3::types::ServerSideEncryption;

use crate::types::{CannedAcl, StorageClass, Tags};

/// Object attributes sent along with a `PutObject` request.
#[derive(Debug, Clone, Default)]
pub struct PutOptions {
    pub(crate) acl: Option<CannedAcl>,
    pub(crate) content_type: Option<String>,
    pub(crate) content_encoding: Option<String>,
    pub(crate) content_language: Option<String>,
    pub(crate) metadata: Option<HashMap<String, String>>,
    pub(crate) server_side_encryption: Option<ServerSideEncryption>,
    pub(crate) sse_kms_key_id: Option<String>,
    pub(crate) storage_class: Option<StorageClass>,
    pub(crate) tags: Option<Tags>,
}

impl PutOptions {
    /// Create an empty set of options
    pub fn new() -> Self {
        Self::default()
    }

    /// Canned ACL to apply to the object.
    pub fn acl(mut self, acl: CannedAcl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Content type of the object.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Storage class to write the object to.
    pub fn storage_class(mut self, storage_class: StorageClass) -> Self {
        self.storage_class = Some(storage_class);
        self
    }

    /// Tag-set to attach to the object.
    pub fn tags(mut self, tags: impl Into<Tags>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    /// Apply the options to a request; an explicit content type wins over `inferred`.
    pub(crate) fn apply(
        self,
        request: PutObjectFluentBuilder,
        inferred_content_type: Option<String>,
    ) -> PutObjectFluentBuilder {
        request
            .set_acl(self.acl.map(Into::into))
            .set_content_type(self.content_type.or(inferred_content_type))
            .set_content_encoding(self.content_encoding)
            .set_content_language(self.content_language)
            .set_metadata(self.metadata)
            .set_server_side_encryption(self.server_side_encryption)
            .set_ssekms_key_id(self.sse_kms_key_id)
            .set_storage_class(self.storage_class.map(Into::into))
            .set_tagging(
                self.tags
                    .filter(|tags| !tags.is_empty())
                    .map(|tags| tags.to_header()),
            )
    }
}
