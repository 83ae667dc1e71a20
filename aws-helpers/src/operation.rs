/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/// Setters shared by every builder that ends in a `PutObject` call.
///
/// The builder must have an `options: PutOptions` field.
macro_rules! put_option_setters {
    () => {
        /// Canned ACL to apply to the object.
        pub fn acl(mut self, acl: $crate::types::CannedAcl) -> Self {
            self.options.acl = Some(acl);
            self
        }

        /// Content type of the object, overriding the inferred one.
        pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
            self.options.content_type = Some(content_type.into());
            self
        }

        /// Content encoding (e.g. `gzip`) of the object.
        pub fn content_encoding(mut self, content_encoding: impl Into<String>) -> Self {
            self.options.content_encoding = Some(content_encoding.into());
            self
        }

        /// Content language of the object.
        pub fn content_language(mut self, content_language: impl Into<String>) -> Self {
            self.options.content_language = Some(content_language.into());
            self
        }

        /// Add one user-defined metadata entry.
        pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
            self.options
                .metadata
                .get_or_insert_with(Default::default)
                .insert(key.into(), value.into());
            self
        }

        /// Server-side encryption algorithm.
        pub fn server_side_encryption(
            mut self,
            sse: aws_sdk_s3::types::ServerSideEncryption,
        ) -> Self {
            self.options.server_side_encryption = Some(sse);
            self
        }

        /// KMS key used with `aws:kms` server-side encryption.
        pub fn sse_kms_key_id(mut self, key_id: impl Into<String>) -> Self {
            self.options.sse_kms_key_id = Some(key_id.into());
            self
        }

        /// Storage class to write the object to.
        pub fn storage_class(mut self, storage_class: $crate::types::StorageClass) -> Self {
            self.options.storage_class = Some(storage_class);
            self
        }

        /// Tag-set to attach to the object.
        pub fn tags(mut self, tags: impl Into<$crate::types::Tags>) -> Self {
            self.options.tags = Some(tags.into());
            self
        }

        /// Replace all put options at once.
        pub fn put_options(mut self, options: $crate::operation::PutOptions) -> Self {
            self.options = options;
            self
        }
    };
}

mod put_options;
pub use put_options::PutOptions;

/// Reading objects
pub mod read;

/// Writing objects
pub mod write;

/// Appending to objects
pub mod append;

/// Single object helpers (existence, size, tags, ACLs, deletion)
pub mod object;

/// Listing keys
pub mod list;

/// Transfers between objects and local files or URLs
pub mod transfer;

/// Copy, rename and temp objects
pub mod copy;

/// Bucket lifecycle
pub mod bucket;
