/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::collections::BTreeMap;

use aws_sdk_s3::types::{ObjectCannedAcl, StorageClass as SdkStorageClass};

/// Canned (predefined) access control policies that can be applied to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CannedAcl {
    /// Owner gets full control, no one else has access rights
    Private,
    /// Owner gets full control, everyone else gets read access
    PublicRead,
    /// Owner gets full control, everyone else gets read and write access
    PublicReadWrite,
    /// Owner gets full control, authenticated AWS users get read access
    AuthenticatedRead,
    /// Owner gets full control, Amazon EC2 gets read access to bundles
    AwsExecRead,
    /// Object owner gets full control, bucket owner gets read access
    BucketOwnerRead,
    /// Both the object owner and bucket owner get full control
    BucketOwnerFullControl,
}

impl CannedAcl {
    /// The ACL name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            CannedAcl::Private => "private",
            CannedAcl::PublicRead => "public-read",
            CannedAcl::PublicReadWrite => "public-read-write",
            CannedAcl::AuthenticatedRead => "authenticated-read",
            CannedAcl::AwsExecRead => "aws-exec-read",
            CannedAcl::BucketOwnerRead => "bucket-owner-read",
            CannedAcl::BucketOwnerFullControl => "bucket-owner-full-control",
        }
    }
}

impl From<CannedAcl> for ObjectCannedAcl {
    fn from(value: CannedAcl) -> Self {
        ObjectCannedAcl::from(value.as_str())
    }
}

/// Storage classes an object can be written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageClass {
    /// Frequently accessed data
    Standard,
    /// Noncritical, reproducible data
    ReducedRedundancy,
    /// Long-lived, infrequently accessed data
    StandardIa,
    /// Infrequently accessed data stored in a single availability zone
    OnezoneIa,
    /// Data with unknown or changing access patterns
    IntelligentTiering,
    /// Archive data
    Glacier,
    /// Long-term archive data
    DeepArchive,
}

impl StorageClass {
    /// The storage class name as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::ReducedRedundancy => "REDUCED_REDUNDANCY",
            StorageClass::StandardIa => "STANDARD_IA",
            StorageClass::OnezoneIa => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageClass::Glacier => "GLACIER",
            StorageClass::DeepArchive => "DEEP_ARCHIVE",
        }
    }
}

impl From<StorageClass> for SdkStorageClass {
    fn from(value: StorageClass) -> Self {
        SdkStorageClass::from(value.as_str())
    }
}

/// The tag-set to attach to an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tags {
    /// Key/value pairs, form-urlencoded when sent
    Map(BTreeMap<String, String>),
    /// An already url-encoded `k1=v1&k2=v2` string
    Encoded(String),
}

impl Tags {
    /// Render the tag-set in the `x-amz-tagging` header format.
    pub fn to_header(&self) -> String {
        match self {
            Tags::Map(tags) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(tags.iter())
                .finish(),
            Tags::Encoded(encoded) => encoded.clone(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Tags::Map(tags) => tags.is_empty(),
            Tags::Encoded(encoded) => encoded.is_empty(),
        }
    }
}

impl<K, V> FromIterator<(K, V)> for Tags
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Tags::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for Tags {
    fn from(value: BTreeMap<String, String>) -> Self {
        Tags::Map(value)
    }
}

impl From<&str> for Tags {
    fn from(value: &str) -> Self {
        Tags::Encoded(value.to_owned())
    }
}

/// The format an object should be read or written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// Plain text
    Text,
    /// A single JSON object
    Mapping,
    /// One JSON document per line
    JsonLines,
    /// One plain text value per line
    Lines,
    /// Rows of delimited values (e.g. CSV)
    Delimited,
    /// A raster image
    Image,
    /// Opaque bytes
    Bytes,
    /// A flat array of `f64` values in native little-endian layout
    Array,
}

/// A column to project out of delimited rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    /// Positional column of a list row
    Index(usize),
    /// Named column of a mapping row
    Key(String),
}

impl From<usize> for Column {
    fn from(value: usize) -> Self {
        Column::Index(value)
    }
}

impl From<&str> for Column {
    fn from(value: &str) -> Self {
        Column::Key(value.to_owned())
    }
}

impl From<String> for Column {
    fn from(value: String) -> Self {
        Column::Key(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_form_urlencoded() {
        let tags: Tags = [("project", "alpha beta"), ("owner", "a&b")]
            .into_iter()
            .collect();
        assert_eq!("owner=a%26b&project=alpha+beta", tags.to_header());
    }

    #[test]
    fn test_encoded_tags_pass_through() {
        let tags = Tags::from("k=v");
        assert_eq!("k=v", tags.to_header());
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            ObjectCannedAcl::PublicRead,
            ObjectCannedAcl::from(CannedAcl::PublicRead)
        );
        assert_eq!(
            SdkStorageClass::DeepArchive,
            SdkStorageClass::from(StorageClass::DeepArchive)
        );
    }
}
