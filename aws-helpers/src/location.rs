/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Resolution of the different ways an S3 object can be addressed.
//!
//! Operations accept either positional values or named `bucket`/`key`/`uri` values:
//!
//! ```
//! use aws_helpers::location::{resolve_location, LocationArgs, LocationPolicy};
//!
//! let by_uri = LocationArgs::from("s3://my-bucket/path/to/key.json");
//! let by_pair = LocationArgs::from(("my-bucket", "path/to/key.json"));
//! let named = LocationArgs::new().bucket("my-bucket").key("path/to/key.json");
//!
//! for args in [by_uri, by_pair, named] {
//!     let resolved = resolve_location(&args, &LocationPolicy::OBJECT).unwrap();
//!     assert_eq!(Some("my-bucket"), resolved.bucket());
//!     assert_eq!(Some("path/to/key.json"), resolved.key());
//! }
//! ```

use std::sync::OnceLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use crate::error::{self, Error};

const URI_SCHEME_PREFIX: &str = "s3:";

/// Characters left unescaped when quoting a key for a URL (`/` is kept as a path separator).
pub(crate) const KEY_QUOTE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

fn uri_regex() -> &'static Regex {
    static URI_REGEX: OnceLock<Regex> = OnceLock::new();
    URI_REGEX.get_or_init(|| Regex::new("^[sS]3://([a-z0-9.-]{3,})/?(.*)").expect("valid regex"))
}

/// Compose a bucket and optional key into an `s3://` URI.
pub fn compose_uri(bucket: &str, key: Option<&str>) -> String {
    match key {
        Some(key) if !key.is_empty() => format!("s3://{bucket}/{key}"),
        _ => format!("s3://{bucket}/"),
    }
}

/// Decompose an `s3://` URI into its bucket and key.
///
/// Malformed URIs decompose to `(None, None)`.
pub fn decompose_uri(uri: &str) -> (Option<String>, Option<String>) {
    match uri_regex().captures(uri) {
        Some(caps) => (
            caps.get(1).map(|m| m.as_str().to_owned()),
            caps.get(2).map(|m| m.as_str().to_owned()),
        ),
        None => (None, None),
    }
}

/// The bucket portion of an S3 URI
pub fn bucket_name(uri: &str) -> Option<String> {
    decompose_uri(uri).0
}

/// The key portion of an S3 URI
pub fn object_key(uri: &str) -> Option<String> {
    decompose_uri(uri).1
}

/// The file name of the object addressed by `uri`, without its extension.
pub fn file_name_portion(uri: &str) -> Option<String> {
    let key = object_key(uri)?;
    let file = key.rsplit('/').next().unwrap_or_default();
    let stem = match file.rfind('.') {
        Some(idx) => &file[..idx],
        None => file,
    };
    Some(stem.to_owned())
}

/// The public URL of an object (assuming its permissions allow public access).
pub fn object_url(bucket: &str, key: &str) -> String {
    format!(
        "https://{bucket}.s3.amazonaws.com/{}",
        utf8_percent_encode(key, KEY_QUOTE_SET)
    )
}

/// The public URL of a bucket.
pub fn bucket_url(bucket: &str) -> String {
    format!("https://{bucket}.s3.amazonaws.com")
}

/// A single positional location value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Positional {
    /// A bucket name, key, or URI
    Value(String),
    /// A list of URIs
    List(Vec<String>),
}

impl Positional {
    fn is_uri(&self) -> bool {
        match self {
            Positional::Value(v) => v.starts_with(URI_SCHEME_PREFIX),
            Positional::List(list) => list
                .first()
                .is_some_and(|v| v.starts_with(URI_SCHEME_PREFIX)),
        }
    }
}

/// A URI argument, either a single URI or a list of URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UriArg {
    /// A single `s3://` URI
    One(String),
    /// Several `s3://` URIs sharing a bucket
    Many(Vec<String>),
}

/// The unresolved location arguments of a call.
///
/// Exactly one addressing mode may be used per call: positional values, or the named
/// `bucket`, `key` (or `prefix`) and `uri` values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationArgs {
    positional: Vec<Positional>,
    bucket: Option<String>,
    key: Option<Keys>,
    uri: Option<UriArg>,
}

impl LocationArgs {
    /// Create an empty set of location arguments
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional location value
    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.positional.push(Positional::Value(value.into()));
        self
    }

    /// Append a positional list of URIs
    pub fn positional_list<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.positional
            .push(Positional::List(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the bucket
    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = Some(bucket.into());
        self
    }

    /// Set the key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(Keys::One(key.into()));
        self
    }

    /// Set several keys (only accepted by operations taking multiple locations)
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key = Some(Keys::Many(keys.into_iter().map(Into::into).collect()));
        self
    }

    /// Set the key prefix, for operations whose key argument is a prefix
    pub fn prefix(self, prefix: impl Into<String>) -> Self {
        self.key(prefix)
    }

    /// Set an `s3://` URI
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(UriArg::One(uri.into()));
        self
    }

    /// Set several `s3://` URIs (only accepted by operations taking multiple locations)
    pub fn uris<I, S>(mut self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uri = Some(UriArg::Many(uris.into_iter().map(Into::into).collect()));
        self
    }

    fn has_named(&self) -> bool {
        self.bucket.is_some() || self.key.is_some() || self.uri.is_some()
    }
}

impl From<&str> for LocationArgs {
    fn from(value: &str) -> Self {
        LocationArgs::new().positional(value)
    }
}

impl From<String> for LocationArgs {
    fn from(value: String) -> Self {
        LocationArgs::new().positional(value)
    }
}

impl From<&String> for LocationArgs {
    fn from(value: &String) -> Self {
        LocationArgs::new().positional(value.as_str())
    }
}

impl<B, K> From<(B, K)> for LocationArgs
where
    B: Into<String>,
    K: Into<String>,
{
    fn from((bucket, key): (B, K)) -> Self {
        LocationArgs::new().positional(bucket).positional(key)
    }
}

impl From<Vec<String>> for LocationArgs {
    fn from(value: Vec<String>) -> Self {
        LocationArgs::new().positional_list(value)
    }
}

impl From<&[&str]> for LocationArgs {
    fn from(value: &[&str]) -> Self {
        LocationArgs::new().positional_list(value.iter().copied())
    }
}

/// Resolution rules for a single operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationPolicy {
    /// A non-empty bucket must be resolved
    pub require_bucket: bool,
    /// A non-empty key must be resolved
    pub require_key: bool,
    /// The name of the key-bearing argument, used in error messages
    pub key_arg: &'static str,
    /// A list of keys or URIs is accepted
    pub allow_multiple: bool,
}

impl LocationPolicy {
    /// A single object: bucket and key required
    pub const OBJECT: LocationPolicy = LocationPolicy {
        require_bucket: true,
        require_key: true,
        key_arg: "key",
        allow_multiple: false,
    };

    /// One or more objects in the same bucket
    pub const OBJECTS: LocationPolicy = LocationPolicy {
        require_bucket: true,
        require_key: true,
        key_arg: "key",
        allow_multiple: true,
    };

    /// A bucket with an optional key prefix
    pub const PREFIX: LocationPolicy = LocationPolicy {
        require_bucket: true,
        require_key: false,
        key_arg: "prefix",
        allow_multiple: false,
    };

    /// A bucket, an object, or nothing at all
    pub const ANY: LocationPolicy = LocationPolicy {
        require_bucket: false,
        require_key: false,
        key_arg: "key",
        allow_multiple: false,
    };
}

/// The key portion of a resolved location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Keys {
    /// No key was given
    #[default]
    None,
    /// A single key
    One(String),
    /// Several keys, in the order given
    Many(Vec<String>),
}

impl Keys {
    fn is_empty(&self) -> bool {
        match self {
            Keys::None => true,
            Keys::One(key) => key.is_empty(),
            Keys::Many(keys) => keys.is_empty(),
        }
    }
}

/// A canonical bucket plus key (or keys).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLocation {
    bucket: Option<String>,
    keys: Keys,
}

impl ResolvedLocation {
    /// The resolved bucket
    pub fn bucket(&self) -> Option<&str> {
        self.bucket.as_deref()
    }

    /// The resolved key, if a single key was given
    pub fn key(&self) -> Option<&str> {
        match &self.keys {
            Keys::One(key) => Some(key.as_str()),
            _ => None,
        }
    }

    /// All resolved keys
    pub fn keys(&self) -> &Keys {
        &self.keys
    }

    /// The `s3://` URI of the resolved location
    pub fn uri(&self) -> String {
        compose_uri(self.bucket.as_deref().unwrap_or_default(), self.key())
    }

    /// The bucket and single key of a location resolved with [`LocationPolicy::OBJECT`].
    pub(crate) fn into_object(self) -> Result<(String, String), Error> {
        match (self.bucket, self.keys) {
            (Some(bucket), Keys::One(key)) => Ok((bucket, key)),
            _ => Err(error::invalid_input("a bucket and key must be provided")),
        }
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Keys) {
        (self.bucket, self.keys)
    }
}

/// Reduce the location arguments of a call to a canonical bucket and key(s).
pub fn resolve_location(
    args: &LocationArgs,
    policy: &LocationPolicy,
) -> Result<ResolvedLocation, Error> {
    let mut uri: Option<UriArg> = None;
    let mut bucket: Option<String> = None;
    let mut keys = Keys::None;

    if !args.has_named() {
        match args.positional.as_slice() {
            [] => return Err(error::invalid_input("a location must be specified")),
            [only] if only.is_uri() => {
                uri = Some(match only {
                    Positional::Value(v) => UriArg::One(v.clone()),
                    Positional::List(list) => UriArg::Many(list.clone()),
                });
            }
            [Positional::Value(b)] => bucket = Some(b.clone()),
            [Positional::List(_)] => {
                return Err(error::invalid_input(
                    "a list location must contain S3 URIs",
                ))
            }
            [Positional::Value(b), Positional::Value(k)] => {
                bucket = Some(b.clone());
                keys = Keys::One(k.clone());
            }
            [Positional::Value(b), Positional::List(k)] => {
                bucket = Some(b.clone());
                keys = Keys::Many(k.clone());
            }
            [_, _] => return Err(error::invalid_input("the bucket must be a single value")),
            _ => return Err(error::invalid_input("too many location values")),
        }
    } else if !args.positional.is_empty() {
        return Err(error::invalid_input(format!(
            "both positional location and {} values are present",
            policy.key_arg
        )));
    } else {
        uri = args.uri.clone();
        bucket = args.bucket.clone();
        keys = args.key.clone().unwrap_or_default();
    }

    match uri {
        Some(UriArg::Many(uris)) if !uris.is_empty() => {
            if !policy.allow_multiple {
                return Err(error::invalid_input(format!(
                    "a list of URIs is not accepted for this {}",
                    policy.key_arg
                )));
            }
            let mut uri_bucket: Option<String> = None;
            let mut uri_keys = Vec::with_capacity(uris.len());
            for u in &uris {
                let (b, k) = decompose_uri(u);
                let b = b.ok_or_else(|| error::invalid_input(format!("invalid S3 URI: {u}")))?;
                match &uri_bucket {
                    None => uri_bucket = Some(b),
                    Some(existing) if *existing != b => {
                        return Err(error::invalid_input(
                            "multiple values for bucket are not allowed",
                        ))
                    }
                    Some(_) => {}
                }
                uri_keys.push(k.unwrap_or_default());
            }
            bucket = uri_bucket;
            keys = Keys::Many(uri_keys);
        }
        Some(UriArg::Many(_)) | None => {}
        Some(UriArg::One(u)) => {
            let (b, k) = decompose_uri(&u);
            if b.is_none() {
                return Err(error::invalid_input(format!("invalid S3 URI: {u}")));
            }
            bucket = b;
            keys = k.map(Keys::One).unwrap_or_default();
        }
    }

    if matches!(keys, Keys::Many(_)) && !policy.allow_multiple {
        return Err(error::invalid_input(format!(
            "a list of values is not accepted for {}",
            policy.key_arg
        )));
    }
    if policy.require_bucket && bucket.as_deref().map_or(true, str::is_empty) {
        return Err(error::invalid_input("a bucket must be provided"));
    }
    if policy.require_key && keys.is_empty() {
        return Err(error::invalid_input(format!(
            "a {} must be provided",
            policy.key_arg
        )));
    }

    Ok(ResolvedLocation { bucket, keys })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn assert_invalid(args: LocationArgs, policy: &LocationPolicy) {
        let err = resolve_location(&args, policy).unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind(), "{args:?}");
    }

    #[test]
    fn test_compose_decompose_round_trip() {
        for (bucket, key) in [
            ("my-bucket", "a.txt"),
            ("b.with.dots", "deep/path/to/file.json"),
            ("abc", "key with spaces"),
        ] {
            let uri = compose_uri(bucket, Some(key));
            assert_eq!(
                (Some(bucket.to_owned()), Some(key.to_owned())),
                decompose_uri(&uri)
            );
        }
    }

    #[test]
    fn test_decompose_scheme_case_insensitive() {
        assert_eq!(
            (Some("bucket".to_owned()), Some("key".to_owned())),
            decompose_uri("S3://bucket/key")
        );
    }

    #[test]
    fn test_decompose_malformed() {
        assert_eq!((None, None), decompose_uri("http://bucket/key"));
        assert_eq!((None, None), decompose_uri("s3://ab/key"));
        assert_eq!((None, None), decompose_uri("s3://UPPER/key"));
    }

    #[test]
    fn test_compose_without_key() {
        assert_eq!("s3://bucket/", compose_uri("bucket", None));
        assert_eq!(
            (Some("bucket".to_owned()), Some(String::new())),
            decompose_uri("s3://bucket/")
        );
    }

    #[test]
    fn test_file_name_portion() {
        assert_eq!(
            Some("report".to_owned()),
            file_name_portion("s3://bucket/a/b/report.csv")
        );
    }

    #[test]
    fn test_object_url_quotes_key() {
        assert_eq!(
            "https://bucket.s3.amazonaws.com/a/b%20c.txt",
            object_url("bucket", "a/b c.txt")
        );
    }

    #[test]
    fn test_resolve_matches_manual_decompose() {
        let uri = "s3://my-bucket/logs/2020/a.txt";
        let resolved = resolve_location(&uri.into(), &LocationPolicy::OBJECT).unwrap();
        let (bucket, key) = decompose_uri(uri);
        assert_eq!(bucket.as_deref(), resolved.bucket());
        assert_eq!(key.as_deref(), resolved.key());
        assert_eq!(uri, resolved.uri());
    }

    #[test]
    fn test_resolve_single_positional_bucket() {
        let resolved = resolve_location(&"my-bucket".into(), &LocationPolicy::PREFIX).unwrap();
        assert_eq!(Some("my-bucket"), resolved.bucket());
        assert_eq!(&Keys::None, resolved.keys());
    }

    #[test]
    fn test_resolve_named_uri() {
        let args = LocationArgs::new().uri("s3://bucket/key");
        let resolved = resolve_location(&args, &LocationPolicy::OBJECT).unwrap();
        assert_eq!(Some("key"), resolved.key());
    }

    #[test]
    fn test_resolve_uri_list() {
        let args = LocationArgs::from(vec![
            "s3://bucket/a".to_owned(),
            "s3://bucket/b".to_owned(),
        ]);
        let resolved = resolve_location(&args, &LocationPolicy::OBJECTS).unwrap();
        assert_eq!(Some("bucket"), resolved.bucket());
        assert_eq!(
            &Keys::Many(vec!["a".to_owned(), "b".to_owned()]),
            resolved.keys()
        );
    }

    #[test]
    fn test_reject_zero_positional() {
        assert_invalid(LocationArgs::new(), &LocationPolicy::OBJECT);
    }

    #[test]
    fn test_reject_too_many_positional() {
        let args = LocationArgs::new()
            .positional("bucket")
            .positional("key")
            .positional("extra");
        assert_invalid(args, &LocationPolicy::OBJECT);
    }

    #[test]
    fn test_reject_mixed_modes() {
        let args = LocationArgs::from("bucket").key("key");
        assert_invalid(args, &LocationPolicy::OBJECT);
    }

    #[test]
    fn test_reject_uri_list_when_single() {
        let args = LocationArgs::new().uris(["s3://bucket/a", "s3://bucket/b"]);
        assert_invalid(args, &LocationPolicy::OBJECT);
    }

    #[test]
    fn test_reject_uri_list_with_mixed_buckets() {
        let args = LocationArgs::new().uris(["s3://bucket-one/a", "s3://bucket-two/b"]);
        assert_invalid(args, &LocationPolicy::OBJECTS);
    }

    #[test]
    fn test_reject_empty_bucket_and_key() {
        assert_invalid(
            LocationArgs::new().bucket("").key("key"),
            &LocationPolicy::OBJECT,
        );
        assert_invalid(
            LocationArgs::new().bucket("bucket").key(""),
            &LocationPolicy::OBJECT,
        );
        assert_invalid(LocationArgs::from("bucket"), &LocationPolicy::OBJECT);
    }

    #[test]
    fn test_reject_malformed_uri() {
        assert_invalid(LocationArgs::new().uri("s3://x/key"), &LocationPolicy::ANY);
    }

    #[test]
    fn test_any_policy_accepts_bucket_only() {
        let args = LocationArgs::new().bucket("bucket");
        let resolved = resolve_location(&args, &LocationPolicy::ANY).unwrap();
        assert_eq!(None, resolved.key());
    }
}
