/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

/* Automatically managed default lints */
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
/* End of automatically managed default lints */
#![warn(
    missing_debug_implementations,
    missing_docs,
    rustdoc::missing_crate_level_docs,
    unreachable_pub,
    rust_2018_idioms
)]

//! Convenience helpers for Amazon S3 and Amazon Mechanical Turk.
//!
//! `aws-helpers` sits on top of the [AWS SDK for Rust] and turns common multi-call recipes
//! into single operations: reading and writing typed values (text, JSON, JSON Lines,
//! delimited rows, images, numeric arrays), appending to objects, finding which keys are
//! missing from a bucket, and staging payloads in a per-account temp bucket.
//!
//! Every object operation accepts its location in any of the usual forms: an `s3://` URI,
//! a `(bucket, key)` pair, or an explicit [`LocationArgs`](location::LocationArgs).
//!
//! [AWS SDK for Rust]: https://github.com/awslabs/aws-sdk-rust
//!
//! # Examples
//!
//! Load the default configuration and create a client:
//!
//! ```no_run
//! # async fn example() {
//! let config = aws_helpers::from_env().load().await;
//! let client = aws_helpers::Client::new(config);
//! # }
//! ```
//!
//! Write a JSON document and read it back:
//!
//! ```no_run
//! # async fn example() -> Result<(), aws_helpers::error::Error> {
//! let config = aws_helpers::from_env().load().await;
//! let client = aws_helpers::Client::new(config);
//!
//! let uri = client
//!     .write("s3://my-bucket/config.json", serde_json::json!({"retries": 3}))
//!     .send()
//!     .await?;
//! let config = client.read_mapping(uri.as_str()).await?;
//! assert_eq!(Some(&serde_json::json!(3)), config.get("retries"));
//! # Ok(())
//! # }
//! ```
//!
//! # Crate Features
//!
//! - `image` (default): encode and decode raster images through the `image` crate.

/// Error types emitted by `aws-helpers`
pub mod error;

/// Common types used by `aws-helpers`
pub mod types;

/// S3 URIs, URLs and location resolution
pub mod location;

/// In-memory values written to and read from objects
pub mod value;

/// Conversions between values and object bytes
pub mod codec;

/// Client configuration
pub mod config;

/// S3 helper client
pub mod client;

/// S3 operations
pub mod operation;

/// Lazily loaded object and bucket handles
pub mod resource;

pub mod mturk;

pub use self::client::Client;
use self::config::loader::ConfigLoader;
pub use self::config::Config;

/// Create a config loader
pub fn from_env() -> ConfigLoader {
    ConfigLoader::default()
}
