/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use aws_sdk_s3::primitives::ByteStream;
use tokio::io::{AsyncSeekExt, AsyncWrite, AsyncWriteExt};

use crate::client::Handle;
use crate::codec::{content_type, Encoded};
use crate::error::{self, Error};
use crate::location::{compose_uri, resolve_location, LocationArgs, LocationPolicy};
use crate::operation::write::put_encoded;
use crate::operation::PutOptions;

/// Stream an object's body into `writer`, returning the number of bytes copied.
async fn copy_object_to<W>(
    handle: &Handle,
    bucket: &str,
    key: &str,
    writer: &mut W,
) -> Result<u64, Error>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    tracing::debug!(%bucket, %key, "downloading object");
    let output = handle
        .s3()
        .get_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await?;
    let reader = output.body.into_async_read();
    tokio::pin!(reader);
    let copied = tokio::io::copy(&mut reader, writer).await?;
    writer.flush().await?;
    tracing::trace!(copied, "download complete");
    Ok(copied)
}

/// Fluent builder for downloading an object to the local filesystem
#[derive(Debug)]
pub struct DownloadFluentBuilder {
    handle: Arc<Handle>,
    location: LocationArgs,
    destination: Option<PathBuf>,
}

impl DownloadFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, location: LocationArgs) -> Self {
        Self {
            handle,
            location,
            destination: None,
        }
    }

    /// File or directory to download to.
    ///
    /// A directory receives a file named after the last segment of the key. Defaults to that
    /// file name in the current directory.
    pub fn destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Download the object, returning the path written.
    ///
    /// The body is staged in a temp file next to the destination, which is only replaced once
    /// the whole object has been received.
    pub async fn send(self) -> Result<PathBuf, Error> {
        let (bucket, key) =
            resolve_location(&self.location, &LocationPolicy::OBJECT)?.into_object()?;
        let file_name = key
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .ok_or_else(|| error::invalid_input(format!("`{key}` does not name a file")))?;

        let path = match self.destination {
            None => PathBuf::from(file_name),
            Some(dir) if tokio::fs::metadata(&dir).await.is_ok_and(|m| m.is_dir()) => {
                dir.join(file_name)
            }
            Some(path) => path,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let staged = tempfile::NamedTempFile::new_in(dir)?;
        let mut file = tokio::fs::File::from_std(staged.as_file().try_clone()?);
        copy_object_to(&self.handle, &bucket, &key, &mut file).await?;
        drop(file);
        staged.persist(&path).map_err(|err| err.error)?;
        tracing::trace!(path = %path.display(), "download persisted");
        Ok(path)
    }

    /// Download the object into `writer`, returning the number of bytes written.
    pub async fn send_to<W>(self, writer: &mut W) -> Result<u64, Error>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let (bucket, key) =
            resolve_location(&self.location, &LocationPolicy::OBJECT)?.into_object()?;
        copy_object_to(&self.handle, &bucket, &key, writer).await
    }
}

pub(crate) async fn download_to_temp(
    handle: &Handle,
    location: LocationArgs,
) -> Result<tokio::fs::File, Error> {
    let (bucket, key) = resolve_location(&location, &LocationPolicy::OBJECT)?.into_object()?;
    let mut file = tokio::fs::File::from_std(tempfile::tempfile()?);
    copy_object_to(handle, &bucket, &key, &mut file).await?;
    file.seek(SeekFrom::Start(0)).await?;
    Ok(file)
}

/// Fluent builder for uploading a local file to an object
#[derive(Debug)]
pub struct UploadFluentBuilder {
    handle: Arc<Handle>,
    location: LocationArgs,
    path: PathBuf,
    options: PutOptions,
}

impl UploadFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, location: LocationArgs, path: PathBuf) -> Self {
        Self {
            handle,
            location,
            path,
            options: PutOptions::default(),
        }
    }

    put_option_setters!();

    /// Upload the file, returning the `s3://` URI of the object.
    pub async fn send(self) -> Result<String, Error> {
        let (bucket, key) =
            resolve_location(&self.location, &LocationPolicy::OBJECT)?.into_object()?;
        let inferred = content_type::for_key(&key)
            .or_else(|| {
                self.path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(content_type::for_extension)
            })
            .map(str::to_owned);

        tracing::debug!(%bucket, %key, path = %self.path.display(), "uploading file");
        let body = ByteStream::from_path(&self.path).await?;
        let request = self
            .handle
            .s3()
            .put_object()
            .bucket(&bucket)
            .key(&key)
            .body(body);
        self.options.apply(request, inferred).send().await?;
        Ok(compose_uri(&bucket, Some(&key)))
    }
}

/// Fluent builder for storing the response of an HTTP GET in an object
#[derive(Debug)]
pub struct FetchFluentBuilder {
    handle: Arc<Handle>,
    url: String,
    location: LocationArgs,
    options: PutOptions,
}

impl FetchFluentBuilder {
    pub(crate) fn new(handle: Arc<Handle>, url: String, location: LocationArgs) -> Self {
        Self {
            handle,
            url,
            location,
            options: PutOptions::default(),
        }
    }

    put_option_setters!();

    /// Fetch the URL and store the body, returning the `s3://` URI of the object.
    ///
    /// The response's content type is kept unless one is set explicitly.
    pub async fn send(self) -> Result<String, Error> {
        let (bucket, key) =
            resolve_location(&self.location, &LocationPolicy::OBJECT)?.into_object()?;
        tracing::debug!(url = %self.url, %bucket, %key, "fetching URL");
        let response = reqwest::get(&self.url).await?.error_for_status()?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .or_else(|| content_type::for_key(&key).map(str::to_owned));
        let body = response.bytes().await?;

        let encoded = Encoded { body, content_type };
        put_encoded(&self.handle, &bucket, &key, encoded, self.options, false).await?;
        Ok(compose_uri(&bucket, Some(&key)))
    }
}
