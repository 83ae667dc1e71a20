/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::io::Cursor;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};

use crate::error::{self, Error};

/// A decoded image along with the format it was read in (or should be written in).
#[derive(Debug, Clone)]
pub struct ImageValue {
    image: DynamicImage,
    format: Option<ImageFormat>,
}

impl ImageValue {
    /// Wrap an image; it will be written as PNG unless a format is set
    pub fn new(image: DynamicImage) -> Self {
        Self {
            image,
            format: None,
        }
    }

    /// Set the format to encode the image in
    pub fn with_format(mut self, format: ImageFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// The image
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// The original (or requested) format, if known
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Consume the wrapper, returning the image
    pub fn into_image(self) -> DynamicImage {
        self.image
    }

    /// The MIME type of the image's known format
    pub(crate) fn mime_type(&self) -> Option<&'static str> {
        self.format.map(|f| f.to_mime_type())
    }
}

impl From<DynamicImage> for ImageValue {
    fn from(value: DynamicImage) -> Self {
        ImageValue::new(value)
    }
}

pub(crate) fn encode(value: &ImageValue) -> Result<Bytes, Error> {
    let format = value.format.unwrap_or(ImageFormat::Png);
    let mut buf = Cursor::new(Vec::new());
    value
        .image
        .write_to(&mut buf, format)
        .map_err(error::serialization)?;
    Ok(Bytes::from(buf.into_inner()))
}

pub(crate) fn decode(bytes: &[u8]) -> Result<ImageValue, Error> {
    let format = image::guess_format(bytes).ok();
    let image = image::load_from_memory(bytes).map_err(error::serialization)?;
    Ok(ImageValue { image, format })
}
