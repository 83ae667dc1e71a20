/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

pub(crate) const TEXT_PLAIN: &str = "text/plain";
pub(crate) const APPLICATION_JSON: &str = "application/json";
pub(crate) const IMAGE_ANY: &str = "image/*";

const EXTENSION_TYPES: &[(&str, &str)] = &[
    ("css", "text/css"),
    ("html", "text/html"),
    ("xhtml", "text/html"),
    ("htm", "text/html"),
    ("xml", "text/xml"),
    ("csv", "text/csv"),
    ("txt", "text/plain"),
    ("png", "image/png"),
    ("jpeg", "image/jpeg"),
    ("jpg", "image/jpeg"),
    ("gif", "image/gif"),
    ("jsonl", "application/x-jsonlines"),
    ("json", "application/json"),
    ("js", "application/javascript"),
    ("zip", "application/zip"),
    ("pdf", "application/pdf"),
    ("sql", "application/sql"),
    ("tiff", "image/tiff"),
    ("tif", "image/tiff"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("ico", "image/vnd.microsoft.icon"),
    ("svg", "image/svg+xml"),
];

/// The lower-cased extension of the last path segment of `key`, if any.
pub(crate) fn extension(key: &str) -> Option<String> {
    let file = key.rsplit('/').next()?;
    let (_, ext) = file.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

/// Look up the MIME type for a file extension.
pub(crate) fn for_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    EXTENSION_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// Suggest a content type for an object key based on its extension.
pub fn for_key(key: &str) -> Option<&'static str> {
    extension(key).and_then(|ext| for_extension(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(Some("text/csv"), for_key("reports/report.CSV"));
        assert_eq!(Some("text/csv"), for_key("reports/report.cSv"));
    }

    #[test]
    fn test_unknown_and_missing_extension() {
        assert_eq!(None, for_key("reports/report.parquet"));
        assert_eq!(None, for_key("reports/report"));
        assert_eq!(None, for_key("dotted.dir/report"));
    }

    #[test]
    fn test_jsonl() {
        assert_eq!(Some("application/x-jsonlines"), for_key("a/b.jsonl"));
    }
}
