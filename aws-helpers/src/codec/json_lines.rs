/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value as Json;

use crate::error::Error;

/// Serialize each record to one JSON line.
pub(crate) fn encode(records: &[Json], newline: &str) -> Result<String, Error> {
    let mut out = String::new();
    for record in records {
        out.push_str(&serde_json::to_string(record)?);
        out.push_str(newline);
    }
    Ok(out)
}

/// Join already-rendered text lines.
pub(crate) fn encode_lines(lines: &[String], newline: &str) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push_str(newline);
    }
    out
}

/// Split text into its non-empty lines.
pub(crate) fn split_lines<'a>(text: &'a str, newline: &'a str) -> impl Iterator<Item = &'a str> {
    text.split(newline).filter(|line| !line.is_empty())
}

/// Eagerly decode every non-empty line as JSON.
pub(crate) fn decode<T: DeserializeOwned>(text: &str, newline: &str) -> Result<Vec<T>, Error> {
    split_lines(text, newline)
        .map(|line| serde_json::from_str(line).map_err(Error::from))
        .collect()
}

/// A lazy iterator decoding one JSON line at a time.
///
/// The iterator owns the downloaded text; decoding errors are yielded per line and do not
/// stop iteration.
#[derive(Debug)]
pub struct JsonLinesIter<T = Json> {
    text: String,
    newline: String,
    pos: usize,
    _item: PhantomData<fn() -> T>,
}

impl<T> JsonLinesIter<T> {
    pub(crate) fn new(text: String, newline: impl Into<String>) -> Self {
        Self {
            text,
            newline: newline.into(),
            pos: 0,
            _item: PhantomData,
        }
    }

    fn next_line(&mut self) -> Option<&str> {
        while self.pos <= self.text.len() {
            let rest = &self.text[self.pos..];
            let (line, advance) = match rest.find(self.newline.as_str()) {
                Some(idx) if !self.newline.is_empty() => (&rest[..idx], idx + self.newline.len()),
                _ => (rest, rest.len() + 1),
            };
            let start = self.pos;
            self.pos += advance;
            if !line.is_empty() {
                return Some(&self.text[start..start + line.len()]);
            }
        }
        None
    }
}

impl<T: DeserializeOwned> Iterator for JsonLinesIter<T> {
    type Item = Result<T, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.next_line()?;
        Some(serde_json::from_str(line).map_err(Error::from))
    }
}
