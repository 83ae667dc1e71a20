/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use bytes::Bytes;
use serde_json::{Map, Value as Json};

use crate::error::{self, Error};
use crate::types::ValueKind;

#[cfg(feature = "image")]
pub use crate::codec::image::ImageValue;

/// A single row of delimited output.
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Positional values, projected by column index
    Fields(Vec<Json>),
    /// Named values, projected by column key
    Record(Map<String, Json>),
    /// A pre-formatted line written as-is
    Line(String),
}

impl From<Json> for Row {
    fn from(value: Json) -> Self {
        match value {
            Json::Object(map) => Row::Record(map),
            Json::Array(values) => Row::Fields(values),
            Json::String(line) => Row::Line(line),
            other => Row::Fields(vec![other]),
        }
    }
}

impl From<Map<String, Json>> for Row {
    fn from(value: Map<String, Json>) -> Self {
        Row::Record(value)
    }
}

impl<T: Into<Json>> From<Vec<T>> for Row {
    fn from(value: Vec<T>) -> Self {
        Row::Fields(value.into_iter().map(Into::into).collect())
    }
}

/// An in-memory value to be written to (or read from) an object.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum Value {
    /// Plain text
    Text(String),
    /// A JSON object
    Mapping(Map<String, Json>),
    /// A list of JSON documents, one per line
    JsonLines(Vec<Json>),
    /// Plain text lines
    Lines(Vec<String>),
    /// Delimited rows
    Delimited(Vec<Row>),
    /// A raster image
    #[cfg(feature = "image")]
    Image(ImageValue),
    /// Opaque bytes
    Bytes(Bytes),
    /// A flat array of `f64` values
    Array(Vec<f64>),
    /// No value; written as a zero-length object
    Empty,
}

impl Value {
    /// Choose a value variant from the runtime shape of a JSON value.
    ///
    /// Predicates are evaluated in order: objects are mappings, strings are text, arrays
    /// of objects are JSON Lines, other arrays are text lines, `null` is empty and any
    /// other scalar is written as its text form.
    pub fn detect(value: Json) -> Value {
        match value {
            Json::Object(map) => Value::Mapping(map),
            Json::String(text) => Value::Text(text),
            Json::Array(items) if items.iter().all(Json::is_object) => Value::JsonLines(items),
            Json::Array(items) => Value::Lines(items.into_iter().map(scalar_text).collect()),
            Json::Null => Value::Empty,
            scalar => Value::Text(scalar.to_string()),
        }
    }

    /// Convert a JSON value into the variant named by `kind`.
    ///
    /// The explicit kind always wins over [`Value::detect`]; a value whose shape does not
    /// fit the kind is rejected.
    pub fn from_json_as(kind: ValueKind, value: Json) -> Result<Value, Error> {
        match (kind, value) {
            (ValueKind::Text, Json::String(text)) => Ok(Value::Text(text)),
            (ValueKind::Text, other) => Ok(Value::Text(other.to_string())),
            (ValueKind::Mapping, Json::Object(map)) => Ok(Value::Mapping(map)),
            (ValueKind::JsonLines, Json::Array(items)) => Ok(Value::JsonLines(items)),
            (ValueKind::JsonLines, Json::Object(map)) => Ok(Value::JsonLines(vec![map.into()])),
            (ValueKind::Lines, Json::Array(items)) => {
                Ok(Value::Lines(items.into_iter().map(scalar_text).collect()))
            }
            (ValueKind::Lines, Json::String(line)) => Ok(Value::Lines(vec![line])),
            (ValueKind::Delimited, Json::Array(rows)) => {
                // a flat list of scalars is a single row
                if rows.iter().all(|r| !r.is_object() && !r.is_array()) && !rows.is_empty() {
                    Ok(Value::Delimited(vec![Row::Fields(rows)]))
                } else {
                    Ok(Value::Delimited(rows.into_iter().map(Row::from).collect()))
                }
            }
            (ValueKind::Delimited, Json::Object(map)) => Ok(Value::Delimited(vec![map.into()])),
            (ValueKind::Delimited, Json::String(line)) => {
                Ok(Value::Delimited(vec![Row::Line(line)]))
            }
            (kind, value) => Err(error::type_unsupported(format!(
                "a {} value cannot be written as {kind:?}",
                json_type_name(&value)
            ))),
        }
    }

    /// The kind of this value
    pub fn kind(&self) -> Option<ValueKind> {
        Some(match self {
            Value::Text(_) => ValueKind::Text,
            Value::Mapping(_) => ValueKind::Mapping,
            Value::JsonLines(_) => ValueKind::JsonLines,
            Value::Lines(_) => ValueKind::Lines,
            Value::Delimited(_) => ValueKind::Delimited,
            #[cfg(feature = "image")]
            Value::Image(_) => ValueKind::Image,
            Value::Bytes(_) => ValueKind::Bytes,
            Value::Array(_) => ValueKind::Array,
            Value::Empty => return None,
        })
    }

    /// Returns the text if this is a [`Value::Text`]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the map if this is a [`Value::Mapping`]
    pub fn as_mapping(&self) -> Option<&Map<String, Json>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the records if this is a [`Value::JsonLines`]
    pub fn as_json_lines(&self) -> Option<&[Json]> {
        match self {
            Value::JsonLines(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the bytes if this is a [`Value::Bytes`]
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

fn scalar_text(value: Json) -> String {
    match value {
        Json::String(text) => text,
        Json::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_type_name(value: &Json) -> &'static str {
    match value {
        Json::Null => "null",
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Array(_) => "array",
        Json::Object(_) => "object",
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<Map<String, Json>> for Value {
    fn from(value: Map<String, Json>) -> Self {
        Value::Mapping(value)
    }
}

impl From<Json> for Value {
    fn from(value: Json) -> Self {
        Value::detect(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Value::Bytes(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value.into())
    }
}

impl From<Vec<f64>> for Value {
    fn from(value: Vec<f64>) -> Self {
        Value::Array(value)
    }
}

impl From<Vec<Row>> for Value {
    fn from(value: Vec<Row>) -> Self {
        Value::Delimited(value)
    }
}

#[cfg(feature = "image")]
impl From<ImageValue> for Value {
    fn from(value: ImageValue) -> Self {
        Value::Image(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_detect_order() {
        assert!(matches!(Value::detect(json!({"a": 1})), Value::Mapping(_)));
        assert!(matches!(Value::detect(json!("hi")), Value::Text(_)));
        assert!(matches!(
            Value::detect(json!([{"a": 1}, {"a": 2}])),
            Value::JsonLines(_)
        ));
        assert!(matches!(Value::detect(json!(null)), Value::Empty));
        match Value::detect(json!([1, "two", {"three": 3}])) {
            Value::Lines(lines) => assert_eq!(vec!["1", "two", r#"{"three":3}"#], lines),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(Some("42"), Value::detect(json!(42)).as_text());
    }

    #[test]
    fn test_explicit_kind_wins() {
        let value = Value::from_json_as(ValueKind::Text, json!({"a": 1})).unwrap();
        assert_eq!(Some(r#"{"a":1}"#), value.as_text());
    }

    #[test]
    fn test_explicit_kind_rejects_shape() {
        let err = Value::from_json_as(ValueKind::Mapping, json!([1, 2])).unwrap_err();
        assert_eq!(&ErrorKind::TypeUnsupported, err.kind());
    }

    #[test]
    fn test_delimited_from_flat_list_is_one_row() {
        match Value::from_json_as(ValueKind::Delimited, json!(["a", 1])).unwrap() {
            Value::Delimited(rows) => {
                assert_eq!(vec![Row::Fields(vec![json!("a"), json!(1)])], rows)
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
