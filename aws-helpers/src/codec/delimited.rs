/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use serde_json::{Map, Value as Json};

use crate::error::{self, Error};
use crate::types::Column;
use crate::value::Row;

/// Options controlling delimited output
#[derive(Debug, Clone)]
pub struct DelimitedOptions {
    pub(crate) delimiter: String,
    pub(crate) newline: String,
    pub(crate) columns: Option<Vec<Column>>,
    pub(crate) headers: Option<Vec<String>>,
    pub(crate) header: bool,
}

impl Default for DelimitedOptions {
    fn default() -> Self {
        Self {
            delimiter: ",".to_owned(),
            newline: "\n".to_owned(),
            columns: None,
            headers: None,
            header: true,
        }
    }
}

impl DelimitedOptions {
    /// Column delimiter, `,` by default
    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Row separator, `\n` by default
    pub fn newline(mut self, newline: impl Into<String>) -> Self {
        self.newline = newline.into();
        self
    }

    /// The columns to project out of each row (list indexes or mapping keys)
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Column>,
    {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Header line to write ahead of the rows
    pub fn headers<I, S>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers = Some(headers.into_iter().map(Into::into).collect());
        self
    }

    /// Write the header line, `true` by default.
    ///
    /// Without a header line, `headers` still name the keys projected out of mapping rows
    /// when no `columns` are given.
    pub fn header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }
}

/// Encode rows as delimited text.
///
/// Rows of mappings get a header line (explicit headers, or the projected keys); other rows
/// only get one when headers are given. An empty row list produces just the header, if any.
/// No header is written when [`DelimitedOptions::header`] is off.
pub(crate) fn encode_rows(rows: &[Row], opts: &DelimitedOptions) -> Result<String, Error> {
    let mut out = String::new();

    match rows.first() {
        Some(Row::Record(first)) => {
            let columns = match (&opts.columns, &opts.headers) {
                (Some(columns), _) => columns.clone(),
                (None, Some(headers)) if !opts.header => {
                    headers.iter().cloned().map(Column::Key).collect()
                }
                (None, _) => first.keys().cloned().map(Column::Key).collect(),
            };
            if opts.header {
                let header = match &opts.headers {
                    Some(headers) => headers.join(&opts.delimiter),
                    None => columns
                        .iter()
                        .map(column_name)
                        .collect::<Vec<_>>()
                        .join(&opts.delimiter),
                };
                out.push_str(&header);
                out.push_str(&opts.newline);
            }
            for row in rows {
                out.push_str(&encode_row(row, Some(&columns), &opts.delimiter)?);
                out.push_str(&opts.newline);
            }
        }
        _ => {
            if let Some(headers) = opts.headers.as_ref().filter(|_| opts.header) {
                out.push_str(&headers.join(&opts.delimiter));
                out.push_str(&opts.newline);
            }
            for row in rows {
                out.push_str(&encode_row(row, opts.columns.as_deref(), &opts.delimiter)?);
                out.push_str(&opts.newline);
            }
        }
    }

    Ok(out)
}

/// Encode a single row (without trailing newline).
pub(crate) fn encode_row(
    row: &Row,
    columns: Option<&[Column]>,
    delimiter: &str,
) -> Result<String, Error> {
    let cells: Vec<String> = match row {
        Row::Line(line) => return Ok(line.clone()),
        Row::Fields(values) => match columns {
            None => values.iter().map(cell).collect(),
            Some(columns) => columns
                .iter()
                .map(|c| match c {
                    Column::Index(idx) => Ok(values.get(*idx).map(cell).unwrap_or_default()),
                    Column::Key(key) => Err(error::type_unsupported(format!(
                        "column `{key}` cannot be projected from a list row"
                    ))),
                })
                .collect::<Result<_, _>>()?,
        },
        Row::Record(map) => match columns {
            None => map.values().map(cell).collect(),
            Some(columns) => columns
                .iter()
                .map(|c| record_cell(map, c))
                .collect::<Result<_, _>>()?,
        },
    };
    Ok(cells.join(delimiter))
}

fn record_cell(map: &Map<String, Json>, column: &Column) -> Result<String, Error> {
    match column {
        Column::Key(key) => Ok(map.get(key).map(cell).unwrap_or_default()),
        Column::Index(idx) => Err(error::type_unsupported(format!(
            "column {idx} cannot be projected from a mapping row"
        ))),
    }
}

fn column_name(column: &Column) -> String {
    match column {
        Column::Key(key) => key.clone(),
        Column::Index(idx) => idx.to_string(),
    }
}

fn cell(value: &Json) -> String {
    match value {
        Json::Null => String::new(),
        Json::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Json) -> Row {
        Row::from(value)
    }

    #[test]
    fn test_mapping_rows_header_from_first_row() {
        let rows = vec![record(json!({"a": 1, "b": 2}))];
        let out = encode_rows(&rows, &DelimitedOptions::default()).unwrap();
        assert_eq!("a,b\n1,2\n", out);
    }

    #[test]
    fn test_empty_rows_write_header_only() {
        let opts = DelimitedOptions::default().headers(["a", "b"]);
        assert_eq!("a,b\n", encode_rows(&[], &opts).unwrap());
        assert_eq!("", encode_rows(&[], &DelimitedOptions::default()).unwrap());
    }

    #[test]
    fn test_mapping_rows_with_columns_and_nulls() {
        let rows = vec![
            record(json!({"a": 1, "b": "x", "c": true})),
            record(json!({"a": null, "c": false})),
        ];
        let opts = DelimitedOptions::default()
            .columns(["c", "b"])
            .delimiter("\t");
        assert_eq!(
            "c\tb\ntrue\tx\nfalse\t\n",
            encode_rows(&rows, &opts).unwrap()
        );
    }

    #[test]
    fn test_list_rows_by_index() {
        let rows = vec![
            Row::from(vec![json!("x"), json!(1), json!(2.5)]),
            Row::from(vec![json!("y"), json!(null)]),
        ];
        let opts = DelimitedOptions::default()
            .columns([2usize, 0])
            .headers(["value", "name"])
            .newline("\r\n");
        assert_eq!(
            "value,name\r\n2.5,x\r\n,y\r\n",
            encode_rows(&rows, &opts).unwrap()
        );
    }

    #[test]
    fn test_list_rows_without_headers() {
        let rows = vec![Row::from(vec![1, 2]), Row::from(vec![3, 4])];
        assert_eq!(
            "1,2\n3,4\n",
            encode_rows(&rows, &DelimitedOptions::default()).unwrap()
        );
    }

    #[test]
    fn test_preformatted_lines() {
        let rows = vec![Row::Line("a|b".into()), Row::Line("c|d".into())];
        assert_eq!(
            "a|b\nc|d\n",
            encode_rows(&rows, &DelimitedOptions::default()).unwrap()
        );
    }

    #[test]
    fn test_rows_without_header_line() {
        let rows = vec![record(json!({"a": 3, "b": 4}))];
        let opts = DelimitedOptions::default().header(false);
        assert_eq!("3,4\n", encode_rows(&rows, &opts).unwrap());

        let opts = DelimitedOptions::default().headers(["b", "a"]).header(false);
        assert_eq!("4,3\n", encode_rows(&rows, &opts).unwrap());
        assert_eq!("", encode_rows(&[], &opts).unwrap());
    }

    #[test]
    fn test_key_column_on_list_row_is_rejected() {
        let rows = vec![Row::from(vec![1, 2])];
        let opts = DelimitedOptions::default().columns(["a"]);
        assert!(encode_rows(&rows, &opts).is_err());
    }
}
