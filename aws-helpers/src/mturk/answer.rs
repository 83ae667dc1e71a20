/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value as Json};

use crate::error::{self, Error};

#[derive(Debug, Default)]
struct PendingAnswer {
    question: Option<String>,
    free_text: Option<String>,
    selections: Vec<Json>,
}

impl PendingAnswer {
    fn into_entry(self) -> Option<(String, Json)> {
        let question = self.question?;
        let value = match self.free_text {
            Some(text) => serde_json::from_str(&text).unwrap_or(Json::String(text)),
            None => Json::Array(self.selections),
        };
        Some((question, value))
    }
}

/// Parse a `QuestionFormAnswers` document into a map of question identifier to answer.
///
/// Free text answers holding JSON are parsed into JSON values, other free text is kept as a
/// string. Selection answers (including `OtherSelection`) become arrays of strings. Uploaded
/// file answers are not supported and produce empty arrays.
pub fn parse_answers(xml: &str) -> Result<Map<String, Json>, Error> {
    let mut reader = Reader::from_str(xml);

    let mut answers = Map::new();
    let mut current: Option<PendingAnswer> = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match (e.local_name().as_ref(), current.as_mut()) {
                (b"Answer", _) => current = Some(PendingAnswer::default()),
                (b"QuestionIdentifier", Some(answer)) => {
                    answer.question = Some(read_text(&mut reader)?);
                }
                (b"FreeText", Some(answer)) => {
                    answer.free_text = Some(read_text(&mut reader)?);
                }
                (b"SelectionIdentifier" | b"OtherSelection", Some(answer)) => {
                    answer.selections.push(Json::String(read_text(&mut reader)?));
                }
                _ => {}
            },
            Event::Empty(e) => {
                if let (b"FreeText", Some(answer)) = (e.local_name().as_ref(), current.as_mut()) {
                    answer.free_text = Some(String::new());
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"Answer" => {
                if let Some((question, value)) = current.take().and_then(PendingAnswer::into_entry)
                {
                    answers.insert(question, value);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(answers)
}

/// Text content of the current element, consuming its end tag.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, Error> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e.decode().map_err(error::serialization)?;
                let unescaped =
                    quick_xml::escape::unescape(&decoded).map_err(error::serialization)?;
                text.push_str(&unescaped);
            }
            Event::CData(e) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Event::GeneralRef(e) => {
                if let Some(ch) = e.resolve_char_ref().map_err(error::serialization)? {
                    text.push(ch);
                } else {
                    let name = e.decode().map_err(error::serialization)?;
                    let resolved = quick_xml::escape::resolve_predefined_entity(&name)
                        .ok_or_else(|| {
                            error::serialization(format!("unknown entity `&{name};`"))
                        })?;
                    text.push_str(resolved);
                }
            }
            Event::End(_) => return Ok(text),
            Event::Eof => {
                return Err(error::serialization(
                    "unexpected end of document inside an answer",
                ))
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NS: &str =
        "http://mechanicalturk.amazonaws.com/AWSMechanicalTurkDataSchemas/2005-10-01/QuestionFormAnswers.xsd";

    fn document(answers: &str) -> String {
        format!(r#"<?xml version="1.0" encoding="UTF-8"?><QuestionFormAnswers xmlns="{NS}">{answers}</QuestionFormAnswers>"#)
    }

    #[test]
    fn test_free_text_json_and_plain() {
        let xml = document(
            r#"<Answer><QuestionIdentifier>taskAnswers</QuestionIdentifier><FreeText>[{"label":"cat"}]</FreeText></Answer>
               <Answer><QuestionIdentifier>comment</QuestionIdentifier><FreeText>looks fine</FreeText></Answer>
               <Answer><QuestionIdentifier>count</QuestionIdentifier><FreeText>42</FreeText></Answer>"#,
        );
        let answers = parse_answers(&xml).unwrap();
        assert_eq!(Some(&json!([{"label": "cat"}])), answers.get("taskAnswers"));
        assert_eq!(Some(&json!("looks fine")), answers.get("comment"));
        assert_eq!(Some(&json!(42)), answers.get("count"));
    }

    #[test]
    fn test_selections_collected() {
        let xml = document(
            r#"<Answer><QuestionIdentifier>colors</QuestionIdentifier>
                 <SelectionIdentifier>red</SelectionIdentifier>
                 <SelectionIdentifier>blue</SelectionIdentifier>
                 <OtherSelection>teal</OtherSelection>
               </Answer>"#,
        );
        let answers = parse_answers(&xml).unwrap();
        assert_eq!(Some(&json!(["red", "blue", "teal"])), answers.get("colors"));
    }

    #[test]
    fn test_escaped_and_empty_text() {
        let xml = document(
            r#"<Answer><QuestionIdentifier>q1</QuestionIdentifier><FreeText>a &amp; b &lt;c&gt;</FreeText></Answer>
               <Answer><QuestionIdentifier>q2</QuestionIdentifier><FreeText/></Answer>"#,
        );
        let answers = parse_answers(&xml).unwrap();
        assert_eq!(Some(&json!("a & b <c>")), answers.get("q1"));
        assert_eq!(Some(&json!("")), answers.get("q2"));
    }

    #[test]
    fn test_malformed_document() {
        assert!(parse_answers("<QuestionFormAnswers><Answer><FreeText>x</Answer>").is_err());
    }
}
