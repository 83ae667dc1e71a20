/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_sdk_mturk::types::{Comparator, HitAccessActions, Locale, QualificationRequirement};

use super::Environment;
use crate::error::{self, Error};

const HTML_QUESTION_NS: &str =
    "http://mechanicalturk.amazonaws.com/AWSMechanicalTurkDataSchemas/2011-11-11/HTMLQuestion.xsd";
const EXTERNAL_QUESTION_NS: &str =
    "http://mechanicalturk.amazonaws.com/AWSMechanicalTurkDataSchemas/2006-07-14/ExternalQuestion.xsd";

// System qualification type ids
const MASTERS_PRODUCTION: &str = "2F1QJWKUDD8XADTFD2Q0G6UTO95ALH";
const MASTERS_SANDBOX: &str = "2ARFPLSP75KLA8M8DH1HTEQVJT3SY6";
const ADULT: &str = "00000000000000000060";
const HITS_APPROVED: &str = "00000000000000000040";
const PERCENT_APPROVED: &str = "000000000000000000L0";
const LOCALE: &str = "00000000000000000071";

/// Wrap HTML task content in an `HTMLQuestion` document.
///
/// A `frame_height` of zero lets the task use the whole window.
pub fn render_html_question(html: &str, frame_height: u32) -> String {
    format!(
        r#"<HTMLQuestion xmlns="{HTML_QUESTION_NS}"><HTMLContent><![CDATA[{html}]]></HTMLContent><FrameHeight>{frame_height}</FrameHeight></HTMLQuestion>"#
    )
}

/// Wrap a task URL in an `ExternalQuestion` document.
pub fn render_external_question(url: &str, frame_height: u32) -> String {
    let url = quick_xml::escape::escape(url);
    format!(
        r#"<ExternalQuestion xmlns="{EXTERNAL_QUESTION_NS}"><ExternalURL>{url}</ExternalURL><FrameHeight>{frame_height}</FrameHeight></ExternalQuestion>"#
    )
}

fn requirement(
    qualification_type_id: &str,
    comparator: Comparator,
    values: Vec<i32>,
    locales: Vec<Locale>,
    actions_guarded: Option<HitAccessActions>,
) -> Result<QualificationRequirement, Error> {
    let requirement = QualificationRequirement::builder()
        .qualification_type_id(qualification_type_id)
        .comparator(comparator)
        .set_integer_values((!values.is_empty()).then_some(values))
        .set_locale_values((!locales.is_empty()).then_some(locales))
        .set_actions_guarded(actions_guarded)
        .build()?;
    Ok(requirement)
}

/// Workers must hold the Masters qualification of `environment`.
pub fn masters_requirement(
    environment: Environment,
    actions_guarded: Option<HitAccessActions>,
) -> Result<QualificationRequirement, Error> {
    let id = match environment {
        Environment::Production => MASTERS_PRODUCTION,
        Environment::Sandbox => MASTERS_SANDBOX,
    };
    requirement(id, Comparator::Exists, vec![], vec![], actions_guarded)
}

/// Workers must have agreed to see adult content.
pub fn adult_requirement(
    actions_guarded: Option<HitAccessActions>,
) -> Result<QualificationRequirement, Error> {
    requirement(ADULT, Comparator::EqualTo, vec![1], vec![], actions_guarded)
}

/// Compare the number of HITs a worker has had approved.
pub fn hits_approved_requirement(
    comparator: Comparator,
    value: i32,
    actions_guarded: Option<HitAccessActions>,
) -> Result<QualificationRequirement, Error> {
    requirement(HITS_APPROVED, comparator, vec![value], vec![], actions_guarded)
}

/// Compare a worker's assignment approval rate, in percent.
pub fn percent_approved_requirement(
    comparator: Comparator,
    value: i32,
    actions_guarded: Option<HitAccessActions>,
) -> Result<QualificationRequirement, Error> {
    requirement(PERCENT_APPROVED, comparator, vec![value], vec![], actions_guarded)
}

/// Restrict workers by locale; each entry is a country code and an optional subdivision.
pub fn locale_requirement(
    comparator: Comparator,
    locales: &[(&str, Option<&str>)],
    actions_guarded: Option<HitAccessActions>,
) -> Result<QualificationRequirement, Error> {
    if locales.is_empty() {
        return Err(error::invalid_input(
            "a locale requirement needs at least one locale",
        ));
    }
    let locales = locales
        .iter()
        .map(|(country, subdivision)| {
            Locale::builder()
                .country(*country)
                .set_subdivision(subdivision.map(str::to_owned))
                .build()
        })
        .collect::<Result<Vec<_>, _>>()?;
    requirement(LOCALE, comparator, vec![], locales, actions_guarded)
}
