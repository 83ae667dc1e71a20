/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use aws_sdk_mturk::types::{HitLayoutParameter, QualificationRequirement};
use serde_json::Value as Json;

use super::{prepare_requester_annotation, render_external_question, render_html_question};
use super::{Client, Hit};
use crate::error::{self, Error};

/// How long a new HIT stays available to workers unless set
const DEFAULT_LIFETIME: Duration = Duration::from_secs(86_400);

/// How long a worker has to finish an accepted assignment unless set
const DEFAULT_ASSIGNMENT_DURATION: Duration = Duration::from_secs(3_600);

fn seconds(duration: Duration) -> Result<i64, Error> {
    i64::try_from(duration.as_secs()).map_err(error::invalid_input)
}

/// A reward in whole cents rendered as the dollar amount MTurk expects, e.g. `"0.05"`.
fn cents_to_dollars(cents: u32) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[derive(Debug)]
enum Annotation {
    Raw(String),
    Packed { s3: crate::Client, payload: Json },
}

impl Annotation {
    async fn render(self) -> Result<String, Error> {
        match self {
            Annotation::Raw(text) => Ok(text),
            Annotation::Packed { s3, payload } => prepare_requester_annotation(&s3, &payload).await,
        }
    }
}

/// Fluent builder for creating a HIT
///
/// The HIT is shown to workers through either a question document (see
/// [`html_question`](Self::html_question) and [`external_question`](Self::external_question)) or
/// a HIT layout. Lifetime defaults to one day and assignment duration to one hour.
#[derive(Debug)]
pub struct CreateHitFluentBuilder {
    client: Client,
    title: String,
    description: String,
    reward: Option<String>,
    lifetime: Duration,
    assignment_duration: Duration,
    max_assignments: Option<i32>,
    auto_approval_delay: Option<Duration>,
    keywords: Option<String>,
    question: Option<String>,
    annotation: Option<Annotation>,
    qualification_requirements: Vec<QualificationRequirement>,
    request_token: Option<String>,
    hit_layout_id: Option<String>,
    hit_layout_parameters: Vec<(String, String)>,
}

impl CreateHitFluentBuilder {
    pub(crate) fn new(client: Client, title: String, description: String) -> Self {
        Self {
            client,
            title,
            description,
            reward: None,
            lifetime: DEFAULT_LIFETIME,
            assignment_duration: DEFAULT_ASSIGNMENT_DURATION,
            max_assignments: None,
            auto_approval_delay: None,
            keywords: None,
            question: None,
            annotation: None,
            qualification_requirements: Vec::new(),
            request_token: None,
            hit_layout_id: None,
            hit_layout_parameters: Vec::new(),
        }
    }

    /// Reward per assignment in US dollars, e.g. `"0.10"`.
    pub fn reward(mut self, reward: impl Into<String>) -> Self {
        self.reward = Some(reward.into());
        self
    }

    /// Reward per assignment in cents.
    pub fn reward_cents(mut self, cents: u32) -> Self {
        self.reward = Some(cents_to_dollars(cents));
        self
    }

    /// How long the HIT can be found and accepted.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// How long a worker has to submit an accepted assignment.
    pub fn assignment_duration(mut self, duration: Duration) -> Self {
        self.assignment_duration = duration;
        self
    }

    /// How many times the HIT can be completed.
    pub fn max_assignments(mut self, max_assignments: i32) -> Self {
        self.max_assignments = Some(max_assignments);
        self
    }

    /// Delay after which submitted assignments are approved automatically.
    pub fn auto_approval_delay(mut self, delay: Duration) -> Self {
        self.auto_approval_delay = Some(delay);
        self
    }

    /// Comma separated search keywords.
    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// A complete question document (`QuestionForm`, `HTMLQuestion` or `ExternalQuestion`).
    pub fn question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Use HTML task content as the question.
    pub fn html_question(self, html: &str, frame_height: u32) -> Self {
        self.question(render_html_question(html, frame_height))
    }

    /// Use an externally hosted task page as the question.
    pub fn external_question(self, url: &str, frame_height: u32) -> Self {
        self.question(render_external_question(url, frame_height))
    }

    /// Attach `payload` as the requester annotation.
    ///
    /// The payload is packed with [`prepare_requester_annotation`], which stores it in a temp
    /// object through `s3` when it does not fit the field.
    pub fn annotation(mut self, s3: &crate::Client, payload: Json) -> Self {
        self.annotation = Some(Annotation::Packed {
            s3: s3.clone(),
            payload,
        });
        self
    }

    /// Set the requester annotation verbatim.
    pub fn raw_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(Annotation::Raw(annotation.into()));
        self
    }

    /// Add a qualification workers must meet.
    pub fn qualification_requirement(mut self, requirement: QualificationRequirement) -> Self {
        self.qualification_requirements.push(requirement);
        self
    }

    /// Token that makes retried requests idempotent for 24 hours.
    pub fn request_token(mut self, token: impl Into<String>) -> Self {
        self.request_token = Some(token.into());
        self
    }

    /// Render the HIT from an existing layout instead of a question document.
    pub fn hit_layout_id(mut self, layout_id: impl Into<String>) -> Self {
        self.hit_layout_id = Some(layout_id.into());
        self
    }

    /// Fill a placeholder of the HIT layout.
    pub fn hit_layout_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.hit_layout_parameters.push((name.into(), value.into()));
        self
    }

    /// Create the HIT.
    pub async fn send(self) -> Result<Hit, Error> {
        let reward = self
            .reward
            .ok_or_else(|| error::invalid_input("a HIT needs a reward"))?;
        if self.question.is_none() && self.hit_layout_id.is_none() {
            return Err(error::invalid_input(
                "a HIT needs either a question or a layout id",
            ));
        }
        let layout_parameters = self
            .hit_layout_parameters
            .into_iter()
            .map(|(name, value)| HitLayoutParameter::builder().name(name).value(value).build())
            .collect::<Result<Vec<_>, _>>()?;
        let annotation = match self.annotation {
            Some(annotation) => Some(annotation.render().await?),
            None => None,
        };

        tracing::debug!(
            title = %self.title,
            %reward,
            environment = %self.client.environment(),
            "creating HIT"
        );
        let output = self
            .client
            .inner()
            .create_hit()
            .title(self.title)
            .description(self.description)
            .reward(reward)
            .lifetime_in_seconds(seconds(self.lifetime)?)
            .assignment_duration_in_seconds(seconds(self.assignment_duration)?)
            .set_max_assignments(self.max_assignments)
            .set_auto_approval_delay_in_seconds(
                self.auto_approval_delay.map(seconds).transpose()?,
            )
            .set_keywords(self.keywords)
            .set_question(self.question)
            .set_requester_annotation(annotation)
            .set_qualification_requirements(
                (!self.qualification_requirements.is_empty())
                    .then_some(self.qualification_requirements),
            )
            .set_unique_request_token(self.request_token)
            .set_hit_layout_id(self.hit_layout_id)
            .set_hit_layout_parameters((!layout_parameters.is_empty()).then_some(layout_parameters))
            .send()
            .await?;
        let hit = output
            .hit
            .ok_or_else(|| Error::new(error::ErrorKind::ServiceError, "no HIT was returned"))?;
        Ok(Hit::new(self.client, hit))
    }
}

/// Fluent builder for registering a HIT type
///
/// HITs created with the same type are grouped together for workers.
#[derive(Debug)]
pub struct CreateHitTypeFluentBuilder {
    client: Client,
    title: String,
    description: String,
    reward: String,
    assignment_duration: Duration,
    auto_approval_delay: Option<Duration>,
    keywords: Option<String>,
    qualification_requirements: Vec<QualificationRequirement>,
}

impl CreateHitTypeFluentBuilder {
    pub(crate) fn new(client: Client, title: String, description: String, reward: String) -> Self {
        Self {
            client,
            title,
            description,
            reward,
            assignment_duration: DEFAULT_ASSIGNMENT_DURATION,
            auto_approval_delay: None,
            keywords: None,
            qualification_requirements: Vec::new(),
        }
    }

    /// How long a worker has to submit an accepted assignment.
    pub fn assignment_duration(mut self, duration: Duration) -> Self {
        self.assignment_duration = duration;
        self
    }

    /// Delay after which submitted assignments are approved automatically.
    pub fn auto_approval_delay(mut self, delay: Duration) -> Self {
        self.auto_approval_delay = Some(delay);
        self
    }

    /// Comma separated search keywords.
    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    /// Add a qualification workers must meet.
    pub fn qualification_requirement(mut self, requirement: QualificationRequirement) -> Self {
        self.qualification_requirements.push(requirement);
        self
    }

    /// Register the HIT type, returning its id.
    pub async fn send(self) -> Result<String, Error> {
        let output = self
            .client
            .inner()
            .create_hit_type()
            .title(self.title)
            .description(self.description)
            .reward(self.reward)
            .assignment_duration_in_seconds(seconds(self.assignment_duration)?)
            .set_auto_approval_delay_in_seconds(
                self.auto_approval_delay.map(seconds).transpose()?,
            )
            .set_keywords(self.keywords)
            .set_qualification_requirements(
                (!self.qualification_requirements.is_empty())
                    .then_some(self.qualification_requirements),
            )
            .send()
            .await?;
        output.hit_type_id.ok_or_else(|| {
            Error::new(error::ErrorKind::ServiceError, "no HIT type id was returned")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mturk::{adult_requirement, Environment};
    use aws_sdk_mturk::operation::create_hit::CreateHitOutput;
    use aws_sdk_mturk::operation::create_hit_type::CreateHitTypeOutput;
    use aws_sdk_mturk::types::Hit as SdkHit;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use serde_json::json;

    fn offline_s3() -> crate::Client {
        let s3 = mock_client!(aws_sdk_s3, RuleMode::Sequential, &[]);
        crate::Client::new(crate::Config::builder().client(s3).build())
    }

    #[test]
    fn test_cents_to_dollars() {
        assert_eq!("0.05", cents_to_dollars(5));
        assert_eq!("0.10", cents_to_dollars(10));
        assert_eq!("12.34", cents_to_dollars(1234));
    }

    #[tokio::test]
    async fn test_create_hit_with_html_question() {
        let create = mock!(aws_sdk_mturk::Client::create_hit)
            .match_requests(|r| {
                r.title() == Some("Label images")
                    && r.description() == Some("Draw boxes around cats")
                    && r.reward() == Some("0.25")
                    && r.lifetime_in_seconds() == Some(86_400)
                    && r.assignment_duration_in_seconds() == Some(600)
                    && r.max_assignments() == Some(3)
                    && r.question().is_some_and(|q| q.contains("<HTMLQuestion"))
                    && r.requester_annotation() == Some(r#"{"payload":{"batch":7}}"#)
                    && r.qualification_requirements().len() == 1
                    && r.hit_layout_id().is_none()
            })
            .then_output(|| {
                CreateHitOutput::builder()
                    .hit(SdkHit::builder().hit_id("HIT1").hit_type_id("TYPE1").build())
                    .build()
            });
        let client = Client::from_client(
            mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&create]),
            Environment::Sandbox,
        );

        let hit = client
            .create_hit("Label images", "Draw boxes around cats")
            .reward_cents(25)
            .assignment_duration(Duration::from_secs(600))
            .max_assignments(3)
            .html_question("<p>Find the cat</p>", 600)
            .annotation(&offline_s3(), json!({"batch": 7}))
            .qualification_requirement(adult_requirement(None).unwrap())
            .send()
            .await
            .unwrap();
        assert_eq!("HIT1", hit.hit_id());
        assert_eq!(
            "https://workersandbox.mturk.com/mturk/preview?groupId=TYPE1",
            hit.preview_url()
        );
        assert_eq!(1, create.num_calls());
    }

    #[tokio::test]
    async fn test_create_hit_from_layout() {
        let create = mock!(aws_sdk_mturk::Client::create_hit)
            .match_requests(|r| {
                r.question().is_none()
                    && r.hit_layout_id() == Some("LAYOUT1")
                    && r.hit_layout_parameters().len() == 1
                    && r.hit_layout_parameters()[0].name() == "image_url"
                    && r.hit_layout_parameters()[0].value() == "https://example.com/1.png"
            })
            .then_output(|| {
                CreateHitOutput::builder()
                    .hit(SdkHit::builder().hit_id("HIT2").hit_type_id("TYPE1").build())
                    .build()
            });
        let client = Client::from_client(
            mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&create]),
            Environment::Production,
        );

        let hit = client
            .create_hit("Label images", "Draw boxes around cats")
            .reward("0.10")
            .hit_layout_id("LAYOUT1")
            .hit_layout_parameter("image_url", "https://example.com/1.png")
            .send()
            .await
            .unwrap();
        assert_eq!("HIT2", hit.hit_id());
    }

    #[tokio::test]
    async fn test_create_hit_requires_question_or_layout() {
        let client = Client::from_client(
            mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[]),
            Environment::Sandbox,
        );
        let err = client
            .create_hit("Label images", "Draw boxes around cats")
            .reward("0.10")
            .send()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());

        let err = client
            .create_hit("Label images", "Draw boxes around cats")
            .external_question("https://example.com/task", 0)
            .send()
            .await
            .unwrap_err();
        assert_eq!(&ErrorKind::InputInvalid, err.kind());
    }

    #[tokio::test]
    async fn test_create_hit_type() {
        let create = mock!(aws_sdk_mturk::Client::create_hit_type)
            .match_requests(|r| {
                r.title() == Some("Label images")
                    && r.reward() == Some("0.05")
                    && r.assignment_duration_in_seconds() == Some(3_600)
                    && r.auto_approval_delay_in_seconds() == Some(259_200)
                    && r.keywords() == Some("images,labels")
            })
            .then_output(|| CreateHitTypeOutput::builder().hit_type_id("TYPE9").build());
        let client = Client::from_client(
            mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&create]),
            Environment::Sandbox,
        );

        let hit_type_id = client
            .create_hit_type("Label images", "Draw boxes around cats", "0.05")
            .auto_approval_delay(Duration::from_secs(3 * 86_400))
            .keywords("images,labels")
            .send()
            .await
            .unwrap();
        assert_eq!("TYPE9", hit_type_id);
    }
}
