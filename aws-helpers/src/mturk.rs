/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

//! Helpers for Amazon Mechanical Turk.
//!
//! [`Client`] wraps an [`aws_sdk_mturk::Client`] pointed at either the production or the sandbox
//! requester endpoint. HITs come back as [`Hit`] values with typed accessors, and assignment
//! answers are parsed from their `QuestionFormAnswers` XML into JSON.

use std::fmt;

use aws_sdk_mturk::config::Region;
use aws_sdk_mturk::types::AssignmentStatus;
use aws_types::SdkConfig;

use crate::error::{Error, ErrorKind};

mod annotation;
mod answer;
mod base85;
mod create;
mod hit;
mod question;

pub use annotation::{prepare_requester_annotation, retrieve_requester_annotation};
pub use answer::parse_answers;
pub use create::{CreateHitFluentBuilder, CreateHitTypeFluentBuilder};
pub use hit::{Assignment, Hit};
pub use question::{
    adult_requirement, hits_approved_requirement, locale_requirement, masters_requirement,
    percent_approved_requirement, render_external_question, render_html_question,
};

/// MTurk is only served from `us-east-1`
const MTURK_REGION: &str = "us-east-1";

/// The MTurk environment requests are sent to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Live marketplace, paid with real money
    Production,
    /// Requester sandbox for testing tasks
    Sandbox,
}

impl Environment {
    /// The requester API endpoint
    pub fn endpoint_url(&self) -> &'static str {
        match self {
            Environment::Production => "https://mturk-requester.us-east-1.amazonaws.com",
            Environment::Sandbox => "https://mturk-requester-sandbox.us-east-1.amazonaws.com",
        }
    }

    /// The worker-facing preview URL for a HIT type (group).
    pub fn preview_url(&self, hit_type_id: &str) -> String {
        match self {
            Environment::Production => {
                format!("https://worker.mturk.com/mturk/preview?groupId={hit_type_id}")
            }
            Environment::Sandbox => {
                format!("https://workersandbox.mturk.com/mturk/preview?groupId={hit_type_id}")
            }
        }
    }

    /// Whether this is the production environment
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Sandbox => write!(f, "sandbox"),
        }
    }
}

/// Mechanical Turk client bound to one [`Environment`]
#[derive(Debug, Clone)]
pub struct Client {
    inner: aws_sdk_mturk::Client,
    environment: Environment,
}

impl Client {
    /// Create a client for `environment` from a shared AWS configuration.
    pub fn new(sdk_config: &SdkConfig, environment: Environment) -> Client {
        let config = aws_sdk_mturk::config::Builder::from(sdk_config)
            .region(Region::from_static(MTURK_REGION))
            .endpoint_url(environment.endpoint_url())
            .build();
        Client::from_client(aws_sdk_mturk::Client::from_conf(config), environment)
    }

    /// Wrap an existing SDK client already pointed at `environment`.
    pub fn from_client(inner: aws_sdk_mturk::Client, environment: Environment) -> Client {
        Client { inner, environment }
    }

    /// The underlying SDK client
    pub fn inner(&self) -> &aws_sdk_mturk::Client {
        &self.inner
    }

    /// The environment this client talks to
    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Preview URL of a HIT type in this client's environment.
    pub fn preview_url(&self, hit_type_id: &str) -> String {
        self.environment.preview_url(hit_type_id)
    }

    /// Retrieve a HIT.
    pub async fn get_hit(&self, hit_id: &str) -> Result<Hit, Error> {
        tracing::debug!(%hit_id, environment = %self.environment, "getting HIT");
        let output = self.inner.get_hit().hit_id(hit_id).send().await?;
        let hit = output
            .hit
            .ok_or_else(|| not_found(format!("HIT `{hit_id}` was not returned")))?;
        Ok(Hit::new(self.clone(), hit))
    }

    /// Start building a new HIT.
    ///
    /// Set a reward and either a question or a layout id before sending.
    pub fn create_hit(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> CreateHitFluentBuilder {
        CreateHitFluentBuilder::new(self.clone(), title.into(), description.into())
    }

    /// Start registering a HIT type with a reward in US dollars, e.g. `"0.10"`.
    pub fn create_hit_type(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        reward: impl Into<String>,
    ) -> CreateHitTypeFluentBuilder {
        CreateHitTypeFluentBuilder::new(
            self.clone(),
            title.into(),
            description.into(),
            reward.into(),
        )
    }

    /// All HITs in the account that have not been deleted.
    pub async fn list_hits(&self) -> Result<Vec<Hit>, Error> {
        let mut hits = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .inner
                .list_hits()
                .set_next_token(next_token)
                .send()
                .await?;
            hits.extend(
                output
                    .hits()
                    .iter()
                    .cloned()
                    .map(|hit| Hit::new(self.clone(), hit)),
            );
            next_token = output.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }
        Ok(hits)
    }

    /// Assignments of a HIT in any of `statuses`, with their answers parsed.
    ///
    /// An empty `statuses` slice selects submitted, approved and rejected assignments.
    pub async fn list_assignments_for_hit(
        &self,
        hit_id: &str,
        statuses: &[AssignmentStatus],
    ) -> Result<Vec<Assignment>, Error> {
        let statuses = if statuses.is_empty() {
            vec![
                AssignmentStatus::Submitted,
                AssignmentStatus::Approved,
                AssignmentStatus::Rejected,
            ]
        } else {
            statuses.to_vec()
        };

        let mut assignments = Vec::new();
        let mut next_token = None;
        loop {
            let output = self
                .inner
                .list_assignments_for_hit()
                .hit_id(hit_id)
                .set_assignment_statuses(Some(statuses.clone()))
                .set_next_token(next_token)
                .send()
                .await?;
            for assignment in output.assignments() {
                assignments.push(Assignment::from_sdk(assignment.clone())?);
            }
            next_token = output.next_token().map(str::to_owned);
            if next_token.is_none() {
                break;
            }
        }
        tracing::trace!(%hit_id, count = assignments.len(), "listed assignments");
        Ok(assignments)
    }

    /// Retrieve an assignment together with its HIT.
    pub async fn get_assignment(&self, assignment_id: &str) -> Result<(Assignment, Hit), Error> {
        let output = self
            .inner
            .get_assignment()
            .assignment_id(assignment_id)
            .send()
            .await?;
        let missing = || not_found(format!("assignment `{assignment_id}` was not returned"));
        let assignment = output.assignment.ok_or_else(missing)?;
        let hit = output.hit.ok_or_else(missing)?;
        Ok((Assignment::from_sdk(assignment)?, Hit::new(self.clone(), hit)))
    }

    /// Approve a submitted assignment.
    pub async fn approve_assignment(
        &self,
        assignment_id: &str,
        feedback: Option<&str>,
        override_rejection: bool,
    ) -> Result<(), Error> {
        tracing::debug!(%assignment_id, override_rejection, "approving assignment");
        self.inner
            .approve_assignment()
            .assignment_id(assignment_id)
            .set_requester_feedback(feedback.map(str::to_owned))
            .override_rejection(override_rejection)
            .send()
            .await?;
        Ok(())
    }

    /// The available balance of the account, e.g. `"10000.00"`.
    pub async fn account_balance(&self) -> Result<String, Error> {
        let output = self.inner.get_account_balance().send().await?;
        Ok(output.available_balance().unwrap_or_default().to_owned())
    }

    /// Find a HIT in production, falling back to the sandbox.
    pub async fn locate_hit(production: &Client, sandbox: &Client, hit_id: &str) -> Result<Hit, Error> {
        match production.get_hit(hit_id).await {
            Ok(hit) => Ok(hit),
            Err(err) => {
                tracing::debug!(%hit_id, error = %err, "HIT not found in production, trying sandbox");
                sandbox.get_hit(hit_id).await
            }
        }
    }
}

fn not_found(message: String) -> Error {
    Error::new(ErrorKind::NotFound, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_mturk::operation::get_account_balance::GetAccountBalanceOutput;
    use aws_sdk_mturk::operation::get_hit::{GetHITError, GetHitOutput};
    use aws_sdk_mturk::types::error::RequestError;
    use aws_sdk_mturk::types::Hit as SdkHit;
    use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
    use aws_smithy_runtime::test_util::capture_test_logs::capture_test_logs;
    use test_common::mock_client_with_stubbed_http_client;
    use tokio_test::assert_err;

    fn hit_output(id: &'static str) -> GetHitOutput {
        GetHitOutput::builder()
            .hit(SdkHit::builder().hit_id(id).hit_type_id("TYPE1").build())
            .build()
    }

    #[test]
    fn test_environment_urls() {
        assert_eq!(
            "https://mturk-requester-sandbox.us-east-1.amazonaws.com",
            Environment::Sandbox.endpoint_url()
        );
        assert_eq!(
            "https://worker.mturk.com/mturk/preview?groupId=G1",
            Environment::Production.preview_url("G1")
        );
        assert_eq!(
            "https://workersandbox.mturk.com/mturk/preview?groupId=G1",
            Environment::Sandbox.preview_url("G1")
        );
    }

    #[tokio::test]
    async fn test_locate_hit_falls_back_to_sandbox() {
        let (_guard, logs) = capture_test_logs();
        let missing = mock!(aws_sdk_mturk::Client::get_hit)
            .then_error(|| GetHITError::RequestError(RequestError::builder().build()));
        let found = mock!(aws_sdk_mturk::Client::get_hit)
            .match_requests(|r| r.hit_id() == Some("HIT1"))
            .then_output(|| hit_output("HIT1"));
        let production = Client::from_client(
            mock_client_with_stubbed_http_client!(
                aws_sdk_mturk,
                RuleMode::Sequential,
                &[&missing]
            ),
            Environment::Production,
        );
        let sandbox = Client::from_client(
            mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&found]),
            Environment::Sandbox,
        );

        let hit = Client::locate_hit(&production, &sandbox, "HIT1").await.unwrap();
        assert_eq!("HIT1", hit.hit_id());
        assert_eq!(Environment::Sandbox, hit.environment());
        assert_eq!(
            "https://workersandbox.mturk.com/mturk/preview?groupId=TYPE1",
            hit.preview_url()
        );
        assert!(logs.contents().contains("trying sandbox"));
    }

    #[tokio::test]
    async fn test_get_hit_without_hit_is_not_found() {
        let empty = mock!(aws_sdk_mturk::Client::get_hit)
            .then_output(|| GetHitOutput::builder().build());
        let client = Client::from_client(
            mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&empty]),
            Environment::Production,
        );
        let err = assert_err!(client.get_hit("HIT9").await);
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_account_balance() {
        let balance = mock!(aws_sdk_mturk::Client::get_account_balance).then_output(|| {
            GetAccountBalanceOutput::builder()
                .available_balance("10000.00")
                .build()
        });
        let client = Client::from_client(
            mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&balance]),
            Environment::Sandbox,
        );
        assert_eq!("10000.00", client.account_balance().await.unwrap());
    }
}
