/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use std::time::Duration;

use aws_sdk_mturk::types::{
    Assignment as SdkAssignment, AssignmentStatus, Hit as SdkHit, HitReviewStatus, HitStatus,
    QualificationRequirement,
};
use aws_smithy_types::DateTime;
use serde_json::{Map, Value as Json};
use tokio::sync::OnceCell;

use super::{answer, annotation, Client, Environment};
use crate::error::Error;

/// A HIT returned by MTurk, tied to the client (and environment) it came from.
///
/// Assignments and the decoded requester annotation are loaded on first access and cached
/// until [`refresh`](Hit::refresh).
#[derive(Debug)]
pub struct Hit {
    client: Client,
    inner: SdkHit,
    assignments: OnceCell<Vec<Assignment>>,
    annotation: OnceCell<Json>,
}

impl Hit {
    pub(crate) fn new(client: Client, inner: SdkHit) -> Self {
        Self {
            client,
            inner,
            assignments: OnceCell::new(),
            annotation: OnceCell::new(),
        }
    }

    /// The SDK representation of the HIT
    pub fn inner(&self) -> &SdkHit {
        &self.inner
    }

    /// Consume the wrapper, returning the SDK representation
    pub fn into_inner(self) -> SdkHit {
        self.inner
    }

    /// The environment the HIT lives in
    pub fn environment(&self) -> Environment {
        self.client.environment()
    }

    /// The HIT id
    pub fn hit_id(&self) -> &str {
        self.inner.hit_id().unwrap_or_default()
    }

    /// The HIT type (group) id
    pub fn hit_type_id(&self) -> &str {
        self.inner.hit_type_id().unwrap_or_default()
    }

    /// The HIT group id
    pub fn hit_group_id(&self) -> Option<&str> {
        self.inner.hit_group_id()
    }

    /// The layout the HIT was created from, if any
    pub fn hit_layout_id(&self) -> Option<&str> {
        self.inner.hit_layout_id()
    }

    /// Title shown to workers
    pub fn title(&self) -> Option<&str> {
        self.inner.title()
    }

    /// Description shown to workers
    pub fn description(&self) -> Option<&str> {
        self.inner.description()
    }

    /// The question XML
    pub fn question(&self) -> Option<&str> {
        self.inner.question()
    }

    /// Comma separated search keywords
    pub fn keywords(&self) -> Option<&str> {
        self.inner.keywords()
    }

    /// When the HIT was created
    pub fn creation_time(&self) -> Option<&DateTime> {
        self.inner.creation_time()
    }

    /// When the HIT stops accepting workers
    pub fn expiration(&self) -> Option<&DateTime> {
        self.inner.expiration()
    }

    /// Assignable, Unassignable, Reviewable, Reviewing or Disposed
    pub fn status(&self) -> Option<&HitStatus> {
        self.inner.hit_status()
    }

    /// Review state set by the requester
    pub fn review_status(&self) -> Option<&HitReviewStatus> {
        self.inner.hit_review_status()
    }

    /// Reward per assignment in dollars
    pub fn reward(&self) -> Option<f64> {
        self.inner.reward().and_then(|r| r.parse().ok())
    }

    /// Reward per assignment in cents
    pub fn reward_cents(&self) -> Option<u64> {
        self.reward().map(|dollars| (dollars * 100.0).round() as u64)
    }

    /// How many workers may complete the HIT
    pub fn max_assignments(&self) -> Option<i32> {
        self.inner.max_assignments()
    }

    /// Delay after which submitted assignments are approved automatically
    pub fn auto_approval_delay(&self) -> Option<Duration> {
        self.inner.auto_approval_delay_in_seconds().map(seconds)
    }

    /// Time a worker has to complete an assignment
    pub fn assignment_duration(&self) -> Option<Duration> {
        self.inner.assignment_duration_in_seconds().map(seconds)
    }

    /// Qualifications a worker needs to accept the HIT
    pub fn qualification_requirements(&self) -> &[QualificationRequirement] {
        self.inner.qualification_requirements()
    }

    /// The raw `RequesterAnnotation` field
    pub fn requester_annotation(&self) -> Option<&str> {
        self.inner.requester_annotation()
    }

    /// Number of assignments accepted but not yet submitted
    pub fn pending(&self) -> Option<i32> {
        self.inner.number_of_assignments_pending()
    }

    /// Number of assignments still open to workers
    pub fn available(&self) -> Option<i32> {
        self.inner.number_of_assignments_available()
    }

    /// Number of assignments submitted
    pub fn completed(&self) -> Option<i32> {
        self.inner.number_of_assignments_completed()
    }

    /// Worker preview URL for the HIT's type.
    pub fn preview_url(&self) -> String {
        self.client.preview_url(self.hit_type_id())
    }

    /// All submitted, approved and rejected assignments, loaded on first call.
    pub async fn assignments(&self) -> Result<&[Assignment], Error> {
        let assignments = self
            .assignments
            .get_or_try_init(|| self.client.list_assignments_for_hit(self.hit_id(), &[]))
            .await?;
        Ok(assignments)
    }

    /// The payload stored in the requester annotation, decoded on first call.
    ///
    /// `s3` is used when the payload was stored out of line in a temp object.
    pub async fn annotation(&self, s3: &crate::Client) -> Result<&Json, Error> {
        self.annotation
            .get_or_try_init(|| {
                annotation::retrieve_requester_annotation(
                    s3,
                    self.requester_annotation().unwrap_or_default(),
                    false,
                )
            })
            .await
    }

    /// Reload the HIT, and its assignments if they had been loaded.
    pub async fn refresh(&mut self) -> Result<(), Error> {
        let hit_id = self.hit_id().to_owned();
        let output = self.client.inner().get_hit().hit_id(&hit_id).send().await?;
        if let Some(hit) = output.hit {
            self.inner = hit;
        }
        self.annotation = OnceCell::new();
        if self.assignments.initialized() {
            let assignments = self.client.list_assignments_for_hit(&hit_id, &[]).await?;
            self.assignments = OnceCell::new_with(Some(assignments));
        }
        Ok(())
    }
}

fn seconds(value: i64) -> Duration {
    Duration::from_secs(value.max(0) as u64)
}

/// An assignment with its answer XML parsed
#[derive(Debug, Clone)]
pub struct Assignment {
    inner: SdkAssignment,
    answer: Map<String, Json>,
}

impl Assignment {
    pub(crate) fn from_sdk(inner: SdkAssignment) -> Result<Self, Error> {
        let answer = match inner.answer() {
            Some(xml) if !xml.trim().is_empty() => answer::parse_answers(xml)?,
            _ => Map::new(),
        };
        Ok(Self { inner, answer })
    }

    /// The SDK representation of the assignment
    pub fn inner(&self) -> &SdkAssignment {
        &self.inner
    }

    /// The assignment id
    pub fn assignment_id(&self) -> &str {
        self.inner.assignment_id().unwrap_or_default()
    }

    /// Worker who accepted the assignment
    pub fn worker_id(&self) -> Option<&str> {
        self.inner.worker_id()
    }

    /// HIT the assignment belongs to
    pub fn hit_id(&self) -> Option<&str> {
        self.inner.hit_id()
    }

    /// Submitted, Approved or Rejected
    pub fn status(&self) -> Option<&AssignmentStatus> {
        self.inner.assignment_status()
    }

    /// When the worker accepted the assignment
    pub fn accept_time(&self) -> Option<&DateTime> {
        self.inner.accept_time()
    }

    /// When the worker submitted the assignment
    pub fn submit_time(&self) -> Option<&DateTime> {
        self.inner.submit_time()
    }

    /// Answers keyed by question identifier
    pub fn answer(&self) -> &Map<String, Json> {
        &self.answer
    }

    /// Time between accepting and submitting the assignment.
    pub fn work_time(&self) -> Option<Duration> {
        let accepted = self.accept_time()?.as_nanos();
        let submitted = self.submit_time()?.as_nanos();
        u64::try_from(submitted - accepted)
            .ok()
            .map(Duration::from_nanos)
    }
}
