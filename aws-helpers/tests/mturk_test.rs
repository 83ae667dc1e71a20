/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use aws_helpers::mturk::{Client, Environment};
use aws_sdk_mturk::operation::approve_assignment::ApproveAssignmentOutput;
use aws_sdk_mturk::operation::get_assignment::GetAssignmentOutput;
use aws_sdk_mturk::operation::list_assignments_for_hit::ListAssignmentsForHitOutput;
use aws_sdk_mturk::types::{Assignment, AssignmentStatus, Hit};
use aws_smithy_mocks_experimental::{mock, mock_client, RuleMode};
use serde_json::json;

const LABEL_ANSWER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<QuestionFormAnswers xmlns="http://mechanicalturk.amazonaws.com/AWSMechanicalTurkDataSchemas/2005-10-01/QuestionFormAnswers.xsd">
  <Answer>
    <QuestionIdentifier>label</QuestionIdentifier>
    <FreeText>{"cat":true,"boxes":[1,2]}</FreeText>
  </Answer>
  <Answer>
    <QuestionIdentifier>colors</QuestionIdentifier>
    <SelectionIdentifier>red</SelectionIdentifier>
    <SelectionIdentifier>blue</SelectionIdentifier>
  </Answer>
</QuestionFormAnswers>"#;

const COMMENT_ANSWER: &str = r#"<QuestionFormAnswers><Answer><QuestionIdentifier>comment</QuestionIdentifier><FreeText>looks fine &amp; done</FreeText></Answer></QuestionFormAnswers>"#;

fn assignment(id: &str, answer: &str) -> Assignment {
    Assignment::builder()
        .assignment_id(id)
        .hit_id("HIT1")
        .worker_id("WORKER1")
        .assignment_status(AssignmentStatus::Submitted)
        .answer(answer)
        .build()
}

#[tokio::test]
async fn test_list_assignments_follows_pages() {
    let first = mock!(aws_sdk_mturk::Client::list_assignments_for_hit)
        .match_requests(|r| r.hit_id() == Some("HIT1") && r.next_token().is_none())
        .then_output(|| {
            ListAssignmentsForHitOutput::builder()
                .assignments(assignment("A1", LABEL_ANSWER))
                .next_token("page-2")
                .build()
        });
    let second = mock!(aws_sdk_mturk::Client::list_assignments_for_hit)
        .match_requests(|r| {
            r.next_token() == Some("page-2")
                && r.assignment_statuses() == [AssignmentStatus::Submitted]
        })
        .then_output(|| {
            ListAssignmentsForHitOutput::builder()
                .assignments(assignment("A2", COMMENT_ANSWER))
                .build()
        });
    let client = Client::from_client(
        mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&first, &second]),
        Environment::Sandbox,
    );

    let assignments = client
        .list_assignments_for_hit("HIT1", &[AssignmentStatus::Submitted])
        .await
        .unwrap();
    assert_eq!(2, assignments.len());

    let label = assignments[0].answer();
    assert_eq!(Some(&json!({"cat": true, "boxes": [1, 2]})), label.get("label"));
    assert_eq!(Some(&json!(["red", "blue"])), label.get("colors"));

    assert_eq!("A2", assignments[1].assignment_id());
    assert_eq!(
        Some(&json!("looks fine & done")),
        assignments[1].answer().get("comment")
    );
}

#[tokio::test]
async fn test_get_assignment_returns_hit() {
    let get = mock!(aws_sdk_mturk::Client::get_assignment)
        .match_requests(|r| r.assignment_id() == Some("A1"))
        .then_output(|| {
            GetAssignmentOutput::builder()
                .assignment(assignment("A1", COMMENT_ANSWER))
                .hit(Hit::builder().hit_id("HIT1").hit_type_id("TYPE1").build())
                .build()
        });
    let client = Client::from_client(
        mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&get]),
        Environment::Production,
    );

    let (assignment, hit) = client.get_assignment("A1").await.unwrap();
    assert_eq!(Some("WORKER1"), assignment.worker_id());
    assert_eq!("HIT1", hit.hit_id());
    assert_eq!(
        "https://worker.mturk.com/mturk/preview?groupId=TYPE1",
        hit.preview_url()
    );
}

#[tokio::test]
async fn test_approve_assignment() {
    let approve = mock!(aws_sdk_mturk::Client::approve_assignment)
        .match_requests(|r| {
            r.assignment_id() == Some("A1")
                && r.requester_feedback() == Some("thanks")
                && r.override_rejection() == Some(true)
        })
        .then_output(|| ApproveAssignmentOutput::builder().build());
    let client = Client::from_client(
        mock_client!(aws_sdk_mturk, RuleMode::Sequential, &[&approve]),
        Environment::Sandbox,
    );

    client
        .approve_assignment("A1", Some("thanks"), true)
        .await
        .unwrap();
    assert_eq!(1, approve.num_calls());
}
