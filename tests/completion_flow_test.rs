// ABOUTME: Integration tests for the session/meal completion state machine
// ABOUTME: Validates next-due ordering, date gating, and progress counting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

mod common;

use chrono::{Days, NaiveDate};
use fitplan_server::{
    errors::ErrorCode,
    services::completion::{self, MealCompletionOutcome},
    services::enrollment,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Enroll a user into a fresh program and return (user, sessions, meal)
async fn enrolled_fixture(
    database: &fitplan_server::database::Database,
    goal: &str,
    session_count: i64,
    start: NaiveDate,
) -> (
    fitplan_server::models::User,
    Vec<fitplan_server::models::Session>,
    fitplan_server::models::Meal,
) {
    let (_, sessions, meal) = common::seed_program(database, goal, session_count, 7)
        .await
        .unwrap();
    let user = common::create_active_user(database, goal).await.unwrap();
    enrollment::enroll_user(database, &user, start)
        .await
        .unwrap()
        .expect("enrollment");
    (user, sessions, meal)
}

#[tokio::test]
async fn test_next_due_session_completes() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, sessions, _) = enrolled_fixture(&database, "Weight Loss", 3, start).await;

    let today = start; // first session is due on the start date
    let outcome = completion::complete_session(&database, user.id, sessions[0].id, today)
        .await
        .unwrap();

    assert!(outcome.completion.is_completed);
    assert_eq!(outcome.completion.completion_date, Some(today));

    let enrollment = outcome.enrollment.expect("active enrollment");
    assert_eq!(enrollment.progress, 1);
    assert!(enrollment.is_active);
}

#[tokio::test]
async fn test_completing_out_of_order_fails() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, sessions, _) = enrolled_fixture(&database, "Weight Loss", 3, start).await;

    // Two sessions are due by the second day; only the earliest may complete
    let today = start.checked_add_days(Days::new(1)).unwrap();
    let err = completion::complete_session(&database, user.id, sessions[1].id, today)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CompletionOrderViolation);

    // The earliest one still completes fine afterwards
    completion::complete_session(&database, user.id, sessions[0].id, today)
        .await
        .unwrap();
    completion::complete_session(&database, user.id, sessions[1].id, today)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_completing_before_scheduled_date_fails() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, sessions, _) = enrolled_fixture(&database, "Weight Loss", 3, start).await;

    // The second session is scheduled for start+1; today is still the start
    let err = completion::complete_session(&database, user.id, sessions[1].id, start)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CompletionTooEarly);
}

#[tokio::test]
async fn test_completing_twice_fails() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, sessions, _) = enrolled_fixture(&database, "Weight Loss", 3, start).await;

    completion::complete_session(&database, user.id, sessions[0].id, start)
        .await
        .unwrap();
    let err = completion::complete_session(&database, user.id, sessions[0].id, start)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::AlreadyCompleted);
}

#[tokio::test]
async fn test_unassigned_session_returns_not_found() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, _, _) = enrolled_fixture(&database, "Weight Loss", 2, start).await;

    // A session from some other program was never assigned to this user
    let (_, other_sessions, _) = common::seed_program(&database, "Endurance", 1, 7)
        .await
        .unwrap();
    let err = completion::complete_session(&database, user.id, other_sessions[0].id, start)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}

#[tokio::test]
async fn test_program_deactivates_when_all_sessions_complete() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, sessions, _) = enrolled_fixture(&database, "Weight Loss", 2, start).await;

    let today = start.checked_add_days(Days::new(1)).unwrap();
    let first = completion::complete_session(&database, user.id, sessions[0].id, today)
        .await
        .unwrap();
    assert_eq!(first.enrollment.as_ref().unwrap().progress, 1);
    assert!(first.enrollment.as_ref().unwrap().is_active);

    let second = completion::complete_session(&database, user.id, sessions[1].id, today)
        .await
        .unwrap();
    let enrollment = second.enrollment.unwrap();
    // Counter reaches total_sessions exactly once and the enrollment closes
    assert_eq!(enrollment.progress, 2);
    assert!(!enrollment.is_active);
}

#[tokio::test]
async fn test_meal_completion_is_unordered_and_idempotent() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, sessions, meal) = enrolled_fixture(&database, "Weight Loss", 3, start).await;

    // The last session's meal completes first; no ordering constraint
    let outcome = completion::complete_meal(&database, user.id, sessions[2].id, meal.id, start)
        .await
        .unwrap();
    assert_eq!(outcome, MealCompletionOutcome::Completed);

    let again = completion::complete_meal(&database, user.id, sessions[2].id, meal.id, start)
        .await
        .unwrap();
    assert_eq!(again, MealCompletionOutcome::AlreadyCompleted);

    let row = database
        .get_meal_completion(user.id, sessions[2].id, meal.id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.is_completed);
    assert_eq!(row.completion_date, Some(start));
}

#[tokio::test]
async fn test_meal_completion_unknown_combination_fails() {
    let database = common::create_test_database().await.unwrap();
    let start = date(2025, 3, 10);
    let (user, sessions, _) = enrolled_fixture(&database, "Weight Loss", 1, start).await;

    let err = completion::complete_meal(
        &database,
        user.id,
        sessions[0].id,
        uuid::Uuid::new_v4(),
        start,
    )
    .await
    .unwrap_err();
    assert_eq!(err.code, ErrorCode::ResourceNotFound);
}
