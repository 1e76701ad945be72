// ABOUTME: Integration tests for enrollment-time schedule generation
// ABOUTME: Validates completion-row fan-out and derived session dates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

mod common;

use chrono::{Days, NaiveDate};
use fitplan_server::services::enrollment;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_enrollment_creates_one_completion_row_per_session_and_meal() {
    let database = common::create_test_database().await.unwrap();
    let (_, sessions, meal) = common::seed_program(&database, "Weight Loss", 5, 7)
        .await
        .unwrap();
    let user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();

    let start = date(2025, 3, 10);
    let enrollment = enrollment::enroll_user(&database, &user, start)
        .await
        .unwrap()
        .expect("goal matches a program");

    assert_eq!(enrollment.start_date, start);
    assert_eq!(enrollment.end_date, start.checked_add_days(Days::new(5)).unwrap());
    assert_eq!(enrollment.progress, 0);
    assert!(enrollment.is_active);

    // One session completion per session, daily dates starting at enrollment
    for (index, session) in sessions.iter().enumerate() {
        let completion = database
            .get_session_completion(user.id, session.id)
            .await
            .unwrap()
            .expect("completion row created eagerly");
        assert!(!completion.is_completed);
        assert_eq!(
            completion.session_date,
            start.checked_add_days(Days::new(index as u64)).unwrap()
        );
        assert_eq!(completion.session_number, session.session_number);

        // One meal completion per (session, meal), same date
        let meal_completion = database
            .get_meal_completion(user.id, session.id, meal.id)
            .await
            .unwrap()
            .expect("meal completion row created eagerly");
        assert!(!meal_completion.is_completed);
        assert_eq!(meal_completion.meal_date, completion.session_date);
    }
}

#[tokio::test]
async fn test_enrollment_with_lower_frequency_spreads_sessions() {
    let database = common::create_test_database().await.unwrap();
    let (_, sessions, _) = common::seed_program(&database, "Endurance", 4, 3)
        .await
        .unwrap();
    let user = common::create_active_user(&database, "Endurance")
        .await
        .unwrap();

    let start = date(2025, 3, 10);
    enrollment::enroll_user(&database, &user, start)
        .await
        .unwrap()
        .expect("goal matches a program");

    // Three per week on offsets 0, 2, 4; the fourth opens the next week
    let expected = [
        date(2025, 3, 10),
        date(2025, 3, 12),
        date(2025, 3, 14),
        date(2025, 3, 17),
    ];
    for (session, expected_date) in sessions.iter().zip(expected) {
        let completion = database
            .get_session_completion(user.id, session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(completion.session_date, expected_date);
    }
}

#[tokio::test]
async fn test_enrollment_skipped_when_no_program_matches_goal() {
    let database = common::create_test_database().await.unwrap();
    common::seed_program(&database, "Weight Loss", 3, 7)
        .await
        .unwrap();
    let user = common::create_active_user(&database, "Marathon Prep")
        .await
        .unwrap();

    let enrollment = enrollment::enroll_user(&database, &user, date(2025, 3, 10))
        .await
        .unwrap();
    assert!(enrollment.is_none());
    assert!(database
        .get_active_user_program(user.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_inactive_program_is_not_matched() {
    let database = common::create_test_database().await.unwrap();
    let (program, _, _) = common::seed_program(&database, "Weight Loss", 3, 7)
        .await
        .unwrap();
    database
        .update_program(
            program.id,
            &fitplan_server::database::ProgramUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();
    let enrollment = enrollment::enroll_user(&database, &user, date(2025, 3, 10))
        .await
        .unwrap();
    assert!(enrollment.is_none());
}
