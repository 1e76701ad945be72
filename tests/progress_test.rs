// ABOUTME: Integration tests for daily and weekly progress aggregation
// ABOUTME: Validates completed/missed classification and calorie sums over windows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

mod common;

use chrono::{Days, NaiveDate};
use fitplan_server::services::{completion, enrollment, progress};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_daily_progress_classifies_completed_and_missed() {
    let database = common::create_test_database().await.unwrap();
    let (_, sessions, meal) = common::seed_program(&database, "Weight Loss", 3, 7)
        .await
        .unwrap();
    let user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();

    let start = date(2024, 11, 18); // a Monday
    enrollment::enroll_user(&database, &user, start)
        .await
        .unwrap()
        .unwrap();

    // Complete the first day's session and meal; leave the rest pending
    completion::complete_session(&database, user.id, sessions[0].id, start)
        .await
        .unwrap();
    completion::complete_meal(&database, user.id, sessions[0].id, meal.id, start)
        .await
        .unwrap();

    let day_one = progress::daily_progress(&database, user.id, start)
        .await
        .unwrap();
    assert_eq!(day_one.date, Some(start));
    assert_eq!(day_one.completed_sessions_count, 1);
    assert_eq!(day_one.missed_sessions_count, 0);
    assert!((day_one.total_calories_burned - 200.0).abs() < f64::EPSILON);
    assert_eq!(day_one.completed_meals_count, 1);
    assert!((day_one.calories_gained - 550.0).abs() < f64::EPSILON);

    // Day two's session is scheduled but untouched: it reads as missed,
    // because its row says incomplete, not because the row is absent
    let day_two = progress::daily_progress(
        &database,
        user.id,
        start.checked_add_days(Days::new(1)).unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(day_two.completed_sessions_count, 0);
    assert_eq!(day_two.missed_sessions_count, 1);
    assert_eq!(day_two.missed_meals_count, 1);
    assert!(day_two.total_calories_burned.abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_weekly_progress_uses_monday_to_sunday_window() {
    let database = common::create_test_database().await.unwrap();
    let (_, sessions, _) = common::seed_program(&database, "Weight Loss", 9, 7)
        .await
        .unwrap();
    let user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();

    // Enroll on a Monday: sessions 1-7 land in week one, 8-9 spill over
    let monday = date(2024, 11, 18);
    enrollment::enroll_user(&database, &user, monday)
        .await
        .unwrap()
        .unwrap();

    completion::complete_session(&database, user.id, sessions[0].id, monday)
        .await
        .unwrap();

    // Query from the Saturday of that week
    let saturday = date(2024, 11, 23);
    let week = progress::weekly_progress(&database, user.id, saturday)
        .await
        .unwrap();

    assert_eq!(week.week_start_date, Some(monday));
    assert_eq!(week.week_end_date, Some(date(2024, 11, 24)));
    // Only the seven sessions scheduled inside the window are counted
    assert_eq!(week.sessions.len(), 7);
    assert_eq!(week.completed_sessions_count, 1);
    assert_eq!(week.missed_sessions_count, 6);

    // The following week picks up the spillover sessions
    let next_week = progress::weekly_progress(&database, user.id, date(2024, 11, 27))
        .await
        .unwrap();
    assert_eq!(next_week.sessions.len(), 2);
    assert_eq!(next_week.week_start_date, Some(date(2024, 11, 25)));
}

#[tokio::test]
async fn test_progress_empty_window() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();

    let summary = progress::daily_progress(&database, user.id, date(2025, 1, 1))
        .await
        .unwrap();
    assert!(summary.sessions.is_empty());
    assert!(summary.meals.is_empty());
    assert_eq!(summary.completed_sessions_count, 0);
    assert!(summary.total_calories_burned.abs() < f64::EPSILON);
}
