// ABOUTME: Integration tests for catalog database operations
// ABOUTME: Round-trips programs, exercises, meals, preparations, and notifications
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

mod common;

use chrono::{NaiveTime, Utc};
use fitplan_server::{
    database::{MealUpdate, PreparationUpdate, ProgramUpdate, SessionUpdate},
    i18n::{Language, Localized},
    models::{
        MealType, Notification, NotificationType, PaymentMethod, Preparation,
    },
    services::notifications,
};
use uuid::Uuid;

#[tokio::test]
async fn test_file_backed_database_is_created_on_first_open() {
    common::init_test_logging();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitplan.db");
    let url = format!("sqlite:{}", path.display());

    let database = fitplan_server::database::Database::new(&url, 2)
        .await
        .unwrap();
    assert!(path.exists(), "first open creates the database file");

    // Re-opening runs migrations idempotently
    drop(database);
    fitplan_server::database::Database::new(&url, 2).await.unwrap();
}

#[tokio::test]
async fn test_program_crud_round_trip() {
    let database = common::create_test_database().await.unwrap();
    let (program, _, _) = common::seed_program(&database, "Weight Loss", 2, 5)
        .await
        .unwrap();

    let loaded = database.get_program(program.id).await.unwrap().unwrap();
    assert_eq!(loaded.frequency_per_week, 5);
    assert_eq!(loaded.total_sessions, 2);
    assert_eq!(loaded.goal.text, "Weight Loss");

    let updated = database
        .update_program(
            program.id,
            &ProgramUpdate {
                total_sessions: Some(4),
                goal: Some(Localized::with_translations(
                    "Weight Loss",
                    None,
                    Some("Похудение".into()),
                    Some("Vazn yo'qotish".into()),
                )),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.total_sessions, 4);
    assert_eq!(updated.goal.resolve(Language::Ru), "Похудение");
    assert_eq!(updated.goal.resolve(Language::Uz), "Vazn yo'qotish");

    assert!(database.delete_program(program.id).await.unwrap());
    assert!(database.get_program(program.id).await.unwrap().is_none());
    // Deleting again reports nothing to delete
    assert!(!database.delete_program(program.id).await.unwrap());
}

#[tokio::test]
async fn test_goal_listing_for_registration_validation() {
    let database = common::create_test_database().await.unwrap();
    common::seed_program(&database, "Weight Loss", 1, 7).await.unwrap();
    common::seed_program(&database, "Endurance", 1, 7).await.unwrap();

    let mut goals = database.list_program_goals().await.unwrap();
    goals.sort();
    assert_eq!(goals, vec!["Endurance".to_owned(), "Weight Loss".to_owned()]);

    assert!(database
        .find_program_by_goal("Endurance")
        .await
        .unwrap()
        .is_some());
    assert!(database
        .find_program_by_goal("Marathon")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_session_links_replaced_on_update() {
    let database = common::create_test_database().await.unwrap();
    let (_, sessions, meal) = common::seed_program(&database, "Weight Loss", 1, 7)
        .await
        .unwrap();
    let exercise = common::seed_exercise(&database).await.unwrap();

    let session = database
        .update_session(
            sessions[0].id,
            &SessionUpdate {
                exercise_ids: Some(vec![exercise.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(session.exercise_ids, vec![exercise.id]);
    // Meal links survive an exercise-only update
    assert_eq!(session.meal_ids, vec![meal.id]);

    let linked = database
        .list_exercises_for_session(sessions[0].id)
        .await
        .unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].name.resolve(Language::Ru), "Отжимание");
    assert_eq!(linked[0].name.resolve(Language::Uz), "Push-up");
}

#[tokio::test]
async fn test_session_number_is_unique_per_program() {
    let database = common::create_test_database().await.unwrap();
    let (program, sessions, _) = common::seed_program(&database, "Weight Loss", 1, 7)
        .await
        .unwrap();

    let duplicate = fitplan_server::models::Session {
        id: Uuid::new_v4(),
        program_id: program.id,
        session_number: sessions[0].session_number,
        calories_burned: 100.0,
        duration_minutes: None,
        exercise_ids: vec![],
        meal_ids: vec![],
    };
    assert!(database.create_session(&duplicate).await.is_err());
}

#[tokio::test]
async fn test_meal_and_preparation_round_trip() {
    let database = common::create_test_database().await.unwrap();
    let (_, _, meal) = common::seed_program(&database, "Weight Loss", 1, 7)
        .await
        .unwrap();

    let updated = database
        .update_meal(
            meal.id,
            &MealUpdate {
                meal_type: Some(MealType::Dinner),
                calories: Some(620.0),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.meal_type, MealType::Dinner);
    assert!((updated.calories - 620.0).abs() < f64::EPSILON);

    let preparation = Preparation {
        id: Uuid::new_v4(),
        meal_id: meal.id,
        name: Localized::new("Grill"),
        description: Localized::new("Grill over medium heat"),
        preparation_time: 15,
    };
    database.create_preparation(&preparation).await.unwrap();

    let by_meal = database.list_preparations(Some(meal.id)).await.unwrap();
    assert_eq!(by_meal.len(), 1);

    let renamed = database
        .update_preparation(
            preparation.id,
            &PreparationUpdate {
                preparation_time: Some(20),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(renamed.preparation_time, 20);

    // A preparation cannot reference a missing meal
    let orphan = Preparation {
        id: Uuid::new_v4(),
        meal_id: Uuid::new_v4(),
        name: Localized::new("Boil"),
        description: Localized::new("Boil for ten minutes"),
        preparation_time: 10,
    };
    assert!(database.create_preparation(&orphan).await.is_err());
}

#[tokio::test]
async fn test_enrollment_payment_fields() {
    let database = common::create_test_database().await.unwrap();
    common::seed_program(&database, "Weight Loss", 2, 7).await.unwrap();
    let user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();
    let enrollment = fitplan_server::services::enrollment::enroll_user(
        &database,
        &user,
        Utc::now().date_naive(),
    )
    .await
    .unwrap()
    .unwrap();

    database
        .set_payment_intent(enrollment.id, 99_000, PaymentMethod::Payme)
        .await
        .unwrap();
    database.set_paid(enrollment.id, true).await.unwrap();

    let loaded = database
        .get_user_program(enrollment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.total_amount, Some(99_000));
    assert_eq!(loaded.payment_method, Some(PaymentMethod::Payme));
    assert!(loaded.is_paid);
}

#[tokio::test]
async fn test_notification_round_trip_and_reminder_sweep() {
    let database = common::create_test_database().await.unwrap();
    let mut user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();
    // Midnight is always due by the time the sweep runs
    user.reminder_time = NaiveTime::from_hms_opt(0, 0, 0);
    database
        .update_reminder_time(user.id, user.reminder_time)
        .await
        .unwrap();

    let notification = notifications::send_notification(
        &database,
        &user,
        Localized::with_translations(
            "Remember to complete your session!",
            None,
            Some("Не забудьте завершить тренировку!".into()),
            None,
        ),
        NotificationType::Reminder,
    )
    .await
    .unwrap();
    assert_eq!(notification.scheduled_time, user.reminder_time);

    // Freshly sent today: the sweep must not re-issue it yet
    let issued = notifications::run_reminder_sweep(&database).await.unwrap();
    assert_eq!(issued, 0);

    // Backdate the reminder to yesterday; a 06:00 schedule is due by now
    let yesterday = Utc::now() - chrono::Duration::days(1);
    database
        .touch_notification_sent(notification.id, yesterday)
        .await
        .unwrap();
    let issued = notifications::run_reminder_sweep(&database).await.unwrap();
    assert_eq!(issued, 1);

    let all = database.list_notifications(user.id).await.unwrap();
    assert_eq!(all.len(), 2);

    // Mark-read round trip
    database.mark_notification_read(notification.id).await.unwrap();
    let loaded = database
        .get_notification(notification.id, user.id)
        .await
        .unwrap()
        .unwrap();
    assert!(loaded.is_read);
    assert_eq!(
        loaded.message.resolve(Language::Ru),
        "Не забудьте завершить тренировку!"
    );

    // Scoped to the recipient
    let other = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();
    assert!(database
        .get_notification(notification.id, other.id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_direct_notification_insert() {
    let database = common::create_test_database().await.unwrap();
    let user = common::create_active_user(&database, "Weight Loss")
        .await
        .unwrap();

    let notification = Notification {
        id: Uuid::new_v4(),
        user_id: user.id,
        message: Localized::new("Welcome to Fitplan"),
        language: Language::En,
        notification_type: NotificationType::General,
        sent_at: Utc::now(),
        is_read: false,
        scheduled_time: None,
    };
    database.create_notification(&notification).await.unwrap();

    let listed = database.list_notifications(user.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].notification_type, NotificationType::General);
}
