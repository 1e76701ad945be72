// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides common database, config, and seed-data helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

#![allow(dead_code, clippy::unwrap_used)]

//! Shared test utilities for `fitplan_server`
//!
//! Common setup functions to reduce duplication across integration tests.

use anyhow::Result;
use chrono::Utc;
use fitplan_server::{
    auth::hash_password,
    config::environment::{
        AuthConfig, DatabaseConfig, DatabaseUrl, Environment, LogLevel, PaymentConfig,
        ServerConfig,
    },
    database::Database,
    i18n::Localized,
    models::{
        Country, Exercise, FitnessLevel, Gender, Meal, MealType, Program, Session, User,
    },
    server::ServerResources,
};
use std::sync::{Arc, Once};
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// Standard test database setup
///
/// A single pooled connection keeps every query on the same in-memory
/// database.
pub async fn create_test_database() -> Result<Arc<Database>> {
    init_test_logging();
    let database = Arc::new(Database::new("sqlite::memory:", 1).await?);
    Ok(database)
}

/// Test server configuration without touching the process environment
pub fn create_test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        environment: Environment::Testing,
        log_level: LogLevel::Warn,
        database: DatabaseConfig {
            url: DatabaseUrl::Memory,
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-jwt-secret".into(),
            token_expiry_hours: 24,
        },
        payment: PaymentConfig {
            merchant_id: "test-merchant".into(),
            checkout_url: "https://checkout.example.com".into(),
            return_url: "https://fitplan.test/payment/done".into(),
        },
    }
}

/// Full resource container backed by an in-memory database
pub async fn create_test_resources() -> Result<Arc<ServerResources>> {
    init_test_logging();
    let database = Database::new("sqlite::memory:", 1).await?;
    Ok(Arc::new(ServerResources::new(
        database,
        Arc::new(create_test_config()),
    )))
}

/// Create and persist an active user with the given goal
pub async fn create_active_user(database: &Database, goal: &str) -> Result<User> {
    let unique = Uuid::new_v4().simple().to_string();
    let mut user = User::new(
        "Test".into(),
        "User".into(),
        format!("user-{unique}@example.com"),
        hash_password("correct horse battery")?,
        Gender::Female,
        Country::Uzbekistan,
        28,
        168,
        60,
        goal.into(),
        FitnessLevel::Beginner,
    );
    user.is_active = true;
    database.create_user(&user).await?;
    Ok(user)
}

/// Create and persist a staff user
pub async fn create_staff_user(database: &Database) -> Result<User> {
    let unique = Uuid::new_v4().simple().to_string();
    let mut user = User::new(
        "Staff".into(),
        "User".into(),
        format!("staff-{unique}@example.com"),
        hash_password("correct horse battery")?,
        Gender::Male,
        Country::Other,
        35,
        180,
        80,
        "Weight Loss".into(),
        FitnessLevel::Advanced,
    );
    user.is_active = true;
    user.is_staff = true;
    database.create_user(&user).await?;
    Ok(user)
}

/// Seed a program with `session_count` sessions, one meal shared by all
///
/// Returns (program, sessions, meal).
pub async fn seed_program(
    database: &Database,
    goal: &str,
    session_count: i64,
    frequency_per_week: i64,
) -> Result<(Program, Vec<Session>, Meal)> {
    let program = Program {
        id: Uuid::new_v4(),
        frequency_per_week,
        total_sessions: session_count,
        goal: Localized::new(goal),
        is_active: true,
    };
    database.create_program(&program).await?;

    let meal = Meal {
        id: Uuid::new_v4(),
        meal_type: MealType::Lunch,
        food_name: Localized::new("Grilled chicken with rice"),
        calories: 550.0,
        water_content: 250.0,
        preparation_time: 25,
    };
    database.create_meal(&meal).await?;

    let mut sessions = Vec::with_capacity(usize::try_from(session_count).unwrap());
    for number in 1..=session_count {
        let session = Session {
            id: Uuid::new_v4(),
            program_id: program.id,
            session_number: number,
            calories_burned: 200.0,
            duration_minutes: Some(45),
            exercise_ids: vec![],
            meal_ids: vec![meal.id],
        };
        database.create_session(&session).await?;
        sessions.push(session);
    }

    Ok((program, sessions, meal))
}

/// Seed an exercise for catalog tests
pub async fn seed_exercise(database: &Database) -> Result<Exercise> {
    let now = Utc::now();
    let exercise = Exercise {
        id: Uuid::new_v4(),
        category_id: None,
        name: Localized::with_translations(
            "Push-up",
            None,
            Some("Отжимание".into()),
            None,
        ),
        description: Localized::new("Standard push-up from plank position"),
        difficulty_level: FitnessLevel::Beginner,
        target_muscle: "Chest".into(),
        video_url: None,
        created_at: now,
        updated_at: now,
    };
    database.create_exercise(&exercise).await?;
    Ok(exercise)
}
