// ABOUTME: Database management for the Fitplan server over SQLite
// ABOUTME: Owns the connection pool and runs per-domain schema migrations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Database Management
//!
//! `SQLite` persistence for all Fitplan entities. Each domain gets its own
//! module extending [`Database`] with migrations and queries; [`Database::migrate`]
//! runs every domain's schema setup at startup.

mod completions;
mod enrollments;
mod exercises;
mod meals;
mod notifications;
mod programs;
mod sessions;
mod users;

pub use completions::{ScheduledMeal, ScheduledSession};
pub use enrollments::UserProgramUpdate;
pub use exercises::{ExerciseUpdate, WorkoutCategoryUpdate};
pub use meals::{MealUpdate, PreparationUpdate};
pub use programs::ProgramUpdate;
pub use sessions::SessionUpdate;

use anyhow::Result;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

/// Database manager for all persisted entities
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection pool and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or any migration fails
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains(":memory:")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_string()
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(&connection_options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails
    pub async fn migrate(&self) -> Result<()> {
        self.migrate_users().await?;
        self.migrate_programs().await?;
        self.migrate_exercises().await?;
        self.migrate_meals().await?;
        self.migrate_sessions().await?;
        self.migrate_enrollments().await?;
        self.migrate_completions().await?;
        self.migrate_notifications().await?;
        Ok(())
    }
}
