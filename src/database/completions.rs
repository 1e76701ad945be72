// ABOUTME: Session and meal completion tracking database operations
// ABOUTME: Handles per-user completion rows, next-due lookup, and date-range queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::models::{MealCompletion, SessionCompletion};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::Row;
use uuid::Uuid;

/// A scheduled session joined with its calorie value, for progress summaries
#[derive(Debug, Clone)]
pub struct ScheduledSession {
    pub session_id: Uuid,
    pub calories_burned: f64,
    pub is_completed: bool,
}

/// A scheduled meal joined with its calorie value, for progress summaries
#[derive(Debug, Clone)]
pub struct ScheduledMeal {
    pub meal_id: Uuid,
    pub calories: f64,
    pub is_completed: bool,
}

impl Database {
    /// Create the completion tracking tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_completions(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS session_completions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                is_completed BOOLEAN NOT NULL DEFAULT 0,
                session_date DATE NOT NULL,
                completion_date DATE,
                started_at DATETIME,
                session_number INTEGER NOT NULL,
                UNIQUE (user_id, session_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS meal_completions (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                meal_id TEXT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                is_completed BOOLEAN NOT NULL DEFAULT 0,
                meal_date DATE NOT NULL,
                completion_date DATE,
                reminder_sent BOOLEAN NOT NULL DEFAULT 0,
                UNIQUE (user_id, session_id, meal_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_session_completions_user_date
             ON session_completions(user_id, is_completed, session_date)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_meal_completions_user_date
             ON meal_completions(user_id, meal_date)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert an incomplete session completion row
    ///
    /// # Errors
    ///
    /// Returns an error if the (user, session) pair already has a row
    pub async fn create_session_completion(&self, completion: &SessionCompletion) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO session_completions (
                id, user_id, session_id, is_completed,
                session_date, completion_date, started_at, session_number
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(completion.id.to_string())
        .bind(completion.user_id.to_string())
        .bind(completion.session_id.to_string())
        .bind(completion.is_completed)
        .bind(completion.session_date)
        .bind(completion.completion_date)
        .bind(completion.started_at)
        .bind(completion.session_number)
        .execute(&self.pool)
        .await?;

        Ok(completion.id)
    }

    /// Get the completion row for a (user, session) pair
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_session_completion(
        &self,
        user_id: Uuid,
        session_id: Uuid,
    ) -> Result<Option<SessionCompletion>> {
        let row = sqlx::query(
            "SELECT * FROM session_completions WHERE user_id = $1 AND session_id = $2",
        )
        .bind(user_id.to_string())
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_session_completion(&row))
            .transpose()
    }

    /// The earliest-dated incomplete session whose date has arrived
    ///
    /// This is the only session the user may complete.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn next_due_session(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<SessionCompletion>> {
        let row = sqlx::query(
            r"
            SELECT * FROM session_completions
            WHERE user_id = $1 AND is_completed = 0 AND session_date <= $2
            ORDER BY session_date, session_number
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_session_completion(&row))
            .transpose()
    }

    /// The next incomplete session scheduled today or later, for session lists
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn next_upcoming_session(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<SessionCompletion>> {
        let row = sqlx::query(
            r"
            SELECT * FROM session_completions
            WHERE user_id = $1 AND is_completed = 0 AND session_date >= $2
            ORDER BY session_date, session_number
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .bind(today)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_session_completion(&row))
            .transpose()
    }

    /// Session ids the user has completed
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn completed_session_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT session_id FROM session_completions WHERE user_id = $1 AND is_completed = 1",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        ids.iter()
            .map(|s| Uuid::parse_str(s).map_err(Into::into))
            .collect()
    }

    /// Mark a session completion row as done
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_session_completed(
        &self,
        completion_id: Uuid,
        completion_date: NaiveDate,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE session_completions SET is_completed = 1, completion_date = $2 WHERE id = $1",
        )
        .bind(completion_id.to_string())
        .bind(completion_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Record the moment the user started a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_session_started(
        &self,
        completion_id: Uuid,
        started_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE session_completions SET started_at = $2 WHERE id = $1")
            .bind(completion_id.to_string())
            .bind(started_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert an incomplete meal completion row
    ///
    /// # Errors
    ///
    /// Returns an error if the (user, session, meal) triple already has a row
    pub async fn create_meal_completion(&self, completion: &MealCompletion) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO meal_completions (
                id, user_id, session_id, meal_id, is_completed,
                meal_date, completion_date, reminder_sent
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(completion.id.to_string())
        .bind(completion.user_id.to_string())
        .bind(completion.session_id.to_string())
        .bind(completion.meal_id.to_string())
        .bind(completion.is_completed)
        .bind(completion.meal_date)
        .bind(completion.completion_date)
        .bind(completion.reminder_sent)
        .execute(&self.pool)
        .await?;

        Ok(completion.id)
    }

    /// Get the completion row for a (user, session, meal) triple
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_meal_completion(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        meal_id: Uuid,
    ) -> Result<Option<MealCompletion>> {
        let row = sqlx::query(
            r"
            SELECT * FROM meal_completions
            WHERE user_id = $1 AND session_id = $2 AND meal_id = $3
            ",
        )
        .bind(user_id.to_string())
        .bind(session_id.to_string())
        .bind(meal_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_meal_completion(&row)).transpose()
    }

    /// Get a meal completion row by its own id, scoped to a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_meal_completion_by_id(
        &self,
        completion_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MealCompletion>> {
        let row = sqlx::query("SELECT * FROM meal_completions WHERE id = $1 AND user_id = $2")
            .bind(completion_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_meal_completion(&row)).transpose()
    }

    /// List all of a user's meal completion rows
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_meal_completions(&self, user_id: Uuid) -> Result<Vec<MealCompletion>> {
        let rows = sqlx::query(
            "SELECT * FROM meal_completions WHERE user_id = $1 ORDER BY meal_date",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_meal_completion).collect()
    }

    /// Mark a meal completion row as done
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_meal_completed(
        &self,
        completion_id: Uuid,
        completion_date: NaiveDate,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE meal_completions SET is_completed = 1, completion_date = $2 WHERE id = $1",
        )
        .bind(completion_id.to_string())
        .bind(completion_date)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Delete a meal completion row, scoped to a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_meal_completion(&self, completion_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meal_completions WHERE id = $1 AND user_id = $2")
            .bind(completion_id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Scheduled sessions in a date range, joined with calorie values
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn scheduled_sessions_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduledSession>> {
        let rows = sqlx::query(
            r"
            SELECT sc.session_id, sc.is_completed, s.calories_burned
            FROM session_completions sc
            JOIN sessions s ON s.id = sc.session_id
            WHERE sc.user_id = $1 AND sc.session_date BETWEEN $2 AND $3
            ORDER BY sc.session_date, sc.session_number
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let session_id: String = row.get("session_id");
                Ok(ScheduledSession {
                    session_id: Uuid::parse_str(&session_id)?,
                    calories_burned: row.get("calories_burned"),
                    is_completed: row.get("is_completed"),
                })
            })
            .collect()
    }

    /// Scheduled meals in a date range, joined with calorie values
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn scheduled_meals_between(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<ScheduledMeal>> {
        let rows = sqlx::query(
            r"
            SELECT mc.meal_id, mc.is_completed, m.calories
            FROM meal_completions mc
            JOIN meals m ON m.id = mc.meal_id
            WHERE mc.user_id = $1 AND mc.meal_date BETWEEN $2 AND $3
            ORDER BY mc.meal_date
            ",
        )
        .bind(user_id.to_string())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let meal_id: String = row.get("meal_id");
                Ok(ScheduledMeal {
                    meal_id: Uuid::parse_str(&meal_id)?,
                    calories: row.get("calories"),
                    is_completed: row.get("is_completed"),
                })
            })
            .collect()
    }

    fn row_to_session_completion(row: &sqlx::sqlite::SqliteRow) -> Result<SessionCompletion> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let session_id: String = row.get("session_id");
        Ok(SessionCompletion {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            session_id: Uuid::parse_str(&session_id)?,
            is_completed: row.get("is_completed"),
            session_date: row.get("session_date"),
            completion_date: row.get("completion_date"),
            started_at: row.get("started_at"),
            session_number: row.get("session_number"),
        })
    }

    fn row_to_meal_completion(row: &sqlx::sqlite::SqliteRow) -> Result<MealCompletion> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let session_id: String = row.get("session_id");
        let meal_id: String = row.get("meal_id");
        Ok(MealCompletion {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            session_id: Uuid::parse_str(&session_id)?,
            meal_id: Uuid::parse_str(&meal_id)?,
            is_completed: row.get("is_completed"),
            meal_date: row.get("meal_date"),
            completion_date: row.get("completion_date"),
            reminder_sent: row.get("reminder_sent"),
        })
    }
}
