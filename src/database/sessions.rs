// ABOUTME: Session template database operations
// ABOUTME: Handles session storage plus exercise and meal link tables
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::models::Session;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

/// Partial update for a session; `None` keeps the stored value
#[derive(Debug, Default, Clone)]
pub struct SessionUpdate {
    pub session_number: Option<i64>,
    pub calories_burned: Option<f64>,
    pub duration_minutes: Option<Option<i64>>,
    pub exercise_ids: Option<Vec<Uuid>>,
    pub meal_ids: Option<Vec<Uuid>>,
}

impl Database {
    /// Create the sessions table and its link tables
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_sessions(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                program_id TEXT NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                session_number INTEGER NOT NULL,
                calories_burned REAL NOT NULL DEFAULT 0,
                duration_minutes INTEGER,
                UNIQUE (program_id, session_number)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS session_exercises (
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
                PRIMARY KEY (session_id, exercise_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS session_meals (
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                meal_id TEXT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                PRIMARY KEY (session_id, meal_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_sessions_program ON sessions(program_id, session_number)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new session with its exercise and meal links
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_session(&self, session: &Session) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO sessions (id, program_id, session_number, calories_burned, duration_minutes)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(session.id.to_string())
        .bind(session.program_id.to_string())
        .bind(session.session_number)
        .bind(session.calories_burned)
        .bind(session.duration_minutes)
        .execute(&self.pool)
        .await?;

        self.replace_session_links(session.id, &session.exercise_ids, &session.meal_ids)
            .await?;

        Ok(session.id)
    }

    /// Get a session by ID, links included
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_session(&self, session_id: Uuid) -> Result<Option<Session>> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = $1")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_session(&row).await?)),
            None => Ok(None),
        }
    }

    /// Get a session within a program by its session number
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_session_by_number(
        &self,
        program_id: Uuid,
        session_number: i64,
    ) -> Result<Option<Session>> {
        let row = sqlx::query("SELECT * FROM sessions WHERE program_id = $1 AND session_number = $2")
            .bind(program_id.to_string())
            .bind(session_number)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some(self.row_to_session(&row).await?)),
            None => Ok(None),
        }
    }

    /// List a program's sessions ordered by session number
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_sessions_for_program(&self, program_id: Uuid) -> Result<Vec<Session>> {
        let rows = sqlx::query(
            "SELECT * FROM sessions WHERE program_id = $1 ORDER BY session_number",
        )
        .bind(program_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            sessions.push(self.row_to_session(row).await?);
        }
        Ok(sessions)
    }

    /// List all sessions ordered by session number (staff view)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_all_sessions(&self) -> Result<Vec<Session>> {
        let rows = sqlx::query("SELECT * FROM sessions ORDER BY session_number")
            .fetch_all(&self.pool)
            .await?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            sessions.push(self.row_to_session(row).await?);
        }
        Ok(sessions)
    }

    /// List sessions by a set of ids, ordered by session number
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_sessions_by_ids(&self, session_ids: &[Uuid]) -> Result<Vec<Session>> {
        let mut sessions = Vec::with_capacity(session_ids.len());
        for session_id in session_ids {
            if let Some(session) = self.get_session(*session_id).await? {
                sessions.push(session);
            }
        }
        sessions.sort_by_key(|s| s.session_number);
        Ok(sessions)
    }

    /// Apply a partial update to a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_session(
        &self,
        session_id: Uuid,
        update: &SessionUpdate,
    ) -> Result<Option<Session>> {
        let Some(mut session) = self.get_session(session_id).await? else {
            return Ok(None);
        };

        if let Some(number) = update.session_number {
            session.session_number = number;
        }
        if let Some(calories) = update.calories_burned {
            session.calories_burned = calories;
        }
        if let Some(duration) = update.duration_minutes {
            session.duration_minutes = duration;
        }
        if let Some(exercise_ids) = &update.exercise_ids {
            session.exercise_ids = exercise_ids.clone();
        }
        if let Some(meal_ids) = &update.meal_ids {
            session.meal_ids = meal_ids.clone();
        }

        sqlx::query(
            r"
            UPDATE sessions SET
                session_number = $2,
                calories_burned = $3,
                duration_minutes = $4
            WHERE id = $1
            ",
        )
        .bind(session_id.to_string())
        .bind(session.session_number)
        .bind(session.calories_burned)
        .bind(session.duration_minutes)
        .execute(&self.pool)
        .await?;

        self.replace_session_links(session_id, &session.exercise_ids, &session.meal_ids)
            .await?;

        Ok(Some(session))
    }

    /// Delete a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_session(&self, session_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_session_links(
        &self,
        session_id: Uuid,
        exercise_ids: &[Uuid],
        meal_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM session_exercises WHERE session_id = $1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM session_meals WHERE session_id = $1")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;

        for exercise_id in exercise_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO session_exercises (session_id, exercise_id) VALUES ($1, $2)",
            )
            .bind(session_id.to_string())
            .bind(exercise_id.to_string())
            .execute(&self.pool)
            .await?;
        }
        for meal_id in meal_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO session_meals (session_id, meal_id) VALUES ($1, $2)",
            )
            .bind(session_id.to_string())
            .bind(meal_id.to_string())
            .execute(&self.pool)
            .await?;
        }

        Ok(())
    }

    async fn row_to_session(&self, row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
        let id: String = row.get("id");
        let program_id: String = row.get("program_id");
        let session_id = Uuid::parse_str(&id)?;

        let exercise_ids: Vec<String> = sqlx::query_scalar(
            "SELECT exercise_id FROM session_exercises WHERE session_id = $1",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await?;
        let meal_ids: Vec<String> =
            sqlx::query_scalar("SELECT meal_id FROM session_meals WHERE session_id = $1")
                .bind(&id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Session {
            id: session_id,
            program_id: Uuid::parse_str(&program_id)?,
            session_number: row.get("session_number"),
            calories_burned: row.get("calories_burned"),
            duration_minutes: row.get("duration_minutes"),
            exercise_ids: exercise_ids
                .iter()
                .map(|s| Uuid::parse_str(s))
                .collect::<Result<_, _>>()?,
            meal_ids: meal_ids
                .iter()
                .map(|s| Uuid::parse_str(s))
                .collect::<Result<_, _>>()?,
        })
    }
}
