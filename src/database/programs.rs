// ABOUTME: Program catalog database operations
// ABOUTME: Handles program storage, goal lookup, and activation state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::i18n::Localized;
use crate::models::Program;
use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

/// Partial update for a program; `None` keeps the stored value
#[derive(Debug, Default, Clone)]
pub struct ProgramUpdate {
    pub frequency_per_week: Option<i64>,
    pub total_sessions: Option<i64>,
    pub goal: Option<Localized>,
    pub is_active: Option<bool>,
}

impl Database {
    /// Create the programs table
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_programs(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS programs (
                id TEXT PRIMARY KEY,
                frequency_per_week INTEGER NOT NULL CHECK (frequency_per_week BETWEEN 1 AND 7),
                total_sessions INTEGER NOT NULL DEFAULT 0,
                goal TEXT NOT NULL,
                goal_en TEXT,
                goal_ru TEXT,
                goal_uz TEXT,
                is_active BOOLEAN NOT NULL DEFAULT 1
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new program
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_program(&self, program: &Program) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO programs (
                id, frequency_per_week, total_sessions,
                goal, goal_en, goal_ru, goal_uz, is_active
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(program.id.to_string())
        .bind(program.frequency_per_week)
        .bind(program.total_sessions)
        .bind(&program.goal.text)
        .bind(&program.goal.en)
        .bind(&program.goal.ru)
        .bind(&program.goal.uz)
        .bind(program.is_active)
        .execute(&self.pool)
        .await?;

        Ok(program.id)
    }

    /// Get a program by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_program(&self, program_id: Uuid) -> Result<Option<Program>> {
        let row = sqlx::query("SELECT * FROM programs WHERE id = $1")
            .bind(program_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_program(&row)).transpose()
    }

    /// List programs, optionally restricted to active ones
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_programs(&self, active_only: bool) -> Result<Vec<Program>> {
        let query = if active_only {
            "SELECT * FROM programs WHERE is_active = 1 ORDER BY goal"
        } else {
            "SELECT * FROM programs ORDER BY goal"
        };

        let rows = sqlx::query(query).fetch_all(&self.pool).await?;
        rows.iter().map(Self::row_to_program).collect()
    }

    /// Find the active program matching a goal's base text
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn find_program_by_goal(&self, goal: &str) -> Result<Option<Program>> {
        let row = sqlx::query("SELECT * FROM programs WHERE goal = $1 AND is_active = 1")
            .bind(goal)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_program(&row)).transpose()
    }

    /// All goal texts, used to validate a registrant's chosen goal
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_program_goals(&self) -> Result<Vec<String>> {
        let goals = sqlx::query_scalar("SELECT goal FROM programs WHERE is_active = 1")
            .fetch_all(&self.pool)
            .await?;
        Ok(goals)
    }

    /// Apply a partial update to a program
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_program(
        &self,
        program_id: Uuid,
        update: &ProgramUpdate,
    ) -> Result<Option<Program>> {
        let Some(mut program) = self.get_program(program_id).await? else {
            return Ok(None);
        };

        if let Some(frequency) = update.frequency_per_week {
            program.frequency_per_week = frequency;
        }
        if let Some(total) = update.total_sessions {
            program.total_sessions = total;
        }
        if let Some(goal) = &update.goal {
            program.goal = goal.clone();
        }
        if let Some(is_active) = update.is_active {
            program.is_active = is_active;
        }

        sqlx::query(
            r"
            UPDATE programs SET
                frequency_per_week = $2,
                total_sessions = $3,
                goal = $4,
                goal_en = $5,
                goal_ru = $6,
                goal_uz = $7,
                is_active = $8
            WHERE id = $1
            ",
        )
        .bind(program_id.to_string())
        .bind(program.frequency_per_week)
        .bind(program.total_sessions)
        .bind(&program.goal.text)
        .bind(&program.goal.en)
        .bind(&program.goal.ru)
        .bind(&program.goal.uz)
        .bind(program.is_active)
        .execute(&self.pool)
        .await?;

        Ok(Some(program))
    }

    /// Delete a program; cascades handled by dependent tables' own deletes
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_program(&self, program_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(program_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_program(row: &sqlx::sqlite::SqliteRow) -> Result<Program> {
        let id: String = row.get("id");
        Ok(Program {
            id: Uuid::parse_str(&id)?,
            frequency_per_week: row.get("frequency_per_week"),
            total_sessions: row.get("total_sessions"),
            goal: Localized::with_translations(
                row.get::<String, _>("goal"),
                row.get("goal_en"),
                row.get("goal_ru"),
                row.get("goal_uz"),
            ),
            is_active: row.get("is_active"),
        })
    }
}
