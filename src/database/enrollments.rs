// ABOUTME: User program enrollment database operations
// ABOUTME: Handles enrollment rows, progress counting, and payment state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::models::{PaymentMethod, UserProgram};
use anyhow::Result;
use chrono::NaiveDate;
use sqlx::Row;
use uuid::Uuid;

/// Partial update for an enrollment; `None` keeps the stored value
#[derive(Debug, Default, Clone)]
pub struct UserProgramUpdate {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl Database {
    /// Create the user programs table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_enrollments(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS user_programs (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                program_id TEXT NOT NULL REFERENCES programs(id) ON DELETE CASCADE,
                start_date DATE NOT NULL,
                end_date DATE NOT NULL,
                progress INTEGER NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT 1,
                total_amount INTEGER,
                is_paid BOOLEAN NOT NULL DEFAULT 0,
                payment_method TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_user_programs_user ON user_programs(user_id, is_active)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new enrollment
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_user_program(&self, enrollment: &UserProgram) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO user_programs (
                id, user_id, program_id, start_date, end_date,
                progress, is_active, total_amount, is_paid, payment_method
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ",
        )
        .bind(enrollment.id.to_string())
        .bind(enrollment.user_id.to_string())
        .bind(enrollment.program_id.to_string())
        .bind(enrollment.start_date)
        .bind(enrollment.end_date)
        .bind(enrollment.progress)
        .bind(enrollment.is_active)
        .bind(enrollment.total_amount)
        .bind(enrollment.is_paid)
        .bind(enrollment.payment_method.map(|m| m.as_str()))
        .execute(&self.pool)
        .await?;

        Ok(enrollment.id)
    }

    /// Get an enrollment by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_program(&self, enrollment_id: Uuid) -> Result<Option<UserProgram>> {
        let row = sqlx::query("SELECT * FROM user_programs WHERE id = $1")
            .bind(enrollment_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_user_program(&row)).transpose()
    }

    /// List a user's enrollments
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_user_programs(&self, user_id: Uuid) -> Result<Vec<UserProgram>> {
        let rows = sqlx::query(
            "SELECT * FROM user_programs WHERE user_id = $1 ORDER BY start_date DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_user_program).collect()
    }

    /// Get a user's active enrollment, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_active_user_program(&self, user_id: Uuid) -> Result<Option<UserProgram>> {
        let row = sqlx::query(
            r"
            SELECT * FROM user_programs
            WHERE user_id = $1 AND is_active = 1
            ORDER BY start_date DESC
            LIMIT 1
            ",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_user_program(&row)).transpose()
    }

    /// Apply a partial update to an enrollment
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_user_program(
        &self,
        enrollment_id: Uuid,
        update: &UserProgramUpdate,
    ) -> Result<Option<UserProgram>> {
        let Some(mut enrollment) = self.get_user_program(enrollment_id).await? else {
            return Ok(None);
        };

        if let Some(start_date) = update.start_date {
            enrollment.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            enrollment.end_date = end_date;
        }
        if let Some(is_active) = update.is_active {
            enrollment.is_active = is_active;
        }

        sqlx::query(
            "UPDATE user_programs SET start_date = $2, end_date = $3, is_active = $4 WHERE id = $1",
        )
        .bind(enrollment_id.to_string())
        .bind(enrollment.start_date)
        .bind(enrollment.end_date)
        .bind(enrollment.is_active)
        .execute(&self.pool)
        .await?;

        Ok(Some(enrollment))
    }

    /// Delete an enrollment
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_user_program(&self, enrollment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM user_programs WHERE id = $1")
            .bind(enrollment_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Increment an enrollment's progress counter
    ///
    /// The counter never exceeds the program's session count; reaching it
    /// deactivates the enrollment. Returns the updated enrollment.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment is missing or the query fails
    pub async fn increment_progress(
        &self,
        enrollment_id: Uuid,
        total_sessions: i64,
    ) -> Result<UserProgram> {
        sqlx::query(
            r"
            UPDATE user_programs
            SET progress = MIN(progress + 1, $2),
                is_active = CASE WHEN MIN(progress + 1, $2) >= $2 THEN 0 ELSE is_active END
            WHERE id = $1
            ",
        )
        .bind(enrollment_id.to_string())
        .bind(total_sessions)
        .execute(&self.pool)
        .await?;

        self.get_user_program(enrollment_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("enrollment {enrollment_id} not found"))
    }

    /// Record a payment intent on an enrollment
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn set_payment_intent(
        &self,
        enrollment_id: Uuid,
        total_amount: i64,
        payment_method: PaymentMethod,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE user_programs SET total_amount = $2, payment_method = $3 WHERE id = $1",
        )
        .bind(enrollment_id.to_string())
        .bind(total_amount)
        .bind(payment_method.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Set an enrollment's paid flag (payment settled or cancelled)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn set_paid(&self, enrollment_id: Uuid, is_paid: bool) -> Result<()> {
        sqlx::query("UPDATE user_programs SET is_paid = $2 WHERE id = $1")
            .bind(enrollment_id.to_string())
            .bind(is_paid)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_user_program(row: &sqlx::sqlite::SqliteRow) -> Result<UserProgram> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let program_id: String = row.get("program_id");
        let payment_method: Option<String> = row.get("payment_method");

        Ok(UserProgram {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            program_id: Uuid::parse_str(&program_id)?,
            start_date: row.get("start_date"),
            end_date: row.get("end_date"),
            progress: row.get("progress"),
            is_active: row.get("is_active"),
            total_amount: row.get("total_amount"),
            is_paid: row.get("is_paid"),
            payment_method: payment_method.as_deref().and_then(PaymentMethod::parse),
        })
    }
}
