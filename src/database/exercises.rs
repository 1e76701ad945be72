// ABOUTME: Exercise and workout category database operations
// ABOUTME: Handles localized exercise content and category grouping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::i18n::Localized;
use crate::models::{Exercise, FitnessLevel, WorkoutCategory};
use anyhow::Result;
use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

/// Partial update for an exercise; `None` keeps the stored value
#[derive(Debug, Default, Clone)]
pub struct ExerciseUpdate {
    pub category_id: Option<Option<Uuid>>,
    pub name: Option<Localized>,
    pub description: Option<Localized>,
    pub difficulty_level: Option<FitnessLevel>,
    pub target_muscle: Option<String>,
    pub video_url: Option<Option<String>>,
}

/// Partial update for a workout category
#[derive(Debug, Default, Clone)]
pub struct WorkoutCategoryUpdate {
    pub name: Option<Localized>,
    pub description: Option<Localized>,
}

impl Database {
    /// Create the workout category and exercise tables
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_exercises(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS workout_categories (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                name_en TEXT,
                name_ru TEXT,
                name_uz TEXT,
                description TEXT NOT NULL,
                description_en TEXT,
                description_ru TEXT,
                description_uz TEXT
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS exercises (
                id TEXT PRIMARY KEY,
                category_id TEXT REFERENCES workout_categories(id) ON DELETE SET NULL,
                name TEXT NOT NULL,
                name_en TEXT,
                name_ru TEXT,
                name_uz TEXT,
                description TEXT NOT NULL,
                description_en TEXT,
                description_ru TEXT,
                description_uz TEXT,
                difficulty_level TEXT NOT NULL,
                target_muscle TEXT NOT NULL,
                video_url TEXT,
                created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new workout category
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_workout_category(&self, category: &WorkoutCategory) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO workout_categories (
                id, name, name_en, name_ru, name_uz,
                description, description_en, description_ru, description_uz
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(category.id.to_string())
        .bind(&category.name.text)
        .bind(&category.name.en)
        .bind(&category.name.ru)
        .bind(&category.name.uz)
        .bind(&category.description.text)
        .bind(&category.description.en)
        .bind(&category.description.ru)
        .bind(&category.description.uz)
        .execute(&self.pool)
        .await?;

        Ok(category.id)
    }

    /// Get a workout category by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_workout_category(&self, category_id: Uuid) -> Result<Option<WorkoutCategory>> {
        let row = sqlx::query("SELECT * FROM workout_categories WHERE id = $1")
            .bind(category_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_category(&row)).transpose()
    }

    /// List all workout categories
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_workout_categories(&self) -> Result<Vec<WorkoutCategory>> {
        let rows = sqlx::query("SELECT * FROM workout_categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_category).collect()
    }

    /// Apply a partial update to a workout category
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_workout_category(
        &self,
        category_id: Uuid,
        update: &WorkoutCategoryUpdate,
    ) -> Result<Option<WorkoutCategory>> {
        let Some(mut category) = self.get_workout_category(category_id).await? else {
            return Ok(None);
        };

        if let Some(name) = &update.name {
            category.name = name.clone();
        }
        if let Some(description) = &update.description {
            category.description = description.clone();
        }

        sqlx::query(
            r"
            UPDATE workout_categories SET
                name = $2, name_en = $3, name_ru = $4, name_uz = $5,
                description = $6, description_en = $7, description_ru = $8, description_uz = $9
            WHERE id = $1
            ",
        )
        .bind(category_id.to_string())
        .bind(&category.name.text)
        .bind(&category.name.en)
        .bind(&category.name.ru)
        .bind(&category.name.uz)
        .bind(&category.description.text)
        .bind(&category.description.en)
        .bind(&category.description.ru)
        .bind(&category.description.uz)
        .execute(&self.pool)
        .await?;

        Ok(Some(category))
    }

    /// Delete a workout category
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_workout_category(&self, category_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM workout_categories WHERE id = $1")
            .bind(category_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a new exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_exercise(&self, exercise: &Exercise) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO exercises (
                id, category_id, name, name_en, name_ru, name_uz,
                description, description_en, description_ru, description_uz,
                difficulty_level, target_muscle, video_url, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ",
        )
        .bind(exercise.id.to_string())
        .bind(exercise.category_id.map(|id| id.to_string()))
        .bind(&exercise.name.text)
        .bind(&exercise.name.en)
        .bind(&exercise.name.ru)
        .bind(&exercise.name.uz)
        .bind(&exercise.description.text)
        .bind(&exercise.description.en)
        .bind(&exercise.description.ru)
        .bind(&exercise.description.uz)
        .bind(exercise.difficulty_level.as_str())
        .bind(&exercise.target_muscle)
        .bind(&exercise.video_url)
        .bind(exercise.created_at)
        .bind(exercise.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(exercise.id)
    }

    /// Get an exercise by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_exercise(&self, exercise_id: Uuid) -> Result<Option<Exercise>> {
        let row = sqlx::query("SELECT * FROM exercises WHERE id = $1")
            .bind(exercise_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_exercise(&row)).transpose()
    }

    /// List all exercises
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_exercises(&self) -> Result<Vec<Exercise>> {
        let rows = sqlx::query("SELECT * FROM exercises ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_exercise).collect()
    }

    /// List the exercises linked to a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_exercises_for_session(&self, session_id: Uuid) -> Result<Vec<Exercise>> {
        let rows = sqlx::query(
            r"
            SELECT e.* FROM exercises e
            JOIN session_exercises se ON se.exercise_id = e.id
            WHERE se.session_id = $1
            ORDER BY e.name
            ",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_exercise).collect()
    }

    /// Apply a partial update to an exercise, bumping `updated_at`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_exercise(
        &self,
        exercise_id: Uuid,
        update: &ExerciseUpdate,
    ) -> Result<Option<Exercise>> {
        let Some(mut exercise) = self.get_exercise(exercise_id).await? else {
            return Ok(None);
        };

        if let Some(category_id) = update.category_id {
            exercise.category_id = category_id;
        }
        if let Some(name) = &update.name {
            exercise.name = name.clone();
        }
        if let Some(description) = &update.description {
            exercise.description = description.clone();
        }
        if let Some(level) = update.difficulty_level {
            exercise.difficulty_level = level;
        }
        if let Some(muscle) = &update.target_muscle {
            exercise.target_muscle = muscle.clone();
        }
        if let Some(video_url) = &update.video_url {
            exercise.video_url = video_url.clone();
        }
        exercise.updated_at = Utc::now();

        sqlx::query(
            r"
            UPDATE exercises SET
                category_id = $2,
                name = $3, name_en = $4, name_ru = $5, name_uz = $6,
                description = $7, description_en = $8, description_ru = $9, description_uz = $10,
                difficulty_level = $11, target_muscle = $12, video_url = $13, updated_at = $14
            WHERE id = $1
            ",
        )
        .bind(exercise_id.to_string())
        .bind(exercise.category_id.map(|id| id.to_string()))
        .bind(&exercise.name.text)
        .bind(&exercise.name.en)
        .bind(&exercise.name.ru)
        .bind(&exercise.name.uz)
        .bind(&exercise.description.text)
        .bind(&exercise.description.en)
        .bind(&exercise.description.ru)
        .bind(&exercise.description.uz)
        .bind(exercise.difficulty_level.as_str())
        .bind(&exercise.target_muscle)
        .bind(&exercise.video_url)
        .bind(exercise.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(Some(exercise))
    }

    /// Delete an exercise
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_exercise(&self, exercise_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(exercise_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_category(row: &sqlx::sqlite::SqliteRow) -> Result<WorkoutCategory> {
        let id: String = row.get("id");
        Ok(WorkoutCategory {
            id: Uuid::parse_str(&id)?,
            name: Localized::with_translations(
                row.get::<String, _>("name"),
                row.get("name_en"),
                row.get("name_ru"),
                row.get("name_uz"),
            ),
            description: Localized::with_translations(
                row.get::<String, _>("description"),
                row.get("description_en"),
                row.get("description_ru"),
                row.get("description_uz"),
            ),
        })
    }

    fn row_to_exercise(row: &sqlx::sqlite::SqliteRow) -> Result<Exercise> {
        let id: String = row.get("id");
        let category_id: Option<String> = row.get("category_id");
        let level: String = row.get("difficulty_level");
        Ok(Exercise {
            id: Uuid::parse_str(&id)?,
            category_id: category_id.as_deref().map(Uuid::parse_str).transpose()?,
            name: Localized::with_translations(
                row.get::<String, _>("name"),
                row.get("name_en"),
                row.get("name_ru"),
                row.get("name_uz"),
            ),
            description: Localized::with_translations(
                row.get::<String, _>("description"),
                row.get("description_en"),
                row.get("description_ru"),
                row.get("description_uz"),
            ),
            difficulty_level: FitnessLevel::parse(&level),
            target_muscle: row.get("target_muscle"),
            video_url: row.get("video_url"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}
