// ABOUTME: Meal and preparation database operations
// ABOUTME: Handles localized meal content and preparation methods
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::i18n::Localized;
use crate::models::{Meal, MealType, Preparation};
use anyhow::{anyhow, Result};
use sqlx::Row;
use uuid::Uuid;

/// Partial update for a meal; `None` keeps the stored value
#[derive(Debug, Default, Clone)]
pub struct MealUpdate {
    pub meal_type: Option<MealType>,
    pub food_name: Option<Localized>,
    pub calories: Option<f64>,
    pub water_content: Option<f64>,
    pub preparation_time: Option<i64>,
}

/// Partial update for a preparation
#[derive(Debug, Default, Clone)]
pub struct PreparationUpdate {
    pub name: Option<Localized>,
    pub description: Option<Localized>,
    pub preparation_time: Option<i64>,
}

impl Database {
    /// Create the meals and preparations tables
    ///
    /// # Errors
    ///
    /// Returns an error if table creation fails
    pub(super) async fn migrate_meals(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS meals (
                id TEXT PRIMARY KEY,
                meal_type TEXT NOT NULL CHECK (meal_type IN ('breakfast', 'lunch', 'snack', 'dinner')),
                food_name TEXT NOT NULL,
                food_name_en TEXT,
                food_name_ru TEXT,
                food_name_uz TEXT,
                calories REAL NOT NULL,
                water_content REAL NOT NULL,
                preparation_time INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS preparations (
                id TEXT PRIMARY KEY,
                meal_id TEXT NOT NULL REFERENCES meals(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                name_en TEXT,
                name_ru TEXT,
                name_uz TEXT,
                description TEXT NOT NULL,
                description_en TEXT,
                description_ru TEXT,
                description_uz TEXT,
                preparation_time INTEGER NOT NULL DEFAULT 0
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_preparations_meal ON preparations(meal_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert a new meal
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_meal(&self, meal: &Meal) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO meals (
                id, meal_type, food_name, food_name_en, food_name_ru, food_name_uz,
                calories, water_content, preparation_time
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(meal.id.to_string())
        .bind(meal.meal_type.as_str())
        .bind(&meal.food_name.text)
        .bind(&meal.food_name.en)
        .bind(&meal.food_name.ru)
        .bind(&meal.food_name.uz)
        .bind(meal.calories)
        .bind(meal.water_content)
        .bind(meal.preparation_time)
        .execute(&self.pool)
        .await?;

        Ok(meal.id)
    }

    /// Get a meal by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_meal(&self, meal_id: Uuid) -> Result<Option<Meal>> {
        let row = sqlx::query("SELECT * FROM meals WHERE id = $1")
            .bind(meal_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_meal(&row)).transpose()
    }

    /// List all meals
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_meals(&self) -> Result<Vec<Meal>> {
        let rows = sqlx::query("SELECT * FROM meals ORDER BY food_name")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(Self::row_to_meal).collect()
    }

    /// List the meals linked to a session
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_meals_for_session(&self, session_id: Uuid) -> Result<Vec<Meal>> {
        let rows = sqlx::query(
            r"
            SELECT m.* FROM meals m
            JOIN session_meals sm ON sm.meal_id = m.id
            WHERE sm.session_id = $1
            ",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_meal).collect()
    }

    /// Apply a partial update to a meal
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_meal(&self, meal_id: Uuid, update: &MealUpdate) -> Result<Option<Meal>> {
        let Some(mut meal) = self.get_meal(meal_id).await? else {
            return Ok(None);
        };

        if let Some(meal_type) = update.meal_type {
            meal.meal_type = meal_type;
        }
        if let Some(food_name) = &update.food_name {
            meal.food_name = food_name.clone();
        }
        if let Some(calories) = update.calories {
            meal.calories = calories;
        }
        if let Some(water) = update.water_content {
            meal.water_content = water;
        }
        if let Some(prep) = update.preparation_time {
            meal.preparation_time = prep;
        }

        sqlx::query(
            r"
            UPDATE meals SET
                meal_type = $2,
                food_name = $3, food_name_en = $4, food_name_ru = $5, food_name_uz = $6,
                calories = $7, water_content = $8, preparation_time = $9
            WHERE id = $1
            ",
        )
        .bind(meal_id.to_string())
        .bind(meal.meal_type.as_str())
        .bind(&meal.food_name.text)
        .bind(&meal.food_name.en)
        .bind(&meal.food_name.ru)
        .bind(&meal.food_name.uz)
        .bind(meal.calories)
        .bind(meal.water_content)
        .bind(meal.preparation_time)
        .execute(&self.pool)
        .await?;

        Ok(Some(meal))
    }

    /// Delete a meal
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_meal(&self, meal_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(meal_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Insert a new preparation for a meal
    ///
    /// # Errors
    ///
    /// Returns an error if the meal is missing or the operation fails
    pub async fn create_preparation(&self, preparation: &Preparation) -> Result<Uuid> {
        if self.get_meal(preparation.meal_id).await?.is_none() {
            return Err(anyhow!("meal {} does not exist", preparation.meal_id));
        }

        sqlx::query(
            r"
            INSERT INTO preparations (
                id, meal_id, name, name_en, name_ru, name_uz,
                description, description_en, description_ru, description_uz,
                preparation_time
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(preparation.id.to_string())
        .bind(preparation.meal_id.to_string())
        .bind(&preparation.name.text)
        .bind(&preparation.name.en)
        .bind(&preparation.name.ru)
        .bind(&preparation.name.uz)
        .bind(&preparation.description.text)
        .bind(&preparation.description.en)
        .bind(&preparation.description.ru)
        .bind(&preparation.description.uz)
        .bind(preparation.preparation_time)
        .execute(&self.pool)
        .await?;

        Ok(preparation.id)
    }

    /// Get a preparation by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_preparation(&self, preparation_id: Uuid) -> Result<Option<Preparation>> {
        let row = sqlx::query("SELECT * FROM preparations WHERE id = $1")
            .bind(preparation_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_preparation(&row)).transpose()
    }

    /// List preparations, optionally filtered by meal
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_preparations(&self, meal_id: Option<Uuid>) -> Result<Vec<Preparation>> {
        let rows = match meal_id {
            Some(meal_id) => {
                sqlx::query("SELECT * FROM preparations WHERE meal_id = $1 ORDER BY name")
                    .bind(meal_id.to_string())
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query("SELECT * FROM preparations ORDER BY name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        rows.iter().map(Self::row_to_preparation).collect()
    }

    /// Apply a partial update to a preparation
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_preparation(
        &self,
        preparation_id: Uuid,
        update: &PreparationUpdate,
    ) -> Result<Option<Preparation>> {
        let Some(mut preparation) = self.get_preparation(preparation_id).await? else {
            return Ok(None);
        };

        if let Some(name) = &update.name {
            preparation.name = name.clone();
        }
        if let Some(description) = &update.description {
            preparation.description = description.clone();
        }
        if let Some(prep_time) = update.preparation_time {
            preparation.preparation_time = prep_time;
        }

        sqlx::query(
            r"
            UPDATE preparations SET
                name = $2, name_en = $3, name_ru = $4, name_uz = $5,
                description = $6, description_en = $7, description_ru = $8, description_uz = $9,
                preparation_time = $10
            WHERE id = $1
            ",
        )
        .bind(preparation_id.to_string())
        .bind(&preparation.name.text)
        .bind(&preparation.name.en)
        .bind(&preparation.name.ru)
        .bind(&preparation.name.uz)
        .bind(&preparation.description.text)
        .bind(&preparation.description.en)
        .bind(&preparation.description.ru)
        .bind(&preparation.description.uz)
        .bind(preparation.preparation_time)
        .execute(&self.pool)
        .await?;

        Ok(Some(preparation))
    }

    /// Delete a preparation
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn delete_preparation(&self, preparation_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM preparations WHERE id = $1")
            .bind(preparation_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_meal(row: &sqlx::sqlite::SqliteRow) -> Result<Meal> {
        let id: String = row.get("id");
        let meal_type: String = row.get("meal_type");
        Ok(Meal {
            id: Uuid::parse_str(&id)?,
            meal_type: MealType::parse(&meal_type)
                .ok_or_else(|| anyhow!("unknown meal type: {meal_type}"))?,
            food_name: Localized::with_translations(
                row.get::<String, _>("food_name"),
                row.get("food_name_en"),
                row.get("food_name_ru"),
                row.get("food_name_uz"),
            ),
            calories: row.get("calories"),
            water_content: row.get("water_content"),
            preparation_time: row.get("preparation_time"),
        })
    }

    fn row_to_preparation(row: &sqlx::sqlite::SqliteRow) -> Result<Preparation> {
        let id: String = row.get("id");
        let meal_id: String = row.get("meal_id");
        Ok(Preparation {
            id: Uuid::parse_str(&id)?,
            meal_id: Uuid::parse_str(&meal_id)?,
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
            preparation_time: row.get("preparation_time"),
        })
    }
}
