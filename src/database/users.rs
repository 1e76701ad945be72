// ABOUTME: User account database operations
// ABOUTME: Handles user storage, lookup, activation, and preference updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::i18n::Language;
use crate::models::{
    Country, FitnessLevel, Gender, NotificationPreferences, User,
};
use anyhow::{anyhow, Result};
use chrono::NaiveTime;
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the users table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_users(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                email_or_phone TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                gender TEXT NOT NULL CHECK (gender IN ('Male', 'Female')),
                country TEXT NOT NULL DEFAULT 'Other',
                age INTEGER NOT NULL,
                height_cm INTEGER NOT NULL,
                weight_kg INTEGER NOT NULL,
                goal TEXT NOT NULL,
                level TEXT NOT NULL,
                language TEXT NOT NULL DEFAULT 'en',
                notification_preferences TEXT NOT NULL,
                reminder_time TIME,
                is_premium BOOLEAN NOT NULL DEFAULT 0,
                is_staff BOOLEAN NOT NULL DEFAULT 0,
                is_active BOOLEAN NOT NULL DEFAULT 0,
                date_joined DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_users_email_or_phone ON users(email_or_phone)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the identifier is already registered or the
    /// database operation fails
    pub async fn create_user(&self, user: &User) -> Result<Uuid> {
        if self
            .get_user_by_identifier(&user.email_or_phone)
            .await?
            .is_some()
        {
            return Err(anyhow!("identifier already in use by another user"));
        }

        sqlx::query(
            r"
            INSERT INTO users (
                id, first_name, last_name, email_or_phone, password_hash,
                gender, country, age, height_cm, weight_kg, goal, level,
                language, notification_preferences, reminder_time,
                is_premium, is_staff, is_active, date_joined
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            ",
        )
        .bind(user.id.to_string())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email_or_phone)
        .bind(&user.password_hash)
        .bind(match user.gender {
            Gender::Male => "Male",
            Gender::Female => "Female",
        })
        .bind(format!("{:?}", user.country))
        .bind(i64::from(user.age))
        .bind(i64::from(user.height_cm))
        .bind(i64::from(user.weight_kg))
        .bind(&user.goal)
        .bind(user.level.as_str())
        .bind(user.language.as_str())
        .bind(serde_json::to_string(&user.notification_preferences)?)
        .bind(user.reminder_time)
        .bind(user.is_premium)
        .bind(user.is_staff)
        .bind(user.is_active)
        .bind(user.date_joined)
        .execute(&self.pool)
        .await?;

        Ok(user.id)
    }

    /// Get a user by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
        self.get_user_impl("id", &user_id.to_string()).await
    }

    /// Get a user by email-or-phone identifier
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_user_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        self.get_user_impl("email_or_phone", identifier).await
    }

    /// Get a user by identifier, returning an error if not found
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the user is absent
    pub async fn get_user_by_identifier_required(&self, identifier: &str) -> Result<User> {
        self.get_user_by_identifier(identifier)
            .await?
            .ok_or_else(|| anyhow!("user not found with identifier: {identifier}"))
    }

    async fn get_user_impl(&self, field: &str, value: &str) -> Result<Option<User>> {
        let query = format!("SELECT * FROM users WHERE {field} = $1");
        let row = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_user(&row)).transpose()
    }

    /// Set the active flag on an account (verification, login, logout)
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn set_user_active(&self, user_id: Uuid, is_active: bool) -> Result<()> {
        sqlx::query("UPDATE users SET is_active = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(is_active)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replace a user's password hash
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_password(&self, user_id: Uuid, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set a user's preferred content language
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_language(&self, user_id: Uuid, language: Language) -> Result<()> {
        sqlx::query("UPDATE users SET language = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(language.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Replace a user's notification preference flags
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database query fails
    pub async fn update_notification_preferences(
        &self,
        user_id: Uuid,
        preferences: &NotificationPreferences,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET notification_preferences = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(serde_json::to_string(preferences)?)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Set or clear a user's daily reminder time
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn update_reminder_time(
        &self,
        user_id: Uuid,
        reminder_time: Option<NaiveTime>,
    ) -> Result<()> {
        sqlx::query("UPDATE users SET reminder_time = $2 WHERE id = $1")
            .bind(user_id.to_string())
            .bind(reminder_time)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Convert a database row to a User struct
    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
        let id: String = row.get("id");
        let gender: String = row.get("gender");
        let country: String = row.get("country");
        let level: String = row.get("level");
        let language: String = row.get("language");
        let preferences_json: String = row.get("notification_preferences");
        let age: i64 = row.get("age");
        let height_cm: i64 = row.get("height_cm");
        let weight_kg: i64 = row.get("weight_kg");

        Ok(User {
            id: Uuid::parse_str(&id)?,
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            email_or_phone: row.get("email_or_phone"),
            password_hash: row.get("password_hash"),
            gender: if gender == "Female" {
                Gender::Female
            } else {
                Gender::Male
            },
            country: match country.as_str() {
                "Uzbekistan" => Country::Uzbekistan,
                "Russia" => Country::Russia,
                "Kazakhstan" => Country::Kazakhstan,
                _ => Country::Other,
            },
            age: u32::try_from(age).unwrap_or_default(),
            height_cm: u32::try_from(height_cm).unwrap_or_default(),
            weight_kg: u32::try_from(weight_kg).unwrap_or_default(),
            goal: row.get("goal"),
            level: FitnessLevel::parse(&level),
            language: Language::parse_or_default(&language),
            notification_preferences: serde_json::from_str(&preferences_json)
                .unwrap_or_default(),
            reminder_time: row.get("reminder_time"),
            is_premium: row.get("is_premium"),
            is_staff: row.get("is_staff"),
            is_active: row.get("is_active"),
            date_joined: row.get("date_joined"),
        })
    }
}
