// ABOUTME: Notification database operations
// ABOUTME: Handles localized notification rows, read tracking, and reminder queries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

use super::Database;
use crate::i18n::{Language, Localized};
use crate::models::{Notification, NotificationType};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::Row;
use uuid::Uuid;

impl Database {
    /// Create the notifications table
    ///
    /// # Errors
    ///
    /// Returns an error if table or index creation fails
    pub(super) async fn migrate_notifications(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS notifications (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                message TEXT NOT NULL,
                message_en TEXT,
                message_ru TEXT,
                message_uz TEXT,
                language TEXT NOT NULL DEFAULT 'en',
                notification_type TEXT NOT NULL DEFAULT 'general',
                sent_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
                is_read BOOLEAN NOT NULL DEFAULT 0,
                scheduled_time TIME
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_notifications_user ON notifications(user_id, is_read)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Insert a new notification
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    pub async fn create_notification(&self, notification: &Notification) -> Result<Uuid> {
        sqlx::query(
            r"
            INSERT INTO notifications (
                id, user_id, message, message_en, message_ru, message_uz,
                language, notification_type, sent_at, is_read, scheduled_time
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(notification.id.to_string())
        .bind(notification.user_id.to_string())
        .bind(&notification.message.text)
        .bind(&notification.message.en)
        .bind(&notification.message.ru)
        .bind(&notification.message.uz)
        .bind(notification.language.as_str())
        .bind(notification.notification_type.as_str())
        .bind(notification.sent_at)
        .bind(notification.is_read)
        .bind(notification.scheduled_time)
        .execute(&self.pool)
        .await?;

        Ok(notification.id)
    }

    /// Get a notification by id, scoped to its recipient
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_notification(
        &self,
        notification_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Notification>> {
        let row = sqlx::query("SELECT * FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(notification_id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_notification(&row)).transpose()
    }

    /// List a user's notifications, newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY sent_at DESC",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_notification).collect()
    }

    /// Mark a notification as read
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn mark_notification_read(&self, notification_id: Uuid) -> Result<()> {
        sqlx::query("UPDATE notifications SET is_read = 1 WHERE id = $1")
            .bind(notification_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Reminder notifications whose scheduled time has passed and which were
    /// last sent before `today`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn due_reminders(
        &self,
        now_time: NaiveTime,
        today: NaiveDate,
    ) -> Result<Vec<Notification>> {
        let rows = sqlx::query(
            r"
            SELECT * FROM notifications
            WHERE notification_type = 'reminder'
              AND is_read = 0
              AND scheduled_time IS NOT NULL
              AND scheduled_time <= $1
              AND DATE(sent_at) < $2
            ",
        )
        .bind(now_time)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(Self::row_to_notification).collect()
    }

    /// Stamp a notification's `sent_at`, recording a reminder re-issue
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn touch_notification_sent(
        &self,
        notification_id: Uuid,
        sent_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("UPDATE notifications SET sent_at = $2 WHERE id = $1")
            .bind(notification_id.to_string())
            .bind(sent_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn row_to_notification(row: &sqlx::sqlite::SqliteRow) -> Result<Notification> {
        let id: String = row.get("id");
        let user_id: String = row.get("user_id");
        let language: String = row.get("language");
        let notification_type: String = row.get("notification_type");
        Ok(Notification {
            id: Uuid::parse_str(&id)?,
            user_id: Uuid::parse_str(&user_id)?,
            message: Localized::with_translations(
                row.get::<String, _>("message"),
                row.get("message_en"),
                row.get("message_ru"),
                row.get("message_uz"),
            ),
            language: Language::parse_or_default(&language),
            notification_type: NotificationType::parse(&notification_type),
            sent_at: row.get("sent_at"),
            is_read: row.get("is_read"),
            scheduled_time: row.get("scheduled_time"),
        })
    }
}
