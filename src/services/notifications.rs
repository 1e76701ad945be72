// ABOUTME: Notification issuance and the reminder sweep
// ABOUTME: Stores localized notification rows gated on user preferences
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Notification service
//!
//! Notifications are persisted in all supported languages and surfaced in-app;
//! outbound email/SMS delivery is out of scope, so channel preferences only
//! gate whether a row is created or a reminder is re-issued. The reminder
//! sweep is driven by the `send-reminders` binary on an external cron cadence
//! and is fire-and-forget.

use crate::database::Database;
use crate::i18n::Localized;
use crate::models::{Notification, NotificationType, User};
use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

/// Message stored when a reminder is re-issued
const REMINDER_MESSAGE: &str = "Remember to complete your session!";

/// Create a notification for a user in their preferred language
///
/// Reminder-type notifications carry the user's configured reminder time so
/// the sweep knows when they become due.
///
/// # Errors
///
/// Returns an error if the database insert fails
pub async fn send_notification(
    database: &Database,
    user: &User,
    message: Localized,
    notification_type: NotificationType,
) -> Result<Notification> {
    let notification = Notification {
        id: Uuid::new_v4(),
        user_id: user.id,
        message,
        language: user.language,
        notification_type,
        sent_at: Utc::now(),
        is_read: false,
        scheduled_time: match notification_type {
            NotificationType::Reminder => user.reminder_time,
            NotificationType::General => None,
        },
    };
    database.create_notification(&notification).await?;

    tracing::debug!(
        user_id = %user.id,
        notification_id = %notification.id,
        kind = notification_type.as_str(),
        "notification stored"
    );

    Ok(notification)
}

/// Re-issue due reminders and stamp them as sent
///
/// Finds unread reminder notifications whose scheduled time has passed and
/// which were last sent before today. Users who disabled reminders still get
/// their `sent_at` stamped so the row is not rescanned every sweep.
///
/// # Errors
///
/// Returns an error if a database query fails
pub async fn run_reminder_sweep(database: &Database) -> Result<usize> {
    let now = Utc::now();
    let due = database
        .due_reminders(now.time(), now.date_naive())
        .await?;

    let mut issued = 0;
    for notification in &due {
        let Some(user) = database.get_user(notification.user_id).await? else {
            continue;
        };

        if user.notification_preferences.reminder_enabled {
            send_notification(
                database,
                &user,
                Localized::new(REMINDER_MESSAGE),
                NotificationType::Reminder,
            )
            .await?;
            issued += 1;
        }

        database
            .touch_notification_sent(notification.id, now)
            .await?;
    }

    tracing::info!(due = due.len(), issued, "reminder sweep finished");
    Ok(issued)
}
