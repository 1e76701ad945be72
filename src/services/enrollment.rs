// ABOUTME: Enrollment service creating user programs and their schedules
// ABOUTME: Runs at verification time: derives session dates and fans out completion rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Enrollment and schedule generation
//!
//! When a user verifies their account, their chosen goal is matched against
//! the active programs. A match creates a `UserProgram` spanning the program
//! length and eagerly materializes one incomplete `SessionCompletion` per
//! session plus one incomplete `MealCompletion` per (session, meal), each
//! carrying its derived calendar date.

use crate::database::Database;
use crate::models::{MealCompletion, SessionCompletion, User, UserProgram};
use crate::schedule;
use anyhow::Result;
use chrono::{Days, NaiveDate};
use uuid::Uuid;

/// Enroll a verified user into the program matching their goal
///
/// Returns `None` when no active program matches the user's goal; the
/// account stays verified and unenrolled, matching the original behavior.
///
/// # Errors
///
/// Returns an error if any database operation fails
pub async fn enroll_user(
    database: &Database,
    user: &User,
    start_date: NaiveDate,
) -> Result<Option<UserProgram>> {
    // Re-verification must not duplicate the schedule
    if let Some(existing) = database.get_active_user_program(user.id).await? {
        tracing::debug!(user_id = %user.id, "user already enrolled, keeping existing schedule");
        return Ok(Some(existing));
    }

    let Some(program) = database.find_program_by_goal(&user.goal).await? else {
        tracing::info!(
            user_id = %user.id,
            goal = %user.goal,
            "no active program matches goal, skipping enrollment"
        );
        return Ok(None);
    };

    let sessions = database.list_sessions_for_program(program.id).await?;
    let total_sessions = i64::try_from(sessions.len()).unwrap_or(0);

    let end_date = start_date
        .checked_add_days(Days::new(u64::try_from(total_sessions.max(0)).unwrap_or(0)))
        .unwrap_or(start_date);

    let enrollment = UserProgram {
        id: Uuid::new_v4(),
        user_id: user.id,
        program_id: program.id,
        start_date,
        end_date,
        progress: 0,
        is_active: true,
        total_amount: None,
        is_paid: false,
        payment_method: None,
    };
    database.create_user_program(&enrollment).await?;

    let dates = schedule::dates_for_program(start_date, total_sessions, program.frequency_per_week);

    for (session, session_date) in sessions.iter().zip(dates.iter()) {
        for meal_id in &session.meal_ids {
            database
                .create_meal_completion(&MealCompletion {
                    id: Uuid::new_v4(),
                    user_id: user.id,
                    session_id: session.id,
                    meal_id: *meal_id,
                    is_completed: false,
                    meal_date: *session_date,
                    completion_date: None,
                    reminder_sent: false,
                })
                .await?;
        }

        database
            .create_session_completion(&SessionCompletion {
                id: Uuid::new_v4(),
                user_id: user.id,
                session_id: session.id,
                is_completed: false,
                session_date: *session_date,
                completion_date: None,
                started_at: None,
                session_number: session.session_number,
            })
            .await?;
    }

    tracing::info!(
        user_id = %user.id,
        program_id = %program.id,
        sessions = sessions.len(),
        "user enrolled with generated schedule"
    );

    Ok(Some(enrollment))
}
