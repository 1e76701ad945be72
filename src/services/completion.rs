// ABOUTME: Completion state machine for sessions and meals
// ABOUTME: Enforces next-due ordering, date gating, and progress counting
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Completion rules
//!
//! Sessions move PENDING → COMPLETED, and only the next due session — the
//! earliest-dated incomplete one whose scheduled date has arrived — may make
//! the transition. Completing it bumps the active enrollment's progress
//! counter, which deactivates the enrollment when it reaches the program's
//! session count. Meals complete independently and in any order.

use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::{SessionCompletion, UserProgram};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Result of completing a session
#[derive(Debug)]
pub struct SessionCompletionOutcome {
    /// The completion row after the transition
    pub completion: SessionCompletion,
    /// The enrollment after its progress was counted, if one is active
    pub enrollment: Option<UserProgram>,
}

/// Result of a session start
#[derive(Debug)]
pub struct SessionStartOutcome {
    pub started_at: DateTime<Utc>,
    /// Start plus the session's expected duration, when it has one
    pub estimated_end: Option<DateTime<Utc>>,
}

/// Whether a meal completion changed anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealCompletionOutcome {
    Completed,
    /// The row was already complete; the operation is idempotent
    AlreadyCompleted,
}

/// Complete a session for a user, enforcing ordering and date rules
///
/// # Errors
///
/// - `ResourceNotFound` when the session is not assigned to the user
/// - `AlreadyCompleted` when the row is already complete
/// - `CompletionTooEarly` when the scheduled date is in the future
/// - `CompletionOrderViolation` when an earlier incomplete session exists
pub async fn complete_session(
    database: &Database,
    user_id: Uuid,
    session_id: Uuid,
    today: NaiveDate,
) -> AppResult<SessionCompletionOutcome> {
    let completion = database
        .get_session_completion(user_id, session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session in your program"))?;

    if completion.is_completed {
        return Err(AppError::already_completed("Session"));
    }

    if completion.session_date > today {
        return Err(AppError::completion_too_early()
            .with_details(serde_json::json!({ "session_date": completion.session_date })));
    }

    // Only the earliest due session may transition
    let next_due = database
        .next_due_session(user_id, today)
        .await?
        .ok_or_else(AppError::completion_order_violation)?;
    if next_due.session_id != session_id {
        return Err(AppError::completion_order_violation().with_details(
            serde_json::json!({ "next_session_number": next_due.session_number }),
        ));
    }

    database
        .mark_session_completed(completion.id, today)
        .await?;

    let enrollment = count_progress(database, user_id).await?;

    let completion = database
        .get_session_completion(user_id, session_id)
        .await?
        .ok_or_else(|| AppError::internal("completion row vanished mid-update"))?;

    tracing::info!(
        %user_id,
        %session_id,
        session_number = completion.session_number,
        "session completed"
    );

    Ok(SessionCompletionOutcome {
        completion,
        enrollment,
    })
}

/// Bump the active enrollment's progress counter
async fn count_progress(database: &Database, user_id: Uuid) -> AppResult<Option<UserProgram>> {
    let Some(enrollment) = database.get_active_user_program(user_id).await? else {
        return Ok(None);
    };
    let Some(program) = database.get_program(enrollment.program_id).await? else {
        return Ok(None);
    };

    let updated = database
        .increment_progress(enrollment.id, program.total_sessions)
        .await?;

    if !updated.is_active {
        tracing::info!(
            %user_id,
            program_id = %program.id,
            "program finished, enrollment deactivated"
        );
    }

    Ok(Some(updated))
}

/// Start a session, arming the auto-complete timer when it has a duration
///
/// A detached task marks the session done once its expected length elapses.
/// The task is fire-and-forget and does not survive a restart; the user can
/// still complete the session manually.
///
/// # Errors
///
/// - `ResourceNotFound` when the session is not assigned to the user
/// - `AlreadyCompleted` when the session is already finished
pub async fn start_session(
    database: &Arc<Database>,
    user_id: Uuid,
    session_id: Uuid,
    now: DateTime<Utc>,
) -> AppResult<SessionStartOutcome> {
    let completion = database
        .get_session_completion(user_id, session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session assigned to you"))?;

    if completion.is_completed {
        return Err(AppError::already_completed("Session"));
    }

    database.mark_session_started(completion.id, now).await?;

    let session = database
        .get_session(session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session"))?;

    let estimated_end = session
        .duration_minutes
        .map(|minutes| now + Duration::minutes(minutes));

    if let Some(minutes) = session.duration_minutes {
        let database = Arc::clone(database);
        let completion_id = completion.id;
        tokio::spawn(async move {
            let sleep_secs = u64::try_from(minutes.max(0)).unwrap_or(0) * 60;
            tokio::time::sleep(std::time::Duration::from_secs(sleep_secs)).await;
            let today = Utc::now().date_naive();
            if let Err(e) = database.mark_session_completed(completion_id, today).await {
                tracing::warn!(%completion_id, "auto-complete after session duration failed: {e}");
            }
        });
    }

    Ok(SessionStartOutcome {
        started_at: now,
        estimated_end,
    })
}

/// Complete a meal; idempotent and free of ordering constraints
///
/// # Errors
///
/// - `ResourceNotFound` when no (user, session, meal) completion row exists
pub async fn complete_meal(
    database: &Database,
    user_id: Uuid,
    session_id: Uuid,
    meal_id: Uuid,
    today: NaiveDate,
) -> AppResult<MealCompletionOutcome> {
    let completion = database
        .get_meal_completion(user_id, session_id, meal_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session and meal combination"))?;

    if completion.is_completed {
        return Ok(MealCompletionOutcome::AlreadyCompleted);
    }

    database.mark_meal_completed(completion.id, today).await?;

    tracing::info!(%user_id, %meal_id, "meal completed");
    Ok(MealCompletionOutcome::Completed)
}
