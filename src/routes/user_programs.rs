// ABOUTME: Route handlers for user program enrollments
// ABOUTME: Enrollment CRUD with ownership checks and the nested full-program view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! User program routes
//!
//! Enrollments are per-user resources: callers only see their own, and
//! mutating someone else's returns a permission error. The full-program view
//! returns the active enrollment with nested sessions, exercises, meals,
//! preparations, and completion flags in one response.

use crate::{
    constants::error_messages,
    database::UserProgramUpdate,
    errors::AppError,
    models::UserProgram,
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Response for an enrollment
#[derive(Debug, Serialize)]
pub struct UserProgramResponse {
    pub id: String,
    pub program_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub progress: i64,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<i64>,
    pub is_paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl From<&UserProgram> for UserProgramResponse {
    fn from(enrollment: &UserProgram) -> Self {
        Self {
            id: enrollment.id.to_string(),
            program_id: enrollment.program_id.to_string(),
            start_date: enrollment.start_date,
            end_date: enrollment.end_date,
            progress: enrollment.progress,
            is_active: enrollment.is_active,
            total_amount: enrollment.total_amount,
            is_paid: enrollment.is_paid,
            payment_method: enrollment.payment_method.map(|m| m.as_str().to_owned()),
        }
    }
}

/// Request body for creating an enrollment by hand
#[derive(Debug, Deserialize)]
pub struct CreateUserProgramBody {
    pub program_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Request body for updating an enrollment
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserProgramBody {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

/// Query parameters for the full-program view
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// User program routes handler
pub struct UserProgramRoutes;

impl UserProgramRoutes {
    /// Create all user program routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/user-programs", get(Self::handle_list))
            .route("/api/user-programs", post(Self::handle_create))
            .route("/api/user-programs/:id", get(Self::handle_get))
            .route("/api/user-programs/:id", put(Self::handle_update))
            .route("/api/user-programs/:id", patch(Self::handle_update))
            .route("/api/user-programs/:id", delete(Self::handle_delete))
            .route("/api/users/full-program", get(Self::handle_full_program))
            .with_state(resources)
    }

    /// Load an enrollment, rejecting callers who do not own it
    async fn get_owned(
        resources: &Arc<ServerResources>,
        enrollment_id: Uuid,
        user_id: Uuid,
        action: &str,
    ) -> Result<UserProgram, AppError> {
        let enrollment = resources
            .database
            .get_user_program(enrollment_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("User program {enrollment_id}")))?;

        if enrollment.user_id != user_id {
            return Err(AppError::permission_denied(format!(
                "You do not have permission to {action} this user program"
            )));
        }
        Ok(enrollment)
    }

    /// Handle GET /api/user-programs
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let enrollments = resources
            .database
            .list_user_programs(user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<UserProgramResponse> = enrollments.iter().map(Into::into).collect();
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "user_programs": body })),
        )
            .into_response())
    }

    /// Handle GET /api/user-programs/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let enrollment = Self::get_owned(&resources, id, user.id, "view").await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "user_program": UserProgramResponse::from(&enrollment)
            })),
        )
            .into_response())
    }

    /// Handle POST /api/user-programs
    ///
    /// Manual enrollment does not fan out a schedule; verification-time
    /// enrollment owns that. This mirrors the original API split.
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateUserProgramBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let program = resources
            .database
            .get_program(body.program_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Specified program"))?;

        let start_date = body.start_date.unwrap_or_else(|| Utc::now().date_naive());
        let end_date = body.end_date.unwrap_or_else(|| {
            start_date
                .checked_add_days(Days::new(
                    u64::try_from(program.total_sessions.max(0)).unwrap_or(0),
                ))
                .unwrap_or(start_date)
        });

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
        resources
            .database
            .create_user_program(&enrollment)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "User program created successfully",
                "user_program": UserProgramResponse::from(&enrollment)
            })),
        )
            .into_response())
    }

    /// Handle PUT/PATCH /api/user-programs/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateUserProgramBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        Self::get_owned(&resources, id, user.id, "update").await?;

        let update = UserProgramUpdate {
            start_date: body.start_date,
            end_date: body.end_date,
            is_active: body.is_active,
        };

        let enrollment = resources
            .database
            .update_user_program(id, &update)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("User program {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "User program updated successfully",
                "user_program": UserProgramResponse::from(&enrollment)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/user-programs/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        Self::get_owned(&resources, id, user.id, "delete").await?;

        resources
            .database
            .delete_user_program(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "User program deleted successfully" })),
        )
            .into_response())
    }

    /// Handle GET /api/users/full-program
    ///
    /// The active enrollment with nested sessions, exercises, meals,
    /// preparations, and per-item completion flags.
    async fn handle_full_program(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LangQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);
        let database = &resources.database;

        let enrollment = database
            .get_active_user_program(user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(error_messages::NO_ACTIVE_PROGRAM))?;

        let program = database
            .get_program(enrollment.program_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Program behind the enrollment"))?;

        let sessions = database
            .list_sessions_for_program(program.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let mut session_views = Vec::with_capacity(sessions.len());
        for session in &sessions {
            let completion = database
                .get_session_completion(user.id, session.id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;

            let exercises = database
                .list_exercises_for_session(session.id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            let exercise_views: Vec<serde_json::Value> = exercises
                .iter()
                .map(|exercise| {
                    serde_json::json!({
                        "id": exercise.id.to_string(),
                        "name": exercise.name.resolve(language),
                        "description": exercise.description.resolve(language),
                        "difficulty_level": exercise.difficulty_level,
                        "target_muscle": exercise.target_muscle,
                        "video_url": exercise.video_url,
                    })
                })
                .collect();

            let meals = database
                .list_meals_for_session(session.id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            let mut meal_views = Vec::with_capacity(meals.len());
            for meal in &meals {
                let meal_completion = database
                    .get_meal_completion(user.id, session.id, meal.id)
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;
                let preparations = database
                    .list_preparations(Some(meal.id))
                    .await
                    .map_err(|e| AppError::database(e.to_string()))?;

                meal_views.push(serde_json::json!({
                    "id": meal.id.to_string(),
                    "type": meal.meal_type,
                    "food_name": meal.food_name.resolve(language),
                    "calories": meal.calories,
                    "water_content": meal.water_content,
                    "preparation_time": meal.preparation_time,
                    "is_completed": meal_completion.is_some_and(|c| c.is_completed),
                    "preparations": preparations
                        .iter()
                        .map(|p| serde_json::json!({
                            "id": p.id.to_string(),
                            "name": p.name.resolve(language),
                            "description": p.description.resolve(language),
                            "preparation_time": p.preparation_time,
                        }))
                        .collect::<Vec<_>>(),
                }));
            }

            session_views.push(serde_json::json!({
                "id": session.id.to_string(),
                "session_number": session.session_number,
                "calories_burned": session.calories_burned,
                "is_completed": completion.is_some_and(|c| c.is_completed),
                "exercises": exercise_views,
                "meals": meal_views,
            }));
        }

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "program": {
                    "id": program.id.to_string(),
                    "goal": program.goal.resolve(language),
                    "progress": enrollment.progress,
                    "total_sessions": program.total_sessions,
                    "is_active": enrollment.is_active,
                    "start_date": enrollment.start_date,
                    "end_date": enrollment.end_date,
                },
                "sessions": session_views,
            })),
        )
            .into_response())
    }
}
