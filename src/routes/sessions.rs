// ABOUTME: Route handlers for session templates, completion, and session start
// ABOUTME: Enforces next-due-only completion and the scheduled-date gate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Session routes
//!
//! Regular users see their completed sessions plus the next upcoming one;
//! staff see the whole catalog. Completion goes through the completion
//! service, which owns the ordering rules.

use crate::{
    constants::error_messages,
    database::SessionUpdate,
    errors::AppError,
    models::Session,
    server::ServerResources,
    services::completion,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Response for a session template
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: String,
    pub program_id: String,
    pub session_number: i64,
    pub calories_burned: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    pub exercise_ids: Vec<String>,
    pub meal_ids: Vec<String>,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.to_string(),
            program_id: session.program_id.to_string(),
            session_number: session.session_number,
            calories_burned: session.calories_burned,
            duration_minutes: session.duration_minutes,
            exercise_ids: session.exercise_ids.iter().map(Uuid::to_string).collect(),
            meal_ids: session.meal_ids.iter().map(Uuid::to_string).collect(),
        }
    }
}

/// Request body for creating a session
#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    pub program_id: Uuid,
    pub session_number: i64,
    #[serde(default)]
    pub calories_burned: f64,
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub exercise_ids: Vec<Uuid>,
    #[serde(default)]
    pub meal_ids: Vec<Uuid>,
}

/// Request body for updating a session; absent fields keep stored values
#[derive(Debug, Default, Deserialize)]
pub struct UpdateSessionBody {
    pub session_number: Option<i64>,
    pub calories_burned: Option<f64>,
    /// Present sets the duration; clearing it requires a full PUT
    pub duration_minutes: Option<i64>,
    pub exercise_ids: Option<Vec<Uuid>>,
    pub meal_ids: Option<Vec<Uuid>>,
}

/// Query parameters for the by-session-number lookup
#[derive(Debug, Deserialize)]
pub struct BySessionNumberQuery {
    pub session_number: Option<i64>,
}

/// Request body for starting a session
#[derive(Debug, Deserialize)]
pub struct StartSessionBody {
    pub session_id: Uuid,
}

/// Session routes handler
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sessions", get(Self::handle_list))
            .route("/api/sessions", post(Self::handle_create))
            .route(
                "/api/sessions/by-session-number",
                get(Self::handle_by_session_number),
            )
            .route("/api/sessions/start", post(Self::handle_start))
            .route("/api/sessions/:id", get(Self::handle_get))
            .route("/api/sessions/:id", put(Self::handle_update))
            .route("/api/sessions/:id", patch(Self::handle_update))
            .route("/api/sessions/:id", delete(Self::handle_delete))
            .route("/api/sessions/:id/complete", post(Self::handle_complete))
            .with_state(resources)
    }

    /// Handle GET /api/sessions
    ///
    /// Staff get the whole catalog; regular users get their completed
    /// sessions plus the next upcoming one.
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let database = &resources.database;

        let sessions = if user.is_staff {
            database
                .list_all_sessions()
                .await
                .map_err(|e| AppError::database(e.to_string()))?
        } else {
            let enrollment = database
                .get_active_user_program(user.id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?
                .ok_or_else(|| AppError::not_found(error_messages::NO_ACTIVE_PROGRAM))?;

            let mut visible = database
                .completed_session_ids(user.id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;

            let today = Utc::now().date_naive();
            if let Some(next) = database
                .next_upcoming_session(user.id, today)
                .await
                .map_err(|e| AppError::database(e.to_string()))?
            {
                visible.push(next.session_id);
            }

            let mut sessions = database
                .list_sessions_by_ids(&visible)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
            sessions.retain(|s| s.program_id == enrollment.program_id);
            sessions
        };

        let body: Vec<SessionResponse> = sessions.iter().map(Into::into).collect();
        Ok((StatusCode::OK, Json(serde_json::json!({ "sessions": body }))).into_response())
    }

    /// Handle GET /api/sessions/by-session-number
    async fn handle_by_session_number(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<BySessionNumberQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let enrollment = resources
            .database
            .get_active_user_program(user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(error_messages::NO_ACTIVE_PROGRAM))?;

        let session_number = query.session_number.ok_or_else(|| {
            AppError::new(
                crate::errors::ErrorCode::MissingRequiredField,
                "session_number is required",
            )
        })?;

        let session = resources
            .database
            .get_session_by_number(enrollment.program_id, session_number)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| {
                AppError::not_found("Session with the given session_number in your program")
            })?;

        Ok((StatusCode::OK, Json(SessionResponse::from(&session))).into_response())
    }

    /// Handle GET /api/sessions/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        super::authenticate(&headers, &resources).await?;

        let session = resources
            .database
            .get_session(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Session {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "session": SessionResponse::from(&session) })),
        )
            .into_response())
    }

    /// Handle POST /api/sessions
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateSessionBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "create a session")?;

        resources
            .database
            .get_program(body.program_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Specified program"))?;

        let session = Session {
            id: Uuid::new_v4(),
            program_id: body.program_id,
            session_number: body.session_number,
            calories_burned: body.calories_burned,
            duration_minutes: body.duration_minutes,
            exercise_ids: body.exercise_ids,
            meal_ids: body.meal_ids,
        };
        resources
            .database
            .create_session(&session)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Session created successfully",
                "session": SessionResponse::from(&session)
            })),
        )
            .into_response())
    }

    /// Handle PUT/PATCH /api/sessions/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateSessionBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "update this session")?;

        let update = SessionUpdate {
            session_number: body.session_number,
            calories_burned: body.calories_burned,
            duration_minutes: body.duration_minutes.map(Some),
            exercise_ids: body.exercise_ids,
            meal_ids: body.meal_ids,
        };

        let session = resources
            .database
            .update_session(id, &update)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Session {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Session updated successfully",
                "session": SessionResponse::from(&session)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/sessions/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "delete this session")?;

        let deleted = resources
            .database
            .delete_session(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !deleted {
            return Err(AppError::not_found(format!("Session {id}")));
        }

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Session deleted successfully" })),
        )
            .into_response())
    }

    /// Handle POST /api/sessions/:id/complete
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let today = Utc::now().date_naive();
        let outcome =
            completion::complete_session(&resources.database, user.id, id, today).await?;

        let mut body = serde_json::json!({ "message": "Session marked as complete" });
        if let Some(enrollment) = outcome.enrollment {
            body["progress"] = serde_json::json!(enrollment.progress);
            body["program_active"] = serde_json::json!(enrollment.is_active);
        }

        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle POST /api/sessions/start
    async fn handle_start(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<StartSessionBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let outcome = completion::start_session(
            &resources.database,
            user.id,
            body.session_id,
            Utc::now(),
        )
        .await?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Session started",
                "start_time": outcome.started_at.to_rfc3339(),
                "estimated_end_time": outcome.estimated_end.map(|t| t.to_rfc3339()),
            })),
        )
            .into_response())
    }
}
