// ABOUTME: Route handlers for the program catalog REST API
// ABOUTME: Provides CRUD on programs with staff-gated mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Program catalog routes
//!
//! All endpoints require authentication. Reads are open to every user (staff
//! see inactive programs too); mutations are staff-only. Goal text resolves
//! to the caller's content language.

use crate::{
    constants::limits,
    database::ProgramUpdate,
    errors::AppError,
    i18n::{Language, Localized},
    models::Program,
    server::ServerResources,
};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Response for a program with its goal resolved to one language
#[derive(Debug, Serialize)]
pub struct ProgramResponse {
    pub id: String,
    pub frequency_per_week: i64,
    pub total_sessions: i64,
    pub goal: String,
    pub is_active: bool,
}

impl ProgramResponse {
    fn from_program(program: &Program, language: Language) -> Self {
        Self {
            id: program.id.to_string(),
            frequency_per_week: program.frequency_per_week,
            total_sessions: program.total_sessions,
            goal: program.goal.resolve(language).to_owned(),
            is_active: program.is_active,
        }
    }
}

/// Request body for creating a program
#[derive(Debug, Deserialize)]
pub struct CreateProgramBody {
    pub frequency_per_week: i64,
    #[serde(default)]
    pub total_sessions: i64,
    pub goal: String,
    pub goal_en: Option<String>,
    pub goal_ru: Option<String>,
    pub goal_uz: Option<String>,
}

/// Request body for updating a program; absent fields keep stored values
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProgramBody {
    pub frequency_per_week: Option<i64>,
    pub total_sessions: Option<i64>,
    pub goal: Option<String>,
    pub goal_en: Option<String>,
    pub goal_ru: Option<String>,
    pub goal_uz: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters shared by catalog reads
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Program routes handler
pub struct ProgramRoutes;

impl ProgramRoutes {
    /// Create all program routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/programs", get(Self::handle_list))
            .route("/api/programs", post(Self::handle_create))
            .route("/api/programs/:id", get(Self::handle_get))
            .route("/api/programs/:id", put(Self::handle_update))
            .route("/api/programs/:id", patch(Self::handle_update))
            .route("/api/programs/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    fn validate_frequency(frequency: i64) -> Result<(), AppError> {
        if (limits::MIN_FREQUENCY_PER_WEEK..=limits::MAX_FREQUENCY_PER_WEEK).contains(&frequency) {
            Ok(())
        } else {
            Err(AppError::validation(serde_json::json!({
                "frequency_per_week": "Must be between 1 and 7"
            })))
        }
    }

    /// Handle GET /api/programs - staff see inactive programs as well
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LangQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let programs = resources
            .database
            .list_programs(!user.is_staff)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<ProgramResponse> = programs
            .iter()
            .map(|p| ProgramResponse::from_program(p, language))
            .collect();

        Ok((StatusCode::OK, Json(serde_json::json!({ "programs": body }))).into_response())
    }

    /// Handle GET /api/programs/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Query(query): Query<LangQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let program = resources
            .database
            .get_program(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Program {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "program": ProgramResponse::from_program(&program, language)
            })),
        )
            .into_response())
    }

    /// Handle POST /api/programs
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateProgramBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "create a program")?;
        Self::validate_frequency(body.frequency_per_week)?;

        let program = Program {
            id: Uuid::new_v4(),
            frequency_per_week: body.frequency_per_week,
            total_sessions: body.total_sessions,
            goal: Localized::with_translations(body.goal, body.goal_en, body.goal_ru, body.goal_uz),
            is_active: true,
        };
        resources
            .database
            .create_program(&program)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Program created successfully",
                "program": ProgramResponse::from_program(&program, user.language)
            })),
        )
            .into_response())
    }

    /// Handle PUT/PATCH /api/programs/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateProgramBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "update this program")?;
        if let Some(frequency) = body.frequency_per_week {
            Self::validate_frequency(frequency)?;
        }

        let goal = body.goal.map(|text| {
            Localized::with_translations(text, body.goal_en, body.goal_ru, body.goal_uz)
        });

        let update = ProgramUpdate {
            frequency_per_week: body.frequency_per_week,
            total_sessions: body.total_sessions,
            goal,
            is_active: body.is_active,
        };

        let program = resources
            .database
            .update_program(id, &update)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Program {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Program updated successfully",
                "program": ProgramResponse::from_program(&program, user.language)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/programs/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "delete a program")?;

        let deleted = resources
            .database
            .delete_program(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !deleted {
            return Err(AppError::not_found(format!("Program {id}")));
        }

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Program deleted successfully" })),
        )
            .into_response())
    }
}
