// ABOUTME: Route handlers for the exercise catalog REST API
// ABOUTME: Provides CRUD on exercises with staff-gated mutations and session filtering
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Exercise routes

use crate::{
    database::ExerciseUpdate,
    errors::AppError,
    i18n::{Language, Localized},
    models::{Exercise, FitnessLevel},
    server::ServerResources,
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

/// Response for an exercise with text resolved to one language
#[derive(Debug, Serialize)]
pub struct ExerciseResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    pub name: String,
    pub description: String,
    pub difficulty_level: FitnessLevel,
    pub target_muscle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl ExerciseResponse {
    fn from_exercise(exercise: &Exercise, language: Language) -> Self {
        Self {
            id: exercise.id.to_string(),
            category_id: exercise.category_id.map(|id| id.to_string()),
            name: exercise.name.resolve(language).to_owned(),
            description: exercise.description.resolve(language).to_owned(),
            difficulty_level: exercise.difficulty_level,
            target_muscle: exercise.target_muscle.clone(),
            video_url: exercise.video_url.clone(),
        }
    }
}

/// Request body for creating an exercise
#[derive(Debug, Deserialize)]
pub struct CreateExerciseBody {
    pub category_id: Option<Uuid>,
    pub name: String,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub name_uz: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
    #[serde(default)]
    pub difficulty_level: FitnessLevel,
    pub target_muscle: String,
    pub video_url: Option<String>,
}

/// Request body for updating an exercise; absent fields keep stored values
#[derive(Debug, Default, Deserialize)]
pub struct UpdateExerciseBody {
    pub category_id: Option<Uuid>,
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub name_uz: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
    pub difficulty_level: Option<FitnessLevel>,
    pub target_muscle: Option<String>,
    pub video_url: Option<String>,
}

/// Query parameters for listing exercises
#[derive(Debug, Default, Deserialize)]
pub struct ListExercisesQuery {
    pub session_id: Option<Uuid>,
    pub lang: Option<String>,
}

/// Exercise routes handler
pub struct ExerciseRoutes;

impl ExerciseRoutes {
    /// Create all exercise routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/exercises", get(Self::handle_list))
            .route("/api/exercises", post(Self::handle_create))
            .route("/api/exercises/:id", get(Self::handle_get))
            .route("/api/exercises/:id", put(Self::handle_update))
            .route("/api/exercises/:id", patch(Self::handle_update))
            .route("/api/exercises/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/exercises, optionally filtered by session
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListExercisesQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let exercises = match query.session_id {
            Some(session_id) => resources
                .database
                .list_exercises_for_session(session_id)
                .await
                .map_err(|e| AppError::database(e.to_string()))?,
            None => resources
                .database
                .list_exercises()
                .await
                .map_err(|e| AppError::database(e.to_string()))?,
        };

        let body: Vec<ExerciseResponse> = exercises
            .iter()
            .map(|e| ExerciseResponse::from_exercise(e, language))
            .collect();
        Ok((StatusCode::OK, Json(serde_json::json!({ "exercises": body }))).into_response())
    }

    /// Handle GET /api/exercises/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Query(query): Query<ListExercisesQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let exercise = resources
            .database
            .get_exercise(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Exercise {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "exercise": ExerciseResponse::from_exercise(&exercise, language)
            })),
        )
            .into_response())
    }

    /// Handle POST /api/exercises
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateExerciseBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "create an exercise")?;

        let now = Utc::now();
        let exercise = Exercise {
            id: Uuid::new_v4(),
            category_id: body.category_id,
            name: Localized::with_translations(body.name, body.name_en, body.name_ru, body.name_uz),
            description: Localized::with_translations(
                body.description,
                body.description_en,
                body.description_ru,
                body.description_uz,
            ),
            difficulty_level: body.difficulty_level,
            target_muscle: body.target_muscle,
            video_url: body.video_url,
            created_at: now,
            updated_at: now,
        };
        resources
            .database
            .create_exercise(&exercise)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Exercise created successfully",
                "exercise": ExerciseResponse::from_exercise(&exercise, user.language)
            })),
        )
            .into_response())
    }

    /// Handle PUT/PATCH /api/exercises/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateExerciseBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "update this exercise")?;

        let name = body
            .name
            .map(|text| Localized::with_translations(text, body.name_en, body.name_ru, body.name_uz));
        let description = body.description.map(|text| {
            Localized::with_translations(
                text,
                body.description_en,
                body.description_ru,
                body.description_uz,
            )
        });

        let update = ExerciseUpdate {
            category_id: body.category_id.map(Some),
            name,
            description,
            difficulty_level: body.difficulty_level,
            target_muscle: body.target_muscle,
            video_url: body.video_url.map(Some),
        };

        let exercise = resources
            .database
            .update_exercise(id, &update)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Exercise {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Exercise updated successfully",
                "exercise": ExerciseResponse::from_exercise(&exercise, user.language)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/exercises/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "delete this exercise")?;

        let deleted = resources
            .database
            .delete_exercise(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !deleted {
            return Err(AppError::not_found(format!("Exercise {id}")));
        }

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Exercise deleted successfully" })),
        )
            .into_response())
    }
}
