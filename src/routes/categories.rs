// ABOUTME: Route handlers for workout category CRUD
// ABOUTME: Staff-gated mutations over localized category content
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Workout category routes

use crate::{
    database::WorkoutCategoryUpdate,
    errors::AppError,
    i18n::{Language, Localized},
    models::WorkoutCategory,
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

/// Response for a workout category with text resolved to one language
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl CategoryResponse {
    fn from_category(category: &WorkoutCategory, language: Language) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.resolve(language).to_owned(),
            description: category.description.resolve(language).to_owned(),
        }
    }
}

/// Request body for creating a workout category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryBody {
    pub name: String,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub name_uz: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
}

/// Request body for updating a workout category
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryBody {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub name_uz: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
}

/// Query parameters for category reads
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Workout category routes handler
pub struct CategoryRoutes;

impl CategoryRoutes {
    /// Create all workout category routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/workout-categories", get(Self::handle_list))
            .route("/api/workout-categories", post(Self::handle_create))
            .route("/api/workout-categories/:id", get(Self::handle_get))
            .route("/api/workout-categories/:id", put(Self::handle_update))
            .route("/api/workout-categories/:id", patch(Self::handle_update))
            .route("/api/workout-categories/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/workout-categories
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LangQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let categories = resources
            .database
            .list_workout_categories()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<CategoryResponse> = categories
            .iter()
            .map(|c| CategoryResponse::from_category(c, language))
            .collect();
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "workout_categories": body })),
        )
            .into_response())
    }

    /// Handle GET /api/workout-categories/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Query(query): Query<LangQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let category = resources
            .database
            .get_workout_category(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Workout category {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "workout_category": CategoryResponse::from_category(&category, language)
            })),
        )
            .into_response())
    }

    /// Handle POST /api/workout-categories
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateCategoryBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "create a workout category")?;

        let category = WorkoutCategory {
            id: Uuid::new_v4(),
            name: Localized::with_translations(body.name, body.name_en, body.name_ru, body.name_uz),
            description: Localized::with_translations(
                body.description,
                body.description_en,
                body.description_ru,
                body.description_uz,
            ),
        };
        resources
            .database
            .create_workout_category(&category)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Workout category created successfully",
                "workout_category": CategoryResponse::from_category(&category, user.language)
            })),
        )
            .into_response())
    }

    /// Handle PUT/PATCH /api/workout-categories/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateCategoryBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "update this workout category")?;

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

        let category = resources
            .database
            .update_workout_category(id, &WorkoutCategoryUpdate { name, description })
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Workout category {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Workout category updated successfully",
                "workout_category": CategoryResponse::from_category(&category, user.language)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/workout-categories/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "delete this workout category")?;

        let deleted = resources
            .database
            .delete_workout_category(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !deleted {
            return Err(AppError::not_found(format!("Workout category {id}")));
        }

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Workout category deleted successfully" })),
        )
            .into_response())
    }
}
