// ABOUTME: Route handlers for meal preparation methods
// ABOUTME: CRUD plus per-meal filtering with staff-gated mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Preparation routes

use crate::{
    database::PreparationUpdate,
    errors::{AppError, ErrorCode},
    i18n::{Language, Localized},
    models::Preparation,
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

/// Response for a preparation with text resolved to one language
#[derive(Debug, Serialize)]
pub struct PreparationResponse {
    pub id: String,
    pub meal_id: String,
    pub name: String,
    pub description: String,
    pub preparation_time: i64,
}

impl PreparationResponse {
    fn from_preparation(preparation: &Preparation, language: Language) -> Self {
        Self {
            id: preparation.id.to_string(),
            meal_id: preparation.meal_id.to_string(),
            name: preparation.name.resolve(language).to_owned(),
            description: preparation.description.resolve(language).to_owned(),
            preparation_time: preparation.preparation_time,
        }
    }
}

/// Request body for creating a preparation
#[derive(Debug, Deserialize)]
pub struct CreatePreparationBody {
    pub meal_id: Uuid,
    pub name: String,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub name_uz: Option<String>,
    pub description: String,
    pub description_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
    #[serde(default)]
    pub preparation_time: i64,
}

/// Request body for updating a preparation
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePreparationBody {
    pub name: Option<String>,
    pub name_en: Option<String>,
    pub name_ru: Option<String>,
    pub name_uz: Option<String>,
    pub description: Option<String>,
    pub description_en: Option<String>,
    pub description_ru: Option<String>,
    pub description_uz: Option<String>,
    pub preparation_time: Option<i64>,
}

/// Query parameters for preparation reads
#[derive(Debug, Default, Deserialize)]
pub struct ListPreparationsQuery {
    pub meal_id: Option<Uuid>,
    pub lang: Option<String>,
}

/// Preparation routes handler
pub struct PreparationRoutes;

impl PreparationRoutes {
    /// Create all preparation routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/preparations", get(Self::handle_list))
            .route("/api/preparations", post(Self::handle_create))
            .route("/api/preparations/by-meal", get(Self::handle_by_meal))
            .route("/api/preparations/:id", get(Self::handle_get))
            .route("/api/preparations/:id", put(Self::handle_update))
            .route("/api/preparations/:id", patch(Self::handle_update))
            .route("/api/preparations/:id", delete(Self::handle_delete))
            .with_state(resources)
    }

    /// Handle GET /api/preparations, optionally filtered by meal
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListPreparationsQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let preparations = resources
            .database
            .list_preparations(query.meal_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<PreparationResponse> = preparations
            .iter()
            .map(|p| PreparationResponse::from_preparation(p, language))
            .collect();
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "preparations": body })),
        )
            .into_response())
    }

    /// Handle GET /api/preparations/by-meal - meal_id is required here
    async fn handle_by_meal(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<ListPreparationsQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let meal_id = query
            .meal_id
            .ok_or_else(|| AppError::new(ErrorCode::MissingRequiredField, "meal_id is required"))?;

        let preparations = resources
            .database
            .list_preparations(Some(meal_id))
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<PreparationResponse> = preparations
            .iter()
            .map(|p| PreparationResponse::from_preparation(p, language))
            .collect();
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "preparations": body })),
        )
            .into_response())
    }

    /// Handle GET /api/preparations/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Query(query): Query<ListPreparationsQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let preparation = resources
            .database
            .get_preparation(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Preparation {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "preparation": PreparationResponse::from_preparation(&preparation, language)
            })),
        )
            .into_response())
    }

    /// Handle POST /api/preparations
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreatePreparationBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "create a preparation")?;

        let preparation = Preparation {
            id: Uuid::new_v4(),
            meal_id: body.meal_id,
            name: Localized::with_translations(body.name, body.name_en, body.name_ru, body.name_uz),
            description: Localized::with_translations(
                body.description,
                body.description_en,
                body.description_ru,
                body.description_uz,
            ),
            preparation_time: body.preparation_time,
        };
        resources
            .database
            .create_preparation(&preparation)
            .await
            .map_err(|e| AppError::invalid_input(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Preparation created successfully",
                "preparation": PreparationResponse::from_preparation(&preparation, user.language)
            })),
        )
            .into_response())
    }

    /// Handle PUT/PATCH /api/preparations/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdatePreparationBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "update this preparation")?;

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

        let update = PreparationUpdate {
            name,
            description,
            preparation_time: body.preparation_time,
        };

        let preparation = resources
            .database
            .update_preparation(id, &update)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Preparation {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Preparation updated successfully",
                "preparation": PreparationResponse::from_preparation(&preparation, user.language)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/preparations/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "delete this preparation")?;

        let deleted = resources
            .database
            .delete_preparation(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !deleted {
            return Err(AppError::not_found(format!("Preparation {id}")));
        }

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Preparation deleted successfully" })),
        )
            .into_response())
    }
}
