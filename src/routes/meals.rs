// ABOUTME: Route handlers for meals and meal completion tracking
// ABOUTME: Meal CRUD is staff-gated; completion is per-user and unordered
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Meal routes
//!
//! Meal templates are catalog content; meal completions are the per-user
//! tracking rows created at enrollment. Completing a meal is idempotent and
//! carries no ordering constraint, unlike sessions.

use crate::{
    database::MealUpdate,
    errors::AppError,
    i18n::{Language, Localized},
    models::{Meal, MealCompletion, MealType},
    server::ServerResources,
    services::completion::{self, MealCompletionOutcome},
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

/// Response for a meal with text resolved to one language
#[derive(Debug, Serialize)]
pub struct MealResponse {
    pub id: String,
    pub meal_type: MealType,
    pub food_name: String,
    pub calories: f64,
    pub water_content: f64,
    pub preparation_time: i64,
}

impl MealResponse {
    fn from_meal(meal: &Meal, language: Language) -> Self {
        Self {
            id: meal.id.to_string(),
            meal_type: meal.meal_type,
            food_name: meal.food_name.resolve(language).to_owned(),
            calories: meal.calories,
            water_content: meal.water_content,
            preparation_time: meal.preparation_time,
        }
    }
}

/// Response for a meal completion row
#[derive(Debug, Serialize)]
pub struct MealCompletionResponse {
    pub id: String,
    pub session_id: String,
    pub meal_id: String,
    pub is_completed: bool,
    pub meal_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_date: Option<String>,
}

impl From<&MealCompletion> for MealCompletionResponse {
    fn from(completion: &MealCompletion) -> Self {
        Self {
            id: completion.id.to_string(),
            session_id: completion.session_id.to_string(),
            meal_id: completion.meal_id.to_string(),
            is_completed: completion.is_completed,
            meal_date: completion.meal_date.to_string(),
            completion_date: completion.completion_date.map(|d| d.to_string()),
        }
    }
}

/// Request body for creating a meal
#[derive(Debug, Deserialize)]
pub struct CreateMealBody {
    pub meal_type: MealType,
    pub food_name: String,
    pub food_name_en: Option<String>,
    pub food_name_ru: Option<String>,
    pub food_name_uz: Option<String>,
    pub calories: f64,
    pub water_content: f64,
    #[serde(default)]
    pub preparation_time: i64,
}

/// Request body for updating a meal; absent fields keep stored values
#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealBody {
    pub meal_type: Option<MealType>,
    pub food_name: Option<String>,
    pub food_name_en: Option<String>,
    pub food_name_ru: Option<String>,
    pub food_name_uz: Option<String>,
    pub calories: Option<f64>,
    pub water_content: Option<f64>,
    pub preparation_time: Option<i64>,
}

/// Request body for completing a meal
#[derive(Debug, Deserialize)]
pub struct CompleteMealBody {
    pub session_id: Uuid,
    pub meal_id: Uuid,
}

/// Query parameters for meal reads
#[derive(Debug, Default, Deserialize)]
pub struct LangQuery {
    pub lang: Option<String>,
}

/// Meal routes handler
pub struct MealRoutes;

impl MealRoutes {
    /// Create all meal and meal completion routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/meals", get(Self::handle_list))
            .route("/api/meals", post(Self::handle_create))
            .route("/api/meals/complete", post(Self::handle_complete))
            .route("/api/meals/:id", get(Self::handle_get))
            .route("/api/meals/:id", put(Self::handle_update))
            .route("/api/meals/:id", patch(Self::handle_update))
            .route("/api/meals/:id", delete(Self::handle_delete))
            .route("/api/meal-completions", get(Self::handle_list_completions))
            .route(
                "/api/meal-completions/:id",
                get(Self::handle_get_completion),
            )
            .route(
                "/api/meal-completions/:id",
                delete(Self::handle_delete_completion),
            )
            .with_state(resources)
    }

    /// Handle GET /api/meals
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<LangQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let meals = resources
            .database
            .list_meals()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<MealResponse> = meals
            .iter()
            .map(|m| MealResponse::from_meal(m, language))
            .collect();
        Ok((StatusCode::OK, Json(serde_json::json!({ "meals": body }))).into_response())
    }

    /// Handle GET /api/meals/:id
    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Query(query): Query<LangQuery>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        let language = super::content_language(query.lang.as_deref(), &user);

        let meal = resources
            .database
            .get_meal(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Meal {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "meal": MealResponse::from_meal(&meal, language) })),
        )
            .into_response())
    }

    /// Handle POST /api/meals
    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateMealBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "create a meal")?;

        let meal = Meal {
            id: Uuid::new_v4(),
            meal_type: body.meal_type,
            food_name: Localized::with_translations(
                body.food_name,
                body.food_name_en,
                body.food_name_ru,
                body.food_name_uz,
            ),
            calories: body.calories,
            water_content: body.water_content,
            preparation_time: body.preparation_time,
        };
        resources
            .database
            .create_meal(&meal)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::CREATED,
            Json(serde_json::json!({
                "message": "Meal created successfully",
                "meal": MealResponse::from_meal(&meal, user.language)
            })),
        )
            .into_response())
    }

    /// Handle PUT/PATCH /api/meals/:id
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
        Json(body): Json<UpdateMealBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "update this meal")?;

        let food_name = body.food_name.map(|text| {
            Localized::with_translations(
                text,
                body.food_name_en,
                body.food_name_ru,
                body.food_name_uz,
            )
        });

        let update = MealUpdate {
            meal_type: body.meal_type,
            food_name,
            calories: body.calories,
            water_content: body.water_content,
            preparation_time: body.preparation_time,
        };

        let meal = resources
            .database
            .update_meal(id, &update)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Meal {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Meal updated successfully",
                "meal": MealResponse::from_meal(&meal, user.language)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/meals/:id
    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;
        super::require_staff(&user, "delete this meal")?;

        let deleted = resources
            .database
            .delete_meal(id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !deleted {
            return Err(AppError::not_found(format!("Meal {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }

    /// Handle POST /api/meals/complete
    async fn handle_complete(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CompleteMealBody>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let outcome = completion::complete_meal(
            &resources.database,
            user.id,
            body.session_id,
            body.meal_id,
            Utc::now().date_naive(),
        )
        .await?;

        let message = match outcome {
            MealCompletionOutcome::Completed => "Meal completed successfully",
            MealCompletionOutcome::AlreadyCompleted => "This meal is already completed",
        };
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": message })),
        )
            .into_response())
    }

    /// Handle GET /api/meal-completions - the caller's completion rows
    async fn handle_list_completions(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let completions = resources
            .database
            .list_meal_completions(user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<MealCompletionResponse> = completions.iter().map(Into::into).collect();
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "meal_completions": body })),
        )
            .into_response())
    }

    /// Handle GET /api/meal-completions/:id
    async fn handle_get_completion(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let completion = resources
            .database
            .get_meal_completion_by_id(id, user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found(format!("Meal completion {id}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "meal_completion": MealCompletionResponse::from(&completion)
            })),
        )
            .into_response())
    }

    /// Handle DELETE /api/meal-completions/:id
    async fn handle_delete_completion(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let deleted = resources
            .database
            .delete_meal_completion(id, user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        if !deleted {
            return Err(AppError::not_found(format!("Meal completion {id}")));
        }

        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
