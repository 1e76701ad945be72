// ABOUTME: Route handlers for progress statistics queries
// ABOUTME: Dispatches daily and weekly aggregation over completion rows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Progress routes

use crate::{
    errors::AppError,
    server::ServerResources,
    services::progress,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;

/// Progress query request
#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    /// `daily` or `weekly`
    #[serde(rename = "type")]
    pub query_type: String,
    /// Query date, `YYYY-MM-DD`
    pub date: String,
}

/// Progress routes handler
pub struct ProgressRoutes;

impl ProgressRoutes {
    /// Create all progress routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/statistics", post(Self::handle_statistics))
            .with_state(resources)
    }

    /// Handle POST /api/users/statistics
    async fn handle_statistics(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ProgressRequest>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let date = NaiveDate::parse_from_str(&request.date, "%Y-%m-%d").map_err(|_| {
            AppError::invalid_input("Invalid date format. Expected 'YYYY-MM-DD'")
        })?;

        let summary = match request.query_type.as_str() {
            "daily" => progress::daily_progress(&resources.database, user.id, date)
                .await
                .map_err(|e| AppError::database(e.to_string()))?,
            "weekly" => progress::weekly_progress(&resources.database, user.id, date)
                .await
                .map_err(|e| AppError::database(e.to_string()))?,
            _ => {
                return Err(AppError::invalid_input(
                    "Invalid type. Expected 'daily' or 'weekly'",
                ))
            }
        };

        Ok((StatusCode::OK, Json(summary)).into_response())
    }
}
