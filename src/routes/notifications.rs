// ABOUTME: Route handlers for in-app notifications
// ABOUTME: Listing and read tracking scoped to the authenticated user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Notification routes

use crate::{
    errors::AppError,
    models::Notification,
    server::ServerResources,
};
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// Response for a notification in the recipient's language
#[derive(Debug, Serialize)]
pub struct NotificationResponse {
    pub id: String,
    pub message: String,
    pub notification_type: String,
    pub sent_at: String,
    pub is_read: bool,
}

impl NotificationResponse {
    fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id.to_string(),
            message: notification.message.resolve(notification.language).to_owned(),
            notification_type: notification.notification_type.as_str().to_owned(),
            sent_at: notification.sent_at.to_rfc3339(),
            is_read: notification.is_read,
        }
    }
}

/// Notification routes handler
pub struct NotificationRoutes;

impl NotificationRoutes {
    /// Create all notification routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/notifications", get(Self::handle_list))
            .route(
                "/api/users/notifications/:id/mark-read",
                post(Self::handle_mark_read),
            )
            .with_state(resources)
    }

    /// Handle GET /api/users/notifications
    async fn handle_list(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let notifications = resources
            .database
            .list_notifications(user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let body: Vec<NotificationResponse> = notifications
            .iter()
            .map(NotificationResponse::from_notification)
            .collect();
        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "notifications": body })),
        )
            .into_response())
    }

    /// Handle POST /api/users/notifications/:id/mark-read
    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(id): Path<Uuid>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let notification = resources
            .database
            .get_notification(id, user.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("Notification"))?;

        resources
            .database
            .mark_notification_read(notification.id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Notification marked as read" })),
        )
            .into_response())
    }
}
