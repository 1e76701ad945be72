// ABOUTME: Account route handlers for registration, verification, and login
// ABOUTME: Provides REST endpoints for the account lifecycle and user settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Account routes
//!
//! Registration issues a one-time verification code; verifying it activates
//! the account and enrolls the user into the program matching their goal.
//! Login returns an HS256 access/refresh token pair. Password reset reuses
//! the verification code flow.

use crate::{
    auth::{hash_password, verify_password, AuthManager},
    constants::{error_messages, limits},
    errors::AppError,
    i18n::Language,
    models::{
        Country, FitnessLevel, Gender, NotificationPreferencesUpdate, User,
    },
    server::ServerResources,
    services::enrollment,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// User registration request
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email_or_phone: String,
    pub password: String,
    pub gender: Gender,
    #[serde(default)]
    pub country: Country,
    pub age: u32,
    pub height_cm: u32,
    pub weight_kg: u32,
    pub goal: String,
    #[serde(default)]
    pub level: FitnessLevel,
}

/// User registration response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: String,
    pub message: String,
}

/// Verification request
#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub user_id: Uuid,
    pub code: u32,
}

/// User login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email_or_phone: String,
    pub password: String,
}

/// User login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub access: String,
    pub refresh: String,
    pub expires_at: String,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh: String,
}

/// Forgot password request
#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email_or_phone: String,
}

/// Reset password request
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email_or_phone: String,
    pub verification_code: u32,
    pub new_password: String,
}

/// Language update request
#[derive(Debug, Deserialize)]
pub struct UpdateLanguageRequest {
    pub language: String,
}

/// Notification preference update request
#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    #[serde(flatten)]
    pub preferences: NotificationPreferencesUpdate,
    /// Daily reminder time; absent keeps the stored value
    pub reminder_time: Option<NaiveTime>,
}

/// Account routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all account routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/register", post(Self::handle_register))
            .route("/api/users/verify-code", post(Self::handle_verify_code))
            .route("/api/users/login", post(Self::handle_login))
            .route("/api/users/refresh", post(Self::handle_refresh))
            .route(
                "/api/users/forgot-password",
                post(Self::handle_forgot_password),
            )
            .route(
                "/api/users/reset-password",
                post(Self::handle_reset_password),
            )
            .route("/api/users/logout", post(Self::handle_logout))
            .route(
                "/api/users/update-language",
                post(Self::handle_update_language),
            )
            .route(
                "/api/users/update-notification-preferences",
                post(Self::handle_update_preferences),
            )
            .with_state(resources)
    }

    /// Validate registration fields, collecting per-field errors
    fn validate_registration(request: &RegisterRequest, known_goals: &[String]) -> Result<(), AppError> {
        let mut field_errors = serde_json::Map::new();

        if request.first_name.trim().is_empty() {
            field_errors.insert("first_name".into(), "This field is required".into());
        }
        if request.last_name.trim().is_empty() {
            field_errors.insert("last_name".into(), "This field is required".into());
        }
        if request.email_or_phone.trim().is_empty() {
            field_errors.insert("email_or_phone".into(), "This field is required".into());
        }
        if request.password.len() < 8 {
            field_errors.insert(
                "password".into(),
                "Password must be at least 8 characters".into(),
            );
        }
        if !(limits::MIN_AGE..=limits::MAX_AGE).contains(&request.age) {
            field_errors.insert(
                "age".into(),
                format!("Age must be between {} and {}", limits::MIN_AGE, limits::MAX_AGE).into(),
            );
        }
        if !(limits::MIN_HEIGHT_CM..=limits::MAX_HEIGHT_CM).contains(&request.height_cm) {
            field_errors.insert(
                "height_cm".into(),
                format!(
                    "Height must be between {} and {} cm",
                    limits::MIN_HEIGHT_CM,
                    limits::MAX_HEIGHT_CM
                )
                .into(),
            );
        }
        if !(limits::MIN_WEIGHT_KG..=limits::MAX_WEIGHT_KG).contains(&request.weight_kg) {
            field_errors.insert(
                "weight_kg".into(),
                format!(
                    "Weight must be between {} and {} kg",
                    limits::MIN_WEIGHT_KG,
                    limits::MAX_WEIGHT_KG
                )
                .into(),
            );
        }
        if !known_goals.iter().any(|g| g == &request.goal) {
            field_errors.insert(
                "goal".into(),
                "Invalid goal. Please select a valid option".into(),
            );
        }

        if field_errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(serde_json::Value::Object(field_errors)))
        }
    }

    /// Handle POST /api/users/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        tracing::info!("registration attempt for {}", request.email_or_phone);

        let known_goals = resources
            .database
            .list_program_goals()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;
        Self::validate_registration(&request, &known_goals)?;

        // An existing unverified account gets a fresh code instead of a new row
        if let Some(existing) = resources
            .database
            .get_user_by_identifier(&request.email_or_phone)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
        {
            if existing.is_active {
                return Err(AppError::invalid_input(error_messages::USER_ALREADY_EXISTS));
            }

            let code = resources.verification.issue(existing.id);
            resources
                .code_delivery
                .deliver(&existing.email_or_phone, code);

            let response = RegisterResponse {
                user_id: existing.id.to_string(),
                message: "Verification code resent.".into(),
            };
            return Ok((StatusCode::OK, Json(response)).into_response());
        }

        let password_hash = hash_password(&request.password)?;
        let user = User::new(
            request.first_name,
            request.last_name,
            request.email_or_phone,
            password_hash,
            request.gender,
            request.country,
            request.age,
            request.height_cm,
            request.weight_kg,
            request.goal,
            request.level,
        );
        let user_id = resources
            .database
            .create_user(&user)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let code = resources.verification.issue(user_id);
        resources.code_delivery.deliver(&user.email_or_phone, code);

        tracing::info!(%user_id, "user registered, verification pending");

        let response = RegisterResponse {
            user_id: user_id.to_string(),
            message: "User registered successfully.".into(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/users/verify-code
    async fn handle_verify_code(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<VerifyCodeRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user(request.user_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("User"))?;

        if !resources.verification.verify(user.id, request.code) {
            return Err(AppError::invalid_input(
                error_messages::CODE_EXPIRED_OR_INVALID,
            ));
        }

        resources
            .database
            .set_user_active(user.id, true)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        // Enrollment fans out the session/meal schedule for the user's goal
        enrollment::enroll_user(&resources.database, &user, Utc::now().date_naive())
            .await
            .map_err(|e| AppError::internal(format!("Enrollment failed: {e}")))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Verification successful" })),
        )
            .into_response())
    }

    /// Handle POST /api/users/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        tracing::info!("login attempt for {}", request.email_or_phone);

        let user = resources
            .database
            .get_user_by_identifier(&request.email_or_phone)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::invalid_input(error_messages::INVALID_CREDENTIALS))?;

        let is_valid =
            verify_password(request.password, user.password_hash.clone()).await?;
        if !is_valid {
            tracing::warn!(user_id = %user.id, "invalid password");
            return Err(AppError::invalid_input(error_messages::INVALID_CREDENTIALS));
        }

        // Logout deactivates the account; a successful login brings it back
        if !user.is_active {
            resources
                .database
                .set_user_active(user.id, true)
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
        }

        let pair = resources.auth_manager.generate_token_pair(&user)?;

        tracing::info!(user_id = %user.id, "login successful");

        let response = LoginResponse {
            message: "Login successful".into(),
            access: pair.access,
            refresh: pair.refresh,
            expires_at: pair.expires_at.to_rfc3339(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/users/refresh
    async fn handle_refresh(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RefreshTokenRequest>,
    ) -> Result<Response, AppError> {
        let claims = resources
            .auth_manager
            .validate_refresh_token(&request.refresh)
            .map_err(|e| AppError::auth_invalid(format!("Invalid refresh token: {e}")))?;
        let user_id = AuthManager::user_id_from_claims(&claims)
            .map_err(|e| AppError::auth_invalid(e.to_string()))?;

        let user = resources
            .database
            .get_user(user_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;

        let pair = resources.auth_manager.generate_token_pair(&user)?;

        let response = LoginResponse {
            message: "Token refreshed".into(),
            access: pair.access,
            refresh: pair.refresh,
            expires_at: pair.expires_at.to_rfc3339(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/users/forgot-password
    async fn handle_forgot_password(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<ForgotPasswordRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user_by_identifier(&request.email_or_phone)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("User"))?;

        let code = resources.verification.issue(user.id);
        resources.code_delivery.deliver(&user.email_or_phone, code);

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Verification code sent" })),
        )
            .into_response())
    }

    /// Handle POST /api/users/reset-password
    async fn handle_reset_password(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<ResetPasswordRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user_by_identifier(&request.email_or_phone)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| {
                AppError::invalid_input(error_messages::CODE_EXPIRED_OR_INVALID)
            })?;

        if !resources
            .verification
            .verify(user.id, request.verification_code)
        {
            return Err(AppError::invalid_input(
                error_messages::CODE_EXPIRED_OR_INVALID,
            ));
        }

        if request.new_password.len() < 8 {
            return Err(AppError::validation(serde_json::json!({
                "new_password": "Password must be at least 8 characters"
            })));
        }

        let password_hash = hash_password(&request.new_password)?;
        resources
            .database
            .update_password(user.id, &password_hash)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Password reset successful" })),
        )
            .into_response())
    }

    /// Handle POST /api/users/logout - deactivates the account until next login
    async fn handle_logout(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        resources
            .database
            .set_user_active(user.id, false)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(user_id = %user.id, "user logged out");

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Logged out successfully" })),
        )
            .into_response())
    }

    /// Handle POST /api/users/update-language
    async fn handle_update_language(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdateLanguageRequest>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let Some(language) = Language::parse(&request.language) else {
            return Err(AppError::invalid_input("Invalid language code"));
        };

        resources
            .database
            .update_language(user.id, language)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Language updated successfully" })),
        )
            .into_response())
    }

    /// Handle POST /api/users/update-notification-preferences
    async fn handle_update_preferences(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<UpdatePreferencesRequest>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let mut preferences = user.notification_preferences.clone();
        preferences.merge(&request.preferences);

        resources
            .database
            .update_notification_preferences(user.id, &preferences)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        if let Some(reminder_time) = request.reminder_time {
            resources
                .database
                .update_reminder_time(user.id, Some(reminder_time))
                .await
                .map_err(|e| AppError::database(e.to_string()))?;
        }

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Notification preferences updated successfully",
                "notification_preferences": preferences
            })),
        )
            .into_response())
    }
}
