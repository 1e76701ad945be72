// ABOUTME: HTTP route modules and shared request authentication helpers
// ABOUTME: One router per resource, assembled by the server module
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Route Handlers
//!
//! One module per resource, each exposing a `Routes` struct whose
//! `routes(Arc<ServerResources>)` returns an axum `Router`. Handlers are thin:
//! they authenticate, validate, call into services or the database, and shape
//! the JSON envelope.

/// Account routes: register, verify, login, password reset, settings
pub mod auth;

/// Workout category CRUD
pub mod categories;

/// Exercise CRUD and per-session listing
pub mod exercises;

/// Service health endpoints
pub mod health;

/// Meal and meal-completion routes
pub mod meals;

/// Notification listing and read tracking
pub mod notifications;

/// Payment order creation and settlement updates
pub mod payments;

/// Preparation CRUD and per-meal listing
pub mod preparations;

/// Program catalog CRUD
pub mod programs;

/// Progress statistics queries
pub mod progress;

/// Session CRUD, completion, and the full-program view
pub mod sessions;

/// User program enrollment CRUD
pub mod user_programs;

use crate::errors::AppError;
use crate::i18n::Language;
use crate::models::User;
use crate::server::ServerResources;
use axum::http::HeaderMap;
use std::sync::Arc;

/// Extract and authenticate the user behind a Bearer token
///
/// Loads the full user row so handlers have the language, staff flag, and
/// preferences at hand. Deactivated accounts (unverified or logged out) are
/// rejected.
pub(crate) async fn authenticate(
    headers: &HeaderMap,
    resources: &Arc<ServerResources>,
) -> Result<User, AppError> {
    let auth_header = headers
        .get("authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(AppError::auth_required)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::auth_invalid("Expected a Bearer token"))?;

    let claims = resources
        .auth_manager
        .validate_access_token(token)
        .map_err(|e| AppError::auth_invalid(format!("Authentication failed: {e}")))?;

    let user_id = crate::auth::AuthManager::user_id_from_claims(&claims)
        .map_err(|e| AppError::auth_invalid(e.to_string()))?;

    let user = resources
        .database
        .get_user(user_id)
        .await
        .map_err(|e| AppError::database(format!("Failed to load user {user_id}: {e}")))?
        .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;

    if !user.is_active {
        return Err(AppError::auth_invalid("Account is not active"));
    }

    Ok(user)
}

/// Reject non-staff users attempting a catalog mutation
pub(crate) fn require_staff(user: &User, action: &str) -> Result<(), AppError> {
    if user.is_staff {
        Ok(())
    } else {
        Err(AppError::permission_denied(format!(
            "You do not have permission to {action}"
        ))
        .with_user_id(user.id))
    }
}

/// Content language: explicit `lang` query parameter wins, then the user's
/// preferred language
pub(crate) fn content_language(query_lang: Option<&str>, user: &User) -> Language {
    query_lang
        .and_then(Language::parse)
        .unwrap_or(user.language)
}
