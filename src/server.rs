// ABOUTME: HTTP server assembly and the shared resource container
// ABOUTME: Builds the axum router, applies middleware layers, and serves requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Server Module
//!
//! [`ServerResources`] is the centralized resource container handed to every
//! route module, eliminating per-request reconstruction of expensive objects.
//! [`HttpServer`] assembles the routers and runs the axum service.

use crate::auth::AuthManager;
use crate::config::environment::ServerConfig;
use crate::database::Database;
use crate::errors::AppError;
use crate::routes;
use crate::verification::{CodeDelivery, LoggingDelivery, VerificationStore};
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Centralized resource container for dependency injection
///
/// Holds all shared server resources behind `Arc` so routers and background
/// tasks share one database pool and one auth manager.
#[derive(Clone)]
pub struct ServerResources {
    pub database: Arc<Database>,
    pub auth_manager: Arc<AuthManager>,
    pub verification: Arc<VerificationStore>,
    pub code_delivery: Arc<dyn CodeDelivery>,
    pub config: Arc<ServerConfig>,
}

impl ServerResources {
    /// Create new server resources with proper Arc sharing
    #[must_use]
    pub fn new(database: Database, config: Arc<ServerConfig>) -> Self {
        let auth_manager = AuthManager::new(
            config.auth.jwt_secret.as_bytes(),
            config.auth.token_expiry_hours,
        );
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            verification: Arc::new(VerificationStore::new()),
            code_delivery: Arc::new(LoggingDelivery),
            config,
        }
    }
}

/// HTTP server over the assembled routers
pub struct HttpServer {
    resources: Arc<ServerResources>,
}

impl HttpServer {
    #[must_use]
    pub const fn new(resources: Arc<ServerResources>) -> Self {
        Self { resources }
    }

    /// Assemble the full application router with middleware layers
    #[must_use]
    pub fn router(&self) -> Router {
        let resources = &self.resources;

        Router::new()
            .merge(routes::health::HealthRoutes::routes(resources.clone()))
            .merge(routes::auth::AuthRoutes::routes(resources.clone()))
            .merge(routes::programs::ProgramRoutes::routes(resources.clone()))
            .merge(routes::sessions::SessionRoutes::routes(resources.clone()))
            .merge(routes::exercises::ExerciseRoutes::routes(resources.clone()))
            .merge(routes::categories::CategoryRoutes::routes(resources.clone()))
            .merge(routes::meals::MealRoutes::routes(resources.clone()))
            .merge(routes::preparations::PreparationRoutes::routes(
                resources.clone(),
            ))
            .merge(routes::user_programs::UserProgramRoutes::routes(
                resources.clone(),
            ))
            .merge(routes::progress::ProgressRoutes::routes(resources.clone()))
            .merge(routes::notifications::NotificationRoutes::routes(
                resources.clone(),
            ))
            .merge(routes::payments::PaymentRoutes::routes(resources.clone()))
            .fallback(fallback_handler)
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(Duration::from_secs(30)))
            .layer(CorsLayer::permissive())
    }

    /// Bind and serve until shutdown
    ///
    /// # Errors
    ///
    /// Returns an error if binding the listen address or serving fails
    pub async fn run(self) -> Result<()> {
        let addr = format!("0.0.0.0:{}", self.resources.config.http_port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        tracing::info!(%addr, "fitplan server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn fallback_handler() -> AppError {
    AppError::not_found("Endpoint")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to install shutdown signal handler: {e}");
    }
    tracing::info!("shutdown signal received");
}
