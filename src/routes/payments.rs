// ABOUTME: Route handlers for enrollment payment orders and settlement
// ABOUTME: Generates checkout links and applies paid/cancelled transitions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Payment routes
//!
//! Order creation records the amount and method on the enrollment and, for
//! the `payme` method, returns a generated checkout link. Settlement is the
//! durable effect of the provider's webhook — provider glue itself is out of
//! scope, so the update endpoint applies the paid/cancelled transition under
//! normal authentication.

use crate::{
    errors::AppError,
    models::PaymentMethod,
    server::ServerResources,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Order creation request
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_program_id: Uuid,
    pub total_amount: i64,
    pub payment_method: PaymentMethod,
}

/// Settlement state reported for an order
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettlementState {
    Paid,
    Cancelled,
}

/// Payment settlement request
#[derive(Debug, Deserialize)]
pub struct PaymentUpdateRequest {
    pub user_program_id: Uuid,
    pub state: SettlementState,
}

/// Payment routes handler
pub struct PaymentRoutes;

impl PaymentRoutes {
    /// Create all payment routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/users/orders", post(Self::handle_create_order))
            .route("/api/payments/update", post(Self::handle_update))
            .with_state(resources)
    }

    /// Build the checkout link for an order
    ///
    /// The checkout page takes a base64 payload of `;`-separated key=value
    /// pairs: merchant id, the order account field, the amount, and the
    /// return URL.
    fn checkout_link(
        resources: &ServerResources,
        enrollment_id: Uuid,
        amount: i64,
    ) -> String {
        let payment = &resources.config.payment;
        let params = format!(
            "m={};ac.order_id={};a={};c={}",
            payment.merchant_id, enrollment_id, amount, payment.return_url
        );
        format!("{}/{}", payment.checkout_url, BASE64.encode(params))
    }

    /// Handle POST /api/users/orders
    async fn handle_create_order(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<CreateOrderRequest>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        if request.total_amount <= 0 {
            return Err(AppError::validation(serde_json::json!({
                "total_amount": "Must be a positive amount"
            })));
        }

        let enrollment = resources
            .database
            .get_user_program(request.user_program_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("User program"))?;
        if enrollment.user_id != user.id {
            return Err(AppError::permission_denied(
                "You can only create orders for your own enrollment",
            ));
        }

        resources
            .database
            .set_payment_intent(enrollment.id, request.total_amount, request.payment_method)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let mut body = serde_json::json!({
            "order": {
                "id": enrollment.id.to_string(),
                "total_amount": request.total_amount,
                "payment_method": request.payment_method,
            }
        });
        if request.payment_method == PaymentMethod::Payme {
            body["payment_link"] = serde_json::Value::String(Self::checkout_link(
                &resources,
                enrollment.id,
                request.total_amount,
            ));
        }

        tracing::info!(
            enrollment_id = %enrollment.id,
            amount = request.total_amount,
            method = request.payment_method.as_str(),
            "payment order created"
        );

        Ok((StatusCode::OK, Json(body)).into_response())
    }

    /// Handle POST /api/payments/update
    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<PaymentUpdateRequest>,
    ) -> Result<Response, AppError> {
        let user = super::authenticate(&headers, &resources).await?;

        let enrollment = resources
            .database
            .get_user_program(request.user_program_id)
            .await
            .map_err(|e| AppError::database(e.to_string()))?
            .ok_or_else(|| AppError::not_found("User program"))?;
        if enrollment.user_id != user.id && !user.is_staff {
            return Err(AppError::permission_denied(
                "You do not have permission to update this payment",
            ));
        }

        let is_paid = matches!(request.state, SettlementState::Paid);
        resources
            .database
            .set_paid(enrollment.id, is_paid)
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(
            enrollment_id = %enrollment.id,
            is_paid,
            "payment state updated"
        );

        Ok((
            StatusCode::OK,
            Json(serde_json::json!({
                "message": if is_paid { "Payment recorded" } else { "Payment cancelled" },
                "is_paid": is_paid
            })),
        )
            .into_response())
    }
}
