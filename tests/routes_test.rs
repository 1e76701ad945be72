// ABOUTME: HTTP-level integration tests for the assembled router
// ABOUTME: Drives registration, verification, login, and guarded endpoints end to end
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(missing_docs)]

mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use fitplan_server::{models::User, server::{HttpServer, ServerResources}};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// Build a router plus the resources backing it
async fn test_app() -> (Router, Arc<ServerResources>) {
    let resources = common::create_test_resources().await.unwrap();
    let router = HttpServer::new(resources.clone()).router();
    (router, resources)
}

/// Issue a request and parse the JSON body
async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

/// Access token for an existing user
fn token_for(resources: &ServerResources, user: &User) -> String {
    resources.auth_manager.generate_token_pair(user).unwrap().access
}

fn register_body(identifier: &str, goal: &str) -> serde_json::Value {
    serde_json::json!({
        "first_name": "Aziza",
        "last_name": "Yusupova",
        "email_or_phone": identifier,
        "password": "long enough password",
        "gender": "Female",
        "country": "Uzbekistan",
        "age": 25,
        "height_cm": 165,
        "weight_kg": 58,
        "goal": goal,
        "level": "Beginner"
    })
}

#[tokio::test]
async fn test_health_endpoint() {
    let (router, _) = test_app().await;
    let (status, body) = send(&router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_register_verify_login_flow() {
    let (router, resources) = test_app().await;
    common::seed_program(&resources.database, "Weight Loss", 3, 7)
        .await
        .unwrap();

    // Register creates an inactive account
    let (status, body) = send(
        &router,
        "POST",
        "/api/users/register",
        None,
        Some(register_body("aziza@example.com", "Weight Loss")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();

    // Login before verification fails: the account is inactive and the
    // password check alone is not enough to issue tokens for a fresh account
    let (status, _) = send(
        &router,
        "POST",
        "/api/users/verify-code",
        None,
        Some(serde_json::json!({ "user_id": user_id, "code": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Verify with the real code activates and enrolls
    let code = resources.verification.issue(user_id);
    let (status, body) = send(
        &router,
        "POST",
        "/api/users/verify-code",
        None,
        Some(serde_json::json!({ "user_id": user_id, "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Verification successful");

    let enrollment = resources
        .database
        .get_active_user_program(user_id)
        .await
        .unwrap();
    assert!(enrollment.is_some(), "verification enrolls the user");

    // Login returns a token pair
    let (status, body) = send(
        &router,
        "POST",
        "/api/users/login",
        None,
        Some(serde_json::json!({
            "email_or_phone": "aziza@example.com",
            "password": "long enough password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].as_str().is_some());
    assert!(body["refresh"].as_str().is_some());

    // Wrong password is rejected without leaking which part was wrong
    let (status, _) = send(
        &router,
        "POST",
        "/api/users/login",
        None,
        Some(serde_json::json!({
            "email_or_phone": "aziza@example.com",
            "password": "wrong password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_register_rejects_active_duplicate_and_unknown_goal() {
    let (router, resources) = test_app().await;
    common::seed_program(&resources.database, "Weight Loss", 1, 7)
        .await
        .unwrap();
    let user = common::create_active_user(&resources.database, "Weight Loss")
        .await
        .unwrap();

    let (status, _) = send(
        &router,
        "POST",
        "/api/users/register",
        None,
        Some(register_body(&user.email_or_phone, "Weight Loss")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        "POST",
        "/api/users/register",
        None,
        Some(register_body("someone@example.com", "No Such Goal")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]["details"]["goal"].is_string());
}

#[tokio::test]
async fn test_program_endpoints_require_auth_and_staff() {
    let (router, resources) = test_app().await;
    common::seed_program(&resources.database, "Weight Loss", 1, 7)
        .await
        .unwrap();

    // No token at all
    let (status, _) = send(&router, "GET", "/api/programs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Regular users read but cannot create
    let user = common::create_active_user(&resources.database, "Weight Loss")
        .await
        .unwrap();
    let token = token_for(&resources, &user);

    let (status, body) = send(&router, "GET", "/api/programs", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["programs"].as_array().unwrap().len(), 1);

    let create = serde_json::json!({ "frequency_per_week": 3, "goal": "Endurance" });
    let (status, _) = send(
        &router,
        "POST",
        "/api/programs",
        Some(&token),
        Some(create.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Staff may create
    let staff = common::create_staff_user(&resources.database).await.unwrap();
    let staff_token = token_for(&resources, &staff);
    let (status, body) = send(
        &router,
        "POST",
        "/api/programs",
        Some(&staff_token),
        Some(create),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["program"]["goal"], "Endurance");
}

#[tokio::test]
async fn test_session_completion_over_http_enforces_ordering() {
    let (router, resources) = test_app().await;
    common::seed_program(&resources.database, "Weight Loss", 3, 7)
        .await
        .unwrap();

    // Register and verify so the schedule starts today
    let (_, body) = send(
        &router,
        "POST",
        "/api/users/register",
        None,
        Some(register_body("flow@example.com", "Weight Loss")),
    )
    .await;
    let user_id: Uuid = body["user_id"].as_str().unwrap().parse().unwrap();
    let code = resources.verification.issue(user_id);
    send(
        &router,
        "POST",
        "/api/users/verify-code",
        None,
        Some(serde_json::json!({ "user_id": user_id, "code": code })),
    )
    .await;

    let user = resources.database.get_user(user_id).await.unwrap().unwrap();
    let token = token_for(&resources, &user);

    let enrollment = resources
        .database
        .get_active_user_program(user_id)
        .await
        .unwrap()
        .unwrap();
    let sessions = resources
        .database
        .list_sessions_for_program(enrollment.program_id)
        .await
        .unwrap();

    // The second session is not the next due one
    let uri = format!("/api/sessions/{}/complete", sessions[1].id);
    let (status, body) = send(&router, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "COMPLETION_TOO_EARLY");

    // The first one is due today and completes
    let uri = format!("/api/sessions/{}/complete", sessions[0].id);
    let (status, body) = send(&router, "POST", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"], 1);
}

#[tokio::test]
async fn test_statistics_validates_query_type() {
    let (router, resources) = test_app().await;
    let user = common::create_active_user(&resources.database, "Weight Loss")
        .await
        .unwrap();
    let token = token_for(&resources, &user);

    let (status, _) = send(
        &router,
        "POST",
        "/api/users/statistics",
        Some(&token),
        Some(serde_json::json!({ "type": "monthly", "date": "2024-11-23" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &router,
        "POST",
        "/api/users/statistics",
        Some(&token),
        Some(serde_json::json!({ "type": "weekly", "date": "2024-11-23" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["week_start_date"], "2024-11-18");
    assert_eq!(body["week_end_date"], "2024-11-24");
}

#[tokio::test]
async fn test_order_creation_returns_payme_link() {
    let (router, resources) = test_app().await;
    common::seed_program(&resources.database, "Weight Loss", 2, 7)
        .await
        .unwrap();
    let user = common::create_active_user(&resources.database, "Weight Loss")
        .await
        .unwrap();
    fitplan_server::services::enrollment::enroll_user(
        &resources.database,
        &user,
        chrono::Utc::now().date_naive(),
    )
    .await
    .unwrap()
    .unwrap();
    let enrollment = resources
        .database
        .get_active_user_program(user.id)
        .await
        .unwrap()
        .unwrap();

    let token = token_for(&resources, &user);
    let (status, body) = send(
        &router,
        "POST",
        "/api/users/orders",
        Some(&token),
        Some(serde_json::json!({
            "user_program_id": enrollment.id,
            "total_amount": 150_000,
            "payment_method": "payme"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let link = body["payment_link"].as_str().expect("payme link generated");
    assert!(link.starts_with("https://checkout.example.com/"));

    let updated = resources
        .database
        .get_user_program(enrollment.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.total_amount, Some(150_000));
    assert!(!updated.is_paid);

    // Settlement flips the paid flag
    let (status, _) = send(
        &router,
        "POST",
        "/api/payments/update",
        Some(&token),
        Some(serde_json::json!({
            "user_program_id": enrollment.id,
            "state": "paid"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let settled = resources
        .database
        .get_user_program(enrollment.id)
        .await
        .unwrap()
        .unwrap();
    assert!(settled.is_paid);
}

#[tokio::test]
async fn test_logout_deactivates_until_next_login() {
    let (router, resources) = test_app().await;
    let user = common::create_active_user(&resources.database, "Weight Loss")
        .await
        .unwrap();
    let token = token_for(&resources, &user);

    let (status, _) = send(&router, "POST", "/api/users/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    // The same token no longer authenticates a deactivated account
    let (status, _) = send(&router, "GET", "/api/programs", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Logging back in reactivates
    let (status, _) = send(
        &router,
        "POST",
        "/api/users/login",
        None,
        Some(serde_json::json!({
            "email_or_phone": user.email_or_phone,
            "password": "correct horse battery"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
