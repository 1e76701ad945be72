// ABOUTME: Main library entry point for the Fitplan fitness tracking API
// ABOUTME: Provides REST endpoints for programs, schedules, completions, and progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

#![deny(unsafe_code)]

//! # Fitplan Server
//!
//! A backend service for a fitness and meal-tracking product. Users register,
//! verify their account with a one-time code, and get enrolled in a workout/meal
//! program matching their chosen goal. Enrollment generates a per-user schedule
//! of sessions and meals; users progress through them under a "next-due-only"
//! completion ordering and can query daily or weekly progress summaries.
//!
//! ## Architecture
//!
//! The server follows a modular architecture:
//! - **Models**: Domain data structures (programs, sessions, meals, completions)
//! - **Database**: `SQLite` persistence with per-domain migration and query modules
//! - **Services**: Protocol-agnostic business logic (enrollment, completion, progress)
//! - **Routes**: Axum REST handlers, one router per resource
//! - **Auth**: JWT-based authentication with one-time verification codes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fitplan_server::config::environment::ServerConfig;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("Fitplan server configured with port: HTTP={}", config.http_port);
//!     Ok(())
//! }
//! ```

/// Authentication and session management
pub mod auth;

/// Configuration management and persistence
pub mod config;

/// Application constants and configuration values
pub mod constants;

/// Database access layer for all persisted entities
pub mod database;

/// Unified error handling system with standard error codes and HTTP responses
pub mod errors;

/// Language selection and localized content resolution
pub mod i18n;

/// Structured logging configuration
pub mod logging;

/// Common data structures for programs, sessions, meals, and tracking
pub mod models;

/// `HTTP` route handlers, one router per resource
pub mod routes;

/// Session/meal schedule derivation from program parameters
pub mod schedule;

/// HTTP server assembly and shared resource container
pub mod server;

/// Domain service layer for business logic extracted from route handlers
pub mod services;

/// One-time verification code issuance and validation
pub mod verification;
