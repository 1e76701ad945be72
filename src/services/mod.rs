// ABOUTME: Domain service layer for business logic extracted from route handlers
// ABOUTME: Provides protocol-agnostic services for enrollment, completion, and progress
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Domain service layer
//!
//! This module contains business logic extracted from route handlers so the
//! rules live in one place regardless of the entry point (REST today, the
//! reminder binary for the sweep).

/// Session/meal completion rules: ordering, date gating, progress counting
pub mod completion;

/// Enrollment on verification: user program creation and schedule fan-out
pub mod enrollment;

/// Localized notification issuance and the reminder sweep
pub mod notifications;

/// Daily and weekly progress aggregation
pub mod progress;
