// ABOUTME: System-wide constants and configuration values for the Fitplan API
// ABOUTME: Contains validation limits, defaults, and shared user-facing messages
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Constants Module
//!
//! Application constants shared across modules.

/// Service identification
pub mod service_names {
    /// Canonical service name used for logging and token audiences
    pub const FITPLAN_SERVER: &str = "fitplan-server";
}

/// Validation limits for user-supplied data
pub mod limits {
    /// Minimum accepted user age
    pub const MIN_AGE: u32 = 16;
    /// Maximum accepted user age
    pub const MAX_AGE: u32 = 50;
    /// Minimum accepted height in centimeters
    pub const MIN_HEIGHT_CM: u32 = 140;
    /// Maximum accepted height in centimeters
    pub const MAX_HEIGHT_CM: u32 = 220;
    /// Minimum accepted weight in kilograms
    pub const MIN_WEIGHT_KG: u32 = 30;
    /// Maximum accepted weight in kilograms
    pub const MAX_WEIGHT_KG: u32 = 200;
    /// Minimum sessions per week for a program
    pub const MIN_FREQUENCY_PER_WEEK: i64 = 1;
    /// Maximum sessions per week for a program
    pub const MAX_FREQUENCY_PER_WEEK: i64 = 7;
    /// Default JWT session lifetime in hours
    pub const DEFAULT_SESSION_HOURS: i64 = 24;
    /// Refresh token lifetime in hours
    pub const REFRESH_TOKEN_HOURS: i64 = 24 * 7;
    /// Verification codes expire after this many seconds
    pub const VERIFICATION_CODE_TTL_SECS: i64 = 300;
    /// Inclusive lower bound of the 4-digit verification code range
    pub const VERIFICATION_CODE_MIN: u32 = 1000;
    /// Inclusive upper bound of the 4-digit verification code range
    pub const VERIFICATION_CODE_MAX: u32 = 9999;
}

/// Default values used when environment variables are absent
pub mod defaults {
    /// Default HTTP port
    pub const HTTP_PORT: u16 = 8081;
    /// Default `SQLite` database path
    pub const DATABASE_URL: &str = "sqlite:./data/fitplan.db";
    /// Default maximum database connections
    pub const DB_MAX_CONNECTIONS: u32 = 10;
}

/// Shared user-facing message fragments
pub mod error_messages {
    pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
    pub const USER_ALREADY_EXISTS: &str = "This email or phone number is already registered";
    pub const CODE_EXPIRED_OR_INVALID: &str = "Verification code expired or invalid";
    pub const NO_ACTIVE_PROGRAM: &str = "No active program found for the user";
}
