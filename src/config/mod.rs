// ABOUTME: Configuration module for environment-driven server settings
// ABOUTME: Re-exports the environment configuration types used across the crate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! Configuration management
//!
//! All runtime configuration comes from environment variables; there is no
//! configuration file. See [`environment::ServerConfig::from_env`].

pub mod environment;

pub use environment::{DatabaseUrl, Environment, LogLevel, ServerConfig};
