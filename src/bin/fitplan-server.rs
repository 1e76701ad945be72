// ABOUTME: Main server binary for the Fitplan fitness tracking API
// ABOUTME: Loads configuration, opens the database, and serves HTTP requests
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Fitplan API Server Binary
//!
//! Starts the Fitplan REST API with user authentication, program scheduling,
//! and completion tracking over `SQLite`.

use anyhow::Result;
use clap::Parser;
use fitplan_server::{
    config::environment::ServerConfig,
    database::Database,
    logging::LoggingConfig,
    server::{HttpServer, ServerResources},
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fitplan-server")]
#[command(about = "Fitplan API - fitness program and meal tracking backend")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(port) = args.http_port {
        config.http_port = port;
    }
    if let Some(url) = args.database_url {
        config.database.url = fitplan_server::config::DatabaseUrl::parse_url(&url);
    }

    info!(
        port = config.http_port,
        environment = %config.environment,
        database = %config.database.url.to_connection_string(),
        "starting fitplan server"
    );

    let database = Database::new(
        &config.database.url.to_connection_string(),
        config.database.max_connections,
    )
    .await?;
    info!("database ready, migrations applied");

    let resources = Arc::new(ServerResources::new(database, Arc::new(config)));
    HttpServer::new(resources).run().await
}
