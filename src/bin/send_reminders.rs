// ABOUTME: Cron-driven binary that re-issues due reminder notifications
// ABOUTME: Runs one sweep against the configured database and exits
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Fitplan Labs

//! # Reminder Sweep Binary
//!
//! Intended to run on an external cron cadence. Each invocation performs one
//! fire-and-forget sweep: reminder notifications whose scheduled time has
//! passed today are re-issued for users who keep reminders enabled.

use anyhow::Result;
use clap::Parser;
use fitplan_server::{
    config::environment::ServerConfig,
    database::Database,
    logging::LoggingConfig,
    services::notifications,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "send-reminders")]
#[command(about = "Send scheduled reminders to Fitplan users")]
pub struct Args {
    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    LoggingConfig::from_env().init()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(url) = args.database_url {
        config.database.url = fitplan_server::config::DatabaseUrl::parse_url(&url);
    }

    let database = Database::new(
        &config.database.url.to_connection_string(),
        config.database.max_connections,
    )
    .await?;

    match notifications::run_reminder_sweep(&database).await {
        Ok(issued) => {
            info!(issued, "successfully sent reminders");
            Ok(())
        }
        Err(e) => {
            error!("failed to send reminders: {e}");
            Err(e)
        }
    }
}
