//! Tang Server Binary
//!
//! Runs the Tang HTTP server.

use anyhow::Context;
use axum::{extract::Request, ServiceExt};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tang_server::{create_router, spawn_scheduled_rotation, AppState, Args, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("Invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = ServerConfig::from_args(&args)
        .await
        .context("Failed to open key storage")?;

    let state = Arc::new(AppState::new(config.storage, config.rotate_token));

    // Generate the first key pair now rather than on the first request
    let keys = state
        .keys
        .ensure_active()
        .await
        .context("Failed to initialise keys")?;

    info!(
        storage = ?args.storage,
        active = keys.active.len(),
        rotated = keys.rotated.len(),
        rotate_endpoint = state.rotate_token.is_some(),
        "Starting Tang server"
    );

    if let Some(period) = config.rotate_interval {
        info!(period_secs = period.as_secs(), "Scheduled key rotation enabled");
        spawn_scheduled_rotation(state.keys.clone(), period);
    }

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("Failed to bind to {}", args.listen))?;

    info!(addr = %args.listen, "Tang listening");

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .context("Server error")?;
    Ok(())
}
