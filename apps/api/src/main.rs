mod accounts;
mod activities;
mod ai_settings;
mod analysis;
mod analytics;
mod candidates;
mod chat;
mod config;
mod db;
mod errors;
mod llm_client;
mod models;
mod outreach;
mod routes;
mod state;
mod subscription;
mod vacancies;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::selector::AnalysisProviderSelector;
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting {} API v{}",
        config.project_name,
        env!("CARGO_PKG_VERSION")
    );

    let db = create_pool(&config.database_url).await?;

    let ai = AnalysisProviderSelector::from_config(&config.ai, &config.project_name)
        .context("Failed to build AI provider clients")?;

    info!(
        "Subscription tiers loaded: {}",
        config
            .tiers
            .iter()
            .map(|(tier, def)| format!("{tier}={}", def.resume_limit))
            .collect::<Vec<_>>()
            .join(", ")
    );

    let cors = build_cors(&config)?;
    let port = config.port;

    let state = AppState {
        db,
        config,
        ai: Arc::new(ai),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Permissive when `CORS_ORIGINS` is unset, otherwise an exact allow-list.
fn build_cors(config: &Config) -> Result<CorsLayer> {
    let Some(origins) = &config.cors_origins else {
        return Ok(CorsLayer::permissive());
    };
    let origins = origins
        .iter()
        .map(|o| HeaderValue::from_str(o).with_context(|| format!("Invalid CORS origin '{o}'")))
        .collect::<Result<Vec<_>>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any))
}
