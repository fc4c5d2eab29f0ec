// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Water Transitions API Server
//!
//! Serves protected area pages and per-area surface-water transition
//! statistics computed on Earth Engine.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use water_transitions::{
    config::Config,
    services::{
        EarthEngineClient, MemoryCache, ProtectedPlanetClient, ServiceAccountCredentials,
        TransitionService,
    },
    templates::TemplateRenderer,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Water Transitions API");

    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()?;

    // Earth Engine service account, loaded once
    let credentials = Arc::new(ServiceAccountCredentials::from_pem_file(
        http.clone(),
        &config.ee_account,
        &config.ee_private_key_file,
        &config.ee_token_uri,
    )?);
    tracing::info!(account = credentials.account(), "Earth Engine credentials loaded");

    let geospatial = Arc::new(EarthEngineClient::new(
        http.clone(),
        &config.ee_base_url,
        &config.ee_project,
        credentials,
    ));
    let registry = Arc::new(ProtectedPlanetClient::new(
        http,
        &config.ppapi_base_url,
        &config.ppapi_token,
    ));

    let cache = Arc::new(MemoryCache::new());
    let transitions = TransitionService::new(
        registry.clone(),
        geospatial.clone(),
        cache,
        config.cache_expiration,
    );

    let templates = match &config.template_dir {
        Some(dir) => TemplateRenderer::from_dir(dir)?,
        None => TemplateRenderer::builtin()?,
    };

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        registry,
        geospatial,
        transitions,
        templates,
    });

    // Build router
    let app = water_transitions::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("water_transitions=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
