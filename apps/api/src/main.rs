mod config;
mod email;
mod errors;
mod http_client;
mod llm_client;
mod outreach;
mod routes;
mod search;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::http_client::ReqwestTransport;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hunter API v{}", env!("CARGO_PKG_VERSION"));

    // One transport for both upstreams so connections are pooled
    let transport = ReqwestTransport::new(config.request_timeout())
        .context("Failed to build HTTP client")?;
    let state = AppState::new(&config, Arc::new(transport));
    info!(
        "Upstreams: search={} chat={} (model: {})",
        config.search_api_url,
        config.chat_api_url,
        state.llm.model()
    );
    info!(
        "Retry policy: {} attempt(s), base delay {}ms; extended web queries: {}",
        config.retry_max_attempts, config.retry_base_delay_ms, config.extended_web_queries
    );

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // the browser front-end calls this API directly

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
