use anyhow::{Context, Result};
use std::time::Duration;

use axum::{
    extract::{DefaultBodyLimit, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::info;

use super::{log_requests, state::*, upload::upload_database, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub version: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    pub status: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    Json(ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

pub fn make_app(config: ServerConfig, extractor: GuardedExtractor) -> Router {
    let state = ServerState::new(config.clone(), extractor);

    let upload_routes: Router = Router::new()
        .route("/upload", post(upload_database))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .with_state(state.clone());

    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(upload_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

pub async fn run_server(config: ServerConfig, extractor: GuardedExtractor) -> Result<()> {
    let port = config.port;
    let app = make_app(config, extractor);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    info!("Ready to serve at port {}!", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}
