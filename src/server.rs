// SYNOID Highlight Server
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use anyhow::{Context, Result};
use axum::{extract::State, routing::get, Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::editor_api;
use crate::state::{KernelState, ServerStatus};

pub type AppState = Arc<KernelState>;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/status", get(get_status))
        .with_state(state.clone())
        .merge(editor_api::router(state))
        .layer(CorsLayer::permissive())
}

pub async fn start_server(port: u16, state: AppState) -> Result<()> {
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let display_addr = if addr.ip().is_unspecified() {
        format!("127.0.0.1:{}", port)
    } else {
        addr.to_string()
    };
    info!("🚀 SYNOID Highlight Server running on http://{}", display_addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server terminated")?;
    Ok(())
}

async fn get_status(State(state): State<AppState>) -> Json<ServerStatus> {
    Json(ServerStatus {
        status: "ok",
        sessions: state.session_count().await,
    })
}
