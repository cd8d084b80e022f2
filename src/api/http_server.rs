// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server wiring: routes, shared state, static assets

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, State};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::Router;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::pages;
use super::predict::predict_handler;
use crate::detection::ObjectDetector;
use crate::storage::UploadStore;
use crate::version;

/// Shared application state: the process-wide detector and the upload store,
/// both constructed once at startup.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn ObjectDetector>,
    pub store: Arc<UploadStore>,
}

impl AppState {
    pub fn new(detector: Arc<dyn ObjectDetector>, store: Arc<UploadStore>) -> Self {
        Self { detector, store }
    }
}

/// Build the application router.
///
/// Separated from `start_server` so tests can drive the router directly.
pub fn build_router(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(home_handler))
        .route("/health", get(health_handler))
        .route("/predict", post(predict_handler))
        .nest_service("/static", ServeDir::new(state.store.static_root()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    body_limit: usize,
) -> anyhow::Result<()> {
    let app = build_router(state, body_limit);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn home_handler() -> impl IntoResponse {
    Html(pages::render_index(None))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    axum::response::Json(json!({
        "status": "ok",
        "model": state.detector.model_name(),
        "version": version::get_version_info(),
    }))
}
