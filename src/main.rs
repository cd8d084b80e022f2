// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use fabstir_vision_node::{
    api::{start_server, AppState},
    config::NodeConfig,
    detection::{DetectorConfig, OnnxDetector},
    storage::UploadStore,
    version,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting {}", version::get_version_string());

    let config = NodeConfig::from_env();
    tracing::info!(
        "Configuration: port={}, model={}, static={}",
        config.api_port,
        config.model_path.display(),
        config.static_dir.display()
    );

    // Storage directories are created up front so the first upload never
    // races directory creation.
    let store = UploadStore::new(&config.static_dir);
    store.ensure_dirs()?;

    // Load the detection model once; it is shared read-only across requests.
    let detector = OnnxDetector::new(DetectorConfig {
        model_path: config.model_path.clone(),
        confidence_threshold: config.confidence_threshold,
        iou_threshold: config.iou_threshold,
        ..DetectorConfig::default()
    })
    .await?;

    let state = AppState::new(Arc::new(detector), Arc::new(store));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    start_server(state, addr, config.body_limit_bytes).await
}
