// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod detection;
pub mod storage;
pub mod version;

// Re-export main types
pub use api::http_server::AppState;
pub use api::{ApiError, DetectionStats, PredictResponse, ResponseFormat};
pub use config::NodeConfig;
pub use detection::{
    DetectedRegion, DetectionResult, DetectorConfig, ObjectDetector, OnnxDetector, StaticDetector,
};
pub use storage::UploadStore;
