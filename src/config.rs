// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Node configuration parsed from environment variables

use std::env;
use std::path::PathBuf;

/// Default maximum upload size (10MB)
pub const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Runtime configuration for the vision node
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// HTTP listen port
    pub api_port: u16,
    /// Root directory for static assets (uploads live in `<static_dir>/uploads`)
    pub static_dir: PathBuf,
    /// Path to the ONNX detection model file
    pub model_path: PathBuf,
    /// Minimum confidence score for a detection to be kept
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression
    pub iou_threshold: f32,
    /// Maximum accepted request body size in bytes
    pub body_limit_bytes: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            api_port: 8080,
            static_dir: PathBuf::from("./static"),
            model_path: PathBuf::from("./models/yolov8n.onnx"),
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl NodeConfig {
    /// Build a configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(defaults.api_port);

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);

        let model_path = env::var("MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let confidence_threshold = env::var("CONFIDENCE_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(defaults.confidence_threshold);

        let iou_threshold = env::var("IOU_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f32>().ok())
            .unwrap_or(defaults.iou_threshold);

        let body_limit_bytes = env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.body_limit_bytes);

        Self {
            api_port,
            static_dir,
            model_path,
            confidence_threshold: confidence_threshold.clamp(0.0, 1.0),
            iou_threshold: iou_threshold.clamp(0.0, 1.0),
            body_limit_bytes,
        }
    }
}
