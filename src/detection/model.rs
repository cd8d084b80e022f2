// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pretrained object-detection model
//!
//! Wraps a YOLO-family ONNX model. The session is loaded once at startup and
//! shared process-wide; invocation is serialized behind a mutex because ONNX
//! Runtime sessions take `&mut self` to run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use ndarray::{ArrayViewD, IxDyn};
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use tracing::{debug, info};

use super::labels::class_label;
use super::preprocessing::{preprocess, Letterbox, DETECT_INPUT_SIZE};
use super::{DetectedRegion, DetectionResult, ObjectDetector};

/// Configuration for loading the detection model
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Path to the ONNX model file
    pub model_path: PathBuf,
    /// Square input size expected by the model
    pub input_size: u32,
    /// Minimum confidence score for a detection to be kept
    pub confidence_threshold: f32,
    /// IoU threshold for non-maximum suppression
    pub iou_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("./models/yolov8n.onnx"),
            input_size: DETECT_INPUT_SIZE,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
        }
    }
}

/// ONNX-backed object detector
pub struct OnnxDetector {
    /// ONNX Runtime session (invocation serialized)
    session: Arc<Mutex<Session>>,
    /// Model input name
    input_name: String,
    config: DetectorConfig,
    name: String,
}

impl std::fmt::Debug for OnnxDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxDetector")
            .field("input_name", &self.input_name)
            .field("config", &self.config)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl OnnxDetector {
    /// Load the detection model from disk
    ///
    /// # Errors
    /// Returns error if:
    /// - Model file not found
    /// - ONNX Runtime initialization fails
    pub async fn new(config: DetectorConfig) -> Result<Self> {
        let model_path = config.model_path.as_path();

        if !model_path.exists() {
            anyhow::bail!("Detection model not found: {}", model_path.display());
        }

        info!("Loading detection model from {}", model_path.display());

        // CPU-only execution; detection never competes for GPU
        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(4)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detection model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        debug!("Detection model loaded - input: {}", input_name);

        let name = model_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("onnx-detector")
            .to_string();

        info!("✅ Detection model loaded successfully (CPU-only)");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            config,
            name,
        })
    }

    /// Decode raw model output into regions in source-image coordinates
    ///
    /// Expects the YOLO export layout [1, 4 + num_classes, anchors]: four
    /// center-format box values followed by per-class scores per anchor.
    fn decode_output(
        &self,
        output: ArrayViewD<'_, f32>,
        letterbox: &Letterbox,
        source_w: u32,
        source_h: u32,
    ) -> Result<Vec<DetectedRegion>> {
        let shape = output.shape();
        if shape.len() != 3 || shape[0] != 1 || shape[1] < 5 {
            anyhow::bail!("Unexpected detection output shape: {:?}", shape);
        }

        let attrs = shape[1];
        let anchors = shape[2];
        let num_classes = attrs - 4;

        let mut regions = Vec::new();

        for i in 0..anchors {
            let mut best_class = 0;
            let mut best_score = 0.0f32;
            for c in 0..num_classes {
                let score = output[IxDyn(&[0, 4 + c, i])];
                if score > best_score {
                    best_score = score;
                    best_class = c;
                }
            }

            if best_score < self.config.confidence_threshold {
                continue;
            }

            let cx = output[IxDyn(&[0, 0, i])];
            let cy = output[IxDyn(&[0, 1, i])];
            let w = output[IxDyn(&[0, 2, i])];
            let h = output[IxDyn(&[0, 3, i])];

            let (x1, y1) = letterbox.to_source(cx - w / 2.0, cy - h / 2.0);
            let (x2, y2) = letterbox.to_source(cx + w / 2.0, cy + h / 2.0);

            regions.push(DetectedRegion {
                x1: x1.clamp(0.0, source_w as f32),
                y1: y1.clamp(0.0, source_h as f32),
                x2: x2.clamp(0.0, source_w as f32),
                y2: y2.clamp(0.0, source_h as f32),
                confidence: best_score.clamp(0.0, 1.0),
                class_id: best_class,
                label: class_label(best_class).to_string(),
            });
        }

        Ok(non_max_suppression(regions, self.config.iou_threshold))
    }
}

impl ObjectDetector for OnnxDetector {
    fn detect(&self, image_path: &Path) -> Result<DetectionResult> {
        let image = super::load_image(image_path)?;
        let (source_w, source_h) = (image.width(), image.height());

        let (input, letterbox) = preprocess(&image, self.config.input_size);

        let regions = {
            let mut session = self.session.lock().unwrap();

            let input_value =
                Value::from_array(input).context("Failed to create input tensor")?;

            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .context("Detection inference failed")?;

            let output_tensor = outputs[0]
                .try_extract_array::<f32>()
                .context("Failed to extract output tensor")?;

            self.decode_output(output_tensor.view(), &letterbox, source_w, source_h)?
        };

        debug!("Detected {} regions in {}", regions.len(), image_path.display());

        Ok(DetectionResult::new(image, regions))
    }

    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Greedy per-class non-maximum suppression
fn non_max_suppression(mut regions: Vec<DetectedRegion>, iou_threshold: f32) -> Vec<DetectedRegion> {
    regions.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<DetectedRegion> = Vec::new();
    for region in regions {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == region.class_id && k.iou(&region) > iou_threshold);
        if !suppressed {
            kept.push(region);
        }
    }

    kept
}
