// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection for uploaded images
//!
//! This module provides:
//! - A pretrained ONNX detection model wrapper (`OnnxDetector`)
//! - A fixed-output detector for tests and demos (`StaticDetector`)
//! - Annotated-image rendering of detection results
//!
//! Detection runs on CPU only.

pub mod annotate;
pub mod labels;
pub mod model;
pub mod preprocessing;
pub mod static_detector;

use std::path::Path;

use anyhow::{Context, Result};
use image::DynamicImage;

pub use labels::{class_label, COCO_CLASSES};
pub use model::{DetectorConfig, OnnxDetector};
pub use preprocessing::{Letterbox, DETECT_INPUT_SIZE};
pub use static_detector::StaticDetector;

/// A single detected object in source-image pixel coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedRegion {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    pub class_id: usize,
    pub label: String,
}

impl DetectedRegion {
    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    pub fn intersection_area(&self, other: &DetectedRegion) -> f32 {
        let x1 = self.x1.max(other.x1);
        let y1 = self.y1.max(other.y1);
        let x2 = self.x2.min(other.x2);
        let y2 = self.y2.min(other.y2);

        if x2 > x1 && y2 > y1 {
            (x2 - x1) * (y2 - y1)
        } else {
            0.0
        }
    }

    pub fn iou(&self, other: &DetectedRegion) -> f32 {
        let intersection = self.intersection_area(other);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// The outcome of one detection invocation
///
/// Owns the decoded source image so the result can render itself with the
/// detections overlaid. The region list is possibly empty, never absent.
pub struct DetectionResult {
    image: DynamicImage,
    pub regions: Vec<DetectedRegion>,
}

impl DetectionResult {
    pub fn new(image: DynamicImage, regions: Vec<DetectedRegion>) -> Self {
        Self { image, regions }
    }

    /// Render the source image with detections overlaid to `output_path`.
    ///
    /// The output format is inferred from the path extension.
    pub fn render(&self, output_path: &Path) -> Result<()> {
        let annotated = annotate::draw_regions(&self.image, &self.regions);
        DynamicImage::ImageRgb8(annotated)
            .save(output_path)
            .with_context(|| format!("Failed to save annotated image to {}", output_path.display()))
    }
}

/// A detection model invocable with an image path
///
/// Implementations must be safe for concurrent invocation; the ONNX-backed
/// detector serializes session access behind a mutex.
pub trait ObjectDetector: Send + Sync {
    /// Run detection on the image at `image_path`.
    fn detect(&self, image_path: &Path) -> Result<DetectionResult>;

    /// Name of the underlying model, for health reporting and logs.
    fn model_name(&self) -> &str;
}

/// Load an image from disk, sniffing the format from content rather than
/// trusting the file extension.
pub(crate) fn load_image(path: &Path) -> Result<DynamicImage> {
    image::ImageReader::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to probe image format of {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode image {}", path.display()))
}
